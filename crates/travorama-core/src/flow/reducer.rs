//! Login reducer (update function).
//!
//! `update(state, event, ctx)` returns the next state and the effects the
//! controller must run. It performs no I/O.

use super::effects::{LoginEffect, Secret};
use super::events::LoginEvent;
use super::navigation::Route;
use super::state::{FormState, Phase, SubmissionId};
use crate::auth::outcome::submission_message;
use crate::auth::{AuthOutcome, Credentials, PhoneFormatter, TransportError, Validator};

/// Pure collaborators the reducer consults.
#[derive(Clone, Copy)]
pub struct FlowContext<'a> {
    pub validator: &'a dyn Validator,
    pub formatter: &'a dyn PhoneFormatter,
    /// Calling code sent with phone identifiers.
    pub country_code: &'a str,
}

/// The login reducer.
pub fn update(
    mut state: FormState,
    event: LoginEvent,
    ctx: &FlowContext<'_>,
) -> (FormState, Vec<LoginEffect>) {
    if state.has_succeeded() && !matches!(event, LoginEvent::Teardown) {
        return (state, vec![]);
    }

    match event {
        LoginEvent::Mounted => (state, vec![LoginEffect::SubscribeNotifications]),
        LoginEvent::IdentifierChanged(identifier) => {
            state.identifier = identifier;
            state.identifier_error = None;
            state.submission_error = None;
            (state, vec![])
        }
        LoginEvent::SecretChanged(secret) => {
            state.secret = secret;
            state.secret_error = None;
            state.submission_error = None;
            (state, vec![])
        }
        LoginEvent::ToggleSecretVisibility => {
            state.is_secret_visible = !state.is_secret_visible;
            (state, vec![])
        }
        LoginEvent::SubmitRequested => submit(state, ctx),
        LoginEvent::ForgotPasswordRequested => {
            (state, vec![LoginEffect::Navigate(Route::ForgotPassword)])
        }
        LoginEvent::AuthCompleted { submission, result } => complete(state, submission, result),
        LoginEvent::Teardown => (state, vec![LoginEffect::ReleaseNotifications]),
    }
}

fn submit(mut state: FormState, ctx: &FlowContext<'_>) -> (FormState, Vec<LoginEffect>) {
    // A second submit while one is in flight is dropped, not queued.
    if !state.can_submit() {
        return (state, vec![]);
    }

    let mut effects = vec![LoginEffect::DismissKeyboard];
    state.phase = Phase::Validating;

    // Both validators always run so both messages can show together.
    state.identifier_error = non_empty(ctx.validator.validate_identifier(&state.identifier));
    state.secret_error = non_empty(ctx.validator.validate_secret(&state.secret));

    if state.identifier_error.is_some() || state.secret_error.is_some() {
        state.phase = Phase::Idle;
        return (state, effects);
    }

    let credentials = Credentials::classify(
        &state.identifier,
        ctx.validator,
        ctx.formatter,
        ctx.country_code,
    );

    state.submissions += 1;
    let submission = state.submissions;
    state.submission_error = None;
    state.phase = Phase::Submitting {
        submission,
        identifier: state.identifier.clone(),
    };

    effects.push(LoginEffect::Login {
        submission,
        credentials,
        secret: Secret::new(state.secret.clone()),
    });
    (state, effects)
}

fn complete(
    mut state: FormState,
    submission: SubmissionId,
    result: Result<AuthOutcome, TransportError>,
) -> (FormState, Vec<LoginEffect>) {
    let identifier = match &state.phase {
        Phase::Submitting {
            submission: in_flight,
            identifier,
        } if *in_flight == submission => identifier.clone(),
        _ => {
            tracing::debug!(submission, "discarding stale login result");
            return (state, vec![]);
        }
    };

    if let Ok(AuthOutcome::Success) = result {
        state.phase = Phase::Succeeded;
        return (
            state,
            vec![
                LoginEffect::PersistLoggedIn(true),
                LoginEffect::RegisterPush,
                LoginEffect::Navigate(Route::Main),
            ],
        );
    }

    state.phase = Phase::Idle;
    state.submission_error = submission_message(&result, &identifier);

    match result {
        Err(error) => (
            state,
            vec![LoginEffect::LogTransportError { submission, error }],
        ),
        Ok(_) => (state, vec![]),
    }
}

fn non_empty(message: Option<String>) -> Option<String> {
    message.filter(|m| !m.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::outcome::MSG_SERVER_ERROR;
    use crate::auth::{AuthErrorCode, FormRules};

    fn run(state: FormState, events: Vec<LoginEvent>) -> (FormState, Vec<LoginEffect>) {
        let rules = FormRules::default();
        let ctx = FlowContext {
            validator: &rules,
            formatter: &rules,
            country_code: "62",
        };
        let mut all = Vec::new();
        let mut state = state;
        for event in events {
            let (next, effects) = update(state, event, &ctx);
            state = next;
            all.extend(effects);
        }
        (state, all)
    }

    fn filled(identifier: &str, secret: &str) -> FormState {
        FormState {
            identifier: identifier.to_string(),
            secret: secret.to_string(),
            ..FormState::default()
        }
    }

    fn login_count(effects: &[LoginEffect]) -> usize {
        effects
            .iter()
            .filter(|e| matches!(e, LoginEffect::Login { .. }))
            .count()
    }

    /// Submits and answers with `result`, returning the final state and effects
    /// produced by the answer alone.
    fn submit_and_answer(
        identifier: &str,
        secret: &str,
        result: Result<AuthOutcome, TransportError>,
    ) -> (FormState, Vec<LoginEffect>) {
        let (state, _) = run(filled(identifier, secret), vec![LoginEvent::SubmitRequested]);
        run(
            state,
            vec![LoginEvent::AuthCompleted {
                submission: 1,
                result,
            }],
        )
    }

    #[test]
    fn test_valid_input_starts_exactly_one_login() {
        let (state, effects) = run(
            filled("user@example.com", "validpass"),
            vec![LoginEvent::SubmitRequested],
        );

        assert_eq!(effects[0], LoginEffect::DismissKeyboard);
        assert_eq!(login_count(&effects), 1);
        assert!(state.is_submitting());
        assert_eq!(state.identifier_error, None);
        assert_eq!(state.secret_error, None);
    }

    #[test]
    fn test_invalid_input_never_calls_login_and_sets_both_errors() {
        let (state, effects) = run(filled("", ""), vec![LoginEvent::SubmitRequested]);

        assert_eq!(effects, vec![LoginEffect::DismissKeyboard]);
        assert!(state.identifier_error.is_some());
        assert!(state.secret_error.is_some());
        assert_eq!(state.phase, Phase::Idle);
    }

    #[test]
    fn test_only_secret_invalid_sets_only_secret_error() {
        let (state, effects) = run(
            filled("user@example.com", ""),
            vec![LoginEvent::SubmitRequested],
        );

        assert_eq!(login_count(&effects), 0);
        assert_eq!(state.identifier_error, None);
        assert!(state.secret_error.is_some());
    }

    #[test]
    fn test_phone_identifier_produces_phone_credentials() {
        let (_, effects) = run(
            filled("08123456789", "validpass"),
            vec![LoginEvent::SubmitRequested],
        );

        let Some(LoginEffect::Login { credentials, .. }) = effects.get(1) else {
            panic!("expected login effect, got {effects:?}");
        };
        assert_eq!(
            *credentials,
            Credentials::Phone {
                phone_number: "8123456789".to_string(),
                country_code: "62".to_string(),
            }
        );
    }

    #[test]
    fn test_email_identifier_produces_email_credentials() {
        let (_, effects) = run(
            filled("user@example.com", "validpass"),
            vec![LoginEvent::SubmitRequested],
        );

        let Some(LoginEffect::Login { credentials, .. }) = effects.get(1) else {
            panic!("expected login effect, got {effects:?}");
        };
        assert_eq!(
            *credentials,
            Credentials::Email {
                email: "user@example.com".to_string(),
            }
        );
    }

    #[test]
    fn test_success_emits_ordered_post_login_effects() {
        let (state, effects) =
            submit_and_answer("08123456789", "validpass", Ok(AuthOutcome::Success));

        assert_eq!(
            effects,
            vec![
                LoginEffect::PersistLoggedIn(true),
                LoginEffect::RegisterPush,
                LoginEffect::Navigate(Route::Main),
            ]
        );
        assert!(state.has_succeeded());
        assert!(!state.has_errors());
    }

    #[test]
    fn test_invalid_password_keeps_fields() {
        let (state, effects) = submit_and_answer(
            "user@example.com",
            "wrong",
            Ok(AuthOutcome::Failure(AuthErrorCode::InvalidPassword)),
        );

        assert!(effects.is_empty());
        assert_eq!(state.submission_error.as_deref(), Some("Incorrect password"));
        assert!(!state.is_submitting());
        assert_eq!(state.identifier, "user@example.com");
        assert_eq!(state.secret, "wrong");
    }

    #[test]
    fn test_not_registered_interpolates_identifier() {
        let (state, _) = submit_and_answer(
            "ghost@example.com",
            "x",
            Ok(AuthOutcome::Failure(AuthErrorCode::NotRegistered)),
        );

        assert_eq!(
            state.submission_error.as_deref(),
            Some("Account ghost@example.com not found")
        );
    }

    #[test]
    fn test_not_registered_uses_submitted_identifier() {
        let (state, _) = run(
            filled("ghost@example.com", "x"),
            vec![
                LoginEvent::SubmitRequested,
                LoginEvent::IdentifierChanged("other@example.com".to_string()),
                LoginEvent::AuthCompleted {
                    submission: 1,
                    result: Ok(AuthOutcome::Failure(AuthErrorCode::NotRegistered)),
                },
            ],
        );

        assert_eq!(
            state.submission_error.as_deref(),
            Some("Account ghost@example.com not found")
        );
        assert_eq!(state.identifier, "other@example.com");
    }

    #[test]
    fn test_unrecognized_code_is_generic_server_error() {
        let (state, effects) = submit_and_answer(
            "user@example.com",
            "pw",
            Ok(AuthOutcome::Failure(AuthErrorCode::Unrecognized(
                "ERR_LOCKED".to_string(),
            ))),
        );

        assert!(effects.is_empty());
        assert_eq!(state.submission_error.as_deref(), Some(MSG_SERVER_ERROR));
    }

    #[test]
    fn test_transport_error_is_logged_and_generic() {
        let error = TransportError::timeout("timed out");
        let (state, effects) =
            submit_and_answer("user@example.com", "pw", Err(error.clone()));

        assert_eq!(state.submission_error.as_deref(), Some(MSG_SERVER_ERROR));
        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(
            effects,
            vec![LoginEffect::LogTransportError {
                submission: 1,
                error
            }]
        );
    }

    #[test]
    fn test_editing_secret_after_failure_clears_submission_error() {
        let (state, _) = submit_and_answer(
            "user@example.com",
            "wrong",
            Ok(AuthOutcome::Failure(AuthErrorCode::InvalidPassword)),
        );
        assert!(state.submission_error.is_some());

        let (state, effects) = run(state, vec![LoginEvent::SecretChanged("right".to_string())]);
        assert!(effects.is_empty());
        assert_eq!(state.submission_error, None);
        assert!(state.can_submit());
    }

    #[test]
    fn test_editing_identifier_clears_only_its_error() {
        let (state, _) = run(filled("", ""), vec![LoginEvent::SubmitRequested]);
        let (state, _) = run(state, vec![LoginEvent::IdentifierChanged("u".to_string())]);

        assert_eq!(state.identifier_error, None);
        assert!(state.secret_error.is_some());
    }

    #[test]
    fn test_second_submit_while_submitting_is_ignored() {
        let (state, effects) = run(
            filled("user@example.com", "validpass"),
            vec![LoginEvent::SubmitRequested, LoginEvent::SubmitRequested],
        );

        assert_eq!(login_count(&effects), 1);
        assert_eq!(state.submissions, 1);
    }

    #[test]
    fn test_stale_result_is_discarded() {
        let (state, _) = submit_and_answer(
            "user@example.com",
            "wrong",
            Ok(AuthOutcome::Failure(AuthErrorCode::InvalidPassword)),
        );
        let (state, effects) = run(state, vec![LoginEvent::SubmitRequested]);
        assert_eq!(login_count(&effects), 1);

        // Late duplicate answer for submission 1 while submission 2 is in flight.
        let (state, effects) = run(
            state,
            vec![LoginEvent::AuthCompleted {
                submission: 1,
                result: Ok(AuthOutcome::Success),
            }],
        );
        assert!(effects.is_empty());
        assert!(state.is_submitting());
    }

    #[test]
    fn test_result_without_submission_is_discarded() {
        let (state, effects) = run(
            FormState::default(),
            vec![LoginEvent::AuthCompleted {
                submission: 7,
                result: Ok(AuthOutcome::Success),
            }],
        );
        assert!(effects.is_empty());
        assert_eq!(state, FormState::default());
    }

    #[test]
    fn test_toggle_visibility_is_orthogonal() {
        let (state, effects) = run(
            filled("user@example.com", "validpass"),
            vec![
                LoginEvent::SubmitRequested,
                LoginEvent::ToggleSecretVisibility,
            ],
        );

        assert!(state.is_secret_visible);
        assert!(state.is_submitting());
        assert_eq!(login_count(&effects), 1);
    }

    #[test]
    fn test_forgot_password_navigates() {
        let (_, effects) = run(
            FormState::default(),
            vec![LoginEvent::ForgotPasswordRequested],
        );
        assert_eq!(effects, vec![LoginEffect::Navigate(Route::ForgotPassword)]);
    }

    #[test]
    fn test_mount_and_teardown_manage_subscription() {
        let (_, effects) = run(
            FormState::default(),
            vec![LoginEvent::Mounted, LoginEvent::Teardown],
        );
        assert_eq!(
            effects,
            vec![
                LoginEffect::SubscribeNotifications,
                LoginEffect::ReleaseNotifications,
            ]
        );
    }

    #[test]
    fn test_events_after_success_are_ignored() {
        let (state, _) =
            submit_and_answer("user@example.com", "validpass", Ok(AuthOutcome::Success));
        let (state, effects) = run(
            state,
            vec![
                LoginEvent::SubmitRequested,
                LoginEvent::IdentifierChanged("x".to_string()),
            ],
        );

        assert!(effects.is_empty());
        assert!(state.has_succeeded());
        assert_eq!(state.identifier, "user@example.com");
    }
}
