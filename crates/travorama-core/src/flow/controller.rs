//! Login controller - owns the form state and executes effects.
//!
//! This is the side-effect boundary of the login flow: the reducer decides,
//! the controller performs. Login requests run on the tokio runtime and their
//! answers come back through an inbox channel, which callers drain with
//! [`LoginController::drain_inbox`] (non-blocking, once per frame) or
//! [`LoginController::settle`] (waits until no request is in flight).
//!
//! Background effects (push registration) are tracked so
//! [`LoginController::shutdown`] can let them finish before the runtime goes
//! away.
//!
//! Methods that execute effects must be called from within a tokio runtime.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio_util::task::TaskTracker;

use super::effects::LoginEffect;
use super::events::LoginEvent;
use super::navigation::{Navigator, Route};
use super::reducer::{self, FlowContext};
use super::state::FormState;
use crate::auth::{
    AuthClient, FileSessionStore, FormRules, HttpAuthClient, HttpPushRegistration,
    NoopPushRegistration, NotificationSubscription, PhoneFormatter, PushRegistration,
    SessionStore, TransportError, TransportErrorKind, Validator,
};
use crate::config::Config;

/// Upper bound on waiting for background effects in `shutdown`.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// How the login screen ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// Login succeeded and the main screen replaced this one.
    LoggedIn,
}

/// External collaborators of the login flow.
pub struct Collaborators {
    pub validator: Arc<dyn Validator>,
    pub formatter: Arc<dyn PhoneFormatter>,
    pub auth: Arc<dyn AuthClient>,
    pub session: Arc<dyn SessionStore>,
    pub push: Arc<dyn PushRegistration>,
    pub navigator: Box<dyn Navigator>,
}

impl Collaborators {
    /// Builds the production collaborators from config.
    ///
    /// # Errors
    /// Returns an error if the API base URL is malformed.
    pub fn from_config(config: &Config, navigator: Box<dyn Navigator>) -> Result<Self> {
        let rules = Arc::new(FormRules::from_config(&config.login));
        let auth = HttpAuthClient::from_config(&config.api)?;
        let session = Arc::new(FileSessionStore::open_default());

        let push: Arc<dyn PushRegistration> = if config.push.enabled {
            Arc::new(HttpPushRegistration::new(
                auth.base_url(),
                Arc::clone(&session),
            ))
        } else {
            Arc::new(NoopPushRegistration)
        };

        Ok(Self {
            validator: Arc::clone(&rules) as Arc<dyn Validator>,
            formatter: rules,
            auth: Arc::new(auth),
            session,
            push,
            navigator,
        })
    }
}

/// Drives one login screen instance.
pub struct LoginController {
    state: FormState,
    country_code: String,
    collaborators: Collaborators,
    inbox_tx: mpsc::UnboundedSender<LoginEvent>,
    inbox_rx: mpsc::UnboundedReceiver<LoginEvent>,
    subscription: Option<NotificationSubscription>,
    /// Fire-and-forget effects still running.
    background: TaskTracker,
    exit: Option<Exit>,
    torn_down: bool,
}

impl LoginController {
    pub fn new(collaborators: Collaborators, country_code: impl Into<String>) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        Self {
            state: FormState::default(),
            country_code: country_code.into(),
            collaborators,
            inbox_tx,
            inbox_rx,
            subscription: None,
            background: TaskTracker::new(),
            exit: None,
            torn_down: false,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Set once navigation to the main screen has happened.
    pub fn exit(&self) -> Option<Exit> {
        self.exit
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn has_subscription(&self) -> bool {
        self.subscription.is_some()
    }

    /// Signals that the screen is visible.
    pub fn mount(&mut self) -> Vec<LoginEffect> {
        self.dispatch(LoginEvent::Mounted)
    }

    /// Runs one event through the reducer and executes the resulting effects.
    ///
    /// Returns the view-only effects (e.g. `DismissKeyboard`) for the caller.
    pub fn dispatch(&mut self, event: LoginEvent) -> Vec<LoginEffect> {
        if self.torn_down {
            tracing::debug!(?event, "login screen torn down; dropping event");
            return vec![];
        }

        let (next, effects) = {
            let ctx = FlowContext {
                validator: self.collaborators.validator.as_ref(),
                formatter: self.collaborators.formatter.as_ref(),
                country_code: &self.country_code,
            };
            reducer::update(std::mem::take(&mut self.state), event, &ctx)
        };
        self.state = next;
        self.execute_effects(effects)
    }

    /// Applies every login answer that has already arrived.
    ///
    /// Returns whether anything was applied, plus the view-only effects.
    pub fn drain_inbox(&mut self) -> (bool, Vec<LoginEffect>) {
        let mut applied = false;
        let mut view_effects = Vec::new();
        while let Ok(event) = self.inbox_rx.try_recv() {
            applied = true;
            view_effects.extend(self.dispatch(event));
        }
        (applied, view_effects)
    }

    /// Waits until no login request is in flight.
    pub async fn settle(&mut self) -> Vec<LoginEffect> {
        let mut view_effects = Vec::new();
        while self.state.is_submitting() && !self.torn_down {
            let Some(event) = self.inbox_rx.recv().await else {
                break;
            };
            view_effects.extend(self.dispatch(event));
        }
        view_effects
    }

    /// Releases screen resources. Login answers arriving later are discarded.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.dispatch(LoginEvent::Teardown);
        self.torn_down = true;
        self.inbox_rx.close();
    }

    /// Tears down, then waits up to [`SHUTDOWN_TIMEOUT`] for background
    /// effects. Call before the tokio runtime is dropped.
    pub async fn shutdown(&mut self) {
        self.shutdown_within(SHUTDOWN_TIMEOUT).await;
    }

    /// [`LoginController::shutdown`] with an explicit bound.
    pub async fn shutdown_within(&mut self, limit: Duration) {
        self.teardown();
        self.background.close();
        if tokio::time::timeout(limit, self.background.wait())
            .await
            .is_err()
        {
            tracing::warn!(
                pending = self.background.len(),
                "background effects still running at shutdown"
            );
        }
    }

    fn execute_effects(&mut self, effects: Vec<LoginEffect>) -> Vec<LoginEffect> {
        let mut view_effects = Vec::new();
        for effect in effects {
            if effect.is_view_only() {
                view_effects.push(effect);
            } else {
                self.execute_effect(effect);
            }
        }
        view_effects
    }

    fn execute_effect(&mut self, effect: LoginEffect) {
        match effect {
            LoginEffect::DismissKeyboard => {}
            LoginEffect::Login {
                submission,
                credentials,
                secret,
            } => {
                tracing::info!(submission, credentials = %credentials.redacted(), "login submitted");
                let auth = Arc::clone(&self.collaborators.auth);
                let tx = self.inbox_tx.clone();
                tokio::spawn(async move {
                    // Run the request in its own task so a panic still yields an answer.
                    let request =
                        tokio::spawn(async move { auth.login(&credentials, secret.expose()).await });
                    let result = request.await.unwrap_or_else(|err| {
                        Err(TransportError::new(
                            TransportErrorKind::Other,
                            format!("Login task failed: {err}"),
                        ))
                    });
                    // The receiver is gone after teardown; the answer is dropped.
                    let _ = tx.send(LoginEvent::AuthCompleted { submission, result });
                });
            }
            LoginEffect::PersistLoggedIn(logged_in) => {
                if let Err(err) = self.collaborators.session.set_logged_in(logged_in) {
                    tracing::error!("Failed to persist login flag: {err:#}");
                }
            }
            LoginEffect::RegisterPush => {
                let push = Arc::clone(&self.collaborators.push);
                self.background.spawn(async move {
                    // Failures are never surfaced to the user.
                    if let Err(err) = push.register().await {
                        tracing::debug!("Push registration failed: {err:#}");
                    }
                });
            }
            LoginEffect::Navigate(Route::Main) => {
                tracing::info!("login succeeded");
                self.collaborators.navigator.replace_with_main();
                self.exit = Some(Exit::LoggedIn);
            }
            LoginEffect::Navigate(route) => {
                self.collaborators.navigator.go_to(route);
            }
            LoginEffect::LogTransportError { submission, error } => {
                tracing::error!(
                    submission,
                    kind = ?error.kind,
                    details = error.details.as_deref().unwrap_or(""),
                    "Login error: {error}"
                );
            }
            LoginEffect::SubscribeNotifications => {
                if self.subscription.is_none()
                    && let Some(rx) = self.collaborators.push.notifications()
                {
                    self.subscription = Some(NotificationSubscription::listen(rx));
                }
            }
            LoginEffect::ReleaseNotifications => {
                if let Some(subscription) = self.subscription.take() {
                    subscription.release();
                }
            }
        }
    }
}

impl Drop for LoginController {
    fn drop(&mut self) {
        self.teardown();
    }
}
