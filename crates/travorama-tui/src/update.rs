//! Screen reducer.
//!
//! Maps terminal input to login flow events and keeps focus in sync. Never
//! touches the form directly: field edits become `IdentifierChanged` /
//! `SecretChanged` events carrying the new full value.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use travorama_core::flow::{FormState, LoginEffect, LoginEvent};

use crate::state::{Focus, ScreenState};

/// Handles one terminal event. Returns the flow events to dispatch, in order.
pub fn handle_terminal_event(
    screen: &mut ScreenState,
    form: &FormState,
    event: Event,
) -> Vec<LoginEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(screen, form, key),
        Event::Paste(text) => edit_focused(screen.focus, form, |value| {
            value.extend(text.chars().filter(|c| !c.is_control()));
        }),
        _ => vec![],
    }
}

fn handle_key(screen: &mut ScreenState, form: &FormState, key: KeyEvent) -> Vec<LoginEvent> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Esc => {
            screen.should_quit = true;
            vec![]
        }
        KeyCode::Char('c') if ctrl => {
            screen.should_quit = true;
            vec![]
        }
        KeyCode::Char('t') if ctrl => vec![LoginEvent::ToggleSecretVisibility],
        KeyCode::Char('f') if ctrl => vec![LoginEvent::ForgotPasswordRequested],
        KeyCode::Tab | KeyCode::Down => {
            screen.focus = screen.focus.next();
            vec![]
        }
        KeyCode::BackTab | KeyCode::Up => {
            screen.focus = screen.focus.prev();
            vec![]
        }
        KeyCode::Enter => match screen.focus {
            Focus::Identifier => {
                screen.focus = Focus::Secret;
                vec![]
            }
            Focus::Secret | Focus::Submit => vec![LoginEvent::SubmitRequested],
            Focus::ForgotLink => vec![LoginEvent::ForgotPasswordRequested],
            Focus::None => vec![],
        },
        KeyCode::Backspace => edit_focused(screen.focus, form, |value| {
            value.pop();
        }),
        KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
            edit_focused(screen.focus, form, |value| value.push(c))
        }
        _ => vec![],
    }
}

/// Applies `edit` to the focused text field and emits the change event.
fn edit_focused(
    focus: Focus,
    form: &FormState,
    edit: impl FnOnce(&mut String),
) -> Vec<LoginEvent> {
    match focus {
        Focus::Identifier => {
            let mut value = form.identifier.clone();
            edit(&mut value);
            vec![LoginEvent::IdentifierChanged(value)]
        }
        Focus::Secret => {
            let mut value = form.secret.clone();
            edit(&mut value);
            vec![LoginEvent::SecretChanged(value)]
        }
        _ => vec![],
    }
}

/// Carries out an effect the flow left to the view.
pub fn apply_view_effect(screen: &mut ScreenState, effect: &LoginEffect) {
    if matches!(effect, LoginEffect::DismissKeyboard) {
        screen.focus = Focus::None;
    }
}

/// Advances the spinner while a login request is in flight.
pub fn tick(screen: &mut ScreenState, form: &FormState) -> bool {
    if form.is_submitting() {
        screen.spinner_frame = screen.spinner_frame.wrapping_add(1);
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyEventState;

    use super::*;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn form(identifier: &str, secret: &str) -> FormState {
        FormState {
            identifier: identifier.to_string(),
            secret: secret.to_string(),
            ..FormState::default()
        }
    }

    #[test]
    fn test_typing_emits_full_field_value() {
        let mut screen = ScreenState::new();
        let events = handle_terminal_event(&mut screen, &form("us", ""), key(KeyCode::Char('e')));
        assert_eq!(events, vec![LoginEvent::IdentifierChanged("use".to_string())]);

        screen.focus = Focus::Secret;
        let events = handle_terminal_event(&mut screen, &form("", "pa"), key(KeyCode::Backspace));
        assert_eq!(events, vec![LoginEvent::SecretChanged("p".to_string())]);
    }

    #[test]
    fn test_typing_without_focus_is_ignored() {
        let mut screen = ScreenState::new();
        screen.focus = Focus::None;
        let events = handle_terminal_event(&mut screen, &form("", ""), key(KeyCode::Char('a')));
        assert!(events.is_empty());
    }

    #[test]
    fn test_enter_moves_from_identifier_to_password() {
        let mut screen = ScreenState::new();
        let events = handle_terminal_event(&mut screen, &form("", ""), key(KeyCode::Enter));
        assert!(events.is_empty());
        assert_eq!(screen.focus, Focus::Secret);
    }

    #[test]
    fn test_enter_on_password_or_button_submits() {
        for focus in [Focus::Secret, Focus::Submit] {
            let mut screen = ScreenState {
                focus,
                ..ScreenState::default()
            };
            let events = handle_terminal_event(&mut screen, &form("", ""), key(KeyCode::Enter));
            assert_eq!(events, vec![LoginEvent::SubmitRequested]);
        }
    }

    #[test]
    fn test_forgot_password_shortcuts() {
        let mut screen = ScreenState::new();
        let events = handle_terminal_event(&mut screen, &form("", ""), ctrl('f'));
        assert_eq!(events, vec![LoginEvent::ForgotPasswordRequested]);

        screen.focus = Focus::ForgotLink;
        let events = handle_terminal_event(&mut screen, &form("", ""), key(KeyCode::Enter));
        assert_eq!(events, vec![LoginEvent::ForgotPasswordRequested]);
    }

    #[test]
    fn test_ctrl_t_toggles_visibility() {
        let mut screen = ScreenState::new();
        let events = handle_terminal_event(&mut screen, &form("", ""), ctrl('t'));
        assert_eq!(events, vec![LoginEvent::ToggleSecretVisibility]);
    }

    #[test]
    fn test_escape_and_ctrl_c_quit() {
        let mut screen = ScreenState::new();
        handle_terminal_event(&mut screen, &form("", ""), key(KeyCode::Esc));
        assert!(screen.should_quit);

        let mut screen = ScreenState::new();
        handle_terminal_event(&mut screen, &form("", ""), ctrl('c'));
        assert!(screen.should_quit);
    }

    #[test]
    fn test_key_release_is_ignored() {
        let mut screen = ScreenState::new();
        let release = Event::Key(KeyEvent {
            code: KeyCode::Char('a'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });
        assert!(handle_terminal_event(&mut screen, &form("", ""), release).is_empty());
    }

    #[test]
    fn test_paste_appends_without_newlines() {
        let mut screen = ScreenState::new();
        let events = handle_terminal_event(
            &mut screen,
            &form("user", ""),
            Event::Paste("@example.com\n".to_string()),
        );
        assert_eq!(
            events,
            vec![LoginEvent::IdentifierChanged("user@example.com".to_string())]
        );
    }

    #[test]
    fn test_dismiss_keyboard_clears_focus() {
        let mut screen = ScreenState::new();
        apply_view_effect(&mut screen, &LoginEffect::DismissKeyboard);
        assert_eq!(screen.focus, Focus::None);
    }
}
