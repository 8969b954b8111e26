//! Screen-local state that the login flow does not own.
//!
//! Form contents, errors and the submission phase live in
//! `travorama_core::flow::FormState`; this module only tracks which widget has
//! focus plus the animation and quit flags.

/// Focusable widgets, top to bottom.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Identifier,
    Secret,
    Submit,
    ForgotLink,
    /// Nothing focused. Equivalent of a dismissed on-screen keyboard.
    None,
}

const FOCUS_ORDER: [Focus; 4] = [
    Focus::Identifier,
    Focus::Secret,
    Focus::Submit,
    Focus::ForgotLink,
];

impl Focus {
    pub fn next(self) -> Self {
        match FOCUS_ORDER.iter().position(|f| *f == self) {
            Some(i) => FOCUS_ORDER[(i + 1) % FOCUS_ORDER.len()],
            None => Focus::Identifier,
        }
    }

    pub fn prev(self) -> Self {
        match FOCUS_ORDER.iter().position(|f| *f == self) {
            Some(i) => FOCUS_ORDER[(i + FOCUS_ORDER.len() - 1) % FOCUS_ORDER.len()],
            None => Focus::ForgotLink,
        }
    }

    /// Whether typing edits a text field.
    pub fn is_text_field(self) -> bool {
        matches!(self, Focus::Identifier | Focus::Secret)
    }
}

#[derive(Debug, Default)]
pub struct ScreenState {
    pub focus: Focus,
    /// Spinner animation frame counter.
    pub spinner_frame: usize,
    pub should_quit: bool,
}

impl ScreenState {
    pub fn new() -> Self {
        Self::default()
    }
}
