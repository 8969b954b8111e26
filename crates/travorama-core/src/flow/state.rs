//! Login form state.

use std::fmt;

/// Identifies one login request so late answers can be matched or dropped.
pub type SubmissionId = u64;

/// Where the form is in its submit cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Phase {
    /// Accepting input.
    #[default]
    Idle,
    /// Running the field validators. Never observable between events.
    Validating,
    /// A login request is in flight.
    Submitting {
        submission: SubmissionId,
        /// Identifier as it was when submitted.
        identifier: String,
    },
    /// Login accepted; navigation has been handed off.
    Succeeded,
}

/// Transient state of one login screen.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct FormState {
    /// Raw username field (email or phone number).
    pub identifier: String,
    /// Raw password field.
    pub secret: String,
    pub identifier_error: Option<String>,
    pub secret_error: Option<String>,
    /// Result message of the last failed submission.
    pub submission_error: Option<String>,
    pub is_secret_visible: bool,
    pub phase: Phase,
    /// Number of submissions that reached the network.
    pub submissions: u64,
}

impl FormState {
    pub fn is_submitting(&self) -> bool {
        matches!(self.phase, Phase::Submitting { .. })
    }

    pub fn has_succeeded(&self) -> bool {
        matches!(self.phase, Phase::Succeeded)
    }

    /// True when a submit action would be acted on.
    pub fn can_submit(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    /// True if any inline or submission error is showing.
    pub fn has_errors(&self) -> bool {
        self.identifier_error.is_some()
            || self.secret_error.is_some()
            || self.submission_error.is_some()
    }
}

impl fmt::Debug for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormState")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .field("identifier_error", &self.identifier_error)
            .field("secret_error", &self.secret_error)
            .field("submission_error", &self.submission_error)
            .field("is_secret_visible", &self.is_secret_visible)
            .field("phase", &self.phase)
            .field("submissions", &self.submissions)
            .finish()
    }
}
