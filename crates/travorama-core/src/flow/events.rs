//! Inputs to the login reducer.

use super::state::SubmissionId;
use crate::auth::{AuthOutcome, TransportError};

/// Everything that can happen to the login screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginEvent {
    /// The screen became visible.
    Mounted,
    IdentifierChanged(String),
    SecretChanged(String),
    ToggleSecretVisibility,
    /// Submit button or the "done" key on the password field.
    SubmitRequested,
    ForgotPasswordRequested,
    /// Answer to the login request started for `submission`.
    AuthCompleted {
        submission: SubmissionId,
        result: Result<AuthOutcome, TransportError>,
    },
    /// The screen is going away.
    Teardown,
}
