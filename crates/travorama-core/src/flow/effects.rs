//! Login effect types.
//!
//! Effects are commands returned by the reducer that the controller executes.
//! The reducer only computes the next state and the effects; it never performs
//! I/O or spawns tasks itself.

use std::fmt;

use super::navigation::Route;
use super::state::SubmissionId;
use crate::auth::{Credentials, TransportError};

/// A password on its way to the network. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// Effects returned by the reducer, in the order they must run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginEffect {
    /// Drop input focus before validating (view-only).
    DismissKeyboard,

    /// Start the login request.
    Login {
        submission: SubmissionId,
        credentials: Credentials,
        secret: Secret,
    },

    /// Write the durable logged-in flag.
    PersistLoggedIn(bool),

    /// Register for push notifications (fire-and-forget).
    RegisterPush,

    /// Leave the login screen.
    Navigate(Route),

    /// Record an unexpected login failure for diagnostics.
    LogTransportError {
        submission: SubmissionId,
        error: TransportError,
    },

    /// Start listening for incoming notifications.
    SubscribeNotifications,

    /// Stop the notification listener, if any.
    ReleaseNotifications,
}

impl LoginEffect {
    /// Effects only the view layer can carry out.
    pub fn is_view_only(&self) -> bool {
        matches!(self, LoginEffect::DismissKeyboard)
    }
}
