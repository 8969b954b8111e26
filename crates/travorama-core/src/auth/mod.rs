//! Collaborators of the login flow: input rules, credential shapes, the
//! remote login call, and the post-login session side effects.

pub mod client;
pub mod credentials;
pub mod outcome;
pub mod push;
pub mod rules;
pub mod session;

pub use client::{AuthClient, HttpAuthClient};
pub use credentials::Credentials;
pub use outcome::{AuthErrorCode, AuthOutcome, TransportError, TransportErrorKind};
pub use push::{
    HttpPushRegistration, NoopPushRegistration, Notification, NotificationSubscription,
    PushRegistration,
};
pub use rules::{FormRules, PhoneFormatter, Validator};
pub use session::{FileSessionStore, SessionStore};
