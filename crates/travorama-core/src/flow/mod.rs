//! Login screen flow.
//!
//! `reducer::update` is the pure state machine; `controller` executes the
//! effects it returns against the collaborators.

pub mod controller;
pub mod effects;
pub mod events;
pub mod navigation;
pub mod reducer;
pub mod state;

pub use controller::{Collaborators, Exit, LoginController};
pub use effects::{LoginEffect, Secret};
pub use events::LoginEvent;
pub use navigation::{Navigator, Route};
pub use reducer::{FlowContext, update};
pub use state::{FormState, Phase, SubmissionId};
