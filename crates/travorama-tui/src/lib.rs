//! Full-screen login screen for Travorama.

pub mod navigator;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, stderr};

use anyhow::Result;
pub use navigator::BrowserNavigator;
pub use runtime::LoginRuntime;
use travorama_core::config::Config;
use travorama_core::flow::{Collaborators, Exit, LoginController};

/// Shows the login screen until the user logs in or quits.
///
/// Returns `Some(Exit::LoggedIn)` after a successful login, `None` if the
/// user quit. Background work started by the login (push registration) is
/// given a bounded time to finish after the terminal is restored.
///
/// # Errors
/// Returns an error if stderr is not a terminal or the terminal fails.
pub async fn run_login_screen(config: &Config) -> Result<Option<Exit>> {
    if !stderr().is_terminal() {
        anyhow::bail!(
            "The login screen requires a terminal.\n\
             Use `travorama login --identifier <ID> --password-stdin` for non-interactive login."
        );
    }

    let navigator = BrowserNavigator::new(&config.login.forgot_password_url);
    let collaborators = Collaborators::from_config(config, Box::new(navigator))?;
    let controller = LoginController::new(collaborators, &config.login.country_code);

    let mut runtime = LoginRuntime::new(controller)?;
    runtime.run()?;
    Ok(runtime.shutdown().await)
}
