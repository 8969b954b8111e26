//! Login, logout and status command handlers.

use std::io::{self, Read};

use anyhow::{Context, Result};
use travorama_core::auth::{FileSessionStore, SessionStore};
use travorama_core::config::Config;
use travorama_core::flow::{
    Collaborators, Exit, FormState, LoginController, LoginEvent, Navigator, Route,
};

/// Navigator for runs without a screen to leave.
struct HeadlessNavigator;

impl Navigator for HeadlessNavigator {
    fn replace_with_main(&mut self) {}

    fn go_to(&mut self, route: Route) {
        tracing::debug!(?route, "navigation ignored in headless login");
    }
}

#[cfg(feature = "tui")]
pub async fn login_interactive(config: &Config) -> Result<()> {
    match travorama_tui::run_login_screen(config).await? {
        Some(Exit::LoggedIn) => println!("Logged in"),
        None => println!("Login cancelled"),
    }
    Ok(())
}

#[cfg(not(feature = "tui"))]
#[allow(clippy::unused_async)]
pub async fn login_interactive(_config: &Config) -> Result<()> {
    anyhow::bail!(
        "Interactive login is not available in this build.\n\
         Use `travorama login --identifier <ID> --password-stdin`."
    )
}

/// Runs the login flow without a screen, reading the password from stdin.
pub async fn login_headless(config: &Config, identifier: &str) -> Result<()> {
    let secret = read_secret(io::stdin().lock())?;

    let collaborators = Collaborators::from_config(config, Box::new(HeadlessNavigator))?;
    let mut controller = LoginController::new(collaborators, &config.login.country_code);

    controller.mount();
    controller.dispatch(LoginEvent::IdentifierChanged(identifier.to_string()));
    controller.dispatch(LoginEvent::SecretChanged(secret));
    controller.dispatch(LoginEvent::SubmitRequested);
    controller.settle().await;
    // Lets post-login work such as push registration finish before exit.
    controller.shutdown().await;

    if controller.exit() == Some(Exit::LoggedIn) {
        println!("Logged in as {identifier}");
        return Ok(());
    }

    anyhow::bail!("{}", failure_message(controller.state()))
}

pub fn logout() -> Result<()> {
    let store = FileSessionStore::open_default();
    if store.is_logged_in()? {
        store.set_logged_in(false).context("clear login flag")?;
        println!("Logged out");
    } else {
        println!("Not logged in");
    }
    Ok(())
}

pub fn status() -> Result<()> {
    let store = FileSessionStore::open_default();
    if store.is_logged_in()? {
        println!("Logged in");
    } else {
        println!("Not logged in");
    }
    Ok(())
}

/// Reads the whole input and drops the trailing line break.
fn read_secret(mut input: impl Read) -> Result<String> {
    let mut secret = String::new();
    input
        .read_to_string(&mut secret)
        .context("read password from stdin")?;
    Ok(secret.trim_end_matches(['\r', '\n']).to_string())
}

/// Every error the form is showing, one per line.
fn failure_message(state: &FormState) -> String {
    let lines: Vec<&str> = [
        &state.identifier_error,
        &state.secret_error,
        &state.submission_error,
    ]
    .into_iter()
    .filter_map(|e| e.as_deref())
    .collect();

    if lines.is_empty() {
        "Login failed".to_string()
    } else {
        lines.join("\n")
    }
}
