//! Navigation targets available to a terminal login screen.

use travorama_core::flow::{Navigator, Route};

/// Forgot-password opens in the system browser; the main screen is the
/// caller's job once the runtime reports `Exit::LoggedIn`.
#[derive(Debug, Clone)]
pub struct BrowserNavigator {
    forgot_password_url: String,
}

impl BrowserNavigator {
    pub fn new(forgot_password_url: impl Into<String>) -> Self {
        Self {
            forgot_password_url: forgot_password_url.into(),
        }
    }
}

impl Navigator for BrowserNavigator {
    fn replace_with_main(&mut self) {
        tracing::debug!("leaving login screen for main screen");
    }

    fn go_to(&mut self, route: Route) {
        match route {
            Route::ForgotPassword => {
                if let Err(err) = open::that(&self.forgot_password_url) {
                    tracing::warn!(
                        url = %self.forgot_password_url,
                        "Failed to open browser: {err}"
                    );
                }
            }
            Route::Main => self.replace_with_main(),
        }
    }
}
