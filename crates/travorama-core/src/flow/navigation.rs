//! Destinations reachable from the login screen.

/// Screens the login flow can hand off to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Home screen. Replaces the login screen.
    Main,
    ForgotPassword,
}

/// Performs navigation on behalf of the login flow.
pub trait Navigator: Send {
    /// Replaces the login screen with the main screen.
    fn replace_with_main(&mut self);

    /// Pushes another screen on top of the login screen.
    fn go_to(&mut self, route: Route);
}
