//! Navigation trait.

/// The UI-side effect the session triggers when it cannot recover.
pub trait Navigator: Send + Sync {
    /// True while the user is already on the login screen.
    ///
    /// A rejection in this state is surfaced directly, never refreshed and
    /// never redirected, so a failed login cannot loop.
    fn is_at_login(&self) -> bool;

    /// Send the user to the login screen.
    fn redirect_to_login(&self);
}
