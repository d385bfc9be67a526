//! Channel-backed navigator.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::broadcast;
use tracing::debug;

use hrms_core::Navigator;

/// Events the session publishes for the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session ended; the user must log in again.
    LoginRequired,
}

/// A [`Navigator`] that turns redirects into [`SessionEvent`]s.
///
/// Whatever renders the UI subscribes and decides how to show the login
/// screen, and flips [`set_at_login`](Self::set_at_login) while it is shown.
#[derive(Debug)]
pub struct ChannelNavigator {
    events: broadcast::Sender<SessionEvent>,
    at_login: AtomicBool,
}

impl ChannelNavigator {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            events,
            at_login: AtomicBool::new(false),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn set_at_login(&self, at_login: bool) {
        self.at_login.store(at_login, Ordering::SeqCst);
    }
}

impl Default for ChannelNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator for ChannelNavigator {
    fn is_at_login(&self) -> bool {
        self.at_login.load(Ordering::SeqCst)
    }

    fn redirect_to_login(&self) {
        // No subscribers is fine: nobody is rendering a login screen.
        if self.events.send(SessionEvent::LoginRequired).is_err() {
            debug!("login required, no subscribers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn redirect_publishes_login_required() {
        let navigator = ChannelNavigator::new();
        let mut events = navigator.subscribe();

        navigator.redirect_to_login();

        assert_eq!(events.recv().await.unwrap(), SessionEvent::LoginRequired);
    }

    #[test]
    fn redirect_without_subscribers_is_silent() {
        let navigator = ChannelNavigator::new();
        navigator.redirect_to_login();
        assert!(!navigator.is_at_login());
    }

    #[test]
    fn at_login_flag_round_trips() {
        let navigator = ChannelNavigator::new();
        navigator.set_at_login(true);
        assert!(navigator.is_at_login());
    }
}
