//! Terminal stand-in for the login screen.

use std::sync::atomic::{AtomicBool, Ordering};

use hrms_core::Navigator;

use crate::output;

/// Tells the user to log in again when the session ends.
#[derive(Debug, Default)]
pub struct TerminalNavigator {
    at_login: AtomicBool,
}

impl TerminalNavigator {
    /// Mark the running command as the login flow.
    pub fn enter_login(&self) {
        self.at_login.store(true, Ordering::SeqCst);
    }
}

impl Navigator for TerminalNavigator {
    fn is_at_login(&self) -> bool {
        self.at_login.load(Ordering::SeqCst)
    }

    fn redirect_to_login(&self) {
        output::warning("session expired, run `hrms login`");
    }
}
