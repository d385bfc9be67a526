//! Single-flight coordination of token refreshes.
//!
//! At most one refresh future exists at a time. Every request that needs a
//! refresh while one is in flight awaits the same shared future instead of
//! starting its own, so one expiry costs exactly one call to the refresh
//! endpoint no matter how many requests hit it.

use std::sync::{Mutex, PoisonError};

use futures_util::future::{BoxFuture, FutureExt, Shared};

use hrms_core::{AccessToken, Error};

/// Why a shared refresh failed. Cloned to every waiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RefreshFailure {
    pub reason: String,
}

impl From<Error> for RefreshFailure {
    fn from(err: Error) -> Self {
        Self {
            reason: err.to_string(),
        }
    }
}

pub(crate) type RefreshOutcome = Result<AccessToken, RefreshFailure>;

type SharedRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

/// A caller's handle on the in-flight refresh.
pub(crate) enum Ticket {
    /// This caller installed the refresh.
    Started(SharedRefresh),
    /// A refresh was already running; this caller waits on it.
    Joined(SharedRefresh),
}

impl Ticket {
    pub fn is_initiator(&self) -> bool {
        matches!(self, Ticket::Started(_))
    }

    pub async fn wait(self) -> RefreshOutcome {
        match self {
            Ticket::Started(refresh) | Ticket::Joined(refresh) => refresh.await,
        }
    }
}

/// Holder of the refresh-in-flight slot.
///
/// The mutex is only ever held for a check-and-install, never across an
/// await, so racing callers cannot both see an empty slot.
#[derive(Default)]
pub(crate) struct RefreshCoordinator {
    in_flight: Mutex<Option<SharedRefresh>>,
}

impl RefreshCoordinator {
    /// Join the in-flight refresh, or install the one `start` builds.
    ///
    /// `start` is only called when the slot is empty. The future it returns
    /// must call [`settle`](Self::settle) as its last step.
    pub fn join_or_start<F>(&self, start: F) -> Ticket
    where
        F: FnOnce() -> BoxFuture<'static, RefreshOutcome>,
    {
        let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(refresh) = slot.as_ref() {
            return Ticket::Joined(refresh.clone());
        }

        let refresh = start().shared();
        *slot = Some(refresh.clone());
        Ticket::Started(refresh)
    }

    /// Empty the slot once the refresh has done its side effects.
    pub fn settle(&self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("refreshing", &self.is_refreshing())
            .finish()
    }
}
