//! Read-only session handle for consumers.

use tokio::sync::watch;

use crate::domain::access::{AccessDecision, AccessRequirement, decide_access};
use crate::domain::User;

use super::state::{SessionPhase, SessionSnapshot};

/// Cloneable reader over the session snapshot.
///
/// Views never mutate the session. Each view tracks which snapshot it last
/// observed, so [`SessionView::changed`] wakes once per published change.
#[derive(Debug, Clone)]
pub struct SessionView {
    receiver: watch::Receiver<SessionSnapshot>,
}

impl SessionView {
    pub(crate) fn new(receiver: watch::Receiver<SessionSnapshot>) -> Self {
        Self { receiver }
    }

    /// Current snapshot, marking it as seen.
    pub fn snapshot(&mut self) -> SessionSnapshot {
        self.receiver.borrow_and_update().clone()
    }

    /// Currently signed-in user.
    pub fn user(&self) -> Option<User> {
        self.receiver.borrow().user.clone()
    }

    /// Whether hydration or a sign-in is in flight.
    pub fn is_loading(&self) -> bool {
        self.receiver.borrow().loading
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.receiver.borrow().phase
    }

    /// Wait for the next published change.
    ///
    /// Returns `false` once the owning manager has been dropped.
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }

    /// Decide whether the current session may enter a guarded screen.
    pub fn access(&self, requirement: AccessRequirement<'_>) -> AccessDecision {
        decide_access(&self.receiver.borrow(), requirement)
    }
}
