//! Session phases and the snapshot published to views.

use std::fmt;

use crate::domain::User;

/// Lifecycle phase of the session manager.
///
/// `Uninitialized → Hydrating → {LoggedOut, LoggedIn}`, then
/// `LoggedOut ⇄ LoggedIn` through sign-in and sign-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// Constructed but not yet hydrated from the record store.
    #[default]
    Uninitialized,
    /// Reading the record store's current-session marker.
    Hydrating,
    /// Settled with no current user.
    LoggedOut,
    /// Settled with a current user.
    LoggedIn,
}

impl SessionPhase {
    /// Phase a settled session lands in for `user`.
    pub(crate) fn settled_for(user: Option<&User>) -> Self {
        if user.is_some() {
            Self::LoggedIn
        } else {
            Self::LoggedOut
        }
    }

    /// True once hydration has finished (or been overtaken by sign-in or
    /// sign-out).
    pub fn is_settled(self) -> bool {
        matches!(self, Self::LoggedOut | Self::LoggedIn)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Uninitialized => "uninitialized",
            Self::Hydrating => "hydrating",
            Self::LoggedOut => "logged-out",
            Self::LoggedIn => "logged-in",
        };
        f.write_str(label)
    }
}

/// Point-in-time view of the session.
///
/// ## Invariants
/// - `phase` is [`SessionPhase::LoggedIn`] exactly when `user` is present,
///   except while uninitialized or hydrating, when `user` is absent.
/// - `loading` is only true while hydration or a sign-in is in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Currently signed-in user.
    pub user: Option<User>,
    /// Whether a session-affecting operation is in flight.
    pub loading: bool,
    /// Lifecycle phase.
    pub phase: SessionPhase,
}
