//! Access gate for guarded screens.
//!
//! Screens wait for the session to settle before deciding anything, then
//! send signed-out visitors to the login screen and refuse roles the screen
//! does not serve.

use crate::domain::session::SessionSnapshot;
use crate::domain::Role;

/// What a guarded screen demands of the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRequirement<'a> {
    /// Any signed-in user.
    AnySignedIn,
    /// A signed-in user holding one of these roles.
    AnyOf(&'a [Role]),
}

/// Outcome of [`decide_access`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// Session still loading; render a placeholder.
    Pending,
    /// Nobody is signed in.
    RedirectToLogin,
    /// Signed in, but with a role the screen does not serve.
    Forbidden {
        /// Role of the current user.
        role: Role,
    },
    /// Render the screen.
    Granted,
}

/// Decide whether `snapshot` satisfies `requirement`.
///
/// # Examples
/// ```
/// use clinic_session::domain::{
///     AccessDecision, AccessRequirement, SessionSnapshot, decide_access,
/// };
///
/// let loading = SessionSnapshot { loading: true, ..SessionSnapshot::default() };
/// assert_eq!(
///     decide_access(&loading, AccessRequirement::AnySignedIn),
///     AccessDecision::Pending,
/// );
/// ```
pub fn decide_access(snapshot: &SessionSnapshot, requirement: AccessRequirement<'_>) -> AccessDecision {
    if snapshot.loading || !snapshot.phase.is_settled() {
        return AccessDecision::Pending;
    }
    let Some(user) = snapshot.user.as_ref() else {
        return AccessDecision::RedirectToLogin;
    };
    match requirement {
        AccessRequirement::AnySignedIn => AccessDecision::Granted,
        AccessRequirement::AnyOf(roles) if roles.contains(&user.role()) => AccessDecision::Granted,
        AccessRequirement::AnyOf(_) => AccessDecision::Forbidden { role: user.role() },
    }
}
