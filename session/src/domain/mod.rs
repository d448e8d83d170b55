//! Domain primitives, the session core, and its ports.
//!
//! Purpose: hold everything about "who is signed in" without knowing how
//! accounts are persisted. Adapters live under `outbound`; the CLI under
//! `inbound`.
//!
//! Public surface:
//! - User, UserPatch, Role and their value objects.
//! - Credentials: sign-in form input.
//! - SessionManager, SessionView, SessionSnapshot, SessionPhase.
//! - decide_access: role gate for guarded screens.
//! - ports::RecordStore: the persistence seam.

pub mod access;
pub mod auth;
pub mod ports;
pub mod session;
pub mod user;

pub use self::access::{AccessDecision, AccessRequirement, decide_access};
pub use self::auth::{Credentials, CredentialsValidationError};
pub use self::session::{SessionManager, SessionPhase, SessionSnapshot, SessionView};
pub use self::user::{
    Email, FULL_NAME_MAX, FullName, Role, User, UserId, UserPatch, UserValidationError,
};
