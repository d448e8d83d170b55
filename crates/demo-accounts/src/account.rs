//! Generated demo account types.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role assigned to a generated account.
///
/// Mirrors the session crate's `Role` without creating a dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemoRole {
    /// A patient booking consultations.
    Patient,
    /// A doctor answering consultations.
    Doctor,
    /// A clinic administrator.
    Admin,
}

impl DemoRole {
    /// Lowercase label used in generated email addresses.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Doctor => "doctor",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for DemoRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated demo account, including its plaintext password.
///
/// The mock record store compares passwords verbatim, so the password is
/// carried as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoAccount {
    /// Unique identifier for the account.
    pub id: Uuid,
    /// Login email, unique within one generated batch.
    pub email: String,
    /// Human-readable full name.
    pub full_name: String,
    /// Account role.
    pub role: DemoRole,
    /// Plaintext password accepted by the mock store.
    pub password: String,
}
