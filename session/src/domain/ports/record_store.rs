//! Driven port for the record store that backs the session.
//!
//! The record store holds durable user records and the "current session"
//! marker. The session manager calls it and never inspects how it persists
//! anything, so tests substitute a double and production wires the in-memory
//! mock service or the JSON file adapter.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Credentials, User, UserId, UserPatch};

/// Failures raised by record store adapters.
///
/// Expected outcomes (no matching account, rejected update) are `Ok(None)`;
/// these variants cover the store being unable to answer at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordStoreError {
    /// The store could not be reached or its state could not be locked.
    #[error("record store unavailable: {message}")]
    Unavailable {
        /// Adapter-supplied detail.
        message: String,
    },
    /// Persisted data could not be decoded or violates store invariants.
    #[error("record store data is corrupt: {message}")]
    Corrupt {
        /// Adapter-supplied detail.
        message: String,
    },
    /// Reading or writing persisted data failed.
    #[error("record store I/O failed: {message}")]
    Io {
        /// Adapter-supplied detail.
        message: String,
    },
}

impl RecordStoreError {
    /// Build an [`RecordStoreError::Unavailable`] error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Build a [`RecordStoreError::Corrupt`] error.
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }

    /// Build a [`RecordStoreError::Io`] error.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }
}

/// Port for user records and the current-session marker.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Return the user named by the current-session marker, if any.
    ///
    /// A marker pointing at a missing record is reported as `None`.
    async fn current_session(&self) -> Result<Option<User>, RecordStoreError>;

    /// Match credentials against stored accounts.
    ///
    /// On a match the store records the session marker and returns the user.
    /// `None` means the credentials did not match.
    async fn authenticate(&self, credentials: &Credentials)
    -> Result<Option<User>, RecordStoreError>;

    /// Forget the current-session marker.
    async fn clear_session(&self) -> Result<(), RecordStoreError>;

    /// Merge `patch` into the record identified by `id`.
    ///
    /// Returns the updated record, or `None` when the store rejects the
    /// change (unknown id, email already used by another account).
    async fn update_user(
        &self,
        id: &UserId,
        patch: &UserPatch,
    ) -> Result<Option<User>, RecordStoreError>;
}

/// Record store with no accounts and no session.
///
/// Every sign-in fails and every update is rejected. Use it where session
/// behaviour is not under test.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRecordStore;

#[async_trait]
impl RecordStore for FixtureRecordStore {
    async fn current_session(&self) -> Result<Option<User>, RecordStoreError> {
        Ok(None)
    }

    async fn authenticate(
        &self,
        _credentials: &Credentials,
    ) -> Result<Option<User>, RecordStoreError> {
        Ok(None)
    }

    async fn clear_session(&self) -> Result<(), RecordStoreError> {
        Ok(())
    }

    async fn update_user(
        &self,
        _id: &UserId,
        _patch: &UserPatch,
    ) -> Result<Option<User>, RecordStoreError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn fixture_store_never_authenticates() {
        let store = FixtureRecordStore;
        let creds = Credentials::try_from_parts("a@x.com", "p").expect("credentials shape");

        assert_eq!(store.current_session().await, Ok(None));
        assert_eq!(store.authenticate(&creds).await, Ok(None));
        assert_eq!(store.clear_session().await, Ok(()));
        let id = UserId::new("1").expect("valid id");
        assert_eq!(store.update_user(&id, &UserPatch::default()).await, Ok(None));
    }

    #[rstest]
    #[case(RecordStoreError::unavailable("down"), "record store unavailable: down")]
    #[case(RecordStoreError::corrupt("bad json"), "record store data is corrupt: bad json")]
    #[case(RecordStoreError::io("disk full"), "record store I/O failed: disk full")]
    fn errors_render_adapter_detail(#[case] error: RecordStoreError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }
}
