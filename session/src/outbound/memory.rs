//! In-process record store backed by an [`AccountBook`] behind a lock.
//!
//! This is the mock data service the app runs against during development:
//! nothing survives a restart.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use demo_accounts::DemoPlan;
use tracing::debug;

use crate::domain::ports::{RecordStore, RecordStoreError};
use crate::domain::{Credentials, User, UserId, UserPatch};

use super::accounts::{AccountBook, AccountBookError, SeedError, StoredAccount, stored_demo_accounts};

/// Record store holding accounts and the session marker in memory.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    book: RwLock<AccountBook>,
}

impl InMemoryRecordStore {
    /// Empty store: no accounts, no session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `accounts`.
    pub fn with_accounts(accounts: Vec<StoredAccount>) -> Result<Self, AccountBookError> {
        Ok(Self {
            book: RwLock::new(AccountBook::new(accounts)?),
        })
    }

    /// Store pre-populated with the demo accounts for `plan`.
    ///
    /// # Examples
    /// ```
    /// use clinic_session::outbound::InMemoryRecordStore;
    /// use demo_accounts::DemoPlan;
    ///
    /// let store = InMemoryRecordStore::seeded(&DemoPlan::new(3)).expect("seeded store");
    /// assert_eq!(Some(store.accounts().expect("readable").len()), DemoPlan::new(3).total());
    /// ```
    pub fn seeded(plan: &DemoPlan) -> Result<Self, SeedError> {
        Ok(Self::with_accounts(stored_demo_accounts(plan)?)?)
    }

    /// Snapshot of the stored accounts.
    pub fn accounts(&self) -> Result<Vec<StoredAccount>, RecordStoreError> {
        Ok(self.read()?.accounts().to_vec())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, AccountBook>, RecordStoreError> {
        self.book
            .read()
            .map_err(|_| RecordStoreError::unavailable("account book lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, AccountBook>, RecordStoreError> {
        self.book
            .write()
            .map_err(|_| RecordStoreError::unavailable("account book lock poisoned"))
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn current_session(&self) -> Result<Option<User>, RecordStoreError> {
        Ok(self.read()?.current_session())
    }

    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<User>, RecordStoreError> {
        let user = self.write()?.authenticate(credentials);
        if let Some(user) = &user {
            debug!(user_id = %user.id(), "session marker recorded");
        }
        Ok(user)
    }

    async fn clear_session(&self) -> Result<(), RecordStoreError> {
        if self.write()?.clear_session() {
            debug!("session marker cleared");
        }
        Ok(())
    }

    async fn update_user(
        &self,
        id: &UserId,
        patch: &UserPatch,
    ) -> Result<Option<User>, RecordStoreError> {
        Ok(self.write()?.update_user(id, patch))
    }
}
