//! Account book shared by the record store adapters.
//!
//! The book is the mock data service's model: user records with plaintext
//! passwords and an optional current-session marker. Adapters wrap it in a
//! lock or a file; all matching and merging rules live here.

use std::fmt;

use demo_accounts::{DemoAccount, DemoAccountsError, DemoPlan, DemoRole, generate_demo_accounts};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Credentials, Role, User, UserId, UserPatch, UserValidationError};

/// A user record plus the password the mock service accepts for it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AccountRecord", into = "AccountRecord")]
pub struct StoredAccount {
    user: User,
    password: String,
}

impl StoredAccount {
    /// Pair a user record with its password.
    pub fn new(user: User, password: impl Into<String>) -> Self {
        Self {
            user,
            password: password.into(),
        }
    }

    /// The user record.
    pub fn user(&self) -> &User {
        &self.user
    }

    /// The accepted password.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    fn accepts(&self, credentials: &Credentials) -> bool {
        self.user.email().matches(credentials.email()) && self.password == credentials.password()
    }
}

impl fmt::Debug for StoredAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredAccount")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl TryFrom<DemoAccount> for StoredAccount {
    type Error = UserValidationError;

    fn try_from(account: DemoAccount) -> Result<Self, Self::Error> {
        let role = match account.role {
            DemoRole::Patient => Role::Patient,
            DemoRole::Doctor => Role::Doctor,
            DemoRole::Admin => Role::Admin,
        };
        let user = User::try_from_strings(
            account.id.to_string(),
            &account.email,
            Some(account.full_name.as_str()),
            role,
        )?;
        Ok(Self::new(user, account.password))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountRecord {
    #[serde(flatten)]
    user: User,
    password: String,
}

impl From<StoredAccount> for AccountRecord {
    fn from(value: StoredAccount) -> Self {
        Self {
            user: value.user,
            password: value.password,
        }
    }
}

/// Error returned when a persisted account has no password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("stored account password must not be empty")]
pub struct EmptyPasswordError;

impl TryFrom<AccountRecord> for StoredAccount {
    type Error = EmptyPasswordError;

    fn try_from(value: AccountRecord) -> Result<Self, Self::Error> {
        if value.password.is_empty() {
            return Err(EmptyPasswordError);
        }
        Ok(Self::new(value.user, value.password))
    }
}

/// Errors raised when a set of accounts would break the book's invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountBookError {
    /// Two accounts share an email (compared case-insensitively).
    #[error("duplicate account email: {email}")]
    DuplicateEmail {
        /// The repeated email.
        email: String,
    },
    /// Two accounts share an identifier.
    #[error("duplicate account id: {id}")]
    DuplicateId {
        /// The repeated identifier.
        id: String,
    },
}

/// Accounts and the current-session marker.
///
/// ## Invariants
/// - Ids and emails are unique across accounts.
/// - The marker may name an id with no account; that reads as no session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountBook {
    accounts: Vec<StoredAccount>,
    current_user_id: Option<UserId>,
}

impl AccountBook {
    /// Build a book with no session marker.
    pub fn new(accounts: Vec<StoredAccount>) -> Result<Self, AccountBookError> {
        ensure_unique(&accounts)?;
        Ok(Self {
            accounts,
            current_user_id: None,
        })
    }

    /// Set the session marker.
    #[must_use]
    pub fn with_current_user_id(mut self, id: Option<UserId>) -> Self {
        self.current_user_id = id;
        self
    }

    /// Stored accounts in insertion order.
    pub fn accounts(&self) -> &[StoredAccount] {
        &self.accounts
    }

    /// Raw session marker, whether or not it resolves to an account.
    pub fn current_user_id(&self) -> Option<&UserId> {
        self.current_user_id.as_ref()
    }

    /// Swap in a new account set and forget the session marker.
    pub fn replace_accounts(&mut self, accounts: Vec<StoredAccount>) -> Result<(), AccountBookError> {
        ensure_unique(&accounts)?;
        self.accounts = accounts;
        self.current_user_id = None;
        Ok(())
    }

    /// User named by the session marker, if it resolves.
    pub fn current_session(&self) -> Option<User> {
        let id = self.current_user_id.as_ref()?;
        self.find(id).map(|account| account.user.clone())
    }

    /// Match `credentials` and, on success, record the session marker.
    ///
    /// Email comparison is case-insensitive; the password must match exactly.
    pub fn authenticate(&mut self, credentials: &Credentials) -> Option<User> {
        let user = self
            .accounts
            .iter()
            .find(|account| account.accepts(credentials))
            .map(|account| account.user.clone())?;
        self.current_user_id = Some(user.id().clone());
        Some(user)
    }

    /// Forget the session marker. Returns whether anything changed.
    pub fn clear_session(&mut self) -> bool {
        self.current_user_id.take().is_some()
    }

    /// Merge `patch` into the account with `id`.
    ///
    /// Returns `None` for an unknown id or when the new email already belongs
    /// to another account.
    pub fn update_user(&mut self, id: &UserId, patch: &UserPatch) -> Option<User> {
        if let Some(email) = &patch.email {
            let taken = self
                .accounts
                .iter()
                .any(|account| account.user.id() != id && account.user.email() == email);
            if taken {
                return None;
            }
        }
        let account = self
            .accounts
            .iter_mut()
            .find(|account| account.user.id() == id)?;
        account.user = account.user.merged_with(patch);
        Some(account.user.clone())
    }

    fn find(&self, id: &UserId) -> Option<&StoredAccount> {
        self.accounts.iter().find(|account| account.user.id() == id)
    }
}

fn ensure_unique(accounts: &[StoredAccount]) -> Result<(), AccountBookError> {
    for (index, account) in accounts.iter().enumerate() {
        for earlier in &accounts[..index] {
            if earlier.user.id() == account.user.id() {
                return Err(AccountBookError::DuplicateId {
                    id: account.user.id().to_string(),
                });
            }
            if earlier.user.email() == account.user.email() {
                return Err(AccountBookError::DuplicateEmail {
                    email: account.user.email().to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Errors raised while turning a demo plan into stored accounts.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The plan could not be generated.
    #[error(transparent)]
    Generate(#[from] DemoAccountsError),
    /// A generated account failed user validation.
    #[error("generated account is invalid: {0}")]
    InvalidAccount(#[from] UserValidationError),
    /// Generated accounts collided.
    #[error(transparent)]
    Book(#[from] AccountBookError),
}

/// Generate the demo accounts for `plan` as stored accounts.
pub fn stored_demo_accounts(plan: &DemoPlan) -> Result<Vec<StoredAccount>, SeedError> {
    let accounts = generate_demo_accounts(plan)?
        .into_iter()
        .map(StoredAccount::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(accounts)
}
