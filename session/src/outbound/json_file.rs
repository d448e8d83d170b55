//! Record store persisted as a JSON document on disk.
//!
//! Document shape:
//!
//! ```json
//! { "version": 1, "accounts": [ ... ], "currentUserId": "..." }
//! ```
//!
//! Every operation reloads the file, so edits made by another process are
//! picked up. Writes replace the file atomically. A missing file is an empty
//! store; a file that fails to parse is reported as corrupt on every access.

use std::io;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::ports::{RecordStore, RecordStoreError};
use crate::domain::{Credentials, User, UserId, UserPatch};

use super::accounts::{AccountBook, StoredAccount};
use super::atomic_write::write_atomic;

/// Supported document version.
pub const STORE_DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct StoreDocument {
    version: u32,
    #[serde(default)]
    accounts: Vec<StoredAccount>,
    #[serde(default)]
    current_user_id: Option<UserId>,
}

/// File-backed record store.
#[derive(Debug)]
pub struct JsonFileRecordStore {
    dir: Dir,
    file_name: String,
    path: Utf8PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileRecordStore {
    /// Open the store at `path`, creating its parent directory if needed.
    ///
    /// The file itself is not created until the first write.
    pub fn open(path: impl AsRef<Utf8Path>) -> Result<Self, RecordStoreError> {
        let path = path.as_ref();
        let Some(Utf8Component::Normal(file_name)) = path.components().next_back() else {
            return Err(RecordStoreError::io(format!(
                "store path {path} does not name a file"
            )));
        };
        let parent = match path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        };
        Dir::create_ambient_dir_all(parent, ambient_authority())
            .map_err(|err| io_error(parent, &err))?;
        let dir = Dir::open_ambient_dir(parent, ambient_authority())
            .map_err(|err| io_error(parent, &err))?;

        Ok(Self {
            dir,
            file_name: file_name.to_owned(),
            path: path.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Read and validate the current document.
    pub fn load(&self) -> Result<AccountBook, RecordStoreError> {
        let raw = match self.dir.read_to_string(&self.file_name) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path, "store file missing; treating as empty");
                return Ok(AccountBook::default());
            }
            Err(err) => return Err(io_error(&self.path, &err)),
        };

        let document: StoreDocument = serde_json::from_str(&raw)
            .map_err(|err| RecordStoreError::corrupt(format!("{}: {err}", self.path)))?;
        if document.version != STORE_DOCUMENT_VERSION {
            return Err(RecordStoreError::corrupt(format!(
                "{}: unsupported version {} (expected {STORE_DOCUMENT_VERSION})",
                self.path, document.version
            )));
        }
        let book = AccountBook::new(document.accounts)
            .map_err(|err| RecordStoreError::corrupt(format!("{}: {err}", self.path)))?;
        Ok(book.with_current_user_id(document.current_user_id))
    }

    /// Overwrite the stored accounts and clear the session marker.
    pub fn replace_accounts(&self, accounts: Vec<StoredAccount>) -> Result<(), RecordStoreError> {
        let _guard = self.lock()?;
        let mut book = match self.load() {
            Ok(book) => book,
            Err(RecordStoreError::Corrupt { message }) => {
                warn!(path = %self.path, %message, "replacing corrupt store file");
                AccountBook::default()
            }
            Err(err) => return Err(err),
        };
        book.replace_accounts(accounts)
            .map_err(|err| RecordStoreError::corrupt(err.to_string()))?;
        self.save(&book)
    }

    fn modify<T>(
        &self,
        change: impl FnOnce(&mut AccountBook) -> (T, bool),
    ) -> Result<T, RecordStoreError> {
        let _guard = self.lock()?;
        let mut book = self.load()?;
        let (outcome, changed) = change(&mut book);
        if changed {
            self.save(&book)?;
        }
        Ok(outcome)
    }

    fn save(&self, book: &AccountBook) -> Result<(), RecordStoreError> {
        let document = StoreDocument {
            version: STORE_DOCUMENT_VERSION,
            accounts: book.accounts().to_vec(),
            current_user_id: book.current_user_id().cloned(),
        };
        let mut contents = serde_json::to_vec_pretty(&document)
            .map_err(|err| RecordStoreError::io(format!("{}: {err}", self.path)))?;
        contents.push(b'\n');
        write_atomic(&self.dir, &self.file_name, &contents).map_err(|err| io_error(&self.path, &err))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, RecordStoreError> {
        self.write_lock
            .lock()
            .map_err(|_| RecordStoreError::unavailable("store write lock poisoned"))
    }
}

fn io_error(path: &Utf8Path, err: &io::Error) -> RecordStoreError {
    RecordStoreError::io(format!("{path}: {err}"))
}

#[async_trait]
impl RecordStore for JsonFileRecordStore {
    async fn current_session(&self) -> Result<Option<User>, RecordStoreError> {
        Ok(self.load()?.current_session())
    }

    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<User>, RecordStoreError> {
        self.modify(|book| {
            let user = book.authenticate(credentials);
            let changed = user.is_some();
            (user, changed)
        })
    }

    async fn clear_session(&self) -> Result<(), RecordStoreError> {
        self.modify(|book| ((), book.clear_session()))
    }

    async fn update_user(
        &self,
        id: &UserId,
        patch: &UserPatch,
    ) -> Result<Option<User>, RecordStoreError> {
        self.modify(|book| {
            let user = book.update_user(id, patch);
            let changed = user.is_some();
            (user, changed)
        })
    }
}
