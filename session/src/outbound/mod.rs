//! Outbound adapters implementing the record store port.

pub mod accounts;
mod atomic_write;
pub mod json_file;
pub mod memory;

pub use accounts::{AccountBook, AccountBookError, SeedError, StoredAccount, stored_demo_accounts};
pub use json_file::JsonFileRecordStore;
pub use memory::InMemoryRecordStore;
