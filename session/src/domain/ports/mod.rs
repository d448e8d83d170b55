//! Domain ports for the hexagonal boundary.

mod record_store;

#[cfg(test)]
pub use record_store::MockRecordStore;
pub use record_store::{FixtureRecordStore, RecordStore, RecordStoreError};
