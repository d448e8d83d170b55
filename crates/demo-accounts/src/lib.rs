//! Deterministic demo accounts for the clinic mock record store.
//!
//! The consultation front-end ships with a mock data service pre-populated
//! with patients, doctors, and an administrator so every protected page can
//! be exercised without a real backend. This crate produces those accounts
//! reproducibly from a numeric seed. It is independent of the session crate's
//! domain types to avoid a dependency cycle; callers convert at the point of
//! use.
//!
//! # Example
//!
//! ```
//! use demo_accounts::{DemoPlan, generate_demo_accounts};
//!
//! let plan = DemoPlan::new(7).with_counts(2, 1, 1);
//! let accounts = generate_demo_accounts(&plan).expect("non-empty plan");
//!
//! assert_eq!(accounts.len(), 4);
//! assert_eq!(accounts, generate_demo_accounts(&plan).expect("non-empty plan"));
//! ```

mod account;
mod error;
mod generator;
mod plan;

pub use account::{DemoAccount, DemoRole};
pub use error::DemoAccountsError;
pub use generator::{DEMO_EMAIL_DOMAIN, MAX_DEMO_ACCOUNTS, generate_demo_accounts};
pub use plan::{DEFAULT_DEMO_SEED, DemoPlan};
