//! Authentication session management for the clinic consultation app.
//!
//! The [`domain::SessionManager`] owns the answer to "who is signed in",
//! restores it from a record store at startup, and publishes every change to
//! read-only [`domain::SessionView`] handles. Persistence sits behind the
//! [`domain::ports::RecordStore`] port; `outbound` provides an in-memory mock
//! service and a JSON file store, and `inbound` a small CLI.

pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod settings;
