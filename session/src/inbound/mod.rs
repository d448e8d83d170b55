//! Inbound adapters driving the session core.

pub mod cli;
