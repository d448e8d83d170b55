//! Error types for demo account generation.

use thiserror::Error;

/// Errors raised while generating demo accounts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DemoAccountsError {
    /// The plan asks for zero accounts in total.
    #[error("demo plan must request at least one account")]
    EmptyPlan,

    /// The plan asks for more accounts than a demo store should hold.
    #[error("demo plan requests more than {max} accounts")]
    PlanTooLarge {
        /// Largest accepted total.
        max: usize,
    },

    /// Failed to produce a non-blank full name after maximum retries.
    #[error("failed to generate a full name after {max_attempts} attempts")]
    NameGenerationFailed {
        /// Number of attempts made before giving up.
        max_attempts: usize,
    },
}
