//! Deterministic account generation from a [`DemoPlan`].
//!
//! One ChaCha RNG is seeded from the plan and drives every random choice, so
//! the same plan always produces identical accounts in the same order:
//! patients first, then doctors, then admins.

use fake::Fake;
use fake::faker::name::raw::{FirstName, LastName};
use fake::locales::EN;
use rand::distr::Alphanumeric;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use crate::account::{DemoAccount, DemoRole};
use crate::error::DemoAccountsError;
use crate::plan::DemoPlan;

/// Domain used for every generated email address.
pub const DEMO_EMAIL_DOMAIN: &str = "demo.clinic";

/// Maximum number of attempts to generate a non-blank full name.
const MAX_NAME_ATTEMPTS: usize = 100;

/// Largest number of accounts a single plan may request.
pub const MAX_DEMO_ACCOUNTS: usize = 10_000;

/// Length of generated passwords.
const PASSWORD_LEN: usize = 12;

/// Generates the accounts described by `plan`.
///
/// Emails follow `<role>.<n>@demo.clinic` with `n` counting from 1 within each
/// role, so they are unique within the batch.
///
/// # Errors
///
/// Returns [`DemoAccountsError::EmptyPlan`] when the plan requests no
/// accounts, [`DemoAccountsError::PlanTooLarge`] when it requests more than
/// [`MAX_DEMO_ACCOUNTS`], or [`DemoAccountsError::NameGenerationFailed`] when no usable
/// name could be produced.
///
/// # Example
///
/// ```
/// use demo_accounts::{DemoPlan, DemoRole, generate_demo_accounts};
///
/// let accounts = generate_demo_accounts(&DemoPlan::new(1).with_counts(0, 1, 0))
///     .expect("one doctor");
/// assert_eq!(accounts[0].role, DemoRole::Doctor);
/// assert_eq!(accounts[0].email, "doctor.1@demo.clinic");
/// ```
pub fn generate_demo_accounts(plan: &DemoPlan) -> Result<Vec<DemoAccount>, DemoAccountsError> {
    let total = match plan.total() {
        Some(0) => return Err(DemoAccountsError::EmptyPlan),
        Some(total) if total <= MAX_DEMO_ACCOUNTS => total,
        _ => {
            return Err(DemoAccountsError::PlanTooLarge {
                max: MAX_DEMO_ACCOUNTS,
            });
        }
    };

    let mut rng = ChaCha8Rng::seed_from_u64(plan.seed());
    let mut accounts = Vec::with_capacity(total);

    for (role, count) in [
        (DemoRole::Patient, plan.patients()),
        (DemoRole::Doctor, plan.doctors()),
        (DemoRole::Admin, plan.admins()),
    ] {
        for ordinal in 1..=count {
            accounts.push(generate_single_account(&mut rng, role, ordinal)?);
        }
    }

    Ok(accounts)
}

fn generate_single_account(
    rng: &mut ChaCha8Rng,
    role: DemoRole,
    ordinal: usize,
) -> Result<DemoAccount, DemoAccountsError> {
    let id = Uuid::from_u128(rng.random());
    let full_name = generate_full_name(rng)?;
    let password = generate_password(rng);

    Ok(DemoAccount {
        id,
        email: format!("{role}.{ordinal}@{DEMO_EMAIL_DOMAIN}"),
        full_name,
        role,
        password,
    })
}

fn generate_full_name(rng: &mut ChaCha8Rng) -> Result<String, DemoAccountsError> {
    for _ in 0..MAX_NAME_ATTEMPTS {
        let first: String = FirstName(EN).fake_with_rng(rng);
        let last: String = LastName(EN).fake_with_rng(rng);
        let candidate = format!("{} {}", first.trim(), last.trim());
        let candidate = candidate.trim();

        if !candidate.is_empty() {
            return Ok(candidate.to_owned());
        }
    }

    Err(DemoAccountsError::NameGenerationFailed {
        max_attempts: MAX_NAME_ATTEMPTS,
    })
}

fn generate_password(rng: &mut ChaCha8Rng) -> String {
    (0..PASSWORD_LEN)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect()
}
