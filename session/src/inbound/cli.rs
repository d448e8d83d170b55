//! Command-line front end over the session manager.
//!
//! Each invocation opens the JSON record store, hydrates a fresh
//! [`SessionManager`], performs one operation, and exits. The session marker
//! in the store carries the signed-in user between invocations.

use std::io::{self, Write};
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use demo_accounts::DemoPlan;
use thiserror::Error;
use tracing::info;

use crate::domain::ports::RecordStoreError;
use crate::domain::{Email, FullName, SessionManager, User, UserPatch, UserValidationError};
use crate::outbound::{JsonFileRecordStore, SeedError, stored_demo_accounts};
use crate::settings::Settings;

/// `clinic-session` arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "clinic-session",
    about = "Sign in to, inspect, and manage the clinic's demo session store",
    version
)]
pub struct Cli {
    /// JSON record store path. Overrides `CLINIC_SESSION_STORE_PATH`.
    #[arg(long = "store", value_name = "path", global = true)]
    pub store: Option<Utf8PathBuf>,
    /// Operation to perform.
    #[command(subcommand)]
    pub command: Command,
}

/// Operations exposed by the CLI.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Replace the store's accounts with generated demo accounts.
    Seed(SeedArgs),
    /// Sign in with an email and password.
    SignIn {
        /// Account email.
        #[arg(long)]
        email: String,
        /// Account password.
        #[arg(long)]
        password: String,
    },
    /// End the current session.
    SignOut,
    /// Show the signed-in user.
    Whoami,
    /// Update the signed-in user's profile.
    UpdateProfile {
        /// New display name.
        #[arg(long = "full-name", value_name = "name")]
        full_name: Option<String>,
        /// New login email.
        #[arg(long)]
        email: Option<String>,
    },
}

/// Options for [`Command::Seed`].
#[derive(Debug, Clone, Default, Args)]
pub struct SeedArgs {
    /// Generator seed. Overrides `CLINIC_SESSION_DEMO_SEED`.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Number of patient accounts.
    #[arg(long)]
    pub patients: Option<usize>,
    /// Number of doctor accounts.
    #[arg(long)]
    pub doctors: Option<usize>,
    /// Number of admin accounts.
    #[arg(long)]
    pub admins: Option<usize>,
}

/// Whether the command achieved what was asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The operation succeeded.
    Success,
    /// The operation ran but was refused (bad credentials, nobody signed in).
    Refused,
}

/// Failures that stop a command from running at all.
#[derive(Debug, Error)]
pub enum CliError {
    /// The record store could not be opened or written.
    #[error("record store error: {0}")]
    Store(#[from] RecordStoreError),
    /// Demo accounts could not be generated.
    #[error("seeding failed: {0}")]
    Seed(#[from] SeedError),
    /// A profile field failed validation.
    #[error("invalid profile field: {0}")]
    InvalidProfile(#[from] UserValidationError),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// Execute `cli` against the store chosen by the flags or `settings`.
///
/// Human-readable results go to `out`; diagnostics go through `tracing`.
pub async fn run(
    cli: Cli,
    settings: &Settings,
    out: &mut impl Write,
) -> Result<CommandOutcome, CliError> {
    let path = cli.store.unwrap_or_else(|| settings.store_path.clone());
    let store = JsonFileRecordStore::open(&path)?;

    match cli.command {
        Command::Seed(args) => seed(&store, &args, settings.demo_seed, out),
        Command::SignIn { email, password } => {
            let manager = SessionManager::start(Arc::new(store)).await;
            if manager.sign_in(&email, &password).await {
                let user = manager.user();
                writeln!(out, "signed in as {}", describe(user.as_ref()))?;
                Ok(CommandOutcome::Success)
            } else {
                writeln!(out, "sign-in failed: email or password is incorrect")?;
                Ok(CommandOutcome::Refused)
            }
        }
        Command::SignOut => {
            let manager = SessionManager::start(Arc::new(store)).await;
            manager.sign_out().await;
            writeln!(out, "signed out")?;
            Ok(CommandOutcome::Success)
        }
        Command::Whoami => {
            let manager = SessionManager::start(Arc::new(store)).await;
            let user = manager.user();
            writeln!(out, "{}", describe(user.as_ref()))?;
            Ok(CommandOutcome::Success)
        }
        Command::UpdateProfile { full_name, email } => {
            let patch = profile_patch(full_name.as_deref(), email.as_deref())?;
            if patch.is_empty() {
                writeln!(out, "nothing to update: pass --full-name or --email")?;
                return Ok(CommandOutcome::Refused);
            }
            let manager = SessionManager::start(Arc::new(store)).await;
            if manager.user().is_none() {
                writeln!(out, "not signed in")?;
                return Ok(CommandOutcome::Refused);
            }
            if manager.update_user(patch).await {
                let user = manager.user();
                writeln!(out, "updated {}", describe(user.as_ref()))?;
                Ok(CommandOutcome::Success)
            } else {
                writeln!(out, "update rejected: the email may already be in use")?;
                Ok(CommandOutcome::Refused)
            }
        }
    }
}

fn seed(
    store: &JsonFileRecordStore,
    args: &SeedArgs,
    default_seed: u64,
    out: &mut impl Write,
) -> Result<CommandOutcome, CliError> {
    let defaults = DemoPlan::new(args.seed.unwrap_or(default_seed));
    let plan = defaults.with_counts(
        args.patients.unwrap_or(defaults.patients()),
        args.doctors.unwrap_or(defaults.doctors()),
        args.admins.unwrap_or(defaults.admins()),
    );
    let accounts = stored_demo_accounts(&plan)?;
    store.replace_accounts(accounts.clone())?;
    info!(
        path = %store.path(),
        seed = plan.seed(),
        accounts = accounts.len(),
        "store seeded with demo accounts"
    );

    writeln!(out, "seeded {} accounts into {}", accounts.len(), store.path())?;
    for account in &accounts {
        let user = account.user();
        writeln!(
            out,
            "{:<8} {:<28} {}",
            user.role().as_str(),
            user.email().as_ref(),
            account.password()
        )?;
    }
    Ok(CommandOutcome::Success)
}

fn profile_patch(full_name: Option<&str>, email: Option<&str>) -> Result<UserPatch, CliError> {
    let mut patch = UserPatch::default();
    if let Some(full_name) = full_name {
        patch = patch.with_full_name(FullName::new(full_name)?);
    }
    if let Some(email) = email {
        patch = patch.with_email(Email::new(email)?);
    }
    Ok(patch)
}

fn describe(user: Option<&User>) -> String {
    let Some(user) = user else {
        return "signed out".to_owned();
    };
    match user.full_name() {
        Some(name) => format!("{name} <{}> ({})", user.email(), user.role()),
        None => format!("<{}> ({})", user.email(), user.role()),
    }
}
