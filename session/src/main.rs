//! `clinic-session` entry point: seed the demo store and drive the session.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io;
use std::process::ExitCode;

use clap::Parser;
use clinic_session::inbound::cli::{Cli, CommandOutcome, run};
use clinic_session::settings::{LogFormat, Settings, settings_from_env};
use color_eyre::eyre::{Context, Result};
use mockable::DefaultEnv;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let settings = settings_from_env(&DefaultEnv::new()).wrap_err("invalid environment settings")?;
    init_tracing(&settings);

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build Tokio runtime")?;
    let outcome = runtime
        .block_on(run(cli, &settings, &mut io::stdout().lock()))
        .wrap_err("clinic-session command failed")?;

    Ok(match outcome {
        CommandOutcome::Success => ExitCode::SUCCESS,
        CommandOutcome::Refused => ExitCode::FAILURE,
    })
}

fn init_tracing(settings: &Settings) {
    let builder = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr);
    let result = match settings.log_format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.compact().try_init(),
    };
    if let Err(e) = result {
        warn!(error = %e, "tracing init failed");
    }
}
