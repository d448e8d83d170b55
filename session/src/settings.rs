//! Environment-driven settings for the session binary.
//!
//! Values are read through [`mockable::Env`] so parsing can be tested without
//! touching the process environment. Command-line flags override whatever is
//! resolved here.

use std::fmt;
use std::str::FromStr;

use camino::Utf8PathBuf;
use demo_accounts::DEFAULT_DEMO_SEED;
use mockable::Env;

/// Location of the JSON record store.
pub const STORE_PATH_ENV: &str = "CLINIC_SESSION_STORE_PATH";
/// Log output format.
pub const LOG_FORMAT_ENV: &str = "CLINIC_SESSION_LOG_FORMAT";
/// Seed used when generating demo accounts.
pub const DEMO_SEED_ENV: &str = "CLINIC_SESSION_DEMO_SEED";
/// Store path used when [`STORE_PATH_ENV`] is unset.
pub const DEFAULT_STORE_PATH: &str = "clinic-session.json";

const LOG_FORMAT_EXPECTED: &str = "text|json";
const SEED_EXPECTED: &str = "an unsigned 64-bit integer";
const PATH_EXPECTED: &str = "a non-empty path";

/// How log lines are rendered on stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable compact lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Json => "json",
        })
    }
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// JSON record store location.
    pub store_path: Utf8PathBuf,
    /// Log output format.
    pub log_format: LogFormat,
    /// Seed for demo account generation.
    pub demo_seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_path: Utf8PathBuf::from(DEFAULT_STORE_PATH),
            log_format: LogFormat::default(),
            demo_seed: DEFAULT_DEMO_SEED,
        }
    }
}

/// Errors raised while reading settings from the environment.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SettingsError {
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Raw value found.
        value: String,
        /// Human-readable description of accepted values.
        expected: &'static str,
    },
}

/// Resolve [`Settings`] from `env`, falling back to defaults for unset
/// variables.
///
/// # Examples
/// ```
/// use clinic_session::settings::{LogFormat, settings_from_env};
/// use mockable::MockEnv;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "CLINIC_SESSION_LOG_FORMAT" => Some("json".to_owned()),
///     _ => None,
/// });
///
/// let settings = settings_from_env(&env).expect("valid settings");
/// assert_eq!(settings.log_format, LogFormat::Json);
/// assert_eq!(settings.store_path.as_str(), "clinic-session.json");
/// ```
pub fn settings_from_env<E: Env>(env: &E) -> Result<Settings, SettingsError> {
    let defaults = Settings::default();

    let store_path = match env.string(STORE_PATH_ENV) {
        Some(value) if value.trim().is_empty() => {
            return Err(invalid(STORE_PATH_ENV, value, PATH_EXPECTED));
        }
        Some(value) => Utf8PathBuf::from(value),
        None => defaults.store_path,
    };

    let log_format = match env.string(LOG_FORMAT_ENV) {
        Some(value) => value
            .parse()
            .map_err(|()| invalid(LOG_FORMAT_ENV, value, LOG_FORMAT_EXPECTED))?,
        None => defaults.log_format,
    };

    let demo_seed = match env.string(DEMO_SEED_ENV) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| invalid(DEMO_SEED_ENV, value, SEED_EXPECTED))?,
        None => defaults.demo_seed,
    };

    Ok(Settings {
        store_path,
        log_format,
        demo_seed,
    })
}

fn invalid(name: &'static str, value: String, expected: &'static str) -> SettingsError {
    SettingsError::InvalidEnv {
        name,
        value,
        expected,
    }
}
