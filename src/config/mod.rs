use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;

use crate::Result;
use crate::error::Error as BridgeError;

mod defaults;
mod env;
mod raw;
mod serde;

pub(crate) use self::serde::HumantimeDuration;

const PRIORITY_BOUNDS: RangeInclusive<u32> = 1..=5;
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Fully validated configuration. Server coordinates stay optional here;
/// the CLI may supply them, and the normalizer enforces their presence.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: Option<String>,
    pub user: Option<String>,
    pub password: Option<SecretString>,
    pub ticket: TicketDefaults,
    pub ledger_path: PathBuf,
    pub history_path: PathBuf,
    pub log_file: Option<PathBuf>,
    pub http_connect_timeout: Duration,
    pub http_request_timeout: Duration,
}

/// Fallback ticket attributes applied when the invocation carries no
/// explicit override. Injected into reconciliation, never global state.
#[derive(Debug, Clone)]
pub struct TicketDefaults {
    pub queue: String,
    pub priority_id: u32,
    pub ticket_type: String,
    pub state: String,
    pub customer_user: String,
}

impl Config {
    /// Load configuration from a file and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration file cannot be read or
    /// parsed, when environment overrides are invalid, or when the
    /// resulting values fail validation.
    pub fn from_env_and_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut raw = raw::load(path).map_err(BridgeError::from)?;
        raw.apply_env_overrides().map_err(BridgeError::from)?;
        raw.validate_and_build()
    }
}
