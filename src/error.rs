use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(String),
    #[error("missing required configuration field: {field}")]
    MissingField { field: &'static str },
    #[error("invalid configuration for {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
    #[error("configuration error: {0}")]
    Other(String),
}

/// Invocation parameters failed validation. Carries every violation found,
/// not just the first.
#[derive(Debug, Error)]
#[error("missing required parameters: {}", missing.join(", "))]
pub struct ValidationError {
    pub missing: Vec<&'static str>,
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to open ledger at {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("ledger schema setup failed")]
    Schema {
        #[source]
        source: rusqlite::Error,
    },
    #[error("ledger query failed")]
    Query {
        #[source]
        source: rusqlite::Error,
    },
    #[error("problem {problem_id} already mapped to a ticket")]
    DuplicateKey { problem_id: u64 },
    #[error("ledger insert failed")]
    Insert {
        #[source]
        source: rusqlite::Error,
    },
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("failed to build HTTP client")]
    Client {
        #[source]
        source: reqwest::Error,
    },
    #[error("cannot resolve ticket server host {host}")]
    ResolutionFailed { host: String },
    #[error("request failed: {source}")]
    RemoteFault {
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: reqwest::StatusCode },
    #[error("invalid response payload: {message}")]
    Json { message: String },
    #[error("missing field in response: {field}")]
    MissingField { field: &'static str },
    #[error("ticket service error {code}: {message}")]
    ApplicationError { code: String, message: String },
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to open history file {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to append to history file {path}")]
    Append {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<reqwest::Error> for GatewayError {
    fn from(source: reqwest::Error) -> Self {
        if source.is_status() {
            if let Some(status) = source.status() {
                return Self::HttpStatus { status };
            }
        }
        Self::RemoteFault { source }
    }
}
