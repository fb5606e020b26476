use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use serde_with::serde_as;

use crate::Result;
use crate::error::ConfigError;

use super::defaults::{
    default_customer_user, default_history_path, default_ledger_path, default_priority_id,
    default_queue, default_state, default_ticket_type,
};
use super::env::{env_duration, env_parse, env_string};
use super::{
    Config, DEFAULT_CONNECT_TIMEOUT, DEFAULT_HTTP_TIMEOUT, HumantimeDuration, PRIORITY_BOUNDS,
    TicketDefaults,
};

pub(super) fn load(path: impl AsRef<Path>) -> std::result::Result<RawConfig, ConfigError> {
    let mut builder = ::config::Config::builder();
    let path = path.as_ref();
    builder = builder.add_source(::config::File::from(path).required(false));
    builder = builder.add_source(
        ::config::Environment::with_prefix("TICKETBRIDGE")
            .separator("__")
            .try_parsing(true),
    );

    builder
        .build()
        .map_err(|err| ConfigError::Other(err.to_string()))?
        .try_deserialize()
        .map_err(|err| ConfigError::Parse(err.to_string()))
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub(super) server: RawServer,
    #[serde(default)]
    pub(super) ticket: RawTicket,
    #[serde(default)]
    pub(super) app: RawApp,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RawServer {
    pub(super) address: Option<String>,
    pub(super) user: Option<String>,
    pub(super) password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawTicket {
    #[serde(default = "default_queue")]
    pub(super) queue: String,
    #[serde(default = "default_priority_id")]
    pub(super) priority: u32,
    #[serde(default = "default_ticket_type", rename = "type")]
    pub(super) ticket_type: String,
    #[serde(default = "default_state")]
    pub(super) state: String,
    #[serde(default = "default_customer_user")]
    pub(super) customer: String,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(super) struct RawApp {
    #[serde(default = "default_ledger_path")]
    pub(super) ledger_path: PathBuf,
    #[serde(default = "default_history_path")]
    pub(super) history_path: PathBuf,
    #[serde(default)]
    pub(super) log_file: Option<PathBuf>,
    #[serde(default)]
    #[serde_as(as = "Option<HumantimeDuration>")]
    pub(super) http_timeout: Option<Duration>,
    #[serde(default)]
    #[serde_as(as = "Option<HumantimeDuration>")]
    pub(super) http_connect_timeout: Option<Duration>,
}

impl RawConfig {
    pub(super) fn apply_env_overrides(&mut self) -> std::result::Result<(), ConfigError> {
        if let Some(address) = env_string("TICKET_SERVER")? {
            self.server.address = Some(address);
        }
        if let Some(user) = env_string("TICKET_USER")? {
            self.server.user = Some(user);
        }
        if let Some(password) = env_string("TICKET_PASSWORD")? {
            self.server.password = Some(password);
        }
        if let Some(queue) = env_string("TICKET_QUEUE")? {
            self.ticket.queue = queue;
        }
        if let Some(priority) = env_parse::<u32>("TICKET_PRIORITY")? {
            self.ticket.priority = priority;
        }
        if let Some(ledger) = env_string("LEDGER_PATH")? {
            self.app.ledger_path = PathBuf::from(ledger);
        }
        if let Some(history) = env_string("HISTORY_PATH")? {
            self.app.history_path = PathBuf::from(history);
        }
        if let Some(log_file) = env_string("LOG_FILE")? {
            self.app.log_file = Some(PathBuf::from(log_file));
        }
        if let Some(timeout) = env_duration("HTTP_TIMEOUT")? {
            self.app.http_timeout = Some(timeout);
        }
        if let Some(timeout) = env_duration("HTTP_CONNECT_TIMEOUT")? {
            self.app.http_connect_timeout = Some(timeout);
        }
        Ok(())
    }

    pub(super) fn validate_and_build(self) -> Result<Config> {
        if !PRIORITY_BOUNDS.contains(&self.ticket.priority) {
            return Err(ConfigError::InvalidField {
                field: "ticket.priority",
                message: format!(
                    "expected between {} and {}, got {}",
                    PRIORITY_BOUNDS.start(),
                    PRIORITY_BOUNDS.end(),
                    self.ticket.priority
                ),
            }
            .into());
        }

        let http_request_timeout = self.app.http_timeout.unwrap_or(DEFAULT_HTTP_TIMEOUT);
        let http_connect_timeout = self
            .app
            .http_connect_timeout
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT);
        if http_request_timeout.is_zero() {
            return Err(ConfigError::InvalidField {
                field: "app.http_timeout",
                message: "timeout must be greater than zero".to_string(),
            }
            .into());
        }
        if http_connect_timeout.is_zero() {
            return Err(ConfigError::InvalidField {
                field: "app.http_connect_timeout",
                message: "timeout must be greater than zero".to_string(),
            }
            .into());
        }

        Ok(Config {
            server: self.server.address,
            user: self.server.user,
            password: self.server.password.map(Into::into),
            ticket: TicketDefaults {
                queue: self.ticket.queue,
                priority_id: self.ticket.priority,
                ticket_type: self.ticket.ticket_type,
                state: self.ticket.state,
                customer_user: self.ticket.customer,
            },
            ledger_path: self.app.ledger_path,
            history_path: self.app.history_path,
            log_file: self.app.log_file,
            http_connect_timeout,
            http_request_timeout,
        })
    }
}

impl Default for RawTicket {
    fn default() -> Self {
        Self {
            queue: default_queue(),
            priority: default_priority_id(),
            ticket_type: default_ticket_type(),
            state: default_state(),
            customer: default_customer_user(),
        }
    }
}

impl Default for RawApp {
    fn default() -> Self {
        Self {
            ledger_path: default_ledger_path(),
            history_path: default_history_path(),
            log_file: None,
            http_timeout: None,
            http_connect_timeout: None,
        }
    }
}
