use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[allow(clippy::struct_excessive_bools)]
#[derive(Parser, Debug)]
#[command(author, version, about = "Monitoring-to-helpdesk ticket bridge", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Ticket service account.
    #[arg(long)]
    pub user: Option<String>,

    /// Ticket service password.
    #[arg(long)]
    pub password: Option<String>,

    /// Ticket server address (https://host[:port]/path).
    #[arg(long)]
    pub server: Option<String>,

    /// Monitoring problem id.
    #[arg(long, value_name = "ID")]
    pub problem_id: Option<String>,

    /// Previous problem id, used as fallback when the current one is
    /// absent or zero.
    #[arg(long, value_name = "ID")]
    pub problem_id_last: Option<String>,

    /// Event type tag (PROBLEM, RECOVERY, ACKNOWLEDGEMENT, ...).
    #[arg(long)]
    pub event_type: Option<String>,

    /// Event timestamp as supplied by the notifier.
    #[arg(long)]
    pub event_date: Option<String>,

    /// Host the event fired on.
    #[arg(long)]
    pub event_host: Option<String>,

    /// Address of that host.
    #[arg(long)]
    pub event_addr: Option<String>,

    /// Trigger/service description (optional).
    #[arg(long)]
    pub event_desc: Option<String>,

    /// Event state (OK, DOWN, ...).
    #[arg(long)]
    pub event_state: Option<String>,

    /// Plugin/check output.
    #[arg(long)]
    pub event_output: Option<String>,

    /// Ticket queue override.
    #[arg(long)]
    pub queue: Option<String>,

    /// Ticket priority override (1-5).
    #[arg(long)]
    pub priority: Option<u32>,

    /// Ticket type override.
    #[arg(long = "type")]
    pub ticket_type: Option<String>,

    /// Target ticket state override.
    #[arg(long)]
    pub state: Option<String>,

    /// Ticket service override.
    #[arg(long)]
    pub service: Option<String>,

    /// Customer user override.
    #[arg(long)]
    pub customer: Option<String>,

    /// Allow plain-HTTP server URLs.
    #[arg(long, action = ArgAction::SetTrue)]
    pub insecure: bool,

    /// Build and log the payload without calling the remote service or
    /// touching the ledger.
    #[arg(long, action = ArgAction::SetTrue)]
    pub dry_run: bool,

    /// Raise console log verbosity to debug.
    #[arg(long, short = 'v', action = ArgAction::SetTrue)]
    pub verbose: bool,

    /// Use a JSON layer for console logs (`--features json-logs`).
    #[arg(long, action = ArgAction::SetTrue)]
    pub json_logs: bool,

    /// Explicit log filter (e.g. "ticketbridge=debug").
    #[arg(long, value_name = "FILTER")]
    pub log_filter: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
