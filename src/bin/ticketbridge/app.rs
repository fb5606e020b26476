use std::path::PathBuf;

use secrecy::ExposeSecret;
use ticketbridge::Result;
use ticketbridge::config::Config;
use ticketbridge::event::{RawEvent, normalize};
use ticketbridge::gateway::TicketGateway;
use ticketbridge::history::History;
use ticketbridge::ledger::ProblemLedger;
use ticketbridge::reconcile::reconcile;
use ticketbridge::telemetry::init_tracing;
use ticketbridge::types::Operation;
use tracing::info;

use super::cli::Cli;

const DEFAULT_CONFIG: &str = "config.toml";

pub async fn run(cli: Cli) -> Result<()> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let config = Config::from_env_and_file(&config_path)?;

    init_tracing(
        cli.log_filter.as_deref(),
        cli.verbose,
        config.log_file.as_deref(),
        cli.json_logs,
    )?;

    let invocation = normalize(merge_parameters(&cli, &config))?;
    let event = &invocation.event;
    info!(
        problem_id = event.problem_id,
        event_type = %event.event_type,
        host = %event.host_name,
        "event validated"
    );

    History::new(&config.history_path).append(event)?;

    let ledger = ProblemLedger::open(&config.ledger_path)?;
    let existing = ledger.find(event.problem_id)?;
    match &existing {
        Some(entry) => info!(
            ticket_id = entry.ticket_id,
            ticket_number = %entry.ticket_number,
            "problem already mapped to a ticket"
        ),
        None => info!(problem_id = event.problem_id, "no ticket recorded for problem"),
    }

    let payload = reconcile(event, existing.as_ref(), &config.ticket);
    info!(operation = %payload.operation, "ticket payload built");

    if cli.dry_run {
        info!(
            operation = %payload.operation,
            ticket = ?payload.ticket,
            dynamic_fields = payload.dynamic_fields.len(),
            "dry run: skipping remote call and ledger insert"
        );
        return Ok(());
    }

    let gateway = TicketGateway::new(
        invocation.server.clone(),
        invocation.credentials.clone(),
        config.http_request_timeout,
        config.http_connect_timeout,
        cli.insecure,
    )?;
    gateway.resolve_server().await?;

    let result = gateway.submit(&payload).await?;
    // Logged before the ledger insert: if the insert fails the operator
    // still has the remote ids needed to reconcile by hand.
    info!(
        operation = %payload.operation,
        ticket_id = result.ticket_id,
        ticket_number = %result.ticket_number,
        article_id = result.article_id,
        "remote ticket call succeeded"
    );

    if payload.operation == Operation::Create {
        ledger.insert(event.problem_id, result.ticket_id, &result.ticket_number)?;
        info!(
            problem_id = event.problem_id,
            ticket_id = result.ticket_id,
            "ledger mapping recorded"
        );
    }

    Ok(())
}

/// CLI parameters win over file/environment configuration.
fn merge_parameters(cli: &Cli, config: &Config) -> RawEvent {
    RawEvent {
        user: cli.user.clone().or_else(|| config.user.clone()),
        password: cli.password.clone().or_else(|| {
            config
                .password
                .as_ref()
                .map(|p| p.expose_secret().to_string())
        }),
        server: cli.server.clone().or_else(|| config.server.clone()),
        problem_id: cli.problem_id.clone(),
        problem_id_last: cli.problem_id_last.clone(),
        event_type: cli.event_type.clone(),
        event_date: cli.event_date.clone(),
        event_host: cli.event_host.clone(),
        event_addr: cli.event_addr.clone(),
        event_desc: cli.event_desc.clone(),
        event_state: cli.event_state.clone(),
        event_output: cli.event_output.clone(),
        queue: cli.queue.clone(),
        priority: cli.priority,
        ticket_type: cli.ticket_type.clone(),
        state: cli.state.clone(),
        service: cli.service.clone(),
        customer: cli.customer.clone(),
    }
}
