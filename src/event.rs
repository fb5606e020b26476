use secrecy::SecretString;
use url::Url;

use crate::Result;
use crate::error::{ConfigError, ValidationError};
use crate::types::Credentials;

/// Notifier artifact emitted when the monitoring macro expands to nothing.
const EMPTY_DESC_PLACEHOLDER: &str = "$ $";

/// Raw invocation parameters as collected from CLI, config file and
/// environment. Everything is optional here; [`normalize`] decides what is
/// actually required.
#[derive(Debug, Default, Clone)]
pub struct RawEvent {
    pub user: Option<String>,
    pub password: Option<String>,
    pub server: Option<String>,
    pub problem_id: Option<String>,
    pub problem_id_last: Option<String>,
    pub event_type: Option<String>,
    pub event_date: Option<String>,
    pub event_host: Option<String>,
    pub event_addr: Option<String>,
    pub event_desc: Option<String>,
    pub event_state: Option<String>,
    pub event_output: Option<String>,
    pub queue: Option<String>,
    pub priority: Option<u32>,
    pub ticket_type: Option<String>,
    pub state: Option<String>,
    pub service: Option<String>,
    pub customer: Option<String>,
}

/// Normalized, validated event. Constructed once per invocation and
/// immutable afterwards.
#[derive(Debug, Clone)]
pub struct EventRecord {
    pub problem_id: u64,
    pub event_type: String,
    pub event_date: String,
    pub host_name: String,
    pub host_address: String,
    /// Trigger/service description; empty when the notifier supplied none.
    pub service_desc: String,
    pub event_state: String,
    pub event_output: String,
    /// Target ticket state: explicit override first, then the event-type
    /// lookup, `None` when neither applies.
    pub target_state: Option<String>,
    pub overrides: TicketOverrides,
}

/// Requester-supplied ticket attributes. Each one falls back to the
/// configured defaults during reconciliation.
#[derive(Debug, Clone, Default)]
pub struct TicketOverrides {
    pub queue: Option<String>,
    pub priority: Option<u32>,
    pub ticket_type: Option<String>,
    pub service: Option<String>,
    pub customer: Option<String>,
}

/// Fully validated invocation: where to talk, as whom, and about what.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub server: Url,
    pub credentials: Credentials,
    pub event: EventRecord,
}

/// Validate and default the raw parameter set into an [`Invocation`].
///
/// # Errors
///
/// Returns [`ValidationError`] listing every missing required parameter, or
/// a configuration error when the server address does not parse as a URL.
pub fn normalize(raw: RawEvent) -> Result<Invocation> {
    let problem_id = apply_problem_fallback(
        parse_digits(raw.problem_id.as_deref()),
        parse_digits(raw.problem_id_last.as_deref()),
    );

    let mut missing: Vec<&'static str> = Vec::new();

    let user = require(&mut missing, "user", raw.user.as_deref());
    let password = require(&mut missing, "password", raw.password.as_deref());
    let server = require(&mut missing, "server", raw.server.as_deref());
    if problem_id == 0 {
        missing.push("problem_id");
    }
    let event_type = require(&mut missing, "event_type", raw.event_type.as_deref());
    let event_date = require(&mut missing, "event_date", raw.event_date.as_deref());
    let host_name = require(&mut missing, "event_host", raw.event_host.as_deref());
    let host_address = require(&mut missing, "event_addr", raw.event_addr.as_deref());
    let event_state = require(&mut missing, "event_state", raw.event_state.as_deref());
    let event_output = require(&mut missing, "event_output", raw.event_output.as_deref());

    if !missing.is_empty() {
        return Err(ValidationError { missing }.into());
    }

    let server = Url::parse(&server).map_err(|err| ConfigError::InvalidField {
        field: "server",
        message: err.to_string(),
    })?;

    let service_desc = raw
        .event_desc
        .map(|d| scrub_placeholder(&d))
        .unwrap_or_default();

    let target_state = raw
        .state
        .filter(|s| !s.trim().is_empty())
        .or_else(|| default_state_for(&event_type).map(str::to_string));

    Ok(Invocation {
        server,
        credentials: Credentials {
            user,
            password: SecretString::from(password),
        },
        event: EventRecord {
            problem_id,
            event_type,
            event_date,
            host_name,
            host_address,
            service_desc,
            event_state,
            event_output,
            target_state,
            overrides: TicketOverrides {
                queue: raw.queue,
                priority: raw.priority,
                ticket_type: raw.ticket_type,
                service: raw.service,
                customer: raw.customer,
            },
        },
    })
}

/// Record the field as missing when absent or blank; the caller reports
/// every violation at once.
fn require(missing: &mut Vec<&'static str>, field: &'static str, value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => {
            missing.push(field);
            String::new()
        }
    }
}

/// Default target ticket state by monitoring event type.
#[must_use]
pub fn default_state_for(event_type: &str) -> Option<&'static str> {
    match event_type {
        "ACKNOWLEDGEMENT" => Some("Aberto"),
        "RECOVERY" => Some("recovered"),
        _ => None,
    }
}

/// Strip everything that is not a digit and parse the remainder.
/// Malformed ids are sanitized rather than rejected; an empty remainder
/// parses to zero.
fn parse_digits(value: Option<&str>) -> u64 {
    let digits: String = value
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}

const fn apply_problem_fallback(problem_id: u64, problem_id_last: u64) -> u64 {
    if problem_id == 0 && problem_id_last > 0 {
        problem_id_last
    } else {
        problem_id
    }
}

fn scrub_placeholder(desc: &str) -> String {
    if desc.trim() == EMPTY_DESC_PLACEHOLDER {
        String::new()
    } else {
        desc.to_string()
    }
}

impl EventRecord {
    /// Event fields as `(name, value)` pairs sorted by name. Feeds the
    /// ticket body audit trail and the history file.
    #[must_use]
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut out = vec![
            ("event_date", self.event_date.clone()),
            ("event_output", self.event_output.clone()),
            ("event_state", self.event_state.clone()),
            ("event_type", self.event_type.clone()),
            ("host_address", self.host_address.clone()),
            ("host_name", self.host_name.clone()),
            ("problem_id", self.problem_id.to_string()),
            ("service_desc", self.service_desc.clone()),
        ];
        if let Some(queue) = &self.overrides.queue {
            out.push(("queue", queue.clone()));
        }
        if let Some(priority) = self.overrides.priority {
            out.push(("priority", priority.to_string()));
        }
        if let Some(ticket_type) = &self.overrides.ticket_type {
            out.push(("ticket_type", ticket_type.clone()));
        }
        if let Some(service) = &self.overrides.service {
            out.push(("service", service.clone()));
        }
        if let Some(customer) = &self.overrides.customer {
            out.push(("customer", customer.clone()));
        }
        out.sort_unstable_by_key(|(name, _)| *name);
        out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::{RawEvent, default_state_for, normalize, parse_digits};
    use crate::error::Error;

    fn raw_complete() -> RawEvent {
        RawEvent {
            user: Some("monitor".into()),
            password: Some("secret".into()),
            server: Some("https://helpdesk.example.org/rpc".into()),
            problem_id: Some("42".into()),
            event_type: Some("PROBLEM".into()),
            event_date: Some("2024-01-01 00:00:00".into()),
            event_host: Some("web1".into()),
            event_addr: Some("10.0.0.1".into()),
            event_state: Some("DOWN".into()),
            event_output: Some("CRITICAL: unreachable".into()),
            ..RawEvent::default()
        }
    }

    #[test]
    fn digits_are_extracted_from_noise() {
        assert_eq!(parse_digits(Some("id-4_2!")), 42);
        assert_eq!(parse_digits(Some("")), 0);
        assert_eq!(parse_digits(None), 0);
    }

    #[test]
    fn problem_id_falls_back_to_last() {
        let mut raw = raw_complete();
        raw.problem_id = Some("0".into());
        raw.problem_id_last = Some("17".into());
        let inv = normalize(raw).unwrap();
        assert_eq!(inv.event.problem_id, 17);
    }

    #[test]
    fn problem_id_keeps_value_when_present() {
        let mut raw = raw_complete();
        raw.problem_id_last = Some("17".into());
        let inv = normalize(raw).unwrap();
        assert_eq!(inv.event.problem_id, 42);
    }

    #[test]
    fn validation_reports_every_missing_field() {
        let raw = RawEvent {
            user: Some("monitor".into()),
            event_type: Some("PROBLEM".into()),
            ..RawEvent::default()
        };
        let err = normalize(raw).unwrap_err();
        match err {
            Error::Validation(v) => {
                assert_eq!(
                    v.missing,
                    vec![
                        "password",
                        "server",
                        "problem_id",
                        "event_date",
                        "event_host",
                        "event_addr",
                        "event_state",
                        "event_output",
                    ]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn placeholder_desc_becomes_empty() {
        let mut raw = raw_complete();
        raw.event_desc = Some("$ $".into());
        let inv = normalize(raw).unwrap();
        assert!(inv.event.service_desc.is_empty());
    }

    #[test]
    fn event_type_defaults_the_target_state() {
        assert_eq!(default_state_for("RECOVERY"), Some("recovered"));
        assert_eq!(default_state_for("ACKNOWLEDGEMENT"), Some("Aberto"));
        assert_eq!(default_state_for("PROBLEM"), None);

        let mut raw = raw_complete();
        raw.event_type = Some("RECOVERY".into());
        let inv = normalize(raw).unwrap();
        assert_eq!(inv.event.target_state.as_deref(), Some("recovered"));
    }

    #[test]
    fn explicit_state_wins_over_event_type() {
        let mut raw = raw_complete();
        raw.event_type = Some("RECOVERY".into());
        raw.state = Some("closed".into());
        let inv = normalize(raw).unwrap();
        assert_eq!(inv.event.target_state.as_deref(), Some("closed"));
    }

    #[test]
    fn fields_are_sorted_by_name() {
        let inv = normalize(raw_complete()).unwrap();
        let fields = inv.event.fields();
        let names: Vec<_> = fields.iter().map(|(n, _)| *n).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }
}
