use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::config::TicketDefaults;
use crate::event::EventRecord;
use crate::ledger::LedgerEntry;
use crate::types::Operation;

/// Remote-system-defined custom attribute, attached at creation time only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicField {
    pub name: &'static str,
    pub value: String,
}

/// Outbound create-or-update request, computed once per invocation.
/// Empty values never make it into the field maps: the remote API treats
/// an absent field as "no change" on update and applies server-side
/// defaults on create.
#[derive(Debug, Clone)]
pub struct TicketPayload {
    pub operation: Operation,
    /// Set only for updates.
    pub ticket_id: Option<u64>,
    pub ticket_number: Option<String>,
    pub ticket: BTreeMap<&'static str, String>,
    pub article: BTreeMap<&'static str, String>,
    /// Create only.
    pub dynamic_fields: Vec<DynamicField>,
}

/// Decide create-vs-update and compute the outbound field set.
///
/// A ledger hit always yields an update against the stored ticket; a miss
/// always yields a create populated from overrides falling back to the
/// injected defaults.
#[must_use]
pub fn reconcile(
    event: &EventRecord,
    existing: Option<&LedgerEntry>,
    defaults: &TicketDefaults,
) -> TicketPayload {
    let title = render_title(event);

    let mut ticket = BTreeMap::new();
    let mut article = BTreeMap::new();
    put(&mut ticket, "Title", title.clone());
    let customer = event
        .overrides
        .customer
        .clone()
        .unwrap_or_else(|| defaults.customer_user.clone());
    put(&mut ticket, "CustomerUser", customer);
    put(&mut article, "Subject", title);
    put(&mut article, "Body", render_body(event));
    put(&mut article, "ContentType", "text/plain; charset=utf8");
    put(&mut article, "SenderType", "system");

    match existing {
        None => {
            put(
                &mut ticket,
                "Queue",
                event
                    .overrides
                    .queue
                    .clone()
                    .unwrap_or_else(|| defaults.queue.clone()),
            );
            let priority = event.overrides.priority.unwrap_or(defaults.priority_id);
            if priority > 0 {
                put(&mut ticket, "PriorityID", priority.to_string());
            }
            put(
                &mut ticket,
                "Type",
                event
                    .overrides
                    .ticket_type
                    .clone()
                    .unwrap_or_else(|| defaults.ticket_type.clone()),
            );
            put(
                &mut ticket,
                "State",
                event
                    .target_state
                    .clone()
                    .unwrap_or_else(|| defaults.state.clone()),
            );
            if let Some(service) = &event.overrides.service {
                put(&mut ticket, "Service", service.clone());
            }
            TicketPayload {
                operation: Operation::Create,
                ticket_id: None,
                ticket_number: None,
                ticket,
                article,
                dynamic_fields: dynamic_fields(event),
            }
        }
        Some(entry) => {
            if let Some(state) = &event.target_state {
                put(&mut ticket, "State", state.clone());
            }
            TicketPayload {
                operation: Operation::Update,
                ticket_id: Some(entry.ticket_id),
                ticket_number: Some(entry.ticket_number.clone()),
                ticket,
                article,
                dynamic_fields: Vec::new(),
            }
        }
    }
}

/// `"{event_type}: {host}[/{desc}] is {state}"`, the `/{desc}` segment only
/// when the description is non-empty.
fn render_title(event: &EventRecord) -> String {
    let desc = if event.service_desc.is_empty() {
        String::new()
    } else {
        format!("/{}", event.service_desc)
    };
    format!(
        "{}: {}{} is {}",
        event.event_type, event.host_name, desc, event.event_state
    )
}

/// Plugin output first, then the full audit trail of the triggering event
/// as sorted `name = value` lines.
fn render_body(event: &EventRecord) -> String {
    let mut body = event.event_output.clone();
    body.push('\n');
    for (name, value) in event.fields() {
        let _ = write!(body, "\n{name} = {value}");
    }
    body
}

fn dynamic_fields(event: &EventRecord) -> Vec<DynamicField> {
    let candidates = [
        ("ProblemID", event.problem_id.to_string()),
        ("HostName", event.host_name.clone()),
        ("HostAddress", event.host_address.clone()),
        ("ServiceDesc", event.service_desc.clone()),
    ];
    candidates
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, value)| DynamicField { name, value })
        .collect()
}

fn put(map: &mut BTreeMap<&'static str, String>, key: &'static str, value: impl Into<String>) {
    let value = value.into();
    if !value.is_empty() {
        map.insert(key, value);
    }
}
