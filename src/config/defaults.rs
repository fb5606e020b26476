use std::path::PathBuf;

pub(super) fn default_queue() -> String {
    "REPAD-Monitoramento".to_string()
}

pub(super) const fn default_priority_id() -> u32 {
    3
}

pub(super) fn default_ticket_type() -> String {
    "Incident".to_string()
}

pub(super) fn default_state() -> String {
    "new".to_string()
}

pub(super) fn default_customer_user() -> String {
    "unknown".to_string()
}

pub(super) fn default_ledger_path() -> PathBuf {
    PathBuf::from("ticketbridge.db")
}

pub(super) fn default_history_path() -> PathBuf {
    PathBuf::from("ticketbridge_history.csv")
}
