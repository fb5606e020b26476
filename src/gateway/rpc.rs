use std::collections::BTreeMap;

use serde::Serialize;

use crate::reconcile::TicketPayload;

const BODY_PREVIEW_LIMIT: usize = 256;

/// Outbound request document. `TicketID`/`TicketNumber` are carried empty
/// on create; the remote side keys on the operation name.
#[derive(Serialize)]
pub(super) struct RpcRequest<'a> {
    #[serde(rename = "Operation")]
    pub(super) operation: &'static str,
    #[serde(rename = "UserLogin")]
    pub(super) user_login: &'a str,
    #[serde(rename = "Password")]
    pub(super) password: &'a str,
    #[serde(rename = "TicketID")]
    pub(super) ticket_id: String,
    #[serde(rename = "TicketNumber")]
    pub(super) ticket_number: String,
    #[serde(rename = "Ticket")]
    pub(super) ticket: &'a BTreeMap<&'static str, String>,
    #[serde(rename = "Article")]
    pub(super) article: &'a BTreeMap<&'static str, String>,
    #[serde(rename = "DynamicField", skip_serializing_if = "Vec::is_empty")]
    pub(super) dynamic_field: Vec<DynamicFieldDoc<'a>>,
}

#[derive(Serialize)]
pub(super) struct DynamicFieldDoc<'a> {
    #[serde(rename = "Name")]
    pub(super) name: &'static str,
    #[serde(rename = "Value")]
    pub(super) value: &'a str,
}

impl<'a> RpcRequest<'a> {
    pub(super) fn from_payload(
        payload: &'a TicketPayload,
        user_login: &'a str,
        password: &'a str,
    ) -> Self {
        Self {
            operation: payload.operation.rpc_name(),
            user_login,
            password,
            ticket_id: payload
                .ticket_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            ticket_number: payload.ticket_number.clone().unwrap_or_default(),
            ticket: &payload.ticket,
            article: &payload.article,
            dynamic_field: payload
                .dynamic_fields
                .iter()
                .map(|f| DynamicFieldDoc {
                    name: f.name,
                    value: &f.value,
                })
                .collect(),
        }
    }
}

pub(super) fn body_preview(body: &[u8]) -> String {
    if body.is_empty() {
        return "<empty>".to_string();
    }
    let end = body.len().min(BODY_PREVIEW_LIMIT);
    let mut preview = String::from_utf8_lossy(&body[..end]).to_string();
    if body.len() > BODY_PREVIEW_LIMIT {
        preview.push_str("...");
    }
    preview.replace('\n', "\\n")
}
