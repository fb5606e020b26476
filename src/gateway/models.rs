use serde::Deserialize;

use crate::error::GatewayError;
use crate::types::Operation;

/// Identifiers returned by a successful create or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketResult {
    pub ticket_id: u64,
    pub ticket_number: String,
    pub article_id: u64,
}

/// Response envelope: exactly one of the operation-specific bodies is
/// expected, matching the issued operation.
#[derive(Debug, Deserialize)]
pub(super) struct ResponseEnvelope {
    #[serde(rename = "TicketCreateResponse")]
    create: Option<ResponseBody>,
    #[serde(rename = "TicketUpdateResponse")]
    update: Option<ResponseBody>,
}

impl ResponseEnvelope {
    pub(super) fn into_result(
        self,
        operation: Operation,
    ) -> std::result::Result<TicketResult, GatewayError> {
        let body = match operation {
            Operation::Create => self.create,
            Operation::Update => self.update,
        }
        .ok_or(GatewayError::MissingField {
            field: match operation {
                Operation::Create => "TicketCreateResponse",
                Operation::Update => "TicketUpdateResponse",
            },
        })?;
        body.into_result()
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ResponseBody {
    #[serde(rename = "Error", default)]
    error: Option<EmbeddedError>,
    #[serde(rename = "TicketID", default, deserialize_with = "deserialize_opt_u64")]
    ticket_id: Option<u64>,
    #[serde(
        rename = "TicketNumber",
        default,
        deserialize_with = "deserialize_opt_string"
    )]
    ticket_number: Option<String>,
    #[serde(rename = "ArticleID", default, deserialize_with = "deserialize_opt_u64")]
    article_id: Option<u64>,
}

/// Business-level failure carried inside a transport-successful response.
#[derive(Debug, Deserialize)]
pub(super) struct EmbeddedError {
    #[serde(rename = "ErrorCode")]
    code: String,
    #[serde(rename = "ErrorMessage")]
    message: String,
}

impl ResponseBody {
    fn into_result(self) -> std::result::Result<TicketResult, GatewayError> {
        if let Some(err) = self.error {
            return Err(GatewayError::ApplicationError {
                code: err.code,
                message: err.message,
            });
        }
        Ok(TicketResult {
            ticket_id: self
                .ticket_id
                .ok_or(GatewayError::MissingField { field: "TicketID" })?,
            ticket_number: self.ticket_number.ok_or(GatewayError::MissingField {
                field: "TicketNumber",
            })?,
            article_id: self
                .article_id
                .ok_or(GatewayError::MissingField { field: "ArticleID" })?,
        })
    }
}

fn deserialize_opt_u64<'de, D>(de: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MaybeU64 {
        Int(u64),
        Str(String),
        Null,
    }

    match MaybeU64::deserialize(de)? {
        MaybeU64::Int(value) => Ok(Some(value)),
        MaybeU64::Str(value) => value
            .parse::<u64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        MaybeU64::Null => Ok(None),
    }
}

fn deserialize_opt_string<'de, D>(de: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MaybeString {
        Str(String),
        Int(u64),
        Null,
    }

    Ok(match MaybeString::deserialize(de)? {
        MaybeString::Str(value) => Some(value),
        MaybeString::Int(value) => Some(value.to_string()),
        MaybeString::Null => None,
    })
}
