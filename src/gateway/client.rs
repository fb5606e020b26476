use std::net::IpAddr;
use std::time::{Duration, Instant};

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde_json::json;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::Result;
use crate::error::{Error, GatewayError};
use crate::reconcile::TicketPayload;
use crate::types::Credentials;

use super::models::{ResponseEnvelope, TicketResult};
use super::rpc::{RpcRequest, body_preview};

const CORRELATION_HEADER: &str = "x-correlation-id";
const DEFAULT_HTTPS_PORT: u16 = 443;

/// Client for the remote ticket service. One invocation issues exactly one
/// call; there is no retry budget anywhere.
pub struct TicketGateway {
    http: reqwest::Client,
    endpoint: Url,
    credentials: Credentials,
}

impl TicketGateway {
    /// Build a gateway configured with the supplied parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTPS is required but the endpoint uses HTTP, or
    /// if the underlying HTTP client fails to build.
    pub fn new(
        endpoint: Url,
        credentials: Credentials,
        timeout: Duration,
        connect_timeout: Duration,
        insecure_http: bool,
    ) -> Result<Self> {
        if endpoint.scheme() != "https" && !insecure_http {
            return Err(Error::Config(crate::error::ConfigError::InvalidField {
                field: "server",
                message: "only https URLs are accepted without --insecure".to_string(),
            }));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static("application/json"),
        );

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .user_agent(concat!("ticketbridge/", env!("CARGO_PKG_VERSION")));

        if !insecure_http {
            builder = builder.https_only(true);
        }

        let http = builder
            .build()
            .map_err(|err| GatewayError::Client { source: err })?;

        Ok(Self {
            http,
            endpoint,
            credentials,
        })
    }

    /// Pre-flight sanity check: resolve the endpoint host to an address
    /// before attempting the remote call.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ResolutionFailed`] when the host component is
    /// absent or does not resolve.
    pub async fn resolve_server(&self) -> Result<IpAddr> {
        let host = self
            .endpoint
            .host_str()
            .ok_or_else(|| GatewayError::ResolutionFailed {
                host: self.endpoint.to_string(),
            })?;
        let port = self
            .endpoint
            .port_or_known_default()
            .unwrap_or(DEFAULT_HTTPS_PORT);

        let mut addrs = tokio::net::lookup_host((host, port)).await.map_err(|_| {
            GatewayError::ResolutionFailed {
                host: host.to_string(),
            }
        })?;
        let addr = addrs.next().ok_or_else(|| GatewayError::ResolutionFailed {
            host: host.to_string(),
        })?;
        debug!(host, ip = %addr.ip(), "ticket server resolved");
        Ok(addr.ip())
    }

    /// Execute the reconciled create-or-update against the remote service.
    ///
    /// # Errors
    ///
    /// Returns a gateway error on transport failure, unexpected status,
    /// undecodable response, or an embedded application-level error.
    pub async fn submit(&self, payload: &TicketPayload) -> Result<TicketResult> {
        let correlation_id = Uuid::now_v7().to_string();
        let started = Instant::now();
        let request = RpcRequest::from_payload(
            payload,
            &self.credentials.user,
            self.credentials.password.expose_secret(),
        );

        if tracing::enabled!(tracing::Level::DEBUG) {
            let mut doc = serde_json::to_value(&request)
                .map_err(|err| GatewayError::Json {
                    message: err.to_string(),
                })?;
            doc["Password"] = json!("<redacted>");
            debug!(
                operation = request.operation,
                %correlation_id,
                payload = %doc,
                "submitting ticket request"
            );
        }

        let response = self
            .http
            .post(self.endpoint.clone())
            .header(CORRELATION_HEADER, &correlation_id)
            .json(&request)
            .send()
            .await
            .map_err(GatewayError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::HttpStatus { status }.into());
        }

        let body = response.bytes().await.map_err(GatewayError::from)?;
        let envelope: ResponseEnvelope =
            serde_json::from_slice(&body).map_err(|err| GatewayError::Json {
                message: format!(
                    "error decoding response body: {err}; body preview: {}",
                    body_preview(&body)
                ),
            })?;

        let result = envelope.into_result(payload.operation)?;
        debug!(
            operation = payload.operation.rpc_name(),
            %correlation_id,
            ticket_id = result.ticket_id,
            latency_ms = started.elapsed().as_millis(),
            "ticket call succeeded"
        );
        Ok(result)
    }
}
