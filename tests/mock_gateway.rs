#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use ticketbridge::error::{Error, GatewayError};
use ticketbridge::event::{RawEvent, normalize};
use ticketbridge::gateway::TicketGateway;
use ticketbridge::ledger::ProblemLedger;
use ticketbridge::reconcile::reconcile;
use ticketbridge::types::{Credentials, Operation};
use url::Url;
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway(server: &MockServer) -> TicketGateway {
    TicketGateway::new(
        Url::parse(&server.uri()).expect("valid mock url"),
        Credentials {
            user: "monitor".to_string(),
            password: SecretString::from("secret"),
        },
        Duration::from_secs(2),
        Duration::from_secs(1),
        true,
    )
    .expect("gateway")
}

fn raw_event(problem_id: &str, event_type: &str, server: &MockServer) -> RawEvent {
    RawEvent {
        user: Some("monitor".into()),
        password: Some("secret".into()),
        server: Some(server.uri()),
        problem_id: Some(problem_id.into()),
        event_type: Some(event_type.into()),
        event_date: Some("2024-01-01 00:00:00".into()),
        event_host: Some("web1".into()),
        event_addr: Some("10.0.0.1".into()),
        event_state: Some("DOWN".into()),
        event_output: Some("CRITICAL: unreachable".into()),
        ..RawEvent::default()
    }
}

fn defaults() -> ticketbridge::config::TicketDefaults {
    ticketbridge::config::TicketDefaults {
        queue: "REPAD-Monitoramento".into(),
        priority_id: 3,
        ticket_type: "Incident".into(),
        state: "new".into(),
        customer_user: "unknown".into(),
    }
}

#[tokio::test]
async fn first_invocation_creates_then_second_updates() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("TicketCreate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "TicketCreateResponse": {
                "TicketID": "100",
                "TicketNumber": "2024010100001",
                "ArticleID": "1"
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_string_contains("TicketUpdate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "TicketUpdateResponse": {
                "TicketID": "100",
                "TicketNumber": "2024010100001",
                "ArticleID": "2"
            }
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let ledger = ProblemLedger::open(dir.path().join("ledger.db")).unwrap();
    let gateway = gateway(&server);

    // First alert for problem 42: no ledger entry, so a create.
    let invocation = normalize(raw_event("42", "PROBLEM", &server)).unwrap();
    let existing = ledger.find(invocation.event.problem_id).unwrap();
    assert!(existing.is_none());

    let payload = reconcile(&invocation.event, existing.as_ref(), &defaults());
    assert_eq!(payload.operation, Operation::Create);

    let result = gateway.submit(&payload).await.unwrap();
    assert_eq!(result.ticket_id, 100);
    ledger
        .insert(
            invocation.event.problem_id,
            result.ticket_id,
            &result.ticket_number,
        )
        .unwrap();

    // Recovery for the same problem: ledger hit, update with state change.
    let invocation = normalize(raw_event("42", "RECOVERY", &server)).unwrap();
    let existing = ledger.find(invocation.event.problem_id).unwrap().unwrap();
    assert_eq!(existing.ticket_id, 100);
    assert_eq!(existing.ticket_number, "2024010100001");

    let payload = reconcile(&invocation.event, Some(&existing), &defaults());
    assert_eq!(payload.operation, Operation::Update);
    assert_eq!(payload.ticket_id, Some(100));
    assert_eq!(payload.ticket["State"], "recovered");

    let result = gateway.submit(&payload).await.unwrap();
    assert_eq!(result.article_id, 2);

    let requests = server.received_requests().await.expect("requests");
    assert_eq!(requests.len(), 2);
    let update: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    assert_eq!(update["Operation"], "TicketUpdate");
    assert_eq!(update["TicketID"], "100");
    assert_eq!(update["TicketNumber"], "2024010100001");
}

#[tokio::test]
async fn create_request_carries_expected_document() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "TicketCreateResponse": {
                "TicketID": 7,
                "TicketNumber": "700",
                "ArticleID": 1
            }
        })))
        .mount(&server)
        .await;

    let mut raw = raw_event("42", "PROBLEM", &server);
    raw.event_desc = Some("disk".into());
    let invocation = normalize(raw).unwrap();
    let payload = reconcile(&invocation.event, None, &defaults());
    gateway(&server).submit(&payload).await.unwrap();

    let requests = server.received_requests().await.expect("requests");
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["Operation"], "TicketCreate");
    assert_eq!(body["UserLogin"], "monitor");
    assert_eq!(body["Password"], "secret");
    assert_eq!(body["TicketID"], "");
    assert_eq!(body["TicketNumber"], "");
    assert_eq!(body["Ticket"]["Queue"], "REPAD-Monitoramento");
    assert_eq!(body["Ticket"]["PriorityID"], "3");
    assert_eq!(body["Ticket"]["Title"], "PROBLEM: web1/disk is DOWN");
    assert_eq!(body["Article"]["Subject"], "PROBLEM: web1/disk is DOWN");
    assert_eq!(body["Article"]["SenderType"], "system");
    let dynamic = body["DynamicField"].as_array().unwrap();
    assert!(
        dynamic
            .iter()
            .any(|f| f["Name"] == "ProblemID" && f["Value"] == "42")
    );
    assert!(
        dynamic
            .iter()
            .any(|f| f["Name"] == "ServiceDesc" && f["Value"] == "disk")
    );
}

#[tokio::test]
async fn embedded_error_fails_despite_transport_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "TicketCreateResponse": {
                "Error": {
                    "ErrorCode": "TicketCreate.AuthFail",
                    "ErrorMessage": "Authorization failing"
                }
            }
        })))
        .mount(&server)
        .await;

    let invocation = normalize(raw_event("42", "PROBLEM", &server)).unwrap();
    let payload = reconcile(&invocation.event, None, &defaults());
    let err = gateway(&server).submit(&payload).await.expect_err("fail");
    match err {
        Error::Gateway(GatewayError::ApplicationError { code, .. }) => {
            assert_eq!(code, "TicketCreate.AuthFail");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn server_error_is_a_remote_fault() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let invocation = normalize(raw_event("42", "PROBLEM", &server)).unwrap();
    let payload = reconcile(&invocation.event, None, &defaults());
    let err = gateway(&server).submit(&payload).await.expect_err("fail");
    assert!(matches!(
        err,
        Error::Gateway(GatewayError::HttpStatus { status }) if status.as_u16() == 503
    ));
}

#[tokio::test]
async fn timeouts_surface_as_remote_faults() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "TicketCreateResponse": {
                        "TicketID": 1,
                        "TicketNumber": "1",
                        "ArticleID": 1
                    }
                }))
                .set_delay(Duration::from_millis(1500)),
        )
        .mount(&server)
        .await;

    let gateway = TicketGateway::new(
        Url::parse(&server.uri()).unwrap(),
        Credentials {
            user: "monitor".to_string(),
            password: SecretString::from("secret"),
        },
        Duration::from_millis(300),
        Duration::from_millis(200),
        true,
    )
    .unwrap();

    let invocation = normalize(raw_event("42", "PROBLEM", &server)).unwrap();
    let payload = reconcile(&invocation.event, None, &defaults());
    let err = gateway.submit(&payload).await.expect_err("fail");
    assert!(matches!(
        err,
        Error::Gateway(GatewayError::RemoteFault { .. })
    ));
}

#[tokio::test]
async fn unresolvable_host_fails_the_preflight() {
    let gateway = TicketGateway::new(
        Url::parse("https://helpdesk.nonexistent.invalid/rpc").unwrap(),
        Credentials {
            user: "monitor".to_string(),
            password: SecretString::from("secret"),
        },
        Duration::from_secs(1),
        Duration::from_secs(1),
        false,
    )
    .unwrap();

    let err = gateway.resolve_server().await.expect_err("fail");
    assert!(matches!(
        err,
        Error::Gateway(GatewayError::ResolutionFailed { host }) if host.contains("invalid")
    ));
}

#[tokio::test]
async fn mock_server_resolves_in_preflight() {
    let server = MockServer::start().await;
    let ip = gateway(&server).resolve_server().await.expect("resolve");
    assert!(ip.is_loopback());
}

#[tokio::test]
async fn http_endpoint_requires_insecure_flag() {
    let err = TicketGateway::new(
        Url::parse("http://helpdesk.example.org/rpc").unwrap(),
        Credentials {
            user: "monitor".to_string(),
            password: SecretString::from("secret"),
        },
        Duration::from_secs(1),
        Duration::from_secs(1),
        false,
    )
    .err()
    .expect("should be rejected");
    assert!(matches!(err, Error::Config(_)));
}
