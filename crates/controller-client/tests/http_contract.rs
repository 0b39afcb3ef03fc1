//! Contract tests for the HTTP controller client.

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use controller_client::{ControllerError, ControllerPort, ControllerReply, HttpController};
use controller_client::{NextCommandRequest, StateReport};
use pagepilot_core_types::{
    Command, CommandFailure, CommandKind, CommandReport, ElementInventory, PageSnapshot, PageType,
    SessionId,
};

fn session() -> SessionId {
    SessionId("session-wire".into())
}

fn snapshot() -> PageSnapshot {
    PageSnapshot {
        session_id: session(),
        url: "https://app.example.com/".into(),
        hostname: "app.example.com".into(),
        pathname: "/".into(),
        page_type: PageType::Main,
        elements: ElementInventory::default(),
    }
}

#[tokio::test]
async fn status_probe_succeeds_against_live_controller() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok", "message": "up", "time": "now"
        })))
        .mount(&server)
        .await;

    let client = HttpController::new(&server.uri()).unwrap();
    client.check_status().await.unwrap();
}

#[tokio::test]
async fn unreachable_controller_maps_to_unreachable() {
    // Nothing listens on this port.
    let client = HttpController::new("http://127.0.0.1:9").unwrap();
    let err = client.check_status().await.unwrap_err();
    assert!(matches!(err, ControllerError::Unreachable(_)));
}

#[tokio::test]
async fn profile_generation_parses_camel_case_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-email"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "firstName": "Ada",
            "lastName": "Byron",
            "email": "ada@tmp.example.com",
            "password": "s3cret",
            "message": "generated"
        })))
        .mount(&server)
        .await;

    let client = HttpController::new(&server.uri()).unwrap();
    let profile = client.generate_profile().await.unwrap();
    assert_eq!(profile.email, "ada@tmp.example.com");
    assert_eq!(profile.password.as_deref(), Some("s3cret"));
}

#[tokio::test]
async fn next_command_decodes_command_and_wait_for_next() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/get-next-command"))
        .and(body_partial_json(json!({"sessionId": "session-wire"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "main_01",
            "type": "click",
            "text": "Sign in",
            "elementType": "link"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpController::new(&server.uri()).unwrap();
    let request = NextCommandRequest {
        session_id: session(),
        url: "https://app.example.com/".into(),
        page_type: PageType::Main,
        current_step: None,
    };
    match client.next_command(&request).await.unwrap() {
        ControllerReply::Command(command) => {
            assert_eq!(command.id.as_deref(), Some("main_01"));
        }
        other => panic!("unexpected reply: {:?}", other),
    }

    server.reset().await;
    Mock::given(method("POST"))
        .and(path("/get-next-command"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"type": "wait_for_next"})),
        )
        .mount(&server)
        .await;
    assert!(matches!(
        client.next_command(&request).await.unwrap(),
        ControllerReply::WaitForNext { .. }
    ));
}

#[tokio::test]
async fn unknown_command_tag_is_surfaced_not_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/get-next-command"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"type": "hover", "selector": "#x"})),
        )
        .mount(&server)
        .await;

    let client = HttpController::new(&server.uri()).unwrap();
    let request = NextCommandRequest {
        session_id: session(),
        url: "https://app.example.com/".into(),
        page_type: PageType::Main,
        current_step: None,
    };
    match client.next_command(&request).await.unwrap() {
        ControllerReply::Unrecognized { tag, raw } => {
            assert_eq!(tag, "hover");
            assert_eq!(raw["selector"], "#x");
        }
        other => panic!("unexpected reply: {:?}", other),
    }
}

#[tokio::test]
async fn reports_state_and_results_with_wire_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/report-state"))
        .and(body_partial_json(json!({
            "sessionId": "session-wire",
            "pageType": "main",
            "isProcessing": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "received"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/report-result"))
        .and(body_partial_json(json!({
            "sessionId": "session-wire",
            "success": false,
            "commandId": "click"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "received"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpController::new(&server.uri()).unwrap();
    client
        .report_state(&StateReport::new(snapshot(), false, None))
        .await
        .unwrap();

    let command = Command::new(CommandKind::Click {
        selector: Some("#missing".into()),
        index: None,
        role: None,
        text: None,
        delay_ms: None,
    });
    let report = CommandReport::new(
        session(),
        command,
        "https://app.example.com/",
        Err(CommandFailure::ElementNotFound("#missing".into())),
    );
    client.report_result(&report).await.unwrap();
}

#[tokio::test]
async fn rejection_status_is_not_unreachable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get-user-data"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = HttpController::new(&server.uri()).unwrap();
    let err = client.fetch_profile().await.unwrap_err();
    assert!(matches!(err, ControllerError::Rejected { status: 404 }));
}
