//! Mock server tests for the Connect channel.
//!
//! These tests use wiremock to stand in for a Connect server and exercise
//! the full dial flow over real HTTP.

use std::time::Duration;

use futures_util::StreamExt;
use serde_json::{Value, json};
use http::HeaderValue;
use tether_connect::{ConnectChannelFactory, ConnectConfig, dial, dial_with_config};
use tether_core::{
    Channel, ChannelFactory, Code, Credential, CredentialKind, Endpoint, Error, ErrorKind,
    MethodPath, Request,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AUTHENTICATE_PATH: &str = "/proto.rpc.v1.AuthService/Authenticate";

fn api_key() -> Credential {
    Credential::new(CredentialKind::ApiKey, "key1", "secret").unwrap()
}

/// Frame `message` as a Connect streaming envelope.
fn envelope(flags: u8, message: &Value) -> Vec<u8> {
    let payload = serde_json::to_vec(message).unwrap();
    let mut out = vec![flags];
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(&payload);
    out
}

async fn mount_authenticate(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path(AUTHENTICATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": token})))
        .mount(server)
        .await;
}

// ============================================================================
// Dial
// ============================================================================

#[tokio::test]
async fn test_dial_sends_credentials_and_stamps_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(AUTHENTICATE_PATH))
        .and(header("connect-protocol-version", "1"))
        .and(body_json(json!({
            "entity": "key1",
            "credentials": {"type": "api-key", "payload": "secret"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "tok-abc"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/robot.v1.RobotService/GetStatus"))
        .and(header("authorization", "Bearer tok-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"battery": 87})))
        .expect(2)
        .mount(&server)
        .await;

    let transport = dial(&server.uri(), api_key()).await.unwrap();
    assert_eq!(transport.entity(), "key1");

    for _ in 0..2 {
        let status: Value = transport
            .unary("robot.v1.RobotService/GetStatus", &json!({}))
            .await
            .unwrap();
        assert_eq!(status, json!({"battery": 87}));
    }

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
    for request in &requests[1..] {
        assert_eq!(request.headers.get_all("authorization").iter().count(), 1);
    }
}

#[tokio::test]
async fn test_dial_rejected_credentials_are_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(AUTHENTICATE_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": "unauthenticated",
            "message": "invalid api key"
        })))
        .mount(&server)
        .await;

    let err = dial(&server.uri(), api_key()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Rpc(Code::Unauthenticated));
    assert!(!err.retryable);
    assert!(err.to_string().contains("invalid api key"));
}

#[tokio::test]
async fn test_dial_overloaded_server_is_retryable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(AUTHENTICATE_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream overloaded"))
        .mount(&server)
        .await;

    let err = dial(&server.uri(), api_key()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Rpc(Code::Unavailable));
    assert!(err.retryable);
}

#[tokio::test]
async fn test_dial_unreachable_host_is_retryable() {
    let err = dial("http://127.0.0.1:1", api_key()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NetworkFailure);
    assert!(err.retryable);
}

#[tokio::test]
async fn test_dial_timeout_is_retryable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(AUTHENTICATE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"accessToken": "late"}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let config = ConnectConfig::new().with_request_timeout(Duration::from_millis(100));
    let err = dial_with_config(&server.uri(), api_key(), &config)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Timeout);
    assert!(err.retryable);
}

#[tokio::test]
async fn test_dial_refuses_non_http_targets() {
    let err = dial("webrtc://robot.example", api_key()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::CannotDialTargetDirectly);
    assert!(!err.retryable);
}

#[tokio::test]
async fn test_dial_empty_host_is_a_configuration_error() {
    let err = dial("", api_key()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::ConfigurationInvalid);
    assert!(!err.retryable);
}

// ============================================================================
// Unary calls
// ============================================================================

#[tokio::test]
async fn test_unary_error_keeps_code_and_message() {
    let server = MockServer::start().await;
    mount_authenticate(&server, "tok").await;

    Mock::given(method("POST"))
        .and(path("/robot.v1.RobotService/Move"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "code": "permission_denied",
            "message": "robot is locked"
        })))
        .mount(&server)
        .await;

    let transport = dial(&server.uri(), api_key()).await.unwrap();
    let err = transport
        .unary::<_, Value>("robot.v1.RobotService/Move", &json!({"x": 1}))
        .await
        .unwrap_err();

    match &err {
        Error::Status(status) => {
            assert_eq!(status.code(), Code::PermissionDenied);
            assert_eq!(status.message(), "robot is locked");
        }
        other => panic!("expected a status, got {other:?}"),
    }
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_unary_missing_route_is_unimplemented() {
    let server = MockServer::start().await;
    mount_authenticate(&server, "tok").await;

    let transport = dial(&server.uri(), api_key()).await.unwrap();
    let err = transport
        .unary::<_, Value>("robot.v1.RobotService/Dance", &json!({}))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Rpc(Code::Unimplemented));
}

// ============================================================================
// Server streaming
// ============================================================================

#[tokio::test]
async fn test_server_stream_yields_messages_in_order() {
    let server = MockServer::start().await;
    mount_authenticate(&server, "tok-stream").await;

    let mut body = Vec::new();
    for seq in 0..3 {
        body.extend(envelope(0, &json!({"seq": seq})));
    }
    body.extend(envelope(0x02, &json!({})));

    Mock::given(method("POST"))
        .and(path("/robot.v1.RobotService/StreamStatus"))
        .and(header("content-type", "application/connect+json"))
        .and(header("authorization", "Bearer tok-stream"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/connect+json")
                .set_body_bytes(body),
        )
        .mount(&server)
        .await;

    let transport = dial(&server.uri(), api_key()).await.unwrap();
    let messages: Vec<Value> = transport
        .server_stream::<_, Value>("robot.v1.RobotService/StreamStatus", &json!({}))
        .await
        .unwrap()
        .map(|item| item.unwrap())
        .collect()
        .await;

    assert_eq!(
        messages,
        vec![json!({"seq": 0}), json!({"seq": 1}), json!({"seq": 2})]
    );

    let requests = server.received_requests().await.unwrap();
    let sent = &requests.last().unwrap().body;
    assert_eq!(sent[0], 0);
    assert_eq!(&sent[5..], b"{}");
}

#[tokio::test]
async fn test_server_stream_trailer_error_is_surfaced() {
    let server = MockServer::start().await;
    mount_authenticate(&server, "tok").await;

    let mut body = envelope(0, &json!({"seq": 0}));
    body.extend(envelope(
        0x02,
        &json!({"error": {"code": "unavailable", "message": "robot rebooting"}}),
    ));

    Mock::given(method("POST"))
        .and(path("/robot.v1.RobotService/StreamStatus"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(&server)
        .await;

    let transport = dial(&server.uri(), api_key()).await.unwrap();
    let items: Vec<_> = transport
        .server_stream::<_, Value>("robot.v1.RobotService/StreamStatus", &json!({}))
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().unwrap(), &json!({"seq": 0}));
    let err = items[1].as_ref().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Rpc(Code::Unavailable));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_server_stream_truncated_body_is_an_error() {
    let server = MockServer::start().await;
    mount_authenticate(&server, "tok").await;

    Mock::given(method("POST"))
        .and(path("/robot.v1.RobotService/StreamStatus"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(envelope(0, &json!({"seq": 0}))))
        .mount(&server)
        .await;

    let transport = dial(&server.uri(), api_key()).await.unwrap();
    let items: Vec<_> = transport
        .server_stream::<_, Value>("robot.v1.RobotService/StreamStatus", &json!({}))
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[1].as_ref().unwrap_err().kind(), ErrorKind::Rpc(Code::Internal));
}

// ============================================================================
// Channel
// ============================================================================

#[tokio::test]
async fn test_protocol_headers_replace_caller_headers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/robot.v1.RobotService/GetStatus"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"battery": 87})))
        .mount(&server)
        .await;

    let factory = ConnectChannelFactory::new(ConnectConfig::default()).unwrap();
    let channel = factory.open(&Endpoint::new(&server.uri()).unwrap()).unwrap();

    let mut request = Request::unary(
        MethodPath::parse("robot.v1.RobotService/GetStatus").unwrap(),
        json!({}),
    );
    let headers = request.headers_mut();
    headers.insert("content-type", HeaderValue::from_static("text/plain"));
    headers.insert("connect-protocol-version", HeaderValue::from_static("7"));
    headers.insert("x-robot", HeaderValue::from_static("r2"));

    let response = channel.unary(request).await.unwrap();
    assert_eq!(response.message(), &json!({"battery": 87}));

    let requests = server.received_requests().await.unwrap();
    let sent = &requests[0].headers;
    let values = |name: &str| -> Vec<String> {
        sent.get_all(name)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    };
    assert_eq!(values("content-type"), vec!["application/json"]);
    assert_eq!(values("connect-protocol-version"), vec!["1"]);
    assert_eq!(values("connect-timeout-ms").len(), 1);
    assert_eq!(values("x-robot"), vec!["r2"]);
}
