//! Bundle submission tests against a mock coordinator endpoint

use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use xrollup_harness::submit::send_bundle;
use xrollup_harness::HarnessError;

const BUNDLE: &[u8] = &[0x0a, 0x06, b'c', b'l', b'i', b'e', b'n', b't'];

#[tokio::test]
async fn test_null_result_is_acceptance() {
    let server = MockServer::start().await;

    // Matching pins down the method name and the 0x-hex sole parameter;
    // anything else falls through to wiremock's 404 and fails the call.
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "eth_sendXTransaction",
            "params": [format!("0x{}", hex::encode(BUNDLE))],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    send_bundle(&server.uri(), BUNDLE, &CancellationToken::new())
        .await
        .unwrap();

    // Dropping the server verifies the expected call count
    drop(server);
}

#[tokio::test]
async fn test_coordinator_error_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32000, "message": "bundle rejected: invalid leg" }
        })))
        .mount(&server)
        .await;

    let err = send_bundle(&server.uri(), BUNDLE, &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        HarnessError::Coordination(message) => {
            assert!(message.contains("bundle rejected"), "got: {}", message)
        }
        other => panic!("expected Coordination error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_null_result_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": "0x01"
        })))
        .mount(&server)
        .await;

    let err = send_bundle(&server.uri(), BUNDLE, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, HarnessError::Coordination(_)));
}

#[tokio::test]
async fn test_transport_failure_is_coordination_error() {
    // Nothing is listening on this port
    let err = send_bundle(
        "http://127.0.0.1:9",
        BUNDLE,
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, HarnessError::Coordination(_)));
}
