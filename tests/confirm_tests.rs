//! Confirmation poller tests against a mock JSON-RPC server

use serde_json::{json, Value};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use xrollup_harness::confirm::{await_confirmation, Confirmation, PollConfig};
use xrollup_harness::ChainHandle;

const TX_HASH: &str = "0x2bb1f76e581d75403a34e6b8ff12a31d93f83b3a9990c4a0d0c33ba1e095a0b6";
const FROM: &str = "0x2c7536e3605d9c16a7a3d7b1898e529396a65c23";

/// Fast polling so the retry budget resolves in tens of milliseconds
fn fast_poll() -> PollConfig {
    PollConfig {
        interval: Duration::from_millis(10),
        max_not_found_retries: 10,
    }
}

fn test_chain(server: &MockServer) -> ChainHandle {
    ChainHandle::new(server.uri(), 77777, "rollup-a")
}

fn tx_hash() -> ethers::types::H256 {
    TX_HASH.parse().unwrap()
}

/// JSON-RPC success body wrapping `result`
fn rpc_result(result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": 1, "result": result })
}

/// A transaction object as returned by eth_getTransactionByHash
fn tx_json(block_number: Option<&str>) -> Value {
    json!({
        "hash": TX_HASH,
        "nonce": "0x0",
        "blockHash": block_number.map(|_| "0x8f6a9c6b74b2e7ea3d2e5b3fc6b0a1de9b2c1a806fd1c1a2bb5d3c1e4f5a6b7c"),
        "blockNumber": block_number,
        "transactionIndex": block_number.map(|_| "0x0"),
        "from": FROM,
        "to": FROM,
        "value": "0xf4240",
        "gasPrice": "0x4a817c800",
        "gas": "0xdbba0",
        "input": "0x",
        "v": "0x0",
        "r": "0x1",
        "s": "0x1",
        "type": "0x2",
        "chainId": "0x12fd1",
        "maxFeePerGas": "0x4a817c800",
        "maxPriorityFeePerGas": "0x3b9aca00",
        "accessList": []
    })
}

/// A receipt as returned by eth_getTransactionReceipt
fn receipt_json(status: &str) -> Value {
    json!({
        "transactionHash": TX_HASH,
        "transactionIndex": "0x0",
        "blockHash": "0x8f6a9c6b74b2e7ea3d2e5b3fc6b0a1de9b2c1a806fd1c1a2bb5d3c1e4f5a6b7c",
        "blockNumber": "0x10",
        "from": FROM,
        "to": FROM,
        "cumulativeGasUsed": "0x5208",
        "gasUsed": "0x5208",
        "contractAddress": null,
        "logs": [],
        "status": status,
        "logsBloom": format!("0x{}", "00".repeat(256)),
        "type": "0x2",
        "effectiveGasPrice": "0x4a817c800"
    })
}

#[tokio::test]
async fn test_not_found_budget_is_eleven_queries() {
    let server = MockServer::start().await;

    // 1 initial query + 10 retries, never more
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_getTransactionByHash" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(rpc_result(Value::Null)))
        .expect(11)
        .mount(&server)
        .await;

    let outcome = await_confirmation(
        &test_chain(&server),
        tx_hash(),
        &fast_poll(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    match outcome {
        Confirmation::NotObserved { reason } => {
            assert!(reason.contains("10 retries"), "unexpected reason: {}", reason)
        }
        other => panic!("expected NotObserved, got {:?}", other),
    }

    // Dropping the server verifies the expected call count
    drop(server);
}

#[tokio::test]
async fn test_mined_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_getTransactionByHash" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(rpc_result(tx_json(Some("0x10")))))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_getTransactionReceipt" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(rpc_result(receipt_json("0x1"))))
        .mount(&server)
        .await;

    let outcome = await_confirmation(
        &test_chain(&server),
        tx_hash(),
        &fast_poll(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert!(outcome.is_success());
    match outcome {
        Confirmation::Success { tx, receipt } => {
            assert_eq!(tx.hash, tx_hash());
            assert_eq!(receipt.status, Some(1u64.into()));
        }
        other => panic!("expected Success, got {:?}", other),
    }
}

#[tokio::test]
async fn test_mined_reverted() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_getTransactionByHash" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(rpc_result(tx_json(Some("0x10")))))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_getTransactionReceipt" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(rpc_result(receipt_json("0x0"))))
        .mount(&server)
        .await;

    let outcome = await_confirmation(
        &test_chain(&server),
        tx_hash(),
        &fast_poll(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    match outcome {
        Confirmation::Failed { receipt } => assert_eq!(receipt.status, Some(0u64.into())),
        other => panic!("expected Failed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_pending_then_mined() {
    let server = MockServer::start().await;

    // First two lookups report the transaction as pending, later ones mined.
    // Mocks match in mount order, so the bounded mock shadows the fallback
    // until its responses are used up.
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_getTransactionByHash" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(rpc_result(tx_json(None))))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_getTransactionByHash" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(rpc_result(tx_json(Some("0x10")))))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_getTransactionReceipt" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(rpc_result(receipt_json("0x1"))))
        .mount(&server)
        .await;

    let outcome = await_confirmation(
        &test_chain(&server),
        tx_hash(),
        &fast_poll(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert!(outcome.is_success());
}

#[tokio::test]
async fn test_cancellation_aborts_immediately() {
    let server = MockServer::start().await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = await_confirmation(&test_chain(&server), tx_hash(), &fast_poll(), &cancel)
        .await
        .unwrap_err();

    assert!(err.is_cancelled(), "expected cancellation, got {:?}", err);
    // No query may be issued once the token is cancelled
    assert!(server.received_requests().await.unwrap().is_empty());
}
