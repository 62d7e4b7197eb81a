//! Coordination bundle submission
//!
//! Submits an encoded bundle to the coordinator with a single custom RPC
//! call. The call conveys *acceptance for coordination* only; whether the
//! legs actually executed is the confirmation poller's concern. A null
//! result is the only success signal, and failures are surfaced to the
//! caller without retrying.

use crate::error::{HarnessError, HarnessResult};

use ethers::providers::{Http, Provider};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Custom RPC method the coordinator listens on
pub const SEND_XTRANSACTION_METHOD: &str = "eth_sendXTransaction";

/// Submit an encoded bundle to the coordinator at `endpoint`
pub async fn send_bundle(
    endpoint: &str,
    encoded: &[u8],
    cancel: &CancellationToken,
) -> HarnessResult<()> {
    let provider = Provider::<Http>::try_from(endpoint).map_err(|e| {
        HarnessError::Coordination(format!("could not connect to coordinator RPC: {}", e))
    })?;

    let params = [format!("0x{}", hex::encode(encoded))];
    let result: serde_json::Value = tokio::select! {
        _ = cancel.cancelled() => {
            return Err(HarnessError::Cancelled {
                operation: "submitting cross-tx bundle".to_string(),
            });
        }
        result = provider.request(SEND_XTRANSACTION_METHOD, params) => {
            result.map_err(|e| HarnessError::Coordination(format!("RPC call failed: {}", e)))?
        }
    };

    // Only a null result means the coordinator accepted the bundle
    if !result.is_null() {
        return Err(HarnessError::Coordination(format!(
            "coordinator returned unexpected result: {}",
            result
        )));
    }

    info!("Cross-tx bundle submitted successfully: {} bytes", encoded.len());
    Ok(())
}
