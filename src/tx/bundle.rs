//! Cross-transaction bundle encoding
//!
//! The coordinator accepts one binary envelope carrying two chain-addressed
//! signed transactions. The schema follows standard protobuf wire rules and
//! must stay byte-stable:
//!
//! ```text
//! Envelope           { 1: string sender_id; oneof payload { 2: XtRequest } }
//! XtRequest          { 1: repeated TransactionRequest transactions }
//! TransactionRequest { 1: bytes chain_id; 2: repeated bytes transaction }
//! ```
//!
//! `chain_id` is the big-endian minimal encoding of the target chain's
//! numeric id. The schema allows multiple payloads per leg for future
//! batching; this client always emits singleton lists.

use crate::chain::ChainHandle;
use crate::error::{HarnessError, HarnessResult};
use crate::tx::builder::SignedTx;

use prost::Message;
use tracing::debug;

/// Top-level coordination message
#[derive(Clone, PartialEq, Message)]
pub struct Envelope {
    #[prost(string, tag = "1")]
    pub sender_id: String,
    #[prost(oneof = "Payload", tags = "2")]
    pub payload: Option<Payload>,
}

/// Tagged payload union; `XtRequest` is the only kind today
#[derive(Clone, PartialEq, prost::Oneof)]
pub enum Payload {
    #[prost(message, tag = "2")]
    XtRequest(XtRequest),
}

/// A cross-chain transaction request with one entry per leg
#[derive(Clone, PartialEq, Message)]
pub struct XtRequest {
    #[prost(message, repeated, tag = "1")]
    pub transactions: Vec<TransactionRequest>,
}

/// One chain-addressed leg of the bundle
#[derive(Clone, PartialEq, Message)]
pub struct TransactionRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub chain_id: Vec<u8>,
    #[prost(bytes = "vec", repeated, tag = "2")]
    pub transaction: Vec<Vec<u8>>,
}

/// Big-endian minimal encoding of a numeric chain id
pub fn encode_chain_id(chain_id: u64) -> Vec<u8> {
    let bytes = chain_id.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    bytes[skip..].to_vec()
}

/// Decode a big-endian minimal chain id
pub fn decode_chain_id(bytes: &[u8]) -> HarnessResult<u64> {
    if bytes.len() > 8 {
        return Err(HarnessError::Encoding(format!(
            "chain id field is {} bytes, exceeds u64 range",
            bytes.len()
        )));
    }
    let mut buf = [0u8; 8];
    buf[8 - bytes.len()..].copy_from_slice(bytes);
    Ok(u64::from_be_bytes(buf))
}

/// Encode a two-leg coordination bundle.
///
/// Leg order follows argument order; order carries no coordination
/// semantics but is preserved exactly so encoding is reproducible. The
/// `(chain id, payload)` pairing of each leg travels intact.
pub fn encode_bundle(
    sender_id: &str,
    leg_a: (&ChainHandle, &SignedTx),
    leg_b: (&ChainHandle, &SignedTx),
) -> HarnessResult<Vec<u8>> {
    let request = XtRequest {
        transactions: vec![
            TransactionRequest {
                chain_id: encode_chain_id(leg_a.0.chain_id()),
                transaction: vec![leg_a.1.raw().to_vec()],
            },
            TransactionRequest {
                chain_id: encode_chain_id(leg_b.0.chain_id()),
                transaction: vec![leg_b.1.raw().to_vec()],
            },
        ],
    };

    let envelope = Envelope {
        sender_id: sender_id.to_string(),
        payload: Some(Payload::XtRequest(request)),
    };

    let mut encoded = Vec::with_capacity(envelope.encoded_len());
    envelope
        .encode(&mut encoded)
        .map_err(|e| HarnessError::Encoding(format!("failed to encode bundle: {}", e)))?;

    debug!(
        "Encoded cross-tx bundle: sender={} legs=({}, {}) {} bytes",
        sender_id,
        leg_a.0.chain_id(),
        leg_b.0.chain_id(),
        encoded.len()
    );
    Ok(encoded)
}

/// Decode a coordination bundle envelope
pub fn decode_bundle(bytes: &[u8]) -> HarnessResult<Envelope> {
    Envelope::decode(bytes)
        .map_err(|e| HarnessError::Encoding(format!("failed to decode bundle: {}", e)))
}
