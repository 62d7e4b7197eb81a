//! Transaction construction, bundle encoding and helper flows

mod builder;
mod bundle;
mod funding;

pub use builder::{broadcast, build, build_with_nonce, SignedTx, TxIntent};
pub use bundle::{
    decode_bundle, decode_chain_id, encode_bundle, encode_chain_id, Envelope, Payload,
    TransactionRequest, XtRequest,
};
pub use funding::distribute_eth;
