//! Client harness for cross-rollup atomic transaction coordination
//!
//! Builds two independently signed transactions, one per rollup, bundles
//! them into a single coordination request, submits the bundle to a
//! coordinator over a custom RPC method and confirms each leg's outcome on
//! its own chain. The coordinator, not this client, guarantees atomicity;
//! the client's job is to preserve leg-to-chain pairing through the wire
//! format and to make the outcome of each leg observable.

pub mod account;
pub mod chain;
pub mod config;
pub mod confirm;
pub mod error;
pub mod session;
pub mod submit;
pub mod tx;

pub use account::Account;
pub use chain::ChainHandle;
pub use config::Settings;
pub use confirm::{await_confirmation, confirm_both, Confirmation, PollConfig};
pub use error::{HarnessError, HarnessResult};
pub use session::generate_session_id;
pub use submit::send_bundle;
pub use tx::{build, build_with_nonce, encode_bundle, SignedTx, TxIntent};
