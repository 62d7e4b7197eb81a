//! Session/correlation id generation
//!
//! Both legs of a cross-chain operation embed the same random session id in
//! their call data so the receiving contracts can correlate them. The value
//! is load-bearing: it must come from a crypto-secure source and must never
//! silently default to something predictable, so an unavailable entropy
//! source aborts the process.

use ethers::types::U256;
use rand::rngs::OsRng;
use rand::Rng;

/// Generate a uniformly random session id in `[0, 2^63)`.
///
/// Panics if the operating system entropy source fails.
pub fn generate_session_id() -> u64 {
    OsRng.gen_range(0..(1u64 << 63))
}

/// ABI-encode a session id as a single `uint256` call argument
pub fn session_id_calldata(session_id: u64) -> [u8; 32] {
    let mut out = [0u8; 32];
    U256::from(session_id).to_big_endian(&mut out);
    out
}
