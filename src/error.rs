//! Error types for the cross-rollup harness

use thiserror::Error;

/// Main error type for harness operations
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Signing error on {chain}: {message}")]
    Signing { chain: String, message: String },

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Coordination error: {0}")]
    Coordination(String),

    #[error("Chain connection error for chain {chain_id}: {message}")]
    ChainConnection { chain_id: u64, message: String },

    #[error("Nonce error for chain {chain_id}: {message}")]
    Nonce { chain_id: u64, message: String },

    #[error("Receipt unavailable for mined transaction {tx_hash} on chain {chain_id}")]
    Receipt { chain_id: u64, tx_hash: String },

    #[error("Cancelled while {operation}")]
    Cancelled { operation: String },
}

impl HarnessError {
    /// Check if the error was caused by external cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, HarnessError::Cancelled { .. })
    }
}

/// Result type for harness operations
pub type HarnessResult<T> = Result<T, HarnessError>;
