//! Chain identity and transient RPC connections
//!
//! A [`ChainHandle`] is the immutable identity of one target rollup: its RPC
//! endpoint, numeric chain id and human label. It holds no client state;
//! every network call opens its own short-lived provider.

use crate::error::{HarnessError, HarnessResult};

use ethers::providers::{Http, Provider};
use std::time::Duration;

/// Immutable identity of one target rollup
#[derive(Debug, Clone)]
pub struct ChainHandle {
    rpc_url: String,
    chain_id: u64,
    name: String,
}

impl ChainHandle {
    /// Create a new chain handle
    pub fn new(rpc_url: impl Into<String>, chain_id: u64, name: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            chain_id,
            name: name.into(),
        }
    }

    /// RPC endpoint URL
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Numeric chain id
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Human-readable chain label
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Open a transient HTTP provider for this chain.
    ///
    /// Callers hold the provider only for the duration of one logical
    /// operation; no connection state is shared between operations.
    pub fn provider(&self) -> HarnessResult<Provider<Http>> {
        let provider = Provider::<Http>::try_from(self.rpc_url.as_str()).map_err(|e| {
            HarnessError::ChainConnection {
                chain_id: self.chain_id,
                message: format!("invalid RPC URL {}: {}", self.rpc_url, e),
            }
        })?;
        Ok(provider.interval(Duration::from_millis(100)))
    }
}

impl From<&crate::config::ChainConfig> for ChainHandle {
    fn from(cfg: &crate::config::ChainConfig) -> Self {
        Self::new(cfg.rpc_url.clone(), cfg.chain_id, cfg.name.clone())
    }
}
