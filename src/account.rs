//! Funded accounts bound to a single rollup
//!
//! An [`Account`] pairs key material with the [`ChainHandle`] it transacts
//! on. The wallet is chain-bound at construction so signatures always embed
//! the right chain id.

use crate::chain::ChainHandle;
use crate::error::{HarnessError, HarnessResult};

use ethers::prelude::*;
use ethers::signers::{LocalWallet, Signer};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// An account with a funded key on one rollup
#[derive(Debug)]
pub struct Account {
    wallet: LocalWallet,
    address: Address,
    chain: Arc<ChainHandle>,
}

impl Account {
    /// Create an account from a hex private key, bound to `chain`
    pub fn new(private_key_hex: &str, chain: Arc<ChainHandle>) -> HarnessResult<Self> {
        let key = private_key_hex.trim_start_matches("0x");
        let wallet = key
            .parse::<LocalWallet>()
            .map_err(|e| HarnessError::Signing {
                chain: chain.name().to_string(),
                message: format!("invalid private key: {}", e),
            })?
            .with_chain_id(chain.chain_id());

        let address = wallet.address();
        Ok(Self {
            wallet,
            address,
            chain,
        })
    }

    /// Address derived from the private key
    pub fn address(&self) -> Address {
        self.address
    }

    /// The rollup this account transacts on
    pub fn chain(&self) -> &Arc<ChainHandle> {
        &self.chain
    }

    /// Signing wallet, already bound to the chain id
    pub fn wallet(&self) -> &LocalWallet {
        &self.wallet
    }

    /// Fetch the next pending nonce for this account
    pub async fn pending_nonce(&self, cancel: &CancellationToken) -> HarnessResult<u64> {
        let provider = self.chain.provider()?;
        let chain_id = self.chain.chain_id();

        let nonce = tokio::select! {
            _ = cancel.cancelled() => {
                return Err(HarnessError::Cancelled {
                    operation: format!("fetching nonce on chain {}", chain_id),
                });
            }
            result = provider.get_transaction_count(self.address, Some(BlockNumber::Pending.into())) => {
                result.map_err(|e| HarnessError::Nonce {
                    chain_id,
                    message: e.to_string(),
                })?
            }
        };

        debug!(
            "Pending nonce for {:?} on {}: {}",
            self.address,
            self.chain.name(),
            nonce
        );
        Ok(nonce.as_u64())
    }

    /// Fetch the account's current balance
    pub async fn balance(&self) -> HarnessResult<U256> {
        let provider = self.chain.provider()?;
        provider
            .get_balance(self.address, None)
            .await
            .map_err(|e| HarnessError::ChainConnection {
                chain_id: self.chain.chain_id(),
                message: e.to_string(),
            })
    }
}
