//! Account funding helpers
//!
//! Distributes ETH from one sponsor account to many recipients using
//! pre-planned sequential nonces, confirming each transfer before moving
//! on. Used by stress scenarios to prepare throwaway accounts.

use crate::account::Account;
use crate::confirm::{await_confirmation, Confirmation, PollConfig};
use crate::error::{HarnessError, HarnessResult};
use crate::tx::builder::{broadcast, build_with_nonce, TxIntent};

use ethers::types::{Bytes, U256};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Send `amount` wei from `sponsor` to each recipient address, sequentially
pub async fn distribute_eth(
    sponsor: &Account,
    recipients: &[&Account],
    amount: U256,
    poll: &PollConfig,
    cancel: &CancellationToken,
) -> HarnessResult<()> {
    let mut nonce = sponsor.pending_nonce(cancel).await?;
    let chain = sponsor.chain();

    for recipient in recipients {
        let intent = TxIntent {
            to: recipient.address(),
            value: amount,
            data: Bytes::new(),
            gas: 25_000,
            max_priority_fee: U256::from(1_000_000u64),
            max_fee: U256::from(2_000_000u64),
        };

        let signed = build_with_nonce(intent, sponsor, nonce).await?;
        let tx_hash = broadcast(&signed, chain, cancel).await?;

        match await_confirmation(chain, tx_hash, poll, cancel).await? {
            Confirmation::Success { .. } => {
                info!(
                    "Funded {:?} with {} wei on {}",
                    recipient.address(),
                    amount,
                    chain.name()
                );
            }
            Confirmation::Failed { .. } => {
                return Err(HarnessError::ChainConnection {
                    chain_id: chain.chain_id(),
                    message: format!("funding transaction {:?} reverted", tx_hash),
                });
            }
            Confirmation::NotObserved { reason } => {
                return Err(HarnessError::ChainConnection {
                    chain_id: chain.chain_id(),
                    message: format!("funding transaction {:?} not observed: {}", tx_hash, reason),
                });
            }
        }

        nonce += 1;
    }

    Ok(())
}
