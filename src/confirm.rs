//! Confirmation polling
//!
//! Resolves the on-chain outcome of a transaction identified by its content
//! hash. The poller walks a small state machine:
//!
//! - AwaitingPropagation: the hash is unknown to the RPC endpoint. A freshly
//!   coordinated transaction may not have propagated yet, so "not found" is
//!   retried on a fixed interval up to a bounded budget; exhausting it yields
//!   [`Confirmation::NotObserved`].
//! - Pending: the transaction exists but is not yet in a block. Re-queried on
//!   the same interval without a bound; once a transaction is known to exist,
//!   eventual inclusion is assumed and only cancellation ends the wait.
//! - Mined: the receipt's status decides [`Confirmation::Success`] or
//!   [`Confirmation::Failed`].
//!
//! Cancellation is observed at every wait point.

use crate::chain::ChainHandle;
use crate::error::{HarnessError, HarnessResult};

use ethers::prelude::*;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Default interval between poll queries
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(600);
/// Default retry budget for the not-yet-propagated phase
pub const DEFAULT_MAX_NOT_FOUND_RETRIES: u32 = 10;

/// Tuning knobs for the confirmation poller
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Wait between consecutive chain queries
    pub interval: Duration,
    /// How many times "not found" is retried before giving up
    pub max_not_found_retries: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_not_found_retries: DEFAULT_MAX_NOT_FOUND_RETRIES,
        }
    }
}

impl PollConfig {
    /// Build a poll config from harness settings
    pub fn from_settings(harness: &crate::config::HarnessConfig) -> Self {
        Self {
            interval: Duration::from_millis(harness.poll_interval_ms),
            max_not_found_retries: harness.max_not_found_retries,
        }
    }
}

/// Authoritative outcome of polling one `(content hash, chain)` pair
#[derive(Debug, Clone)]
pub enum Confirmation {
    /// Mined with a successful receipt
    Success {
        tx: Transaction,
        receipt: TransactionReceipt,
    },
    /// Mined, but the receipt reports reversion
    Failed { receipt: TransactionReceipt },
    /// Never appeared within the retry budget. For a bundle leg this is the
    /// expected outcome when the coordinator declined the whole bundle.
    NotObserved { reason: String },
}

impl Confirmation {
    /// True only for a mined, successful transaction
    pub fn is_success(&self) -> bool {
        matches!(self, Confirmation::Success { .. })
    }
}

/// Poll `chain` for the outcome of the transaction identified by `tx_hash`
pub async fn await_confirmation(
    chain: &ChainHandle,
    tx_hash: H256,
    poll: &PollConfig,
    cancel: &CancellationToken,
) -> HarnessResult<Confirmation> {
    let provider = chain.provider()?;
    let chain_id = chain.chain_id();
    let started = Instant::now();
    let mut not_found_retries: u32 = 0;

    info!(
        "Fetching transaction details on {} for hash {:?}",
        chain.name(),
        tx_hash
    );

    loop {
        let lookup = query(cancel, tx_hash, provider.get_transaction(tx_hash)).await?;
        let tx = match lookup {
            Ok(Some(tx)) => tx,
            Ok(None) => {
                not_found_retries += 1;
                if not_found_retries > poll.max_not_found_retries {
                    let reason = format!(
                        "not found after {} retries",
                        poll.max_not_found_retries
                    );
                    info!(
                        "Transaction {:?} on {}: {} ({:?} elapsed)",
                        tx_hash,
                        chain.name(),
                        reason,
                        started.elapsed()
                    );
                    return Ok(Confirmation::NotObserved { reason });
                }
                debug!(
                    "Transaction {:?} did not reach the RPC yet, waiting {:?} before retry (retry {}/{})",
                    tx_hash, poll.interval, not_found_retries, poll.max_not_found_retries
                );
                wait(cancel, tx_hash, poll.interval).await?;
                continue;
            }
            Err(e) => {
                return Err(HarnessError::ChainConnection {
                    chain_id,
                    message: format!("failed to get transaction {:?}: {}", tx_hash, e),
                });
            }
        };

        if tx.block_number.is_none() {
            debug!(
                "Transaction {:?} is still pending, waiting {:?} before retry",
                tx_hash, poll.interval
            );
            wait(cancel, tx_hash, poll.interval).await?;
            continue;
        }

        // Mined: the receipt status is authoritative
        let receipt = query(cancel, tx_hash, provider.get_transaction_receipt(tx_hash))
            .await?
            .map_err(|e| HarnessError::ChainConnection {
                chain_id,
                message: format!("failed to get receipt for {:?}: {}", tx_hash, e),
            })?
            .ok_or_else(|| HarnessError::Receipt {
                chain_id,
                tx_hash: format!("{:?}", tx_hash),
            })?;

        info!(
            "Transaction {:?} on {} resolved in {:?}",
            tx_hash,
            chain.name(),
            started.elapsed()
        );

        if receipt.status == Some(U64::from(1u64)) {
            return Ok(Confirmation::Success { tx, receipt });
        }
        return Ok(Confirmation::Failed { receipt });
    }
}

/// Poll both legs of a bundle concurrently, each against its own chain
pub async fn confirm_both(
    leg_a: (&ChainHandle, H256),
    leg_b: (&ChainHandle, H256),
    poll: &PollConfig,
    cancel: &CancellationToken,
) -> HarnessResult<(Confirmation, Confirmation)> {
    let (a, b) = tokio::join!(
        await_confirmation(leg_a.0, leg_a.1, poll, cancel),
        await_confirmation(leg_b.0, leg_b.1, poll, cancel),
    );
    Ok((a?, b?))
}

/// Run one chain query, aborting promptly on cancellation
async fn query<T, F>(
    cancel: &CancellationToken,
    tx_hash: H256,
    fut: F,
) -> HarnessResult<Result<T, ProviderError>>
where
    F: std::future::Future<Output = Result<T, ProviderError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(HarnessError::Cancelled {
            operation: format!("querying transaction {:?}", tx_hash),
        }),
        result = fut => Ok(result),
    }
}

/// Sleep for the poll interval, aborting promptly on cancellation
async fn wait(cancel: &CancellationToken, tx_hash: H256, interval: Duration) -> HarnessResult<()> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(HarnessError::Cancelled {
            operation: format!("waiting for transaction {:?}", tx_hash),
        }),
        _ = tokio::time::sleep(interval) => Ok(()),
    }
}
