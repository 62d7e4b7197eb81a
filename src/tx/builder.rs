//! Signed-transaction construction
//!
//! Builds chain-bound EIP-1559 transactions from a [`TxIntent`] and an
//! [`Account`]. Building and broadcasting are distinct operations: a bundle
//! leg is built, embedded into a coordination bundle and never sent to its
//! chain directly by this client.

use crate::account::Account;
use crate::error::{HarnessError, HarnessResult};

use ethers::prelude::*;
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::utils::keccak256;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Unsigned description of one chain-local transaction
#[derive(Debug, Clone)]
pub struct TxIntent {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub gas: u64,
    pub max_priority_fee: U256,
    pub max_fee: U256,
}

/// A signed transaction ready to be embedded into a bundle leg
///
/// Invariant: `hash` is the keccak-256 digest of `raw`, so the two fields
/// can never be transmitted inconsistently.
#[derive(Debug, Clone)]
pub struct SignedTx {
    raw: Bytes,
    hash: H256,
    chain_id: u64,
}

impl SignedTx {
    /// Canonical signed-transaction bytes
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    /// Content hash identifying the transaction on its origin chain
    pub fn hash(&self) -> H256 {
        self.hash
    }

    /// Chain id the signature is bound to
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }
}

/// Build a signed transaction, fetching the account's next pending nonce
pub async fn build(
    intent: TxIntent,
    account: &Account,
    cancel: &CancellationToken,
) -> HarnessResult<SignedTx> {
    let nonce = account.pending_nonce(cancel).await?;
    build_with_nonce(intent, account, nonce).await
}

/// Build a signed transaction with an explicitly chosen nonce.
///
/// Used to construct multiple in-flight transactions with pre-planned,
/// non-colliding nonces. No network call is made.
pub async fn build_with_nonce(
    intent: TxIntent,
    account: &Account,
    nonce: u64,
) -> HarnessResult<SignedTx> {
    let chain_id = account.chain().chain_id();
    info!(
        "Creating transaction on {} with nonce {}",
        account.chain().name(),
        nonce
    );

    let request = Eip1559TransactionRequest::new()
        .chain_id(chain_id)
        .nonce(nonce)
        .to(intent.to)
        .value(intent.value)
        .gas(intent.gas)
        .max_priority_fee_per_gas(intent.max_priority_fee)
        .max_fee_per_gas(intent.max_fee)
        .data(intent.data);
    let typed = TypedTransaction::Eip1559(request);

    let signature = account
        .wallet()
        .sign_transaction(&typed)
        .await
        .map_err(|e| HarnessError::Signing {
            chain: account.chain().name().to_string(),
            message: e.to_string(),
        })?;

    let raw = typed.rlp_signed(&signature);
    let hash = H256::from(keccak256(&raw));
    debug!("Transaction signed successfully: {:?}", hash);

    Ok(SignedTx {
        raw,
        hash,
        chain_id,
    })
}

/// Broadcast a signed transaction directly to its chain.
///
/// Only for standalone helper flows such as funding; bundle legs reach
/// their chains through the coordinator, never through this path.
pub async fn broadcast(
    tx: &SignedTx,
    chain: &crate::chain::ChainHandle,
    cancel: &CancellationToken,
) -> HarnessResult<H256> {
    let provider = chain.provider()?;
    let chain_id = chain.chain_id();

    let pending = tokio::select! {
        _ = cancel.cancelled() => {
            return Err(HarnessError::Cancelled {
                operation: format!("broadcasting transaction {:?} on chain {}", tx.hash(), chain_id),
            });
        }
        result = provider.send_raw_transaction(tx.raw().clone()) => {
            result.map_err(|e| HarnessError::ChainConnection {
                chain_id,
                message: format!("failed to send transaction: {}", e),
            })?
        }
    };

    let tx_hash = pending.tx_hash();
    info!("Transaction sent successfully: {:?}", tx_hash);
    Ok(tx_hash)
}
