//! Cross-rollup harness smoke flow
//!
//! Builds one self-transfer per configured rollup, bundles them, submits
//! the bundle to the coordinator and confirms both legs concurrently.

use anyhow::{Context, Result};
use ethers::types::{Bytes, U256};
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use xrollup_harness::confirm::{confirm_both, PollConfig};
use xrollup_harness::session::{generate_session_id, session_id_calldata};
use xrollup_harness::submit::send_bundle;
use xrollup_harness::tx::{build, encode_bundle, TxIntent};
use xrollup_harness::{Account, ChainHandle, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    info!("Starting cross-rollup harness v{}", env!("CARGO_PKG_VERSION"));

    let settings = Settings::load()?;
    let (cfg_a, cfg_b) = settings.rollup_pair();

    let chain_a = Arc::new(ChainHandle::from(cfg_a));
    let chain_b = Arc::new(ChainHandle::from(cfg_b));
    let account_a = Account::new(&cfg_a.private_key, chain_a.clone())?;
    let account_b = Account::new(&cfg_b.private_key, chain_b.clone())?;

    info!(
        "Configured rollups: {} (chain {}) and {} (chain {})",
        chain_a.name(),
        chain_a.chain_id(),
        chain_b.name(),
        chain_b.chain_id()
    );

    let cancel = CancellationToken::new();
    let flow_cancel = cancel.clone();
    let flow = tokio::spawn(async move {
        run_smoke_flow(settings, account_a, account_b, flow_cancel).await
    });

    tokio::select! {
        result = flow => result.context("smoke flow panicked")??,
        _ = shutdown_signal() => {
            warn!("Shutdown signal received, cancelling in-flight operations");
            cancel.cancel();
        }
    }

    Ok(())
}

/// Build, submit and confirm one cross-chain self-transfer pair
async fn run_smoke_flow(
    settings: Settings,
    account_a: Account,
    account_b: Account,
    cancel: CancellationToken,
) -> Result<()> {
    let chain_a = account_a.chain().clone();
    let chain_b = account_b.chain().clone();

    let balance_a = account_a.balance().await?;
    let balance_b = account_b.balance().await?;
    info!(
        "Balances before submission: {} wei on {}, {} wei on {}",
        balance_a,
        chain_a.name(),
        balance_b,
        chain_b.name()
    );

    // Both legs carry the same correlation value in their call data
    let session_id = generate_session_id();
    info!("Generated session id {}", session_id);

    let intent_a = self_transfer(&account_a, session_id);
    let intent_b = self_transfer(&account_b, session_id);

    let leg_a = build(intent_a, &account_a, &cancel).await?;
    let leg_b = build(intent_b, &account_b, &cancel).await?;

    let encoded = encode_bundle(
        &settings.harness.sender_id,
        (&chain_a, &leg_a),
        (&chain_b, &leg_b),
    )?;

    // The coordinator is reached through rollup-a's endpoint
    send_bundle(chain_a.rpc_url(), &encoded, &cancel).await?;
    info!(
        "Bundle submitted, confirming legs {:?} and {:?}",
        leg_a.hash(),
        leg_b.hash()
    );

    let poll = PollConfig::from_settings(&settings.harness);
    let (outcome_a, outcome_b) = confirm_both(
        (&chain_a, leg_a.hash()),
        (&chain_b, leg_b.hash()),
        &poll,
        &cancel,
    )
    .await?;

    info!(
        "Leg outcomes: {} on {}, {} on {}",
        describe(&outcome_a),
        chain_a.name(),
        describe(&outcome_b),
        chain_b.name()
    );

    if !outcome_a.is_success() || !outcome_b.is_success() {
        anyhow::bail!("cross-chain smoke flow did not execute both legs");
    }

    Ok(())
}

fn self_transfer(account: &Account, session_id: u64) -> TxIntent {
    TxIntent {
        to: account.address(),
        value: U256::from(1_000_000u64),
        data: Bytes::from(session_id_calldata(session_id).to_vec()),
        gas: 900_000,
        max_priority_fee: U256::from(1_000_000_000u64),
        max_fee: U256::from(20_000_000_000u64),
    }
}

fn describe(outcome: &xrollup_harness::Confirmation) -> &'static str {
    use xrollup_harness::Confirmation;
    match outcome {
        Confirmation::Success { .. } => "success",
        Confirmation::Failed { .. } => "failed",
        Confirmation::NotObserved { .. } => "not observed",
    }
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,xrollup_harness=debug,hyper=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
