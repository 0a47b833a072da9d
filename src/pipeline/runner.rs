use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::{
    chains::ChainDataProvider,
    models::{BalanceSnapshot, ProtocolUsage, Result, RiskAssessment},
    pipeline::store,
    scoring::{analyze_transactions, RiskEngine},
};

/// Per-wallet processing states. Fetching and Scoring can fall sideways
/// into Failed; nothing leaves Completed or Failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletStage {
    Pending,
    Fetching,
    Scoring,
    Completed,
    Failed,
}

impl WalletStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletStage::Pending => "pending",
            WalletStage::Fetching => "fetching",
            WalletStage::Scoring => "scoring",
            WalletStage::Completed => "completed",
            WalletStage::Failed => "failed",
        }
    }
}

impl fmt::Display for WalletStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Pause between wallets; a rate-limit throttle, not a correctness
    /// mechanism.
    pub delay: Duration,
    /// Accumulated results are checkpointed every this many wallets.
    pub checkpoint_interval: usize,
    pub checkpoint_path: PathBuf,
}

/// Drives the scoring engine across an ordered wallet list, one wallet at a
/// time. Per-wallet failures become error rows; the batch itself only fails
/// on checkpoint I/O.
pub struct BatchPipeline {
    provider: Arc<dyn ChainDataProvider>,
    engine: RiskEngine,
    options: PipelineOptions,
    cancelled: Arc<AtomicBool>,
}

impl BatchPipeline {
    pub fn new(
        provider: Arc<dyn ChainDataProvider>,
        engine: RiskEngine,
        options: PipelineOptions,
    ) -> Self {
        Self {
            provider,
            engine,
            options,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag checked at the loop boundary; flipping it stops the pipeline
    /// after the wallet in flight finishes.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn engine(&self) -> &RiskEngine {
        &self.engine
    }

    /// Process the list strictly in input order. Every wallet that was
    /// started yields exactly one result; cancellation only prevents new
    /// wallets from starting.
    pub async fn run(&self, addresses: &[String]) -> Result<Vec<RiskAssessment>> {
        let mut results = Vec::with_capacity(addresses.len());

        for (index, address) in addresses.iter().enumerate() {
            if self.cancelled.load(Ordering::SeqCst) {
                warn!(
                    "Cancellation requested, stopping after {} of {} wallets",
                    index,
                    addresses.len()
                );
                break;
            }

            info!(
                "[{}/{}] Processing wallet: {}",
                index + 1,
                addresses.len(),
                address
            );
            let assessment = self.process_wallet(address).await;
            match &assessment.error {
                None => info!(
                    "  Risk score: {}/1000 ({})",
                    assessment.risk_score, assessment.risk_category
                ),
                Some(error) => warn!("  Unable to assess {}: {}", address, error),
            }
            results.push(assessment);

            if (index + 1) % self.options.checkpoint_interval == 0 {
                store::write_results(&self.options.checkpoint_path, &results)?;
                info!(
                    "Checkpoint written to {} ({} wallets)",
                    self.options.checkpoint_path.display(),
                    results.len()
                );
            }

            if !self.options.delay.is_zero() && index + 1 < addresses.len() {
                tokio::time::sleep(self.options.delay).await;
            }
        }

        Ok(results)
    }

    /// Score a single wallet. Never fails: any error is folded into the
    /// returned assessment.
    pub async fn process_wallet(&self, address: &str) -> RiskAssessment {
        debug!(wallet = %address, stage = %WalletStage::Fetching, "fetching chain data");

        // The transaction listing is the backbone of every factor; without
        // it the wallet cannot be assessed.
        let transactions = match self.provider.fetch_transactions(address).await {
            Ok(transactions) => transactions,
            Err(e) => {
                debug!(wallet = %address, stage = %WalletStage::Failed, "transaction fetch failed");
                return RiskAssessment::failed(
                    address,
                    format!("Transaction fetch error: {}", e),
                );
            }
        };

        // Secondary fetches degrade to neutral defaults instead of failing
        // the wallet.
        let usage = match self.provider.fetch_protocol_usage(address).await {
            Ok(usage) => usage,
            Err(e) => {
                warn!("Protocol usage fetch failed for {}: {}", address, e);
                ProtocolUsage::default()
            }
        };
        let balance = match self.provider.fetch_balance(address).await {
            Ok(balance) => balance,
            Err(e) => {
                warn!("Balance fetch failed for {}: {}", address, e);
                BalanceSnapshot::default()
            }
        };

        debug!(wallet = %address, stage = %WalletStage::Scoring, "scoring");

        // The normalizer and engine are pure; a panic here means a bug.
        // Degrade to an error row rather than killing the batch.
        let engine = &self.engine;
        let scored = catch_unwind(AssertUnwindSafe(|| {
            let metrics = analyze_transactions(&transactions);
            engine.calculate_risk_score(address, &metrics, &usage, &balance)
        }));

        match scored {
            Ok(assessment) => {
                debug!(wallet = %address, stage = %WalletStage::Completed, "done");
                assessment
            }
            Err(_) => {
                warn!("Unexpected scoring failure for {}", address);
                debug!(wallet = %address, stage = %WalletStage::Failed, "scoring panicked");
                RiskAssessment::failed(address, "Unexpected error during scoring")
            }
        }
    }
}
