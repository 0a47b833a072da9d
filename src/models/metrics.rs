use serde::{Deserialize, Serialize};

/// Base units per whole native token (18-decimal fixed point).
pub const WEI_PER_ETH: f64 = 1e18;

/// One entry of a provider transaction listing. Explorer APIs serialize
/// every numeric field as a decimal string, so the raw shape keeps them as
/// strings and lets the normalizer decide how to parse them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTransaction {
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub value: String,
    #[serde(rename = "isError", default)]
    pub is_error: String,
    #[serde(rename = "timeStamp", default)]
    pub time_stamp: String,
}

/// Aggregate statistics derived from a wallet's transaction listing.
/// Immutable once computed; produced fresh per wallet by the normalizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionMetrics {
    pub total_transactions: u64,
    /// Mean value per transaction, in base units.
    pub avg_transaction_value: f64,
    /// Transactions per day over the observed span.
    pub transaction_frequency: f64,
    pub failed_transactions: u64,
    pub failed_transaction_rate: f64,
    pub unique_counterparties: u64,
    pub time_span_days: f64,
    pub total_value_eth: f64,
}

impl TransactionMetrics {
    /// Counterparties per transaction. Informational only: the scoring
    /// policy buckets on the absolute counterparty count, not this ratio.
    pub fn diversity_ratio(&self) -> f64 {
        self.unique_counterparties as f64 / self.total_transactions.max(1) as f64
    }
}

/// Lending-protocol interaction summary for a wallet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProtocolUsage {
    pub compound_count: u64,
    /// The matching transactions themselves; carried for reporting, never
    /// scored directly.
    pub compound_transactions: Vec<RawTransaction>,
}

/// Current native balance of a wallet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub current_balance_eth: f64,
    pub current_balance_wei: u128,
}

impl BalanceSnapshot {
    pub fn from_wei(wei: u128) -> Self {
        Self {
            current_balance_eth: wei as f64 / WEI_PER_ETH,
            current_balance_wei: wei,
        }
    }
}
