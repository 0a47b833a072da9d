use async_trait::async_trait;

use crate::models::{BalanceSnapshot, ProtocolUsage, RawTransaction, Result};

/// Normalized view of a ledger explorer / RPC pair. The pipeline only ever
/// talks to this trait; live and simulated sources plug in behind it.
#[async_trait]
pub trait ChainDataProvider: Send + Sync {
    /// Full transaction listing for the address.
    async fn fetch_transactions(&self, address: &str) -> Result<Vec<RawTransaction>>;

    /// Lending-protocol interactions for the address.
    async fn fetch_protocol_usage(&self, address: &str) -> Result<ProtocolUsage>;

    /// Current native balance for the address.
    async fn fetch_balance(&self, address: &str) -> Result<BalanceSnapshot>;
}
