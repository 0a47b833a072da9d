use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    chains::ChainDataProvider,
    config::ProviderSettings,
    models::{BalanceSnapshot, ProtocolUsage, RawTransaction, Result, RiskScoreError},
};

/// Compound protocol contract addresses used to flag lending interactions.
pub struct CompoundContracts;

impl CompoundContracts {
    // V2 cTokens and comptroller
    pub const CDAI: &'static str = "0x5d3a536e4d6dbd6114cc1ead35777bab948e3643";
    pub const CUSDC: &'static str = "0x39aa39c021dfbae8fac545936693ac917d5e7563";
    pub const CUSDT: &'static str = "0xf650c3d88d12db855b8bf7d11be6c55a4e07dcc9";
    pub const CETH: &'static str = "0x4ddc2d193948926d02f9b1fe9e1daa0718270ed5";
    pub const CWBTC: &'static str = "0xc11b1268c1a384e55c48c2391d8d480264a3a7f4";
    pub const COMPTROLLER: &'static str = "0x3d9819210a31b4961b30ef54be2aed79b9c9cd3b";

    // V3 comets
    pub const CUSDC_V3: &'static str = "0xc3d688b66703497daa19211eedff47f25384cdc3";
    pub const CWETH_V3: &'static str = "0xa17581a9e3356d9a858b789d68b4d866e593ae94";

    pub fn all() -> [&'static str; 8] {
        [
            Self::CDAI,
            Self::CUSDC,
            Self::CUSDT,
            Self::CETH,
            Self::CWBTC,
            Self::COMPTROLLER,
            Self::CUSDC_V3,
            Self::CWETH_V3,
        ]
    }
}

/// Explorer-API answer envelope. `result` is an array on success and a
/// bare string on failure, so it stays untyped until the status is known.
#[derive(Debug, Deserialize)]
struct ExplorerResponse {
    status: String,
    message: String,
    result: serde_json::Value,
}

/// Live chain data provider backed by an Etherscan-compatible API.
pub struct EtherscanProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    max_retries: u32,
    retry_backoff: Duration,
}

impl EtherscanProvider {
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            base_url: settings.etherscan_api_url.clone(),
            api_key: settings.etherscan_api_key.clone(),
            max_retries: settings.max_retries,
            retry_backoff: Duration::from_millis(settings.retry_backoff_ms),
        })
    }

    /// One explorer call with bounded retries on transport failure. An
    /// answer with `status != "1"` is a provider error and is not retried:
    /// the explorer has already answered, just not with data.
    async fn call(&self, stage: &str, params: &[(&str, &str)]) -> Result<serde_json::Value> {
        let mut attempt = 0;
        loop {
            let request = self
                .http
                .get(&self.base_url)
                .query(params)
                .query(&[("apikey", self.api_key.as_str())]);

            match request.send().await {
                Ok(response) => {
                    let envelope: ExplorerResponse = response.json().await?;
                    if envelope.status == "1" {
                        return Ok(envelope.result);
                    }
                    return Err(RiskScoreError::Provider {
                        stage: stage.to_string(),
                        message: envelope.message,
                    });
                }
                Err(e) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        "Explorer {} call failed (attempt {}/{}): {}",
                        stage, attempt, self.max_retries, e
                    );
                    tokio::time::sleep(self.retry_backoff).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[async_trait]
impl ChainDataProvider for EtherscanProvider {
    async fn fetch_transactions(&self, address: &str) -> Result<Vec<RawTransaction>> {
        let result = self
            .call(
                "txlist",
                &[
                    ("module", "account"),
                    ("action", "txlist"),
                    ("address", address),
                    ("startblock", "0"),
                    ("endblock", "99999999"),
                    ("page", "1"),
                    ("offset", "10000"),
                    ("sort", "desc"),
                ],
            )
            .await?;

        let transactions: Vec<RawTransaction> = serde_json::from_value(result)?;
        debug!("Fetched {} transactions for {}", transactions.len(), address);
        Ok(transactions)
    }

    async fn fetch_protocol_usage(&self, address: &str) -> Result<ProtocolUsage> {
        let transactions = self.fetch_transactions(address).await?;

        let targets: HashSet<&str> = CompoundContracts::all().into_iter().collect();
        let compound_transactions: Vec<RawTransaction> = transactions
            .into_iter()
            .filter(|tx| targets.contains(tx.to.to_lowercase().as_str()))
            .collect();

        Ok(ProtocolUsage {
            compound_count: compound_transactions.len() as u64,
            compound_transactions,
        })
    }

    async fn fetch_balance(&self, address: &str) -> Result<BalanceSnapshot> {
        let result = self
            .call(
                "balance",
                &[
                    ("module", "account"),
                    ("action", "balance"),
                    ("address", address),
                    ("tag", "latest"),
                ],
            )
            .await?;

        let wei: u128 = result
            .as_str()
            .unwrap_or_default()
            .parse()
            .map_err(|_| RiskScoreError::Provider {
                stage: "balance".to_string(),
                message: format!("Unparseable balance payload: {}", result),
            })?;

        Ok(BalanceSnapshot::from_wei(wei))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_set_is_lowercase() {
        // The usage filter lowercases transaction targets before lookup,
        // so the constants table must already be folded.
        for address in CompoundContracts::all() {
            assert_eq!(address, address.to_lowercase());
            assert!(address.starts_with("0x"));
            assert_eq!(address.len(), 42);
        }
    }
}
