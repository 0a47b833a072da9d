use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::models::{Result, RiskAssessment, RiskScoreError};

/// One row of the output table, in the column order analysts expect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRow {
    pub wallet_id: String,
    pub risk_score: u32,
    pub risk_category: String,
    pub total_transactions: u64,
    pub compound_interactions: u64,
    pub current_balance_eth: f64,
    pub transaction_volume_eth: f64,
    pub transaction_frequency: f64,
    pub failed_transaction_rate: f64,
    pub unique_counterparties: u64,
    pub error: String,
    /// ISO-8601 timestamp, stamped when the row is written.
    pub processed_at: String,
}

impl ResultRow {
    pub fn from_assessment(assessment: &RiskAssessment) -> Self {
        let metrics = &assessment.transaction_metrics;
        Self {
            wallet_id: assessment.wallet_address.clone(),
            risk_score: assessment.risk_score,
            risk_category: assessment.risk_category.as_str().to_string(),
            total_transactions: metrics.total_transactions,
            compound_interactions: assessment.protocol_usage.compound_count,
            current_balance_eth: assessment.balance.current_balance_eth,
            transaction_volume_eth: metrics.total_value_eth,
            transaction_frequency: metrics.transaction_frequency,
            failed_transaction_rate: metrics.failed_transaction_rate,
            unique_counterparties: metrics.unique_counterparties,
            error: assessment.error.clone().unwrap_or_default(),
            processed_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Read the wallet list from the input table. The table must exist and
/// carry a `wallet_id` column; anything else is a preflight failure.
pub fn read_wallets(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(RiskScoreError::Preflight(format!(
            "Input file '{}' not found",
            path.display()
        )));
    }

    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let column = headers
        .iter()
        .position(|h| h.trim() == "wallet_id")
        .ok_or_else(|| {
            RiskScoreError::Preflight("Input table is missing a 'wallet_id' column".to_string())
        })?;

    let mut wallets = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(value) = record.get(column) {
            let value = value.trim();
            if !value.is_empty() {
                wallets.push(value.to_string());
            }
        }
    }

    Ok(wallets)
}

/// Write the result table, one row per assessment, in input order.
pub fn write_results(path: &Path, results: &[RiskAssessment]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for assessment in results {
        writer.serialize(ResultRow::from_assessment(assessment))?;
    }
    writer.flush()?;
    Ok(())
}
