use serde::{Deserialize, Serialize};
use std::fmt;

use super::{BalanceSnapshot, ProtocolUsage, TransactionMetrics};

/// Score assigned to wallets the pipeline could not assess.
pub const ERROR_RISK_SCORE: u32 = 999;

/// The seven scored risk factors, in canonical order. The order matters:
/// it is the tie-break for the explanation ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    TransactionVolume,
    TransactionFrequency,
    ProtocolExperience,
    BalanceStability,
    FailureRate,
    CounterpartyDiversity,
    RecentActivity,
}

impl RiskFactor {
    pub const ALL: [RiskFactor; 7] = [
        RiskFactor::TransactionVolume,
        RiskFactor::TransactionFrequency,
        RiskFactor::ProtocolExperience,
        RiskFactor::BalanceStability,
        RiskFactor::FailureRate,
        RiskFactor::CounterpartyDiversity,
        RiskFactor::RecentActivity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskFactor::TransactionVolume => "transaction_volume",
            RiskFactor::TransactionFrequency => "transaction_frequency",
            RiskFactor::ProtocolExperience => "protocol_experience",
            RiskFactor::BalanceStability => "balance_stability",
            RiskFactor::FailureRate => "failure_rate",
            RiskFactor::CounterpartyDiversity => "counterparty_diversity",
            RiskFactor::RecentActivity => "recent_activity",
        }
    }

    /// Human-readable name used in explanations.
    pub fn label(&self) -> &'static str {
        match self {
            RiskFactor::TransactionVolume => "Transaction Volume",
            RiskFactor::TransactionFrequency => "Transaction Frequency",
            RiskFactor::ProtocolExperience => "Protocol Experience",
            RiskFactor::BalanceStability => "Balance Stability",
            RiskFactor::FailureRate => "Failure Rate",
            RiskFactor::CounterpartyDiversity => "Counterparty Diversity",
            RiskFactor::RecentActivity => "Recent Activity",
        }
    }
}

/// Per-factor scores, each in [0, 1] where 1 is highest risk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub transaction_volume: f64,
    pub transaction_frequency: f64,
    pub protocol_experience: f64,
    pub balance_stability: f64,
    pub failure_rate: f64,
    pub counterparty_diversity: f64,
    pub recent_activity: f64,
}

impl ComponentScores {
    pub fn get(&self, factor: RiskFactor) -> f64 {
        match factor {
            RiskFactor::TransactionVolume => self.transaction_volume,
            RiskFactor::TransactionFrequency => self.transaction_frequency,
            RiskFactor::ProtocolExperience => self.protocol_experience,
            RiskFactor::BalanceStability => self.balance_stability,
            RiskFactor::FailureRate => self.failure_rate,
            RiskFactor::CounterpartyDiversity => self.counterparty_diversity,
            RiskFactor::RecentActivity => self.recent_activity,
        }
    }

    pub fn set(&mut self, factor: RiskFactor, score: f64) {
        match factor {
            RiskFactor::TransactionVolume => self.transaction_volume = score,
            RiskFactor::TransactionFrequency => self.transaction_frequency = score,
            RiskFactor::ProtocolExperience => self.protocol_experience = score,
            RiskFactor::BalanceStability => self.balance_stability = score,
            RiskFactor::FailureRate => self.failure_rate = score,
            RiskFactor::CounterpartyDiversity => self.counterparty_diversity = score,
            RiskFactor::RecentActivity => self.recent_activity = score,
        }
    }

    /// Factor/score pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (RiskFactor, f64)> + '_ {
        RiskFactor::ALL.iter().map(move |f| (*f, self.get(*f)))
    }
}

/// Ordered risk labels derived from the numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskCategory {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
    /// Placeholder for wallets that could not be assessed.
    Unassessable,
}

impl RiskCategory {
    /// Boundaries are inclusive on the upper side: 200 is still Very Low.
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=200 => RiskCategory::VeryLow,
            201..=400 => RiskCategory::Low,
            401..=600 => RiskCategory::Medium,
            601..=800 => RiskCategory::High,
            _ => RiskCategory::VeryHigh,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::VeryLow => "Very Low Risk",
            RiskCategory::Low => "Low Risk",
            RiskCategory::Medium => "Medium Risk",
            RiskCategory::High => "High Risk",
            RiskCategory::VeryHigh => "Very High Risk",
            RiskCategory::Unassessable => "Error - Unable to Assess",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The engine's output for one wallet. Created once per pipeline pass and
/// never mutated afterward; either a scored result or an error placeholder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub wallet_address: String,
    pub risk_score: u32,
    pub risk_category: RiskCategory,
    /// Pre-scaling weighted sum in [0, 1].
    pub weighted_score: f64,
    pub component_scores: ComponentScores,
    pub transaction_metrics: TransactionMetrics,
    pub protocol_usage: ProtocolUsage,
    pub balance: BalanceSnapshot,
    pub error: Option<String>,
}

impl RiskAssessment {
    /// Placeholder for a wallet that could not be processed.
    pub fn failed(wallet_address: &str, message: impl Into<String>) -> Self {
        Self {
            wallet_address: wallet_address.to_string(),
            risk_score: ERROR_RISK_SCORE,
            risk_category: RiskCategory::Unassessable,
            weighted_score: 0.0,
            component_scores: ComponentScores::default(),
            transaction_metrics: TransactionMetrics::default(),
            protocol_usage: ProtocolUsage::default(),
            balance: BalanceSnapshot::default(),
            error: Some(message.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_boundaries_are_inclusive() {
        assert_eq!(RiskCategory::from_score(0), RiskCategory::VeryLow);
        assert_eq!(RiskCategory::from_score(200), RiskCategory::VeryLow);
        assert_eq!(RiskCategory::from_score(201), RiskCategory::Low);
        assert_eq!(RiskCategory::from_score(400), RiskCategory::Low);
        assert_eq!(RiskCategory::from_score(401), RiskCategory::Medium);
        assert_eq!(RiskCategory::from_score(600), RiskCategory::Medium);
        assert_eq!(RiskCategory::from_score(601), RiskCategory::High);
        assert_eq!(RiskCategory::from_score(800), RiskCategory::High);
        assert_eq!(RiskCategory::from_score(801), RiskCategory::VeryHigh);
        assert_eq!(RiskCategory::from_score(1000), RiskCategory::VeryHigh);
    }

    #[test]
    fn failed_assessment_is_a_fixed_placeholder() {
        let assessment = RiskAssessment::failed("0xabc", "Transaction fetch error: timeout");

        assert!(assessment.is_failed());
        assert_eq!(assessment.risk_score, ERROR_RISK_SCORE);
        assert_eq!(assessment.risk_category, RiskCategory::Unassessable);
        assert_eq!(assessment.risk_category.as_str(), "Error - Unable to Assess");
        assert_eq!(assessment.component_scores, ComponentScores::default());
        assert_eq!(assessment.transaction_metrics, TransactionMetrics::default());
    }

    #[test]
    fn component_scores_iterate_in_canonical_order() {
        let mut scores = ComponentScores::default();
        scores.set(RiskFactor::FailureRate, 0.3);

        let collected: Vec<_> = scores.iter().collect();
        assert_eq!(collected.len(), 7);
        assert_eq!(collected[0].0, RiskFactor::TransactionVolume);
        assert_eq!(collected[4], (RiskFactor::FailureRate, 0.3));
    }
}
