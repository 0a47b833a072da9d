use std::cmp::Ordering;

use crate::{
    models::{
        BalanceSnapshot, ComponentScores, ProtocolUsage, Result, RiskAssessment, RiskCategory,
        RiskFactor, RiskScoreError, TransactionMetrics,
    },
    scoring::ScoringPolicy,
};

/// The risk scoring engine. Pure and deterministic: the same inputs always
/// produce the same assessment, and no well-formed input can make it fail.
pub struct RiskEngine {
    policy: ScoringPolicy,
}

impl RiskEngine {
    pub fn new(policy: ScoringPolicy) -> Result<Self> {
        policy.validate().map_err(RiskScoreError::Config)?;
        Ok(Self { policy })
    }

    pub fn with_default_policy() -> Self {
        Self {
            policy: ScoringPolicy::default(),
        }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Score one wallet from its normalized metrics, protocol usage, and
    /// balance snapshot.
    pub fn calculate_risk_score(
        &self,
        wallet_address: &str,
        metrics: &TransactionMetrics,
        usage: &ProtocolUsage,
        balance: &BalanceSnapshot,
    ) -> RiskAssessment {
        let mut scores = ComponentScores::default();

        for policy in &self.policy.factors {
            let value = factor_input(policy.factor, metrics, usage, balance);
            let mut score = policy.rule.score(value);
            if policy.factor == RiskFactor::BalanceStability {
                score = self.adjust_balance_score(
                    score,
                    balance.current_balance_eth,
                    metrics.total_value_eth,
                );
            }
            scores.set(policy.factor, score);
        }

        let weighted_score: f64 = scores
            .iter()
            .map(|(factor, score)| score * self.policy.weight(factor))
            .sum();
        // Truncates toward zero: 682.9 points stay a 682.
        let risk_score = (weighted_score * 1000.0) as u32;

        RiskAssessment {
            wallet_address: wallet_address.to_string(),
            risk_score,
            risk_category: RiskCategory::from_score(risk_score),
            weighted_score,
            component_scores: scores,
            transaction_metrics: metrics.clone(),
            protocol_usage: usage.clone(),
            balance: balance.clone(),
            error: None,
        }
    }

    /// Balance bucket adjusted by the balance-to-volume ratio. Strict
    /// comparators on both boundaries; result clamped to [0, 1].
    fn adjust_balance_score(&self, base: f64, balance_eth: f64, volume_eth: f64) -> f64 {
        let adj = &self.policy.balance_adjustment;
        let ratio = balance_eth / volume_eth.max(adj.volume_floor);

        let delta = if ratio > adj.healthy_ratio {
            adj.bonus
        } else if ratio < adj.depleted_ratio {
            adj.penalty
        } else {
            0.0
        };

        (base + delta).clamp(0.0, 1.0)
    }

    /// Human-readable justification: the three factors contributing the most
    /// weighted points, ranked descending. Stable sort over the canonical
    /// factor order breaks ties.
    pub fn explain(&self, assessment: &RiskAssessment) -> String {
        let mut out = format!(
            "Risk Score: {}/1000 ({})\n\nKey Risk Factors:\n",
            assessment.risk_score, assessment.risk_category
        );

        let mut ranked: Vec<(RiskFactor, f64)> = assessment
            .component_scores
            .iter()
            .map(|(factor, score)| (factor, score * self.policy.weight(factor) * 1000.0))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        for (factor, contribution) in ranked.into_iter().take(3) {
            let score = assessment.component_scores.get(factor);
            out.push_str(&format!(
                "- {}: {:.2} (contributes {:.0} points)\n",
                factor.label(),
                score,
                contribution
            ));
        }

        out
    }
}

fn factor_input(
    factor: RiskFactor,
    metrics: &TransactionMetrics,
    usage: &ProtocolUsage,
    balance: &BalanceSnapshot,
) -> f64 {
    match factor {
        RiskFactor::TransactionVolume => metrics.total_value_eth,
        RiskFactor::TransactionFrequency => metrics.transaction_frequency,
        RiskFactor::ProtocolExperience => usage.compound_count as f64,
        RiskFactor::BalanceStability => balance.current_balance_eth,
        RiskFactor::FailureRate => metrics.failed_transaction_rate,
        RiskFactor::CounterpartyDiversity => metrics.unique_counterparties as f64,
        RiskFactor::RecentActivity => metrics.time_span_days,
    }
}
