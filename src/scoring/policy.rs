use serde::{Deserialize, Serialize};

use crate::models::RiskFactor;

/// One threshold/score pair of a bucketed step function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub threshold: f64,
    pub score: f64,
}

impl Step {
    const fn new(threshold: f64, score: f64) -> Self {
        Self { threshold, score }
    }
}

/// How a factor's buckets compare the observed value against thresholds.
/// Boundaries are inclusive on the stricter side, so a value exactly at a
/// threshold lands in the better bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketRule {
    /// Thresholds listed high to low; the first `value >= threshold` wins.
    /// `positive` claims values in (0, lowest threshold) when present;
    /// `fallback` covers everything left over.
    Floor {
        steps: Vec<Step>,
        positive: Option<f64>,
        fallback: f64,
    },
    /// Thresholds listed low to high; the first `value <= threshold` wins.
    /// `zero` short-circuits an exact zero before the steps are consulted.
    Ceiling {
        steps: Vec<Step>,
        zero: Option<f64>,
        fallback: f64,
    },
}

impl BucketRule {
    pub fn score(&self, value: f64) -> f64 {
        match self {
            BucketRule::Floor { steps, positive, fallback } => {
                for step in steps {
                    if value >= step.threshold {
                        return step.score;
                    }
                }
                if value > 0.0 {
                    if let Some(score) = positive {
                        return *score;
                    }
                }
                *fallback
            }
            BucketRule::Ceiling { steps, zero, fallback } => {
                if value == 0.0 {
                    if let Some(score) = zero {
                        return *score;
                    }
                }
                for step in steps {
                    if value <= step.threshold {
                        return step.score;
                    }
                }
                *fallback
            }
        }
    }

    fn scores(&self) -> Vec<f64> {
        match self {
            BucketRule::Floor { steps, positive, fallback } => steps
                .iter()
                .map(|s| s.score)
                .chain(positive.iter().copied())
                .chain(std::iter::once(*fallback))
                .collect(),
            BucketRule::Ceiling { steps, zero, fallback } => steps
                .iter()
                .map(|s| s.score)
                .chain(zero.iter().copied())
                .chain(std::iter::once(*fallback))
                .collect(),
        }
    }
}

/// Weight and bucket table for one factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorPolicy {
    pub factor: RiskFactor,
    pub weight: f64,
    pub rule: BucketRule,
}

/// Balance-to-volume ratio adjustment layered on the balance bucket.
/// Both comparisons are strict: a ratio exactly at a boundary gets no
/// adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioAdjustment {
    /// Lower bound on the volume divisor, so empty wallets do not divide
    /// by zero.
    pub volume_floor: f64,
    /// Ratio strictly above this earns the bonus.
    pub healthy_ratio: f64,
    /// Ratio strictly below this earns the penalty.
    pub depleted_ratio: f64,
    pub bonus: f64,
    pub penalty: f64,
}

/// The complete scoring policy: weights, bucket tables, and the balance
/// adjustment. A tunable table rather than hard-coded branches, so
/// thresholds and weights can be swapped through configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub factors: Vec<FactorPolicy>,
    pub balance_adjustment: RatioAdjustment,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            factors: vec![
                FactorPolicy {
                    factor: RiskFactor::TransactionVolume,
                    weight: 0.20,
                    rule: BucketRule::Floor {
                        steps: vec![
                            Step::new(1000.0, 0.1),
                            Step::new(100.0, 0.2),
                            Step::new(10.0, 0.4),
                            Step::new(1.0, 0.6),
                        ],
                        positive: None,
                        fallback: 0.9,
                    },
                },
                FactorPolicy {
                    factor: RiskFactor::TransactionFrequency,
                    weight: 0.15,
                    rule: BucketRule::Floor {
                        steps: vec![
                            Step::new(1.0, 0.1),
                            Step::new(0.5, 0.2),
                            Step::new(0.1, 0.4),
                        ],
                        positive: Some(0.7),
                        fallback: 1.0,
                    },
                },
                FactorPolicy {
                    factor: RiskFactor::ProtocolExperience,
                    weight: 0.25,
                    rule: BucketRule::Floor {
                        steps: vec![
                            Step::new(50.0, 0.05),
                            Step::new(20.0, 0.15),
                            Step::new(10.0, 0.3),
                            Step::new(5.0, 0.5),
                        ],
                        positive: Some(0.7),
                        fallback: 0.95,
                    },
                },
                FactorPolicy {
                    factor: RiskFactor::BalanceStability,
                    weight: 0.15,
                    rule: BucketRule::Floor {
                        steps: vec![
                            Step::new(100.0, 0.05),
                            Step::new(10.0, 0.15),
                            Step::new(1.0, 0.3),
                            Step::new(0.1, 0.6),
                        ],
                        positive: None,
                        fallback: 0.9,
                    },
                },
                FactorPolicy {
                    factor: RiskFactor::FailureRate,
                    weight: 0.10,
                    rule: BucketRule::Ceiling {
                        steps: vec![
                            Step::new(0.02, 0.1),
                            Step::new(0.05, 0.3),
                            Step::new(0.1, 0.6),
                        ],
                        zero: Some(0.0),
                        fallback: 1.0,
                    },
                },
                FactorPolicy {
                    factor: RiskFactor::CounterpartyDiversity,
                    weight: 0.10,
                    rule: BucketRule::Floor {
                        steps: vec![
                            Step::new(100.0, 0.05),
                            Step::new(50.0, 0.15),
                            Step::new(20.0, 0.3),
                            Step::new(10.0, 0.5),
                        ],
                        positive: Some(0.8),
                        fallback: 1.0,
                    },
                },
                FactorPolicy {
                    factor: RiskFactor::RecentActivity,
                    weight: 0.05,
                    rule: BucketRule::Ceiling {
                        steps: vec![
                            Step::new(30.0, 0.1),
                            Step::new(90.0, 0.3),
                            Step::new(180.0, 0.5),
                            Step::new(365.0, 0.7),
                        ],
                        zero: None,
                        fallback: 1.0,
                    },
                },
            ],
            balance_adjustment: RatioAdjustment {
                volume_floor: 0.001,
                healthy_ratio: 0.1,
                depleted_ratio: 0.01,
                bonus: -0.1,
                penalty: 0.2,
            },
        }
    }
}

impl ScoringPolicy {
    pub fn factor(&self, factor: RiskFactor) -> Option<&FactorPolicy> {
        self.factors.iter().find(|p| p.factor == factor)
    }

    pub fn weight(&self, factor: RiskFactor) -> f64 {
        self.factor(factor).map(|p| p.weight).unwrap_or(0.0)
    }

    pub fn total_weight(&self) -> f64 {
        self.factors.iter().map(|p| p.weight).sum()
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        let total = self.total_weight();
        if (total - 1.0).abs() > 1e-9 {
            return Err(format!("Factor weights must sum to 1.0, got {}", total));
        }

        for factor in RiskFactor::ALL {
            let count = self.factors.iter().filter(|p| p.factor == factor).count();
            if count != 1 {
                return Err(format!(
                    "Factor {} must appear exactly once, found {}",
                    factor.as_str(),
                    count
                ));
            }
        }

        for policy in &self.factors {
            if policy.weight < 0.0 {
                return Err(format!("Weight for {} is negative", policy.factor.as_str()));
            }
            for score in policy.rule.scores() {
                if !(0.0..=1.0).contains(&score) {
                    return Err(format!(
                        "Bucket score {} for {} is outside [0, 1]",
                        score,
                        policy.factor.as_str()
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_valid() {
        let policy = ScoringPolicy::default();
        assert!(policy.validate().is_ok());
        assert!((policy.total_weight() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn floor_rule_gives_exact_thresholds_the_better_bucket() {
        let policy = ScoringPolicy::default();
        let volume = &policy.factor(RiskFactor::TransactionVolume).unwrap().rule;

        assert_eq!(volume.score(1000.0), 0.1);
        assert_eq!(volume.score(999.9), 0.2);
        assert_eq!(volume.score(100.0), 0.2);
        assert_eq!(volume.score(10.0), 0.4);
        assert_eq!(volume.score(1.0), 0.6);
        assert_eq!(volume.score(0.5), 0.9);
        assert_eq!(volume.score(0.0), 0.9);
    }

    #[test]
    fn floor_rule_positive_bucket_excludes_zero() {
        let policy = ScoringPolicy::default();
        let frequency = &policy.factor(RiskFactor::TransactionFrequency).unwrap().rule;

        assert_eq!(frequency.score(0.05), 0.7);
        assert_eq!(frequency.score(0.0), 1.0);
    }

    #[test]
    fn ceiling_rule_zero_short_circuits() {
        let policy = ScoringPolicy::default();
        let failure = &policy.factor(RiskFactor::FailureRate).unwrap().rule;

        assert_eq!(failure.score(0.0), 0.0);
        assert_eq!(failure.score(0.02), 0.1);
        assert_eq!(failure.score(0.05), 0.3);
        assert_eq!(failure.score(0.1), 0.6);
        assert_eq!(failure.score(0.11), 1.0);
    }

    #[test]
    fn recency_buckets_follow_time_span() {
        let policy = ScoringPolicy::default();
        let recency = &policy.factor(RiskFactor::RecentActivity).unwrap().rule;

        assert_eq!(recency.score(0.0), 0.1);
        assert_eq!(recency.score(30.0), 0.1);
        assert_eq!(recency.score(90.0), 0.3);
        assert_eq!(recency.score(180.0), 0.5);
        assert_eq!(recency.score(365.0), 0.7);
        assert_eq!(recency.score(366.0), 1.0);
    }

    #[test]
    fn bucket_scores_are_monotone_in_risk() {
        let policy = ScoringPolicy::default();
        let samples = [0.0, 0.5, 1.0, 3.0, 5.0, 10.0, 20.0, 50.0, 100.0, 500.0, 1000.0, 5000.0];

        for factor in [
            RiskFactor::TransactionVolume,
            RiskFactor::ProtocolExperience,
            RiskFactor::CounterpartyDiversity,
        ] {
            let rule = &policy.factor(factor).unwrap().rule;
            let mut previous = f64::INFINITY;
            for value in samples {
                let score = rule.score(value);
                assert!(
                    score <= previous,
                    "{} score rose from {} to {} at value {}",
                    factor.as_str(),
                    previous,
                    score,
                    value
                );
                previous = score;
            }
        }
    }

    #[test]
    fn validate_rejects_bad_tables() {
        let mut policy = ScoringPolicy::default();
        policy.factors[0].weight += 0.1;
        assert!(policy.validate().is_err());

        let mut policy = ScoringPolicy::default();
        policy.factors.remove(0);
        assert!(policy.validate().is_err());

        let mut policy = ScoringPolicy::default();
        if let BucketRule::Floor { steps, .. } = &mut policy.factors[0].rule {
            steps[0].score = 1.5;
        }
        assert!(policy.validate().is_err());
    }
}
