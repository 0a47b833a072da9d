use serde::Serialize;
use std::fmt;

use crate::models::RiskAssessment;

#[derive(Debug, Clone, Serialize)]
pub struct ScoreStats {
    pub mean: f64,
    pub median: f64,
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityStats {
    pub avg_transactions: f64,
    pub avg_protocol_interactions: f64,
    pub avg_balance_eth: f64,
}

/// Summary statistics over a finished batch. Score, category, and activity
/// figures cover successful rows only.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub scores: Option<ScoreStats>,
    pub categories: Vec<CategoryShare>,
    pub activity: Option<ActivityStats>,
}

impl RunSummary {
    pub fn from_results(results: &[RiskAssessment]) -> Self {
        let succeeded: Vec<&RiskAssessment> =
            results.iter().filter(|r| !r.is_failed()).collect();
        let failed = results.len() - succeeded.len();

        let scores = if succeeded.is_empty() {
            None
        } else {
            let mut sorted: Vec<u32> = succeeded.iter().map(|r| r.risk_score).collect();
            sorted.sort_unstable();
            let mean =
                sorted.iter().map(|&s| s as f64).sum::<f64>() / sorted.len() as f64;
            let median = if sorted.len() % 2 == 1 {
                sorted[sorted.len() / 2] as f64
            } else {
                let upper = sorted.len() / 2;
                (sorted[upper - 1] as f64 + sorted[upper] as f64) / 2.0
            };
            Some(ScoreStats {
                mean,
                median,
                min: sorted[0],
                max: sorted[sorted.len() - 1],
            })
        };

        // Distribution ordered by count, descending; absent categories are
        // omitted.
        let mut categories: Vec<CategoryShare> = Vec::new();
        for result in &succeeded {
            let label = result.risk_category.as_str();
            match categories.iter_mut().find(|c| c.category == label) {
                Some(share) => share.count += 1,
                None => categories.push(CategoryShare {
                    category: label.to_string(),
                    count: 1,
                    percentage: 0.0,
                }),
            }
        }
        for share in &mut categories {
            share.percentage = share.count as f64 / succeeded.len().max(1) as f64 * 100.0;
        }
        categories.sort_by(|a, b| b.count.cmp(&a.count));

        let activity = if succeeded.is_empty() {
            None
        } else {
            let n = succeeded.len() as f64;
            Some(ActivityStats {
                avg_transactions: succeeded
                    .iter()
                    .map(|r| r.transaction_metrics.total_transactions as f64)
                    .sum::<f64>()
                    / n,
                avg_protocol_interactions: succeeded
                    .iter()
                    .map(|r| r.protocol_usage.compound_count as f64)
                    .sum::<f64>()
                    / n,
                avg_balance_eth: succeeded
                    .iter()
                    .map(|r| r.balance.current_balance_eth)
                    .sum::<f64>()
                    / n,
            })
        };

        Self {
            total: results.len(),
            succeeded: succeeded.len(),
            failed,
            scores,
            categories,
            activity,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "=".repeat(60))?;
        writeln!(f, "WALLET RISK ANALYSIS SUMMARY")?;
        writeln!(f, "{}", "=".repeat(60))?;
        writeln!(f, "Total wallets processed: {}", self.total)?;
        writeln!(f, "Successful analyses: {}", self.succeeded)?;
        writeln!(f, "Failed analyses: {}", self.failed)?;

        if let Some(scores) = &self.scores {
            writeln!(f)?;
            writeln!(f, "Risk Score Statistics:")?;
            writeln!(f, "  Average risk score: {:.1}", scores.mean)?;
            writeln!(f, "  Median risk score: {:.1}", scores.median)?;
            writeln!(f, "  Minimum risk score: {}", scores.min)?;
            writeln!(f, "  Maximum risk score: {}", scores.max)?;
        }

        if !self.categories.is_empty() {
            writeln!(f)?;
            writeln!(f, "Risk Category Distribution:")?;
            for share in &self.categories {
                writeln!(
                    f,
                    "  {}: {} ({:.1}%)",
                    share.category, share.count, share.percentage
                )?;
            }
        }

        if let Some(activity) = &self.activity {
            writeln!(f)?;
            writeln!(f, "Transaction Statistics:")?;
            writeln!(
                f,
                "  Average transactions per wallet: {:.1}",
                activity.avg_transactions
            )?;
            writeln!(
                f,
                "  Average Compound interactions: {:.1}",
                activity.avg_protocol_interactions
            )?;
            writeln!(f, "  Average balance (ETH): {:.4}", activity.avg_balance_eth)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RiskCategory, RiskAssessment};

    fn scored(address: &str, score: u32, transactions: u64, balance: f64) -> RiskAssessment {
        let mut assessment = RiskAssessment::failed(address, "");
        assessment.error = None;
        assessment.risk_score = score;
        assessment.risk_category = RiskCategory::from_score(score);
        assessment.transaction_metrics.total_transactions = transactions;
        assessment.balance.current_balance_eth = balance;
        assessment
    }

    #[test]
    fn empty_batch_has_no_score_stats() {
        let summary = RunSummary::from_results(&[]);
        assert_eq!(summary.total, 0);
        assert!(summary.scores.is_none());
        assert!(summary.activity.is_none());
        assert!(summary.categories.is_empty());
    }

    #[test]
    fn failures_are_excluded_from_statistics() {
        let results = vec![
            scored("0xa", 100, 10, 1.0),
            scored("0xb", 300, 30, 3.0),
            RiskAssessment::failed("0xc", "Transaction fetch error: down"),
        ];

        let summary = RunSummary::from_results(&results);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);

        let scores = summary.scores.unwrap();
        assert_eq!(scores.mean, 200.0);
        assert_eq!(scores.median, 200.0);
        assert_eq!(scores.min, 100);
        assert_eq!(scores.max, 300);

        let activity = summary.activity.unwrap();
        assert_eq!(activity.avg_transactions, 20.0);
        assert_eq!(activity.avg_balance_eth, 2.0);
    }

    #[test]
    fn odd_count_median_is_the_middle_score() {
        let results = vec![
            scored("0xa", 100, 0, 0.0),
            scored("0xb", 250, 0, 0.0),
            scored("0xc", 900, 0, 0.0),
        ];

        let summary = RunSummary::from_results(&results);
        assert_eq!(summary.scores.unwrap().median, 250.0);
    }

    #[test]
    fn category_distribution_is_sorted_by_count() {
        let results = vec![
            scored("0xa", 100, 0, 0.0),
            scored("0xb", 150, 0, 0.0),
            scored("0xc", 700, 0, 0.0),
        ];

        let summary = RunSummary::from_results(&results);
        assert_eq!(summary.categories.len(), 2);
        assert_eq!(summary.categories[0].category, "Very Low Risk");
        assert_eq!(summary.categories[0].count, 2);
        assert!((summary.categories[0].percentage - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.categories[1].category, "High Risk");
    }

    #[test]
    fn display_includes_the_headline_counts() {
        let summary = RunSummary::from_results(&[scored("0xa", 500, 5, 0.5)]);
        let text = summary.to_string();

        assert!(text.contains("WALLET RISK ANALYSIS SUMMARY"));
        assert!(text.contains("Total wallets processed: 1"));
        assert!(text.contains("Average risk score: 500.0"));
        assert!(text.contains("Medium Risk: 1 (100.0%)"));
    }
}
