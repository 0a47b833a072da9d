use std::collections::HashSet;

use crate::models::{RawTransaction, TransactionMetrics, WEI_PER_ETH};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Collapse a raw transaction listing into the aggregate statistics the
/// scoring engine consumes. Pure function of its input: provider quirks
/// (string-encoded numbers, missing fields) degrade to zeros, never errors.
pub fn analyze_transactions(transactions: &[RawTransaction]) -> TransactionMetrics {
    if transactions.is_empty() {
        return TransactionMetrics::default();
    }

    let total = transactions.len() as u64;
    let total_value: f64 = transactions
        .iter()
        .map(|tx| tx.value.parse::<f64>().unwrap_or(0.0))
        .sum();
    let failed = transactions.iter().filter(|tx| tx.is_error == "1").count() as u64;

    // Counterparties are compared case-insensitively; both ends of every
    // transaction count, the wallet itself included.
    let mut counterparties = HashSet::new();
    for tx in transactions {
        counterparties.insert(tx.to.to_lowercase());
        counterparties.insert(tx.from.to_lowercase());
    }

    let timestamps: Vec<i64> = transactions
        .iter()
        .filter_map(|tx| tx.time_stamp.parse().ok())
        .collect();

    let (time_span_days, transaction_frequency) =
        match (timestamps.iter().min(), timestamps.iter().max()) {
            (Some(&first), Some(&last)) => {
                let span = (last - first) as f64 / SECONDS_PER_DAY;
                // Divisor floors at one day so single-burst wallets do not
                // report infinite frequency.
                (span, total as f64 / span.max(1.0))
            }
            _ => (0.0, 0.0),
        };

    TransactionMetrics {
        total_transactions: total,
        avg_transaction_value: total_value / total.max(1) as f64,
        transaction_frequency,
        failed_transactions: failed,
        failed_transaction_rate: failed as f64 / total as f64,
        unique_counterparties: counterparties.len() as u64,
        time_span_days,
        total_value_eth: total_value / WEI_PER_ETH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(from: &str, to: &str, value: &str, is_error: &str, time_stamp: &str) -> RawTransaction {
        RawTransaction {
            hash: String::new(),
            from: from.to_string(),
            to: to.to_string(),
            value: value.to_string(),
            is_error: is_error.to_string(),
            time_stamp: time_stamp.to_string(),
        }
    }

    #[test]
    fn empty_listing_yields_all_zeros() {
        let metrics = analyze_transactions(&[]);
        assert_eq!(metrics, TransactionMetrics::default());
        assert_eq!(metrics.total_transactions, 0);
        assert_eq!(metrics.transaction_frequency, 0.0);
    }

    #[test]
    fn aggregates_values_failures_and_counterparties() {
        let wallet = "0xAAAA";
        let listing = vec![
            tx(wallet, "0xbbbb", "2000000000000000000", "0", "1700000000"),
            tx(wallet, "0xBBBB", "1000000000000000000", "1", "1700086400"),
            tx("0xcccc", wallet, "500000000000000000", "0", "1700172800"),
        ];

        let metrics = analyze_transactions(&listing);
        assert_eq!(metrics.total_transactions, 3);
        assert_eq!(metrics.failed_transactions, 1);
        assert!((metrics.failed_transaction_rate - 1.0 / 3.0).abs() < 1e-12);
        assert!((metrics.total_value_eth - 3.5).abs() < 1e-9);
        // 0xaaaa, 0xbbbb, 0xcccc after case folding.
        assert_eq!(metrics.unique_counterparties, 3);
        assert!((metrics.time_span_days - 2.0).abs() < 1e-9);
        // Span of 2 days floors the divisor at 2.
        assert!((metrics.transaction_frequency - 1.5).abs() < 1e-9);
        assert!((metrics.avg_transaction_value - 3.5e18 / 3.0).abs() < 1e6);
    }

    #[test]
    fn sub_day_span_floors_the_frequency_divisor() {
        let listing = vec![
            tx("0xa", "0xb", "0", "0", "1700000000"),
            tx("0xa", "0xb", "0", "0", "1700000600"),
        ];

        let metrics = analyze_transactions(&listing);
        assert!(metrics.time_span_days < 1.0);
        assert!((metrics.transaction_frequency - 2.0).abs() < 1e-12);
    }

    #[test]
    fn unparseable_fields_degrade_to_zero() {
        let listing = vec![
            tx("0xa", "0xb", "not-a-number", "0", ""),
            tx("0xa", "0xc", "", "0", "garbage"),
        ];

        let metrics = analyze_transactions(&listing);
        assert_eq!(metrics.total_transactions, 2);
        assert_eq!(metrics.total_value_eth, 0.0);
        assert_eq!(metrics.time_span_days, 0.0);
        assert_eq!(metrics.transaction_frequency, 0.0);
    }
}
