//! Daily spend anomaly detection.
//!
//! Groups records by UTC calendar day, computes the mean and population
//! standard deviation of the daily totals, and flags every day whose z-score
//! exceeds the configured threshold. The detector is a statistical heuristic,
//! not a guarantee: the contract is determinism (same input, same flags), not
//! ground truth, and small samples are expected to under-report.

use crate::aggregation::daily_totals;
use crate::types::{AnomalyResult, Transaction};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Detector tuning. The default threshold flags days more than two standard
/// deviations away from the mean daily total.
#[derive(Debug, Clone)]
pub struct AnomalyConfig {
    pub z_threshold: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self { z_threshold: 2.0 }
    }
}

/// Deterministic z-score detector over daily spend totals.
#[derive(Debug, Clone, Default)]
pub struct AnomalyDetector {
    config: AnomalyConfig,
}

impl AnomalyDetector {
    pub fn new(config: AnomalyConfig) -> Self {
        Self { config }
    }

    /// Flag every record whose UTC day deviates from the dataset mean by
    /// more than the threshold. Empty input yields an empty result with a
    /// "no data" message, never an error.
    pub fn detect(&self, records: &[Transaction]) -> AnomalyResult {
        if records.is_empty() {
            return AnomalyResult::empty("No transaction data available for anomaly detection.");
        }

        let totals = daily_totals(records);
        let count = totals.len() as f64;
        let mean = totals.values().sum::<f64>() / count;
        let variance = totals
            .values()
            .map(|total| (total - mean).powi(2))
            .sum::<f64>()
            / count;
        let std_dev = variance.sqrt();
        // A flat ledger has zero deviation; substitute 1.0 so z-scores stay
        // defined instead of dividing by zero.
        let scale = if std_dev == 0.0 { 1.0 } else { std_dev };

        let anomalous_days: BTreeSet<NaiveDate> = totals
            .iter()
            .filter(|(_, total)| ((**total - mean) / scale).abs() > self.config.z_threshold)
            .map(|(day, _)| *day)
            .collect();

        let anomalies: Vec<Transaction> = records
            .iter()
            .filter(|record| anomalous_days.contains(&record.day()))
            .cloned()
            .collect();

        let details = format!(
            "Flagged {} anomalous day(s) across {} day(s) of spend; daily mean {:.2}, standard deviation {:.2}.",
            anomalous_days.len(),
            totals.len(),
            mean,
            std_dev,
        );

        AnomalyResult { anomalies, details }
    }
}
