use crate::error::RecordError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Currency applied when a record or summary carries no explicit one.
///
/// Multi-currency arithmetic is unsupported: callers must not mix currencies
/// within one aggregation.
pub const DEFAULT_CURRENCY: &str = "USD";

/// A single spend record against a named service.
///
/// Records are immutable once stored. The store assigns `id`; a value of 0
/// marks an unsaved draft that has not passed through the store yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Unique, monotonically assigned by the store, never reused.
    pub id: u64,
    pub service: String,
    pub amount: f64,
    pub currency: String,
    pub timestamp: DateTime<Utc>,
    pub category: Option<String>,
}

impl Transaction {
    /// Create an unsaved draft with the default currency and the current time.
    pub fn draft(service: impl Into<String>, amount: f64) -> Self {
        Self {
            id: 0,
            service: service.into(),
            amount,
            currency: DEFAULT_CURRENCY.to_string(),
            timestamp: Utc::now(),
            category: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// UTC calendar day of the transaction. All daily grouping uses this.
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Creation-time validation. A negative amount is an error, not a refund
    /// convention.
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.service.trim().is_empty() {
            return Err(RecordError::EmptyService);
        }
        if !self.amount.is_finite() {
            return Err(RecordError::NonFiniteAmount);
        }
        if self.amount < 0.0 {
            return Err(RecordError::NegativeAmount(self.amount));
        }
        Ok(())
    }
}

/// Derived spend summary, recomputed on each query and never persisted.
///
/// `currency` is taken from the first record; for mixed-currency input it is
/// undefined by contract and left as that first currency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialSummary {
    pub total_spend: f64,
    pub per_service: BTreeMap<String, f64>,
    pub currency: String,
}

/// Output of the daily anomaly detector.
///
/// `anomalies` holds the records of every flagged day in input order;
/// `details` records the statistical basis (flagged-day count, mean,
/// standard deviation) in operator-readable form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnomalyResult {
    pub anomalies: Vec<Transaction>,
    pub details: String,
}

impl AnomalyResult {
    pub fn empty(details: impl Into<String>) -> Self {
        Self {
            anomalies: Vec::new(),
            details: details.into(),
        }
    }
}
