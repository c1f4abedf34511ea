//! Spendsight core: transaction records, spend aggregation, and the
//! deterministic daily anomaly detector.
//!
//! Everything in this crate is pure computation over immutable records.
//! Persistence, command parsing, and script execution live in sibling crates
//! and consume the types exported here.

#![deny(unsafe_code)]

pub mod aggregation;
pub mod anomaly;
pub mod error;
pub mod types;

pub use aggregation::{daily_totals, sixty_forty_split, summarize};
pub use anomaly::{AnomalyConfig, AnomalyDetector};
pub use error::RecordError;
pub use types::{AnomalyResult, FinancialSummary, Transaction, DEFAULT_CURRENCY};
