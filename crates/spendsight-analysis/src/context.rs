//! Least-privilege script context construction
//!
//! Scripts see a projection of the ledger, never the ledger itself. This
//! module is the only place where domain records become script values, so
//! the full set of fields any script can ever observe is the union of the
//! match arms below. Adding a purpose means adding an arm, not widening
//! what existing purposes receive.

use spendsight_core::Transaction;
use spendsight_script::{ScriptContext, Value};
use std::collections::BTreeMap;

/// What a script execution is for. Decides which record fields the context
/// exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptPurpose {
    /// Re-scoring detector-flagged transactions
    RefineAnomalies,
    /// Aggregating the full ledger into a per-service report
    PortfolioReport,
}

impl ScriptPurpose {
    /// Stable tag used in logs
    pub fn tag(&self) -> &'static str {
        match self {
            Self::RefineAnomalies => "refine-anomalies",
            Self::PortfolioReport => "portfolio-report",
        }
    }
}

/// Project `records` into a context holding a single `transactions` list.
///
/// Refinement sees `{id, amount}`; portfolio reporting sees
/// `{service, amount}`. Timestamps, currencies, and categories are withheld
/// from both. Every value is built fresh, so the script's copy shares
/// nothing with the caller's records.
pub fn build_context(records: &[Transaction], purpose: ScriptPurpose) -> ScriptContext {
    let rows: Vec<Value> = records
        .iter()
        .map(|record| {
            let mut row = BTreeMap::new();
            match purpose {
                ScriptPurpose::RefineAnomalies => {
                    // Ids are small sequence numbers; exact in an f64.
                    row.insert("id".to_string(), Value::Number(record.id as f64));
                    row.insert("amount".to_string(), Value::Number(record.amount));
                }
                ScriptPurpose::PortfolioReport => {
                    row.insert("service".to_string(), Value::Str(record.service.clone()));
                    row.insert("amount".to_string(), Value::Number(record.amount));
                }
            }
            Value::Map(row)
        })
        .collect();

    ScriptContext::new().with("transactions", Value::List(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Transaction> {
        let mut txn = Transaction::draft("Slack", 42.0).with_category("chat");
        txn.id = 7;
        vec![txn]
    }

    #[test]
    fn refinement_context_exposes_id_and_amount_only() {
        let context = build_context(&sample(), ScriptPurpose::RefineAnomalies);
        let rows = context.get("transactions").and_then(|v| v.as_list()).unwrap();
        let row = rows[0].as_map().unwrap();

        let fields: Vec<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(fields, vec!["amount", "id"]);
        assert_eq!(row.get("id"), Some(&Value::Number(7.0)));
        assert_eq!(row.get("amount"), Some(&Value::Number(42.0)));
    }

    #[test]
    fn portfolio_context_exposes_service_and_amount_only() {
        let context = build_context(&sample(), ScriptPurpose::PortfolioReport);
        let rows = context.get("transactions").and_then(|v| v.as_list()).unwrap();
        let row = rows[0].as_map().unwrap();

        let fields: Vec<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(fields, vec!["amount", "service"]);
        assert_eq!(row.get("service"), Some(&Value::Str("Slack".into())));
    }

    #[test]
    fn context_holds_exactly_one_name() {
        let context = build_context(&sample(), ScriptPurpose::RefineAnomalies);
        let names: Vec<&str> = context.names().collect();
        assert_eq!(names, vec!["transactions"]);
    }

    #[test]
    fn empty_records_give_an_empty_transaction_list() {
        let context = build_context(&[], ScriptPurpose::PortfolioReport);
        let rows = context.get("transactions").and_then(|v| v.as_list()).unwrap();
        assert!(rows.is_empty());
    }
}
