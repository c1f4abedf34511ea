//! Scripted portfolio reporting
//!
//! The script aggregates the full ledger into per-service totals; the host
//! derives the headline (top service) from the validated output rather than
//! trusting the script to name it.

use crate::context::{build_context, ScriptPurpose};
use crate::error::AnalysisResult;
use crate::validate::{extract_number, extract_number_map};
use spendsight_core::Transaction;
use spendsight_script::ScriptEngine;
use std::collections::BTreeMap;

/// A completed portfolio breakdown
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioReport {
    pub total: f64,
    pub per_service: BTreeMap<String, f64>,
    pub top_service: String,
    pub top_amount: f64,
}

/// Portfolio analysis either produces a report or states that the ledger
/// gave the script nothing to aggregate. The latter is an expected outcome,
/// not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum PortfolioOutcome {
    Report(PortfolioReport),
    InsufficientData,
}

/// Run `script` over `{service, amount}` projections of the whole ledger.
///
/// The script must bind `per_service` (map of service name to spend) and
/// `total` (number). An absent or empty `per_service` becomes
/// [`PortfolioOutcome::InsufficientData`]. The top service is the largest
/// aggregate, ties resolved by service name order.
pub fn portfolio_report(
    records: &[Transaction],
    script: &str,
    engine: &ScriptEngine,
) -> AnalysisResult<PortfolioOutcome> {
    tracing::debug!(
        purpose = ScriptPurpose::PortfolioReport.tag(),
        records = records.len(),
        "running portfolio script"
    );

    let context = build_context(records, ScriptPurpose::PortfolioReport);
    let bindings = engine.run(script, &context)?;

    let per_service = extract_number_map(&bindings, "per_service")?;
    let total = extract_number(&bindings, "total")?;

    let mut top: Option<(&str, f64)> = None;
    for (service, amount) in &per_service {
        let replace = match top {
            None => true,
            // Strict comparison over name-ordered entries keeps the
            // alphabetically first service on ties.
            Some((_, best)) => *amount > best,
        };
        if replace {
            top = Some((service, *amount));
        }
    }

    let Some((top_service, top_amount)) = top else {
        return Ok(PortfolioOutcome::InsufficientData);
    };

    Ok(PortfolioOutcome::Report(PortfolioReport {
        total,
        top_service: top_service.to_string(),
        top_amount,
        per_service,
    }))
}
