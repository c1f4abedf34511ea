//! Two-stage anomaly refinement
//!
//! Stage one is the deterministic daily detector. Stage two hands the
//! flagged transactions to a script that re-scores them; only the script's
//! own flags decide what lands in the final report. A failing script fails
//! the pipeline once: script failures are assumed deterministic, so there
//! is no retry.

use crate::context::{build_context, ScriptPurpose};
use crate::error::AnalysisResult;
use crate::validate::{ensure_aligned, extract_bool_list, extract_number_list};
use spendsight_core::{AnomalyDetector, Transaction};
use spendsight_script::ScriptEngine;

/// One detector-flagged transaction the script kept, with its score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredAnomaly {
    pub transaction: Transaction,
    pub score: f64,
}

/// Outcome of the full refinement pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct RefinementReport {
    /// Detector statistics, present whether or not anything was flagged
    pub details: String,
    /// Script-confirmed anomalies in candidate order
    pub scored: Vec<ScoredAnomaly>,
}

/// Detect daily anomalies, then let `script` re-score the flagged records.
///
/// The script sees `{id, amount}` projections of the candidates and must
/// bind `scores` and `flags`, aligned element-for-element. A candidate
/// appears in the report when its flag is set. No candidates means the
/// script never runs.
pub fn refine_anomalies(
    records: &[Transaction],
    script: &str,
    engine: &ScriptEngine,
    detector: &AnomalyDetector,
) -> AnalysisResult<RefinementReport> {
    let base = detector.detect(records);
    if base.anomalies.is_empty() {
        return Ok(RefinementReport {
            details: base.details,
            scored: Vec::new(),
        });
    }

    tracing::debug!(
        purpose = ScriptPurpose::RefineAnomalies.tag(),
        candidates = base.anomalies.len(),
        "running refinement script"
    );

    let context = build_context(&base.anomalies, ScriptPurpose::RefineAnomalies);
    let bindings = engine.run(script, &context)?;

    let scores = extract_number_list(&bindings, "scores")?;
    let flags = extract_bool_list(&bindings, "flags")?;
    ensure_aligned("scores", scores.len(), "flags", flags.len())?;

    let scored = base
        .anomalies
        .iter()
        .zip(scores.iter().zip(flags.iter()))
        .filter(|(_, (_, flag))| **flag)
        .map(|(transaction, (score, _))| ScoredAnomaly {
            transaction: transaction.clone(),
            score: *score,
        })
        .collect();

    Ok(RefinementReport {
        details: base.details,
        scored,
    })
}
