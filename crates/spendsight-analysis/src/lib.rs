//! Spendsight analysis: the bridge between the ledger and untrusted
//! analysis scriptlets.
//!
//! Data flows one way: domain records are projected into least-privilege
//! script contexts ([`build_context`]), the script runs under the engine's
//! limits, and its output bindings come back through shape validation before
//! anything reaches a report. The two pipelines built on that path are
//! anomaly refinement ([`refine_anomalies`]) and portfolio reporting
//! ([`portfolio_report`]).

#![deny(unsafe_code)]

pub mod context;
pub mod error;
pub mod portfolio;
pub mod refine;
pub mod scripts;
pub mod validate;

pub use context::{build_context, ScriptPurpose};
pub use error::{AnalysisError, AnalysisResult};
pub use portfolio::{portfolio_report, PortfolioOutcome, PortfolioReport};
pub use refine::{refine_anomalies, RefinementReport, ScoredAnomaly};
pub use scripts::{DEFAULT_PORTFOLIO_SCRIPT, DEFAULT_REFINEMENT_SCRIPT};
pub use validate::{
    ensure_aligned, extract_bool_list, extract_number, extract_number_list, extract_number_map,
    ValidationError,
};
