//! Built-in analysis scriptlets
//!
//! Used whenever the caller does not supply a script of its own. These are
//! ordinary untrusted scripts: they run through the same engine, limits, and
//! output validation as anything supplied from outside.

/// Scores each candidate transaction by absolute amount and flags the ones
/// at or above 80% of the maximum score. Binds `scores` and `flags`.
pub const DEFAULT_REFINEMENT_SCRIPT: &str = "\
scores = [abs(t.amount) for t in transactions]
threshold = max(scores) * 0.8 if scores else 0
flags = [s >= threshold for s in scores]
";

/// Aggregates spend per service and in total. Binds `per_service` and
/// `total`.
pub const DEFAULT_PORTFOLIO_SCRIPT: &str = "\
services = unique([t.service for t in transactions])
per_service = {s: sum([t.amount for t in transactions if t.service == s]) for s in services}
total = sum([t.amount for t in transactions])
";
