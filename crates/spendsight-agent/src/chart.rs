//! Plain-text daily spend chart for the chat surface.

use spendsight_core::{daily_totals, Transaction};

const MAX_BAR_WIDTH: usize = 40;

/// Render one bar per UTC day, scaled so the busiest day fills the full
/// width. Returns `None` when there is nothing to chart.
pub fn render_daily_chart(records: &[Transaction]) -> Option<String> {
    let totals = daily_totals(records);
    if totals.is_empty() {
        return None;
    }

    let max = totals.values().fold(0.0f64, |acc, total| acc.max(*total));
    let mut lines = vec!["Daily spend:".to_string()];
    for (day, total) in &totals {
        let width = if *total <= 0.0 || max <= 0.0 {
            0
        } else {
            // Nonzero days always get at least one mark.
            (((total / max) * MAX_BAR_WIDTH as f64).round() as usize).max(1)
        };
        let bar = "#".repeat(width);
        lines.push(format!("{day} | {bar} {total:.2}"));
    }

    Some(lines.join("\n"))
}
