//! The operator chat agent: parses one message, runs the matching ledger
//! operation, and renders a plain-text reply.
//!
//! Every path replies. Failures inside a command degrade to a sanitized
//! explanation; raw storage or script errors never reach the operator.

use crate::chart::render_daily_chart;
use crate::command::{parse_command, Command};
use crate::export::export_csv;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use spendsight_analysis::{portfolio_report, refine_anomalies, PortfolioOutcome};
use spendsight_analysis::{DEFAULT_PORTFOLIO_SCRIPT, DEFAULT_REFINEMENT_SCRIPT};
use spendsight_core::{
    sixty_forty_split, summarize, AnomalyDetector, Transaction, DEFAULT_CURRENCY,
};
use spendsight_script::ScriptEngine;
use spendsight_store::{StoreError, TransactionStore};
use std::path::PathBuf;

const USAGE_ADD: &str =
    "I could not read that transaction. Use: add transaction <amount> for <service> [on YYYY-MM-DD].";

/// Tunable agent behavior. Defaults match the interactive service.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Currency label used when the ledger is empty.
    pub currency: String,
    /// Directory CSV exports are written into.
    pub export_dir: PathBuf,
    /// Script run to refine detector candidates.
    pub refinement_script: String,
    /// Script run to build the portfolio report.
    pub portfolio_script: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_string(),
            export_dir: PathBuf::from("exports"),
            refinement_script: DEFAULT_REFINEMENT_SCRIPT.to_string(),
            portfolio_script: DEFAULT_PORTFOLIO_SCRIPT.to_string(),
        }
    }
}

/// Chat agent bound to one transaction store.
pub struct Agent {
    store: TransactionStore,
    engine: ScriptEngine,
    detector: AnomalyDetector,
    config: AgentConfig,
}

impl Agent {
    pub fn new(store: TransactionStore, engine: ScriptEngine, config: AgentConfig) -> Self {
        Self {
            store,
            engine,
            detector: AnomalyDetector::default(),
            config,
        }
    }

    pub fn with_detector(mut self, detector: AnomalyDetector) -> Self {
        self.detector = detector;
        self
    }

    pub fn store(&self) -> &TransactionStore {
        &self.store
    }

    /// Handle one chat message and produce the reply text.
    pub fn handle_message(&mut self, text: &str) -> String {
        let command = parse_command(text);
        tracing::debug!(?command, "dispatching chat command");

        match command {
            Command::AddTransaction {
                amount,
                service,
                date,
            } => self.handle_add(amount, service, date),
            Command::MalformedAdd => USAGE_ADD.to_string(),
            Command::TotalSpend => self.handle_total(),
            Command::SpendPerService => self.handle_per_service(),
            Command::SixtyFortySplit => self.handle_split(),
            Command::ExportCsv => self.handle_export(),
            Command::DetectAnomalies => self.handle_anomalies(),
            Command::SpendChart => self.handle_chart(),
            Command::AnalysisReport => self.handle_analysis(),
            Command::Help => help_text(),
        }
    }

    fn handle_add(&mut self, amount: f64, service: String, date: Option<NaiveDate>) -> String {
        let mut draft = Transaction::draft(service, amount);
        if let Some(day) = date {
            // Explicit dates land at UTC midnight of that day.
            draft = draft.with_timestamp(Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN)));
        }

        match self.store.add(draft) {
            Ok(saved) => format!(
                "Recorded transaction #{}: {:.2} {} for {} at {}.",
                saved.id,
                saved.amount,
                saved.currency,
                saved.service,
                saved.timestamp.format("%Y-%m-%d %H:%M UTC")
            ),
            Err(StoreError::InvalidRecord(err)) => {
                format!("That transaction was rejected: {err}.")
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to persist transaction");
                "The transaction could not be saved; the ledger file is unavailable.".to_string()
            }
        }
    }

    fn handle_total(&self) -> String {
        let summary = summarize(self.store.records(), &self.config.currency);
        format!(
            "Total spend: {:.2} {} across {} transaction(s).",
            summary.total_spend,
            summary.currency,
            self.store.len()
        )
    }

    fn handle_per_service(&self) -> String {
        let summary = summarize(self.store.records(), &self.config.currency);
        if summary.per_service.is_empty() {
            return "No transactions recorded yet.".to_string();
        }

        let mut entries: Vec<(&String, &f64)> = summary.per_service.iter().collect();
        entries.sort_by(|a, b| b.1.total_cmp(a.1).then_with(|| a.0.cmp(b.0)));

        let mut lines = vec!["Spend per service:".to_string()];
        for (service, amount) in entries {
            lines.push(format!("  {service}: {amount:.2} {}", summary.currency));
        }
        lines.join("\n")
    }

    fn handle_split(&self) -> String {
        let summary = summarize(self.store.records(), &self.config.currency);
        let (operational, savings) = sixty_forty_split(summary.total_spend);
        format!(
            "60/40 split of {:.2} {}: {:.2} operational / {:.2} savings target.",
            summary.total_spend, summary.currency, operational, savings
        )
    }

    fn handle_export(&self) -> String {
        if self.store.is_empty() {
            return "No transactions to export.".to_string();
        }
        match export_csv(self.store.records(), &self.config.export_dir) {
            Ok(path) => format!(
                "Exported {} transaction(s) to {}.",
                self.store.len(),
                path.display()
            ),
            Err(err) => {
                tracing::error!(error = %err, "csv export failed");
                "The CSV export failed; check that the export directory is writable.".to_string()
            }
        }
    }

    fn handle_anomalies(&self) -> String {
        match refine_anomalies(
            self.store.records(),
            &self.config.refinement_script,
            &self.engine,
            &self.detector,
        ) {
            Ok(report) => {
                if report.scored.is_empty() {
                    return format!("{} No script-confirmed anomalies.", report.details);
                }
                let mut lines = vec![report.details, "Script-confirmed anomalies:".to_string()];
                for item in &report.scored {
                    lines.push(format!(
                        "  #{} {} {:.2} {} (score {:.2})",
                        item.transaction.id,
                        item.transaction.service,
                        item.transaction.amount,
                        item.transaction.currency,
                        item.score
                    ));
                }
                lines.join("\n")
            }
            Err(err) => {
                tracing::warn!(error = %err, "anomaly refinement failed");
                // The detector is deterministic, so re-running it here gives
                // the same candidates the failed refinement started from.
                let base = self.detector.detect(self.store.records());
                let mut lines = vec![
                    base.details,
                    "Refined analysis is unavailable; raw detector candidates:".to_string(),
                ];
                for txn in &base.anomalies {
                    lines.push(format!(
                        "  #{} {} {:.2} {}",
                        txn.id, txn.service, txn.amount, txn.currency
                    ));
                }
                lines.join("\n")
            }
        }
    }

    fn handle_chart(&self) -> String {
        match render_daily_chart(self.store.records()) {
            Some(chart) => chart,
            None => "No transaction data to chart.".to_string(),
        }
    }

    fn handle_analysis(&self) -> String {
        match portfolio_report(
            self.store.records(),
            &self.config.portfolio_script,
            &self.engine,
        ) {
            Ok(PortfolioOutcome::Report(report)) => {
                let currency = summarize(self.store.records(), &self.config.currency).currency;
                let mut lines = vec![
                    "Portfolio report:".to_string(),
                    format!(
                        "  Top service: {} ({:.2} {currency})",
                        report.top_service, report.top_amount
                    ),
                    format!("  Total spend: {:.2} {currency}", report.total),
                    "  Per service:".to_string(),
                ];
                for (service, amount) in &report.per_service {
                    lines.push(format!("    {service}: {amount:.2} {currency}"));
                }
                lines.join("\n")
            }
            Ok(PortfolioOutcome::InsufficientData) => {
                "Not enough transaction data for a portfolio report.".to_string()
            }
            Err(err) => {
                tracing::warn!(error = %err, "portfolio analysis failed");
                "The portfolio analysis is unavailable right now.".to_string()
            }
        }
    }
}

fn help_text() -> String {
    [
        "I can help with:",
        "  add transaction <amount> for <service> [on YYYY-MM-DD]",
        "  total spend",
        "  spend per service",
        "  60/40 split",
        "  detect anomalies",
        "  spend chart",
        "  analysis report",
        "  export csv",
    ]
    .join("\n")
}
