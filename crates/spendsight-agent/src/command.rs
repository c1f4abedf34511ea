//! Free-text command recognition for the operator chat surface.
//!
//! Recognition is total: every message maps to exactly one [`Command`], with
//! `Help` as the fallback for anything unrecognized. Matching is
//! case-insensitive phrase detection, plus one regex form for recording a
//! transaction.

use chrono::NaiveDate;
use regex::Regex;

/// Everything the chat surface can be asked to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `add transaction <amount> for <service> [on YYYY-MM-DD]`
    AddTransaction {
        amount: f64,
        service: String,
        date: Option<NaiveDate>,
    },
    /// An add attempt whose amount, service, or date failed to parse.
    MalformedAdd,
    TotalSpend,
    SpendPerService,
    SixtyFortySplit,
    ExportCsv,
    DetectAnomalies,
    SpendChart,
    AnalysisReport,
    Help,
}

const ADD_PATTERN: &str =
    r"(?i)add transaction:?\s*([0-9]+(?:\.[0-9]+)?)\s+for\s+([a-z0-9_\- ]+?)(?:\s+on\s+(\S+))?\s*$";

/// Map one chat message to a command. Total; unknown text becomes `Help`.
pub fn parse_command(text: &str) -> Command {
    let lowered = text.to_lowercase();

    if lowered.contains("add transaction") {
        return parse_add(text).unwrap_or(Command::MalformedAdd);
    }
    if lowered.contains("export") && lowered.contains("csv") {
        return Command::ExportCsv;
    }
    if lowered.contains("60-40") || lowered.contains("60/40") || lowered.contains("6040") {
        return Command::SixtyFortySplit;
    }
    if lowered.contains("per service") || lowered.contains("per app") {
        return Command::SpendPerService;
    }
    if lowered.contains("total spend") {
        return Command::TotalSpend;
    }
    if lowered.contains("anomal") {
        return Command::DetectAnomalies;
    }
    if lowered.contains("chart") || lowered.contains("plot") || lowered.contains("trend") {
        return Command::SpendChart;
    }
    if lowered.contains("analysis") || lowered.contains("report") {
        return Command::AnalysisReport;
    }
    Command::Help
}

/// Parse the add form against the original message so the service keeps its
/// casing. `None` covers every malformed variant: unparseable amount, blank
/// service, or a date that is not a real `YYYY-MM-DD` day.
fn parse_add(text: &str) -> Option<Command> {
    let re = Regex::new(ADD_PATTERN).ok()?;
    let caps = re.captures(text)?;

    let amount: f64 = caps.get(1)?.as_str().parse().ok()?;
    if !amount.is_finite() {
        return None;
    }

    let service = caps.get(2)?.as_str().trim().to_string();
    if service.is_empty() {
        return None;
    }

    let date = match caps.get(3) {
        Some(m) => Some(NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d").ok()?),
        None => None,
    };

    Some(Command::AddTransaction {
        amount,
        service,
        date,
    })
}
