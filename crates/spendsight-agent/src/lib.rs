//! Operator chat agent over the spend ledger: command recognition, reply
//! rendering, CSV export, and the daily spend chart.

#![deny(unsafe_code)]

pub mod agent;
pub mod chart;
pub mod command;
pub mod export;

pub use agent::{Agent, AgentConfig};
pub use chart::render_daily_chart;
pub use command::{parse_command, Command};
pub use export::{export_csv, ExportError, EXPORT_FILE};
