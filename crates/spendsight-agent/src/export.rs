//! CSV export of the transaction ledger.

use spendsight_core::Transaction;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Stable file name so repeated exports overwrite the previous one.
pub const EXPORT_FILE: &str = "transactions.csv";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Write every record as one CSV row under `dir` and return the file path.
///
/// Timestamps are RFC 3339; a missing category becomes an empty field.
pub fn export_csv(records: &[Transaction], dir: &Path) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(EXPORT_FILE);

    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(["id", "service", "amount", "currency", "timestamp", "category"])?;
    for record in records {
        writer.write_record([
            record.id.to_string(),
            record.service.clone(),
            format!("{:.2}", record.amount),
            record.currency.clone(),
            record.timestamp.to_rfc3339(),
            record.category.clone().unwrap_or_default(),
        ])?;
    }
    writer.flush()?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn txn(id: u64, service: &str, amount: f64) -> Transaction {
        let ts = Utc.with_ymd_and_hms(2025, 10, 1, 9, 0, 0).unwrap();
        let mut t = Transaction::draft(service, amount).with_timestamp(ts);
        t.id = id;
        t
    }

    #[test]
    fn export_writes_header_and_one_row_per_record() {
        let dir = std::env::temp_dir().join(format!("spendsight-export-{}", Uuid::new_v4()));
        let records = vec![txn(1, "Slack", 12.5), txn(2, "Zoom", 50.0)];

        let path = export_csv(&records, &dir).unwrap();
        let contents = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "id,service,amount,currency,timestamp,category");
        assert_eq!(lines[1], "1,Slack,12.50,USD,2025-10-01T09:00:00+00:00,");
        assert_eq!(lines[2], "2,Zoom,50.00,USD,2025-10-01T09:00:00+00:00,");
    }

    #[test]
    fn export_quotes_fields_with_commas() {
        let dir = std::env::temp_dir().join(format!("spendsight-export-{}", Uuid::new_v4()));
        let records = vec![txn(1, "Zoom, Inc", 50.0)];

        let path = export_csv(&records, &dir).unwrap();
        let contents = fs::read_to_string(path).unwrap();

        assert!(contents.contains("\"Zoom, Inc\""), "{contents}");
    }

    #[test]
    fn repeated_export_overwrites_the_file() {
        let dir = std::env::temp_dir().join(format!("spendsight-export-{}", Uuid::new_v4()));
        export_csv(&[txn(1, "Slack", 1.0), txn(2, "Zoom", 2.0)], &dir).unwrap();
        let path = export_csv(&[txn(1, "Slack", 1.0)], &dir).unwrap();

        let contents = fs::read_to_string(path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[test]
    fn category_round_trips_when_present() {
        let dir = std::env::temp_dir().join(format!("spendsight-export-{}", Uuid::new_v4()));
        let mut record = txn(1, "Notion", 8.0);
        record.category = Some("productivity".to_string());

        let path = export_csv(&[record], &dir).unwrap();
        let contents = fs::read_to_string(path).unwrap();
        assert!(contents.contains(",productivity"), "{contents}");
    }
}
