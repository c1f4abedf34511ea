//! Pure aggregation over transaction records: ledger summaries, per-day
//! totals, and the 60/40 operational split.

use crate::types::{FinancialSummary, Transaction};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Summarize a finite sequence of records.
///
/// Total is the arithmetic sum of amounts (0 for empty input); the
/// per-service map accumulates amounts keyed by service name; the currency is
/// the first record's, or `default_currency` when the input is empty. Pure
/// function, no error conditions.
pub fn summarize(records: &[Transaction], default_currency: &str) -> FinancialSummary {
    let mut per_service: BTreeMap<String, f64> = BTreeMap::new();
    let mut total = 0.0;

    for record in records {
        total += record.amount;
        *per_service.entry(record.service.clone()).or_insert(0.0) += record.amount;
    }

    let currency = records
        .first()
        .map(|record| record.currency.clone())
        .unwrap_or_else(|| default_currency.to_string());

    FinancialSummary {
        total_spend: total,
        per_service,
        currency,
    }
}

/// Sum of amounts per UTC calendar day. Input order within a day is
/// preserved by the fold, so identical input always produces identical
/// totals.
pub fn daily_totals(records: &[Transaction]) -> BTreeMap<NaiveDate, f64> {
    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in records {
        *totals.entry(record.day()).or_insert(0.0) += record.amount;
    }
    totals
}

/// The 60/40 protocol: split total spend into a 60% operational share and a
/// 40% saving / efficiency target.
pub fn sixty_forty_split(total: f64) -> (f64, f64) {
    (total * 0.6, total * 0.4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_CURRENCY;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn txn(service: &str, amount: f64, day: u32) -> Transaction {
        let ts = Utc.with_ymd_and_hms(2025, 10, day, 12, 0, 0).unwrap();
        Transaction::draft(service, amount).with_timestamp(ts)
    }

    #[test]
    fn summarize_empty_input_yields_zero_total() {
        let summary = summarize(&[], DEFAULT_CURRENCY);
        assert_eq!(summary.total_spend, 0.0);
        assert!(summary.per_service.is_empty());
        assert_eq!(summary.currency, DEFAULT_CURRENCY);
    }

    #[test]
    fn summarize_accumulates_per_service() {
        let records = vec![txn("A", 100.0, 1), txn("B", 50.0, 1), txn("A", 20.0, 2)];
        let summary = summarize(&records, DEFAULT_CURRENCY);

        assert_eq!(summary.total_spend, 170.0);
        assert_eq!(summary.per_service.get("A"), Some(&120.0));
        assert_eq!(summary.per_service.get("B"), Some(&50.0));
    }

    #[test]
    fn summarize_takes_currency_from_first_record() {
        let records = vec![
            txn("A", 1.0, 1).with_currency("EUR"),
            txn("B", 2.0, 1).with_currency("USD"),
        ];
        let summary = summarize(&records, DEFAULT_CURRENCY);
        assert_eq!(summary.currency, "EUR");
    }

    #[test]
    fn daily_totals_groups_by_utc_day() {
        let records = vec![txn("A", 10.0, 1), txn("B", 5.0, 1), txn("A", 7.0, 2)];
        let totals = daily_totals(&records);

        assert_eq!(totals.len(), 2);
        assert_eq!(
            totals.get(&NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()),
            Some(&15.0)
        );
        assert_eq!(
            totals.get(&NaiveDate::from_ymd_opt(2025, 10, 2).unwrap()),
            Some(&7.0)
        );
    }

    #[test]
    fn sixty_forty_split_is_exact_on_round_totals() {
        let (operational, savings) = sixty_forty_split(1000.0);
        assert_eq!(operational, 600.0);
        assert_eq!(savings, 400.0);
    }

    proptest! {
        #[test]
        fn property_per_service_values_sum_to_total(
            amounts in proptest::collection::vec(0.0f64..10_000.0, 1..50)
        ) {
            let records: Vec<Transaction> = amounts
                .iter()
                .enumerate()
                .map(|(i, amount)| txn(if i % 3 == 0 { "A" } else { "B" }, *amount, 1 + (i as u32 % 28)))
                .collect();

            let summary = summarize(&records, DEFAULT_CURRENCY);
            let direct: f64 = records.iter().map(|r| r.amount).sum();
            let via_services: f64 = summary.per_service.values().sum();

            prop_assert!((summary.total_spend - direct).abs() < 1e-6);
            prop_assert!((via_services - direct).abs() < 1e-6);
        }
    }
}
