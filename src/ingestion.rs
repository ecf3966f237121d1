use crate::error::Result;
use crate::schema::{AccountSelector, DailyLedgerRecord, DayDetailItem};
use crate::utils::normalize_date_key;
use chrono::NaiveDate;
use log::warn;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

/// Date-keyed lookup over a sparse list of daily records.
///
/// Keys are the calendar day of each record after normalization, so a record
/// dated `2024-02-29T03:00:00Z` is found under 2024-02-29. Records whose date
/// cannot be normalized are skipped and counted in [`DayRecordIndex::dropped`].
/// When two records land on the same day, the later one in input order wins.
#[derive(Debug, Default)]
pub struct DayRecordIndex<'a> {
    by_day: HashMap<NaiveDate, &'a DailyLedgerRecord>,
    dropped: usize,
    replaced: usize,
}

impl<'a> DayRecordIndex<'a> {
    pub fn build(records: &'a [DailyLedgerRecord], selector: &AccountSelector) -> Self {
        let mut index = Self::default();

        for record in records {
            if !selector.matches(record.account_id.as_deref()) {
                continue;
            }

            match normalize_date_key(&record.date) {
                Some(day) => {
                    if index.by_day.insert(day, record).is_some() {
                        index.replaced += 1;
                    }
                }
                None => {
                    warn!("Skipping ledger record with unparseable date '{}'", record.date);
                    index.dropped += 1;
                }
            }
        }

        index
    }

    pub fn get(&self, day: &NaiveDate) -> Option<&'a DailyLedgerRecord> {
        self.by_day.get(day).copied()
    }

    /// Lookup by raw date text; text that does not normalize finds nothing.
    pub fn get_by_key(&self, key: &str) -> Option<&'a DailyLedgerRecord> {
        normalize_date_key(key).and_then(|day| self.get(&day))
    }

    pub fn len(&self) -> usize {
        self.by_day.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_day.is_empty()
    }

    /// Records skipped because their date could not be read.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Records that overwrote an earlier record for the same day.
    pub fn replaced(&self) -> usize {
        self.replaced
    }
}

pub fn parse_ledger_payload(payload: &str) -> Result<Vec<DailyLedgerRecord>> {
    parse_lenient_array(payload, "ledger record")
}

pub fn parse_detail_payload(payload: &str) -> Result<Vec<DayDetailItem>> {
    parse_lenient_array(payload, "detail item")
}

/// Parses a JSON array element by element. Elements that do not decode are
/// logged and left out rather than failing the whole payload; a body that is
/// not an array at all is an error.
fn parse_lenient_array<T: DeserializeOwned>(payload: &str, what: &str) -> Result<Vec<T>> {
    let elements: Vec<Value> = serde_json::from_str(payload)?;
    let mut parsed = Vec::with_capacity(elements.len());

    for (idx, element) in elements.into_iter().enumerate() {
        match serde_json::from_value::<T>(element) {
            Ok(item) => parsed.push(item),
            Err(e) => warn!("Dropping malformed {} #{}: {}", what, idx, e),
        }
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, account: Option<&str>, revenue: f64) -> DailyLedgerRecord {
        DailyLedgerRecord {
            date: date.to_string(),
            account_id: account.map(str::to_string),
            general_expenses: 0.0,
            fixed_cost: 0.0,
            contingency: 0.0,
            revenue,
            regulated_revenue: 0.0,
            daily_surplus: revenue,
            cumulative_surplus: revenue,
        }
    }

    #[test]
    fn test_index_normalizes_keys() {
        let records = vec![record("2024-03-01T00:00:00.000Z", Some("A1"), 10.0)];
        let index = DayRecordIndex::build(&records, &AccountSelector::All);

        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(index.get(&day).unwrap().revenue, 10.0);
        assert_eq!(index.get_by_key("2024-03-01").unwrap().revenue, 10.0);
        assert!(index.get_by_key("garbage").is_none());
    }

    #[test]
    fn test_index_last_write_wins() {
        let records = vec![
            record("2024-03-01", Some("A1"), 10.0),
            record("2024-03-01", Some("A1"), 25.0),
        ];
        let index = DayRecordIndex::build(&records, &AccountSelector::All);

        assert_eq!(index.len(), 1);
        assert_eq!(index.replaced(), 1);
        assert_eq!(index.get_by_key("2024-03-01").unwrap().revenue, 25.0);
    }

    #[test]
    fn test_index_drops_bad_dates() {
        let records = vec![
            record("not a date", Some("A1"), 10.0),
            record("2024-13-01", Some("A1"), 10.0),
            record("2024-03-02", Some("A1"), 5.0),
        ];
        let index = DayRecordIndex::build(&records, &AccountSelector::All);

        assert_eq!(index.len(), 1);
        assert_eq!(index.dropped(), 2);
    }

    #[test]
    fn test_index_filters_by_account() {
        let records = vec![
            record("2024-03-01", Some("A1"), 10.0),
            record("2024-03-01", Some("B2"), 99.0),
            record("2024-03-02", None, 7.0),
        ];
        let selector = AccountSelector::Account("A1".to_string());
        let index = DayRecordIndex::build(&records, &selector);

        assert_eq!(index.len(), 2);
        assert_eq!(index.get_by_key("2024-03-01").unwrap().revenue, 10.0);
        assert_eq!(index.get_by_key("2024-03-02").unwrap().revenue, 7.0);
    }

    #[test]
    fn test_parse_payload_skips_bad_elements() {
        let payload = r#"[
            {"date": "2024-01-05", "revenue": 12},
            "not an object",
            {"date": "2024-01-06", "revenue": "3.5"}
        ]"#;
        let records = parse_ledger_payload(payload).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].revenue, 3.5);
    }

    #[test]
    fn test_parse_payload_rejects_non_array() {
        assert!(parse_ledger_payload(r#"{"error": "boom"}"#).is_err());
        assert!(parse_detail_payload("[]").unwrap().is_empty());
    }
}
