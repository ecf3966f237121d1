//! # Cash Ledger Builder
//!
//! A library for turning the sparse daily cash records served by a business
//! backend into a dense yearly ledger ("controle efetivo"): one row per
//! calendar day, monthly roll-ups, and the server's running balance carried
//! through untouched.
//!
//! ## Core Concepts
//!
//! - **Sparse Data**: the backend only returns days that had activity
//! - **Dense Data**: one [`CalendarDayRow`] for every day of the year, zero-filled where no record exists
//! - **Flow Categories**: general expenses, fixed costs, contingencies, revenue and regulated revenue
//! - **Cumulative Total**: the server's year-to-date surplus, copied verbatim and never re-summed
//! - **Drill-Down**: itemized transactions for a single day, bucketed by category text
//!
//! ## Example
//!
//! ```rust
//! use cash_ledger_builder::*;
//!
//! let records: Vec<DailyLedgerRecord> = serde_json::from_str(r#"[
//!     {"date": "2024-02-29", "accountId": "A1", "revenue": 1000,
//!      "generalExpenses": 400, "dailySurplus": 600, "cumulativeSurplus": 600}
//! ]"#).unwrap();
//!
//! let selector = AccountSelector::Account("A1".to_string());
//! let view = compute_ledger(2024, &selector, &records).unwrap();
//!
//! assert_eq!(view.rows.len(), 366);
//! assert_eq!(view.months[&1].end_of_month_cumulative, 600.0);
//! ```

pub mod aggregation;
pub mod classification;
#[cfg(feature = "http")]
pub mod client;
pub mod config;
pub mod controller;
pub mod drilldown;
pub mod engine;
pub mod error;
pub mod ingestion;
pub mod report;
pub mod schema;
pub mod selection;
pub mod source;
pub mod utils;
pub mod verification;

pub use aggregation::{aggregate_months, year_totals, MonthAggregate, YearTotals};
pub use classification::{classify, BucketDetail, DayBreakdown, DetailBucket};
#[cfg(feature = "http")]
pub use client::HttpLedgerSource;
pub use config::{LedgerClientConfig, LedgerConfig};
pub use controller::{ApplyOutcome, LedgerController, RequestTicket};
pub use drilldown::DetailResolver;
pub use engine::{build_calendar_rows, Densifier};
pub use error::{LedgerError, Result};
pub use ingestion::{parse_detail_payload, parse_ledger_payload, DayRecordIndex};
pub use report::LedgerReport;
pub use schema::*;
pub use selection::{
    JsonFileSelectionStore, MemorySelectionStore, SelectionStore, SELECTED_ACCOUNT_KEY,
};
pub use source::LedgerSource;
pub use utils::*;
pub use verification::{
    inspect_rows, verify_rows, Discrepancy, LedgerVerifier, VerificationResult,
};

use chrono::NaiveDate;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowOrigin {
    /// Copied from a server record for that day
    Recorded,
    /// No record existed for the day; every amount is zero
    ZeroFilled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDayRow {
    pub date: NaiveDate,
    /// `dd/mm`
    pub display_label: String,
    /// 0 = January
    pub month_index: u32,
    pub general_expenses: f64,
    pub fixed_cost: f64,
    pub contingency: f64,
    pub revenue: f64,
    pub regulated_revenue: f64,
    /// Server-reported surplus for the day
    pub surplus: f64,
    /// Server-reported year-to-date total for the day
    pub cumulative_total: f64,
    pub origin: RowOrigin,
}

impl CalendarDayRow {
    pub fn total_expenses(&self) -> f64 {
        self.general_expenses + self.fixed_cost + self.contingency
    }

    pub fn total_revenue(&self) -> f64 {
        self.revenue + self.regulated_revenue
    }
}

/// Everything the ledger screen renders for one (year, account) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerView {
    pub year: i32,
    pub selector: AccountSelector,
    pub rows: Vec<CalendarDayRow>,
    pub months: BTreeMap<u32, MonthAggregate>,
}

impl LedgerView {
    /// A fully zeroed calendar, used before the first fetch lands and after
    /// a failed one.
    pub fn empty(year: i32, selector: AccountSelector) -> Result<Self> {
        compute_ledger(year, &selector, &[])
    }

    pub fn row(&self, date: NaiveDate) -> Option<&CalendarDayRow> {
        self.rows
            .binary_search_by_key(&date, |r| r.date)
            .ok()
            .map(|idx| &self.rows[idx])
    }

    pub fn month(&self, month_index: u32) -> Option<&MonthAggregate> {
        self.months.get(&month_index)
    }

    pub fn year_totals(&self) -> YearTotals {
        year_totals(&self.rows)
    }

    pub fn recorded_days(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.origin == RowOrigin::Recorded)
            .count()
    }
}

pub struct LedgerProcessor;

impl LedgerProcessor {
    pub fn process(
        year: i32,
        selector: &AccountSelector,
        records: &[DailyLedgerRecord],
        config: &LedgerConfig,
    ) -> Result<LedgerView> {
        let index = DayRecordIndex::build(records, selector);

        debug!(
            "Indexed {} of {} records for {} ({} dropped, {} replaced)",
            index.len(),
            records.len(),
            selector,
            index.dropped(),
            index.replaced()
        );

        let rows = Densifier::new(year).densify(&index)?;
        let months = aggregate_months(&rows);

        let verification = inspect_rows(&rows, config.verification_tolerance);
        for warning in &verification.warnings {
            debug!("Ledger consistency note: {}", warning);
        }

        info!(
            "Computed ledger for {} / {}: {} days, {} with activity",
            year,
            selector,
            rows.len(),
            index.len()
        );

        Ok(LedgerView {
            year,
            selector: selector.clone(),
            rows,
            months,
        })
    }

    pub fn process_with_verification(
        year: i32,
        selector: &AccountSelector,
        records: &[DailyLedgerRecord],
        config: &LedgerConfig,
    ) -> Result<LedgerView> {
        let view = Self::process(year, selector, records, config)?;

        verify_rows(&view.rows, config.verification_tolerance)?;

        Ok(view)
    }
}

/// Merges `records` into a full calendar for `year` and rolls it up by month.
///
/// Pure: identical inputs always give identical output.
pub fn compute_ledger(
    year: i32,
    selector: &AccountSelector,
    records: &[DailyLedgerRecord],
) -> Result<LedgerView> {
    LedgerProcessor::process(year, selector, records, &LedgerConfig::default())
}

pub fn compute_ledger_with_verification(
    year: i32,
    selector: &AccountSelector,
    records: &[DailyLedgerRecord],
    tolerance: f64,
) -> Result<LedgerView> {
    let config = LedgerConfig {
        verification_tolerance: tolerance,
    };
    LedgerProcessor::process_with_verification(year, selector, records, &config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        date: &str,
        account: &str,
        revenue: f64,
        expenses: f64,
        cumulative: f64,
    ) -> DailyLedgerRecord {
        DailyLedgerRecord {
            date: date.to_string(),
            account_id: Some(account.to_string()),
            general_expenses: expenses,
            fixed_cost: 0.0,
            contingency: 0.0,
            revenue,
            regulated_revenue: 0.0,
            daily_surplus: revenue - expenses,
            cumulative_surplus: cumulative,
        }
    }

    #[test]
    fn test_end_to_end_leap_year() {
        let records = vec![record("2024-02-29", "A1", 1000.0, 400.0, 600.0)];
        let selector = AccountSelector::Account("A1".to_string());
        let view = compute_ledger(2024, &selector, &records).unwrap();

        assert_eq!(view.rows.len(), 366);
        assert_eq!(view.recorded_days(), 1);

        let feb29 = view.row(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()).unwrap();
        assert_eq!(feb29.revenue, 1000.0);
        assert_eq!(feb29.surplus, 600.0);
        assert_eq!(feb29.cumulative_total, 600.0);

        let feb = view.month(1).unwrap();
        assert_eq!(feb.total_revenue, 1000.0);
        assert_eq!(feb.total_expenses, 400.0);
        assert_eq!(feb.net_surplus, 600.0);
        assert_eq!(feb.end_of_month_cumulative, 600.0);

        // March has no records, so its closing cumulative is zero-filled.
        assert_eq!(view.month(2).unwrap().end_of_month_cumulative, 0.0);
    }

    #[test]
    fn test_compute_is_idempotent() {
        let records = vec![
            record("2023-04-01", "A1", 50.0, 10.0, 40.0),
            record("2023-04-03", "A1", 0.0, 15.0, 25.0),
        ];
        let a = compute_ledger(2023, &AccountSelector::All, &records).unwrap();
        let b = compute_ledger(2023, &AccountSelector::All, &records).unwrap();

        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_view_survives_json_round_trip() {
        let records = vec![
            record("2024-01-15", "A1", 300.0, 120.5, 179.5),
            record("2024-01-31", "A1", 0.0, 79.5, 100.0),
            record("2024-02-29", "A1", 50.0, 0.0, 150.0),
        ];
        let selector = AccountSelector::Account("A1".to_string());
        let view = compute_ledger(2024, &selector, &records).unwrap();

        let json = serde_json::to_string(&view).unwrap();
        let restored: LedgerView = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, view);
        assert_eq!(restored.month(0).unwrap().end_of_month_cumulative, 100.0);
    }

    #[test]
    fn test_empty_view_is_all_zero() {
        let view = LedgerView::empty(2023, AccountSelector::All).unwrap();
        assert_eq!(view.rows.len(), 365);
        assert_eq!(view.months.len(), 12);
        assert!(view.rows.iter().all(|r| r.cumulative_total == 0.0));
        assert_eq!(view.year_totals().net_surplus, 0.0);
    }

    #[test]
    fn test_verification_rejects_inconsistent_records() {
        let mut bad = record("2023-01-10", "A1", 100.0, 0.0, 100.0);
        bad.daily_surplus = 55.0;

        assert!(compute_ledger(2023, &AccountSelector::All, &[bad.clone()]).is_ok());
        assert!(matches!(
            compute_ledger_with_verification(2023, &AccountSelector::All, &[bad], 0.01),
            Err(LedgerError::SurplusMismatch { .. })
        ));
    }
}
