use crate::error::Result;
use crate::ingestion::DayRecordIndex;
use crate::schema::DailyLedgerRecord;
use crate::utils::{day_label, month_index, year_days};
use crate::{CalendarDayRow, RowOrigin};
use chrono::NaiveDate;

/// Turns a sparse, date-indexed set of records into one row per calendar day.
pub struct Densifier {
    year: i32,
}

impl Densifier {
    pub fn new(year: i32) -> Self {
        Self { year }
    }

    /// Walks every day of the year in order and emits a row for it.
    ///
    /// Days with a record copy its amounts verbatim, including the server's
    /// daily surplus and running total. Days without one are zero-filled,
    /// running total included; the previous day's total is not carried over.
    pub fn densify(&self, index: &DayRecordIndex<'_>) -> Result<Vec<CalendarDayRow>> {
        let rows = year_days(self.year)?
            .map(|day| match index.get(&day) {
                Some(record) => recorded_row(day, record),
                None => zero_row(day),
            })
            .collect();

        Ok(rows)
    }
}

fn recorded_row(day: NaiveDate, record: &DailyLedgerRecord) -> CalendarDayRow {
    CalendarDayRow {
        date: day,
        display_label: day_label(day),
        month_index: month_index(day),
        general_expenses: record.general_expenses,
        fixed_cost: record.fixed_cost,
        contingency: record.contingency,
        revenue: record.revenue,
        regulated_revenue: record.regulated_revenue,
        surplus: record.daily_surplus,
        cumulative_total: record.cumulative_surplus,
        origin: RowOrigin::Recorded,
    }
}

fn zero_row(day: NaiveDate) -> CalendarDayRow {
    CalendarDayRow {
        date: day,
        display_label: day_label(day),
        month_index: month_index(day),
        general_expenses: 0.0,
        fixed_cost: 0.0,
        contingency: 0.0,
        revenue: 0.0,
        regulated_revenue: 0.0,
        surplus: 0.0,
        cumulative_total: 0.0,
        origin: RowOrigin::ZeroFilled,
    }
}

pub fn build_calendar_rows(year: i32, index: &DayRecordIndex<'_>) -> Result<Vec<CalendarDayRow>> {
    Densifier::new(year).densify(index)
}
