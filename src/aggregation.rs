use crate::utils::month_name;
use crate::CalendarDayRow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthAggregate {
    /// 0 = January.
    pub month_index: u32,
    pub total_expenses: f64,
    pub total_revenue: f64,
    pub net_surplus: f64,
    /// Running total reported for the chronologically last day of the month.
    pub end_of_month_cumulative: f64,
    pub day_count: usize,
}

impl MonthAggregate {
    fn empty(month_index: u32) -> Self {
        Self {
            month_index,
            total_expenses: 0.0,
            total_revenue: 0.0,
            net_surplus: 0.0,
            end_of_month_cumulative: 0.0,
            day_count: 0,
        }
    }

    pub fn month_name(&self) -> &'static str {
        month_name(self.month_index)
    }

    fn absorb(&mut self, row: &CalendarDayRow) {
        self.total_expenses += row.total_expenses();
        self.total_revenue += row.total_revenue();
        self.net_surplus = self.total_revenue - self.total_expenses;
        self.day_count += 1;
    }
}

/// Groups daily rows by month and sums each flow category.
///
/// Only months with at least one row appear in the result. The month's
/// closing cumulative is the latest-dated row's `cumulative_total`, taken
/// as-is rather than summed.
pub fn aggregate_months(rows: &[CalendarDayRow]) -> BTreeMap<u32, MonthAggregate> {
    let mut months: BTreeMap<u32, MonthAggregate> = BTreeMap::new();
    let mut latest: BTreeMap<u32, NaiveDate> = BTreeMap::new();

    for row in rows {
        let month = months
            .entry(row.month_index)
            .or_insert_with(|| MonthAggregate::empty(row.month_index));
        month.absorb(row);

        let last = latest.entry(row.month_index).or_insert(row.date);
        if row.date >= *last {
            *last = row.date;
            month.end_of_month_cumulative = row.cumulative_total;
        }
    }

    months
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearTotals {
    pub total_expenses: f64,
    pub total_revenue: f64,
    pub net_surplus: f64,
    pub closing_cumulative: f64,
}

pub fn year_totals(rows: &[CalendarDayRow]) -> YearTotals {
    let total_expenses: f64 = rows.iter().map(CalendarDayRow::total_expenses).sum();
    let total_revenue: f64 = rows.iter().map(CalendarDayRow::total_revenue).sum();
    let closing_cumulative = rows
        .iter()
        .max_by_key(|r| r.date)
        .map(|r| r.cumulative_total)
        .unwrap_or(0.0);

    YearTotals {
        total_expenses,
        total_revenue,
        net_surplus: total_revenue - total_expenses,
        closing_cumulative,
    }
}
