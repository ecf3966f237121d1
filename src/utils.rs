use crate::error::{LedgerError, Result};
use chrono::{Datelike, NaiveDate};
use serde_json::Value;

const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_year(year: i32) -> usize {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

/// Every calendar day of `year`, January 1 through December 31, ascending.
///
/// The sequence is lazy; collecting it yields 365 or 366 dates.
pub fn year_days(year: i32) -> Result<impl Iterator<Item = NaiveDate>> {
    let first = NaiveDate::from_ymd_opt(year, 1, 1).ok_or(LedgerError::InvalidYear(year))?;
    let last = NaiveDate::from_ymd_opt(year, 12, 31).ok_or(LedgerError::InvalidYear(year))?;

    Ok(std::iter::successors(Some(first), |d| d.succ_opt()).take_while(move |d| *d <= last))
}

/// Reduces an upstream date string to its calendar day.
///
/// Anything after the first ten characters (a time component, a timezone
/// offset) is discarded before parsing. Returns `None` when the remaining
/// text is not a valid `YYYY-MM-DD` date.
pub fn normalize_date_key(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let day_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(day_part, "%Y-%m-%d").ok()
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Day/month label used by the calendar grid, e.g. `29/02`.
pub fn day_label(date: NaiveDate) -> String {
    date.format("%d/%m").to_string()
}

pub fn month_name(month_index: u32) -> &'static str {
    MONTH_NAMES
        .get(month_index as usize)
        .copied()
        .unwrap_or("?")
}

pub fn month_index(date: NaiveDate) -> u32 {
    date.month0()
}

/// Coerces a loosely typed JSON amount into a finite number.
///
/// Numbers pass through, numeric strings are parsed (a decimal comma is
/// accepted), and everything else (null, booleans, garbage text, NaN,
/// infinities) becomes `0.0`.
pub fn coerce_amount(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<f64>()
                .ok()
                .or_else(|| s.replace(',', ".").parse::<f64>().ok())
        }
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Coerces a JSON scalar into text. Numbers are rendered, null and
/// structured values yield `None`.
pub fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}
