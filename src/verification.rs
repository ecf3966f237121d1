use crate::error::{LedgerError, Result};
use crate::utils::approx_eq;
use crate::{CalendarDayRow, RowOrigin};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub enum Discrepancy {
    /// Server surplus differs from revenue minus expenses for the day.
    Surplus {
        date: NaiveDate,
        reported: f64,
        expected: f64,
    },
    /// Running total differs from the previous recorded total plus the day's surplus.
    Cumulative {
        date: NaiveDate,
        reported: f64,
        expected: f64,
    },
}

impl Discrepancy {
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::Surplus { date, .. } | Self::Cumulative { date, .. } => *date,
        }
    }

    fn into_error(self) -> LedgerError {
        match self {
            Self::Surplus {
                date,
                reported,
                expected,
            } => LedgerError::SurplusMismatch {
                date,
                reported,
                expected,
            },
            Self::Cumulative {
                date,
                reported,
                expected,
            } => LedgerError::CumulativeDrift {
                date,
                reported,
                expected,
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct VerificationResult {
    pub discrepancies: Vec<Discrepancy>,
    pub warnings: Vec<String>,
}

impl VerificationResult {
    pub fn is_clean(&self) -> bool {
        self.discrepancies.is_empty()
    }
}

/// Cross-checks the server's figures on recorded days.
///
/// Rows are only read. The server stays authoritative; discrepancies are
/// reported so callers can log them or refuse the data outright.
pub struct LedgerVerifier<'a> {
    rows: &'a [CalendarDayRow],
    tolerance: f64,
}

impl<'a> LedgerVerifier<'a> {
    pub fn new(rows: &'a [CalendarDayRow], tolerance: f64) -> Self {
        Self { rows, tolerance }
    }

    pub fn inspect(&self) -> VerificationResult {
        let mut result = VerificationResult::default();
        let mut previous_cumulative = 0.0;

        for row in self.rows.iter().filter(|r| r.origin == RowOrigin::Recorded) {
            let expected_surplus = row.total_revenue() - row.total_expenses();
            if !approx_eq(row.surplus, expected_surplus, self.tolerance) {
                result.warnings.push(format!(
                    "{}: daily surplus {:.2} but revenue minus expenses is {:.2}",
                    row.date, row.surplus, expected_surplus
                ));
                result.discrepancies.push(Discrepancy::Surplus {
                    date: row.date,
                    reported: row.surplus,
                    expected: expected_surplus,
                });
            }

            let expected_cumulative = previous_cumulative + row.surplus;
            if !approx_eq(row.cumulative_total, expected_cumulative, self.tolerance) {
                result.warnings.push(format!(
                    "{}: cumulative {:.2} but previous total plus surplus is {:.2}",
                    row.date, row.cumulative_total, expected_cumulative
                ));
                result.discrepancies.push(Discrepancy::Cumulative {
                    date: row.date,
                    reported: row.cumulative_total,
                    expected: expected_cumulative,
                });
            }

            previous_cumulative = row.cumulative_total;
        }

        result
    }

    /// Fails on the first discrepancy.
    pub fn verify(&self) -> Result<()> {
        match self.inspect().discrepancies.into_iter().next() {
            Some(d) => Err(d.into_error()),
            None => Ok(()),
        }
    }
}

pub fn inspect_rows(rows: &[CalendarDayRow], tolerance: f64) -> VerificationResult {
    LedgerVerifier::new(rows, tolerance).inspect()
}

pub fn verify_rows(rows: &[CalendarDayRow], tolerance: f64) -> Result<()> {
    LedgerVerifier::new(rows, tolerance).verify()
}
