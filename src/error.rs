use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid ledger year {0}: outside the supported calendar range")]
    InvalidYear(i32),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Daily surplus mismatch on {date}: server reported {reported}, revenue minus expenses is {expected}")]
    SurplusMismatch {
        date: NaiveDate,
        reported: f64,
        expected: f64,
    },

    #[error("Cumulative drift on {date}: server reported {reported}, previous total plus surplus is {expected}")]
    CumulativeDrift {
        date: NaiveDate,
        reported: f64,
        expected: f64,
    },

    #[error("Ledger API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[cfg(feature = "http")]
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
