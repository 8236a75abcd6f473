use chrono::NaiveDate;
use thiserror::Error;

/// Error type that captures ledger validation, keying, and persistence failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("A record for {0} already exists; use update instead")]
    DuplicateKey(NaiveDate),
    #[error("No record found for {0}")]
    NotFound(NaiveDate),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("No period ledger is open")]
    NotLoaded,
}

pub type Result<T> = std::result::Result<T, LedgerError>;

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Persistence(err.to_string())
    }
}

impl From<csv::Error> for LedgerError {
    fn from(err: csv::Error) -> Self {
        LedgerError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Persistence(err.to_string())
    }
}
