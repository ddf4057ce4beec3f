use std::result::Result as StdResult;

use thiserror::Error;
use uuid::Uuid;

/// Error type shared by the ledger, reporting, income, and storage layers.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Customer not found: {0}")]
    CustomerNotFound(Uuid),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),
    #[error("Income entry not found: {0}")]
    IncomeEntryNotFound(Uuid),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Persistence error: {0}")]
    StorageError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// The first half of a two-step write landed and could not be rolled back.
    #[error("Partial write: {0}")]
    PartialWrite(String),
    #[error("Export failed: {0}")]
    Export(String),
}

pub type Result<T> = StdResult<T, LedgerError>;

impl LedgerError {
    /// True for lookups that referenced a record the store does not hold.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LedgerError::CustomerNotFound(_)
                | LedgerError::TransactionNotFound(_)
                | LedgerError::IncomeEntryNotFound(_)
        )
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::StorageError(err.to_string())
    }
}

impl From<csv::Error> for LedgerError {
    fn from(err: csv::Error) -> Self {
        LedgerError::Export(err.to_string())
    }
}
