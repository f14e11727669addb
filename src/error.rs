use thiserror::Error;

/// Failures of the key-value backing store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors surfaced by ledger mutations.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{0}")]
    Validation(String),
    #[error("Transaction with ID {0} not found")]
    NotFound(String),
    #[error("Failed to save transactions: {0}")]
    StorageWrite(#[source] StorageError),
}

impl LedgerError {
    pub fn validation(message: impl Into<String>) -> Self {
        LedgerError::Validation(message.into())
    }
}
