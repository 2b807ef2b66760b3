//! Error types for wellness-core

use thiserror::Error;

/// Main error type for the wellness-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV export error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// The predictor failed or produced an unusable score
    #[error("prediction error: {0}")]
    Prediction(String),

    /// Caller supplied a value the core cannot interpret
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A thread panicked while holding the database connection
    #[error("database connection lock poisoned")]
    LockPoisoned,
}

impl Error {
    /// Whether this error originates in the storage layer.
    pub fn is_storage(&self) -> bool {
        matches!(self, Error::Database(_) | Error::LockPoisoned)
    }
}

/// Result type alias for wellness-core
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_classification() {
        assert!(Error::LockPoisoned.is_storage());
        assert!(Error::Database(rusqlite::Error::InvalidQuery).is_storage());
        assert!(!Error::Prediction("nan".into()).is_storage());
        assert!(!Error::Config("missing model".into()).is_storage());
    }
}
