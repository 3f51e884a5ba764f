//! Error types for ZQLZ

use thiserror::Error;

/// Core error type for driver-level operations
#[derive(Error, Debug)]
pub enum ZqlzError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Security error: {0}")]
    Security(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("{0}")]
    Other(String),
}

impl ZqlzError {
    /// The database-facing message without the category prefix.
    ///
    /// Error classifiers match against this text, so it must stay as close
    /// to what the server reported as possible.
    pub fn message(&self) -> String {
        match self {
            ZqlzError::Connection(msg)
            | ZqlzError::Query(msg)
            | ZqlzError::Configuration(msg)
            | ZqlzError::Security(msg)
            | ZqlzError::Timeout(msg)
            | ZqlzError::Other(msg) => msg.clone(),
            ZqlzError::Io(err) => err.to_string(),
        }
    }

    /// Returns true for failures that happened before or while establishing
    /// the connection rather than while running SQL.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, ZqlzError::Connection(_) | ZqlzError::Timeout(_))
    }
}

/// Result type alias for ZQLZ operations
pub type Result<T> = std::result::Result<T, ZqlzError>;
