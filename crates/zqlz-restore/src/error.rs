//! Restore error taxonomy
//!
//! Only fatal conditions surface as `RestoreError`. Capacity failures of the
//! whole-dump attempt and benign batch conflicts are absorbed where they are
//! classified (see `engine` and `batch`) and never reach the caller.

use std::path::PathBuf;

use thiserror::Error;
use zqlz_core::{TargetError, ZqlzError};

pub type RestoreResult<T> = Result<T, RestoreError>;

/// Fatal restore errors with operator-facing messages
#[derive(Debug, Error)]
pub enum RestoreError {
    /// The connection string was rejected before connecting
    #[error(transparent)]
    InvalidTarget(#[from] TargetError),

    #[error("Backup file not found: {0}")]
    DumpNotFound(PathBuf),

    #[error("Backup file is empty: {0}")]
    DumpEmpty(PathBuf),

    #[error("Backup file is not valid UTF-8 text: {0}")]
    DumpNotUtf8(PathBuf),

    #[error("Failed to read backup file {path}: {source}")]
    DumpUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The destination could not be reached or refused the session
    #[error("Could not connect to the destination database: {message}\n{hint}")]
    Connectivity { message: String, hint: &'static str },

    /// The whole-dump attempt failed with a non-capacity error
    #[error("Restore failed: {0}")]
    Execution(String),

    #[error("Too many errors ({errors} > {threshold}). Stopping import at batch {batch_index}.")]
    ThresholdExceeded {
        errors: usize,
        threshold: usize,
        batch_index: usize,
    },

    #[error("Verification failed: {0}")]
    Verification(String),

    #[error("Failed to write {path}: {source}")]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl RestoreError {
    /// Wrap a driver error raised while connecting or pinging
    pub fn connectivity(error: ZqlzError) -> Self {
        let message = error.message();
        let hint = connectivity_hint(&message);
        RestoreError::Connectivity { message, hint }
    }

    /// Errors raised before any database interaction
    pub fn is_input_validation(&self) -> bool {
        matches!(
            self,
            RestoreError::InvalidTarget(_)
                | RestoreError::DumpNotFound(_)
                | RestoreError::DumpEmpty(_)
                | RestoreError::DumpNotUtf8(_)
                | RestoreError::DumpUnreadable { .. }
        )
    }
}

/// Remediation advice for a connection failure message
pub fn connectivity_hint(message: &str) -> &'static str {
    let lower = message.to_lowercase();
    if lower.contains("password authentication failed") {
        "Check the database password in the connection string (the database password, not an API key)."
    } else if lower.contains("lookup address")
        || lower.contains("name or service not known")
        || lower.contains("nodename nor servname")
    {
        "The host could not be resolved. Is the database instance active (not paused) and the host name correct?"
    } else if lower.contains("connection refused") {
        "The host refused the connection. Check the port and whether the server accepts remote connections."
    } else if lower.contains("timed out") || lower.contains("did not complete within") {
        "The connection timed out. The host may be unreachable over IPv4/IPv6 from here; try the provider's connection pooler endpoint."
    } else {
        "Check that the DATABASE_URL is correct and the database instance is running."
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("password authentication failed for user \"postgres\"", "password")]
    #[case("error connecting to server: failed to lookup address information: Name or service not known", "paused")]
    #[case("error connecting to server: Connection refused (os error 111)", "refused")]
    #[case("connecting to db:5432 did not complete within 60s", "timed out")]
    #[case("something else entirely", "DATABASE_URL")]
    fn test_connectivity_hint(#[case] message: &str, #[case] expected: &str) {
        assert!(
            connectivity_hint(message).contains(expected),
            "hint for {:?} was {:?}",
            message,
            connectivity_hint(message)
        );
    }

    #[test]
    fn test_connectivity_wraps_driver_message() {
        let err = RestoreError::connectivity(ZqlzError::Connection(
            "Failed to connect to PostgreSQL: Connection refused".to_string(),
        ));

        let text = err.to_string();
        assert!(text.contains("Connection refused"));
        assert!(text.contains("Check the port"));
        assert!(!err.is_input_validation());
    }

    #[test]
    fn test_input_validation_classification() {
        assert!(RestoreError::from(TargetError::Empty).is_input_validation());
        assert!(RestoreError::DumpEmpty(PathBuf::from("a.sql")).is_input_validation());
        assert!(!RestoreError::Execution("boom".into()).is_input_validation());
    }
}
