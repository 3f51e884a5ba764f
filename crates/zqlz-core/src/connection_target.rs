//! Destination connection string validation
//!
//! A restore must fail before any network traffic when the operator hands
//! over a bad connection string, so the string is checked in three steps:
//! emptiness, scheme, then full URL parsing.

use std::fmt;

use thiserror::Error;
use url::Url;

/// Default PostgreSQL port used when the URL omits one
pub const DEFAULT_POSTGRES_PORT: u16 = 5432;

/// Accepted connection string prefixes
pub const POSTGRES_SCHEMES: [&str; 2] = ["postgresql://", "postgres://"];

/// Reasons a connection string is rejected
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TargetError {
    /// Nothing usable was supplied
    #[error("Invalid DATABASE_URL: URL is empty or invalid")]
    Empty,

    /// The string does not start with a PostgreSQL scheme
    #[error("Invalid DATABASE_URL: Must start with postgresql:// or postgres:// (got {scheme:?})")]
    WrongScheme { scheme: String },

    /// The string has the right scheme but is not a valid URL
    #[error("Invalid DATABASE_URL format: {0}")]
    Malformed(String),
}

/// A validated destination connection string.
///
/// The raw string is kept intact for the driver; accessors expose the parts
/// that are safe to log.
#[derive(Clone)]
pub struct ConnectionTarget {
    raw: String,
    url: Url,
}

impl ConnectionTarget {
    /// Validate and parse a connection string
    pub fn parse(raw: &str) -> Result<Self, TargetError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(TargetError::Empty);
        }

        if !POSTGRES_SCHEMES.iter().any(|prefix| raw.starts_with(prefix)) {
            let scheme = raw
                .split_once("://")
                .map(|(scheme, _)| scheme.to_string())
                .unwrap_or_default();
            return Err(TargetError::WrongScheme { scheme });
        }

        let url = Url::parse(raw).map_err(|e| TargetError::Malformed(e.to_string()))?;

        if url.host_str().is_none_or(str::is_empty) {
            return Err(TargetError::Malformed("missing host".to_string()));
        }

        Ok(Self {
            raw: raw.to_string(),
            url,
        })
    }

    /// The connection string exactly as supplied (trimmed)
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    pub fn port(&self) -> u16 {
        self.url.port().unwrap_or(DEFAULT_POSTGRES_PORT)
    }

    pub fn username(&self) -> &str {
        self.url.username()
    }

    /// Database name from the URL path, if present
    pub fn database(&self) -> Option<&str> {
        let db = self.url.path().trim_start_matches('/');
        (!db.is_empty()).then_some(db)
    }

    /// Password masked down to its last four characters
    pub fn masked_password(&self) -> Option<String> {
        let password = self.url.password()?;
        let chars: Vec<char> = password.chars().collect();
        let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
        Some(format!("***{}", tail))
    }

    /// Whether the host looks like a connection pooler endpoint
    pub fn is_pooler(&self) -> bool {
        self.host().contains("pooler.")
    }
}

impl fmt::Debug for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionTarget")
            .field("host", &self.host())
            .field("port", &self.port())
            .field("username", &self.username())
            .field("database", &self.database())
            .finish()
    }
}

impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host(), self.port())?;
        if let Some(db) = self.database() {
            write!(f, "/{}", db)?;
        }
        Ok(())
    }
}
