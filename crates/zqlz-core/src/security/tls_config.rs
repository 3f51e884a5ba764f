//! TLS/SSL Configuration Types
//!
//! Defines the TLS settings for the destination database connection.

use crate::{Result, ZqlzError};
use serde::{Deserialize, Serialize};

/// Whether the destination connection is encrypted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TlsMode {
    /// Plain TCP (local test servers only)
    Disable,
    /// Require TLS
    #[default]
    Require,
}

impl TlsMode {
    /// Returns true if this mode requires encryption
    pub fn requires_encryption(&self) -> bool {
        matches!(self, TlsMode::Require)
    }
}

/// Configuration for the destination connection's TLS layer
///
/// The default requires encryption and accepts any certificate and
/// hostname. Managed providers often present certificates the local trust
/// store cannot validate.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TlsConfig {
    pub mode: TlsMode,
    /// Verify the certificate chain and hostname against the system trust store
    pub verify_server: bool,
}

impl TlsConfig {
    /// Create a disabled TLS configuration
    pub fn disabled() -> Self {
        Self {
            mode: TlsMode::Disable,
            verify_server: false,
        }
    }

    /// Encryption required, certificates not verified
    pub fn require() -> Self {
        Self::default()
    }

    /// Override the server verification setting
    pub fn verify_server(mut self, verify: bool) -> Self {
        self.verify_server = verify;
        self
    }

    /// Validate the TLS configuration
    pub fn validate(&self) -> Result<()> {
        if self.mode == TlsMode::Disable && self.verify_server {
            return Err(ZqlzError::Configuration(
                "Server verification requested but TLS is disabled".to_string(),
            ));
        }
        Ok(())
    }
}
