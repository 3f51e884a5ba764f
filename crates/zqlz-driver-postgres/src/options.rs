//! Connection options for the destination database

use std::time::Duration;

use serde::{Deserialize, Serialize};
use zqlz_core::TlsConfig;

/// Default connection-establish timeout in milliseconds
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 60_000;

/// Settings for the single connection a restore runs on.
///
/// A restore owns exactly one connection for its whole lifetime; there is
/// no pool sizing to configure. Only establishing the connection is bounded
/// by a timeout. Statements sent over it are not.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionOptions {
    /// Timeout in milliseconds for establishing the connection
    connect_timeout_ms: u64,
    /// TLS settings
    tls: TlsConfig,
    /// Reported to the server as `application_name`
    application_name: String,
}

impl ConnectionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connect timeout in milliseconds
    pub fn with_connect_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.connect_timeout_ms = timeout_ms;
        self
    }

    /// Replace the TLS settings
    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = tls;
        self
    }

    pub fn with_application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = name.into();
        self
    }

    /// Get the connect timeout as a Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn tls(&self) -> &TlsConfig {
        &self.tls
    }

    pub fn application_name(&self) -> &str {
        &self.application_name
    }
}

impl Default for ConnectionOptions {
    /// Defaults:
    /// - connect_timeout: 60 seconds
    /// - tls: required, certificate verification relaxed
    fn default() -> Self {
        Self {
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            tls: TlsConfig::default(),
            application_name: "zqlz-restore".to_string(),
        }
    }
}
