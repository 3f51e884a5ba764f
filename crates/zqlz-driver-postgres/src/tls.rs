//! PostgreSQL TLS Support
//!
//! Builds the native-tls connector used for the destination connection
//! from a `TlsConfig`.

use native_tls::{TlsConnector as NativeTlsConnector, TlsConnectorBuilder};
use postgres_native_tls::MakeTlsConnector;
use tokio_postgres::config::SslMode;
use tracing::{debug, info, warn};
use zqlz_core::security::{TlsConfig, TlsMode};

/// Error types for TLS operations
#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    /// TLS configuration error
    #[error("TLS configuration error: {0}")]
    ConfigurationError(String),

    /// TLS mode not supported
    #[error("TLS mode {mode:?} is not supported for this operation")]
    UnsupportedMode { mode: TlsMode },
}

/// A PostgreSQL TLS connector builder
///
/// # Example
///
/// ```ignore
/// use zqlz_core::TlsConfig;
/// use zqlz_driver_postgres::PostgresTlsConnector;
///
/// let tls = PostgresTlsConnector::build(&TlsConfig::require())?;
/// let (client, connection) = config.connect(tls).await?;
/// ```
#[derive(Debug, Clone)]
pub struct PostgresTlsConnector;

impl PostgresTlsConnector {
    /// Build a TLS connector from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration does not validate
    /// - The TLS mode is Disable (use `NoTls` instead)
    /// - The platform TLS library rejects the settings
    pub fn build(config: &TlsConfig) -> Result<MakeTlsConnector, TlsError> {
        config
            .validate()
            .map_err(|e| TlsError::ConfigurationError(e.message()))?;

        if config.mode == TlsMode::Disable {
            return Err(TlsError::UnsupportedMode { mode: config.mode });
        }

        info!(mode = ?config.mode, verify_server = config.verify_server, "Building PostgreSQL TLS connector");

        let mut builder = NativeTlsConnector::builder();

        configure_verification(&mut builder, config);

        let connector = builder
            .build()
            .map_err(|e| TlsError::ConfigurationError(e.to_string()))?;

        debug!("TLS connector built successfully");

        Ok(MakeTlsConnector::new(connector))
    }
}

/// Relax certificate checks unless server verification was requested
fn configure_verification(builder: &mut TlsConnectorBuilder, config: &TlsConfig) {
    if config.verify_server {
        debug!("Verifying server certificate against the system trust store");
    } else {
        warn!("Certificate verification disabled for destination connection");
        builder.danger_accept_invalid_certs(true);
        builder.danger_accept_invalid_hostnames(true);
    }
}

/// Map a TlsMode to the tokio-postgres SSL negotiation mode.
///
/// Certificate verification is enforced by the connector, not by the
/// negotiation mode.
pub fn tls_mode_to_sslmode(mode: TlsMode) -> SslMode {
    match mode {
        TlsMode::Disable => SslMode::Disable,
        TlsMode::Require => SslMode::Require,
    }
}
