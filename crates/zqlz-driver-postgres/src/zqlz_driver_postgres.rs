//! PostgreSQL driver implementation

mod connection;
mod options;
mod tls;

pub use connection::PostgresConnection;
pub use options::ConnectionOptions;
pub use tls::{PostgresTlsConnector, TlsError, tls_mode_to_sslmode};
