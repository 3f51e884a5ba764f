//! ZQLZ Core - Core abstractions shared by the restore tool
//!
//! This crate provides the fundamental traits and types that the driver,
//! restore engine and CLI crates depend on. It defines:
//!
//! - `Connection` - Trait for a destination database connection
//! - `ConnectionTarget` - Validated `postgresql://` connection string
//! - `ErrorClassifier` - Dialect-specific interpretation of error messages
//! - `TlsConfig` - TLS settings for the destination connection
//! - Common types like `Row` and `QueryResult`

mod connection;
mod connection_target;
mod error;
mod error_classifier;
pub mod security;
mod types;

pub use connection::*;
pub use connection_target::*;
pub use error::*;
pub use error_classifier::*;
pub use security::*;
pub use types::*;
