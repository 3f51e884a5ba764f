//! Security-related configuration types for database connections
//!
//! This module provides the TLS/SSL settings used when opening the
//! destination connection.

mod tls_config;

pub use tls_config::*;
