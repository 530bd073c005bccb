//! SafeHttp error types

use thiserror::Error;

/// SafeHttp error type
///
/// Only construction and configuration paths return this type. Requests
/// issued through [`crate::client::HttpExecutor`] never fail with it; their
/// outcome is always carried by the response envelope.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Privacy classification error
    #[error("Privacy error: {0}")]
    Privacy(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type alias for SafeHttp operations
pub type Result<T> = std::result::Result<T, Error>;
