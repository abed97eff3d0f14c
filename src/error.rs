//! Error types for the Medusa exporter.
//!
//! This module defines custom error types using `thiserror` for structured
//! error handling throughout the application.

use thiserror::Error;

/// Main error type for Medusa exporter operations.
#[derive(Debug, Error)]
pub enum MedusaError {
    /// Medusa exited with a non-zero status
    #[error("Medusa command failed: {0}")]
    Command(String),

    /// Medusa did not finish within the configured timeout
    #[error("Medusa command timed out after {0} seconds")]
    Timeout(u64),

    /// Error decoding the backup list
    #[error("Failed to parse Medusa output: {0}")]
    Parse(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Metrics error
    #[error("Metrics error: {0}")]
    Metrics(String),

    /// HTTP server error
    #[error("HTTP server error: {0}")]
    Server(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<prometheus::Error> for MedusaError {
    fn from(err: prometheus::Error) -> Self {
        MedusaError::Metrics(err.to_string())
    }
}

/// Result type alias for Medusa exporter operations.
pub type Result<T> = std::result::Result<T, MedusaError>;
