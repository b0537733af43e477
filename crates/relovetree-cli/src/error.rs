//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Store(#[from] relovetree_store::StoreError),

    /// Check, sync or clone failure
    #[error("{0}")]
    Fork(#[from] relovetree_fork::ForkError),

    /// Failure the console already reported to the user
    #[error("{0}")]
    Reported(#[source] relovetree_fork::ForkError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Tree not found
    #[error("Tree not found: {0}")]
    NotFound(String),
}

impl CliError {
    /// True when the user has already seen this failure
    pub fn is_reported(&self) -> bool {
        matches!(self, CliError::Reported(_))
    }
}
