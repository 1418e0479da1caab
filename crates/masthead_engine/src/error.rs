//! Engine error types

use thiserror::Error;

/// Why no configuration could be resolved
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Neither the data island nor a fallback value is present
    #[error("No configuration found")]
    Absent,

    /// Configuration text is not a JSON object
    #[error("Malformed configuration: {0}")]
    Malformed(String),
}

/// Result type for configuration resolution
pub type Result<T> = std::result::Result<T, ConfigError>;
