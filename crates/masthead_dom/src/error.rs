//! Document error types

use thiserror::Error;

/// Selector parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// Selector string was empty or whitespace only
    #[error("Empty selector")]
    Empty,

    /// Selector could not be parsed
    #[error("Invalid selector at column {column}: {message}")]
    Invalid {
        /// Column (1-indexed) where parsing stopped
        column: usize,
        /// What went wrong
        message: String,
    },

    /// Selector is valid CSS but uses syntax this document cannot match
    #[error("Unsupported selector syntax: {0}")]
    Unsupported(String),
}

/// Color parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    /// Value is not a recognized color
    #[error("Invalid color value: {0}")]
    Invalid(String),
}

/// Result type for selector operations
pub type Result<T> = std::result::Result<T, SelectorError>;
