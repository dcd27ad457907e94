//! Common error types for mlib

use thiserror::Error;

/// Common result type for mlib operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the mlib crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Initial database connection failed after exhausting the retry policy
    #[error("Database connection failed after {attempts} attempt(s): {source}")]
    Connection {
        attempts: u32,
        #[source]
        source: sqlx::Error,
    },

    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
