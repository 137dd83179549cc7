//! Error types for Levelwatch

use thiserror::Error;

/// Result type alias using Levelwatch's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the reading store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The reading was rejected before reaching storage
    #[error("Invalid reading: {0}")]
    Invalid(String),

    /// The backing database could not be read or written
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// No readings have been stored yet
    #[error("No level data found")]
    Empty,
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::Unavailable(format!("Migration failed: {err}"))
    }
}

/// Errors raised while delivering a notification
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotifyError {
    /// The gateway rejected our credentials
    #[error("Notification gateway rejected credentials: {0}")]
    Unauthorized(String),

    /// The gateway could not be reached or timed out
    #[error("Notification gateway unreachable: {0}")]
    Unreachable(String),

    /// The gateway answered with something we could not interpret
    #[error("Malformed gateway response: {0}")]
    Malformed(String),

    /// The gateway accepted the request but refused the message
    #[error("Gateway error {code}: {message}")]
    Rejected {
        /// Gateway error code
        code: i64,
        /// Gateway error description
        message: String,
    },

    /// Destination or credentials are missing
    #[error("Notifier not configured: {0}")]
    NotConfigured(String),
}

/// Error types for Levelwatch operations
#[derive(Error, Debug)]
pub enum Error {
    /// Reading store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Notification error
    #[error(transparent)]
    Notify(#[from] NotifyError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
