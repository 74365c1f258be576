//! Application error types for the showdeck client.
//!
//! Provides a unified error type shared by the HTTP transport, the catalog
//! service, and the stateful engines built on top of them.

use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Non-2xx response from the catalog API
    #[error("HTTP {status} from {url}: {message}")]
    Http {
        status: u16,
        url: String,
        message: String,
    },

    /// The call was cancelled or timed out before a response arrived.
    ///
    /// Timeout expiry and external cancellation are deliberately
    /// indistinguishable at this level; callers treat both as "ignore".
    #[error("request aborted")]
    Aborted,

    /// Response body could not be decoded as the expected JSON shape
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// Configuration loading/parsing errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Internal client error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True for timeouts and cancellations, which are never surfaced as
    /// user-visible errors.
    pub fn is_aborted(&self) -> bool {
        matches!(self, AppError::Aborted)
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, AppError>;
