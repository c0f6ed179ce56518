//! Error types and Result alias for the rewards client

use thiserror::Error;

/// Fallback text shown when a failed mutation carries no server message
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Main error type for the rewards client
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Session token expired")]
    TokenExpired,

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl Error {
    /// Message suitable for a user-facing notification.
    ///
    /// Server-provided messages and input validation messages are shown as-is;
    /// everything else collapses to [`GENERIC_FAILURE_MESSAGE`].
    pub fn user_message(&self) -> String {
        match self {
            Error::ApiError(msg) | Error::InvalidData(msg) if !msg.trim().is_empty() => {
                msg.clone()
            }
            Error::TokenExpired => "Your session has expired. Please sign in again.".to_string(),
            Error::NotAuthenticated => "Please sign in to use Chill Points.".to_string(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::NetworkError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidData(err.to_string())
    }
}
