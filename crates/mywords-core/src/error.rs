//! Error types for the MyWords system
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for MyWords operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the MyWords system
#[derive(Error, Debug)]
pub enum Error {
    /// No valid session (or guest flag) for the attempted operation
    #[error("Not authenticated: {0}")]
    Unauthenticated(String),

    /// Network, durable store or oracle failure
    #[error("Backend error ({service}): {message}")]
    Backend {
        /// Which backend failed (e.g. "supabase", "deepseek")
        service: String,
        /// Error message
        message: String,
    },

    /// Input rejected before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Oracle returned text that is not the structured record we asked for
    #[error("Malformed oracle response: {0}")]
    MalformedOracleResponse(String),

    /// Device-local storage errors
    #[error("Device storage error: {0}")]
    DeviceStorage(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an unauthenticated error
    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    /// Create a backend error for a named service
    pub fn backend(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a malformed oracle response error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedOracleResponse(msg.into())
    }

    /// Create a device storage error
    pub fn device_storage(msg: impl Into<String>) -> Self {
        Self::DeviceStorage(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the user may simply try the same action again
    ///
    /// Backend failures are surfaced as a retry prompt. Nothing is retried
    /// automatically.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }

    /// Short, generic text suitable for showing to an end user
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthenticated(_) => "Please sign in again and try once more.".to_string(),
            Self::Backend { .. } => "Something went wrong talking to the server. Please try again.".to_string(),
            Self::Validation(msg) => msg.clone(),
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_backend_is_retryable() {
        assert!(Error::backend("supabase", "timeout").is_retryable());
        assert!(!Error::unauthenticated("no session").is_retryable());
        assert!(!Error::validation("too few words").is_retryable());
    }

    #[test]
    fn test_user_message_hides_backend_detail() {
        let err = Error::backend("supabase", "connection reset by peer at 10.0.0.3");
        assert!(!err.user_message().contains("10.0.0.3"));

        let err = Error::validation("Select between 10 and 20 words");
        assert_eq!(err.user_message(), "Select between 10 and 20 words");
    }
}
