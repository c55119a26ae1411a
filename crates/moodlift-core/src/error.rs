//! Error types for the Moodlift backend.

use thiserror::Error;

/// A shared error type for the Moodlift application.
///
/// Provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait. Handlers serialize these
/// into `{"error": ...}` JSON bodies; nothing here terminates the process.
#[derive(Error, Debug)]
pub enum MoodliftError {
    /// A configured provider call failed.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Frame capture from the camera device failed.
    #[error("capture error: {0}")]
    Capture(String),

    /// Configuration error (bad address, unusable capture command, ...).
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error (temp files, spawned processes).
    #[error("IO error: {0}")]
    Io(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen in normal operation).
    #[error("internal error: {0}")]
    Internal(String),
}

impl MoodliftError {
    /// Creates a Capture error.
    pub fn capture(message: impl Into<String>) -> Self {
        Self::Capture(message.into())
    }

    /// Creates a Config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a Capture error.
    pub fn is_capture(&self) -> bool {
        matches!(self, Self::Capture(_))
    }

    /// Check if this is a Config error.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl From<std::io::Error> for MoodliftError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for MoodliftError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// A type alias for `Result<T, MoodliftError>`.
pub type Result<T> = std::result::Result<T, MoodliftError>;

/// Outcome of a single outbound provider call.
///
/// Every expected failure mode of an external provider is a value here, not
/// a panic or an escaping error: the cascade logs the variant and advances
/// to its next strategy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider's API key is absent; treated identically to a failed call.
    #[error("provider is not configured")]
    Unconfigured,

    /// Network-level failure (connect, DNS, TLS).
    #[error("request failed: {0}")]
    Request(String),

    /// The call exceeded its fixed timeout.
    #[error("request timed out")]
    Timeout,

    /// Non-success HTTP status with whatever message the body carried.
    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    /// The provider responded 2xx but the payload was not in the expected shape.
    #[error("malformed payload: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// Creates a Status error.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Creates a Malformed error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(err.to_string())
        }
    }
}
