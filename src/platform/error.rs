//! Platform API error types.
//!
//! Every remote call may fail with an error carrying a human-readable
//! message. Nothing in this crate retries automatically: transport failures
//! propagate to the point of use, where the dispatch loop logs them with
//! recipient context and moves on.

use thiserror::Error;

/// An error from the remote messaging platform or its transport.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The platform rejected the call and returned an error payload.
    #[error("platform error {code}: {message}")]
    Api {
        /// Platform-assigned error code.
        code: i64,
        /// Human-readable message from the platform.
        message: String,
    },

    /// The HTTP transport failed before a platform response was obtained.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not decode as valid JSON.
    #[error("response decode error: {0}")]
    Json(#[from] serde_json::Error),

    /// The response decoded but did not have the expected shape.
    #[error("malformed platform response: {0}")]
    Malformed(String),
}

impl PlatformError {
    /// Creates an API error with a message (used by tests and mock platforms).
    pub fn api(code: i64, message: impl Into<String>) -> Self {
        PlatformError::Api {
            code,
            message: message.into(),
        }
    }
}

/// Result type for platform operations.
pub type Result<T> = std::result::Result<T, PlatformError>;
