//! rpc-cachetools error types

use std::time::Duration;

/// rpc-cachetools error types
#[derive(Debug, thiserror::Error)]
pub enum CachetoolsError {
    // Remote call errors
    /// The remote service raised an application or transport error.
    #[error("remote error calling {method}: {message}")]
    Remote { method: String, message: String },

    /// The remote call did not complete before its deadline.
    #[error("remote call timed out after {0:?}")]
    Timeout(Duration),

    #[error("method not found: {0}")]
    MethodNotFound(String),

    /// The detached task running a remote call panicked or was cancelled.
    #[error("remote call task failed: {0}")]
    TaskFailed(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl CachetoolsError {
    /// Build a [`CachetoolsError::Remote`] for `method`.
    pub fn remote(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            method: method.into(),
            message: message.into(),
        }
    }

    /// Whether this error is a deadline overrun.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Whether this error originated in the remote service.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. } | Self::MethodNotFound(_))
    }
}

impl From<tokio::task::JoinError> for CachetoolsError {
    fn from(err: tokio::task::JoinError) -> Self {
        CachetoolsError::TaskFailed(err.to_string())
    }
}

/// Result type alias for rpc-cachetools operations
pub type Result<T> = std::result::Result<T, CachetoolsError>;
