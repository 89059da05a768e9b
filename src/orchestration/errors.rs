//! # Orchestration Error Types
//!
//! Structured error handling for the request orchestration core using
//! thiserror instead of `Box<dyn Error>` patterns.
//!
//! The terminal failure taxonomy (timeout, backend failure, cancellation) is
//! captured on the status record itself; the variants here cover the paths
//! where an operation is rejected or an internal seam fails.

use thiserror::Error;

use crate::orchestration::types::{RequestId, RequestKind};

/// Errors surfaced by orchestration operations
#[derive(Error, Debug)]
pub enum OrchestrationError {
    #[error("Invalid request parameters: {reason}")]
    InvalidParameters { reason: String },

    #[error("Request {request_id} not found in registry")]
    RequestNotFound { request_id: RequestId },

    #[error("Bus publish failed for {event}: {reason}")]
    PublishFailed { event: String, reason: String },

    #[error("Request {request_id} ({kind}) timed out after {timeout_ms}ms")]
    Timeout {
        request_id: RequestId,
        kind: RequestKind,
        timeout_ms: u64,
    },

    #[error("Internal orchestration error: {message}")]
    Internal { message: String },
}

impl OrchestrationError {
    /// Create an invalid-parameters error
    pub fn invalid_parameters(reason: impl Into<String>) -> Self {
        Self::InvalidParameters {
            reason: reason.into(),
        }
    }

    /// Create a publish-failed error
    pub fn publish_failed(event: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PublishFailed {
            event: event.into(),
            reason: reason.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<OrchestrationError> for crate::error::StrideError {
    fn from(err: OrchestrationError) -> Self {
        match err {
            OrchestrationError::InvalidParameters { reason } => {
                crate::error::StrideError::ValidationError(reason)
            }
            OrchestrationError::PublishFailed { event, reason } => {
                crate::error::StrideError::EventError(format!("{event}: {reason}"))
            }
            other => crate::error::StrideError::OrchestrationError(other.to_string()),
        }
    }
}

/// Result type for orchestration operations
pub type OrchestrationResult<T> = std::result::Result<T, OrchestrationError>;
