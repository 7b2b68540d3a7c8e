//! Unified error types for the sync layer.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// Unified error type for the Stock Sphere sync layer.
///
/// Every variant is scoped to the operation that produced it; none of them is
/// fatal to the process. The type is `Clone` so a single fetch failure can be
/// handed to every caller that joined the same in-flight request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SphereError {
    // ============ Client-side Errors ============
    /// The remote access port has not been initialized yet.
    ///
    /// Query bindings never surface this variant; they report a disabled
    /// placeholder instead.
    #[error("Remote access port unavailable")]
    PortUnavailable,

    /// Client-side validation failed before any remote call was made.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A submission was refused because an earlier one is still pending.
    #[error("A submission is already in progress")]
    SubmissionPending,

    // ============ Remote Errors ============
    /// The backend rejected the call.
    #[error("{operation} rejected: {reason}")]
    RemoteRejection {
        operation: &'static str,
        reason: String,
    },

    /// The request never produced a backend answer (connection, decoding).
    #[error("Transport error during {operation}: {message}")]
    Transport {
        operation: &'static str,
        message: String,
    },

    /// The blob upload collaborator failed.
    #[error("Upload failed: {0}")]
    Upload(String),

    // ============ Infrastructure Errors ============
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SphereError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::PortUnavailable => "PORT_UNAVAILABLE",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::SubmissionPending => "SUBMISSION_PENDING",
            Self::RemoteRejection { .. } => "REMOTE_REJECTION",
            Self::Transport { .. } => "TRANSPORT_ERROR",
            Self::Upload(_) => "UPLOAD_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a remote rejection for the named port operation.
    #[must_use]
    pub fn rejected<T: Into<String>>(operation: &'static str, reason: T) -> Self {
        Self::RemoteRejection {
            operation,
            reason: reason.into(),
        }
    }

    /// Creates a transport error for the named port operation.
    #[must_use]
    pub fn transport<T: ToString>(operation: &'static str, err: T) -> Self {
        Self::Transport {
            operation,
            message: err.to_string(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Checks if repeating the same call could succeed.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Upload(_))
    }

    /// Checks if the message should be shown to the user.
    ///
    /// `PortUnavailable` disables bindings instead of being displayed.
    #[must_use]
    pub const fn is_user_visible(&self) -> bool {
        !matches!(self, Self::PortUnavailable)
    }

    /// Returns the text a form should display for this error.
    ///
    /// Remote rejections show the backend's reason verbatim.
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            Self::RemoteRejection { reason, .. } => reason.clone(),
            Self::Validation(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for SphereError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization error: {}", err))
    }
}

/// Serializable error payload for logs and UI consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional field-level errors for validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

/// Field-level validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
}

impl ErrorResponse {
    /// Creates a new error response from a `SphereError`.
    #[must_use]
    pub fn from_error(error: &SphereError) -> Self {
        Self {
            code: error.error_code().to_string(),
            message: error.display_message(),
            details: None,
        }
    }

    /// Sets field-level validation errors.
    #[must_use]
    pub fn with_details(mut self, details: Vec<FieldError>) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<&SphereError> for ErrorResponse {
    fn from(error: &SphereError) -> Self {
        Self::from_error(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SphereError::PortUnavailable.error_code(), "PORT_UNAVAILABLE");
        assert_eq!(SphereError::validation("bad").error_code(), "VALIDATION_ERROR");
        assert_eq!(
            SphereError::rejected("addPost", "Unauthorized").error_code(),
            "REMOTE_REJECTION"
        );
        assert_eq!(
            SphereError::transport("getAllPosts", "connection reset").error_code(),
            "TRANSPORT_ERROR"
        );
        assert_eq!(SphereError::internal("oops").error_code(), "INTERNAL_ERROR");
        assert_eq!(
            SphereError::SubmissionPending.error_code(),
            "SUBMISSION_PENDING"
        );
    }

    #[test]
    fn test_retriable_errors() {
        assert!(SphereError::transport("getAllPosts", "timeout").is_retriable());
        assert!(!SphereError::rejected("addPost", "no").is_retriable());
        assert!(!SphereError::validation("empty").is_retriable());
        assert!(!SphereError::PortUnavailable.is_retriable());
        assert!(!SphereError::SubmissionPending.is_retriable());
    }

    #[test]
    fn test_port_unavailable_is_not_user_visible() {
        assert!(!SphereError::PortUnavailable.is_user_visible());
        assert!(SphereError::rejected("createCourse", "denied").is_user_visible());
    }

    #[test]
    fn test_display_message_uses_remote_reason() {
        let err = SphereError::rejected("enrollInCourse", "Already enrolled");
        assert_eq!(err.display_message(), "Already enrolled");
        assert!(err.to_string().contains("enrollInCourse"));
    }

    #[test]
    fn test_error_response_from_error() {
        let err = SphereError::validation("name: required");
        let response = ErrorResponse::from(&err);
        assert_eq!(response.code, "VALIDATION_ERROR");
        assert_eq!(response.message, "name: required");
        assert!(response.details.is_none());
    }

    #[test]
    fn test_error_response_with_details() {
        let err = SphereError::validation("bad input");
        let details = vec![FieldError {
            field: "title".to_string(),
            message: "required".to_string(),
            code: "not_blank".to_string(),
        }];
        let response = ErrorResponse::from_error(&err).with_details(details);
        assert_eq!(response.details.map(|d| d.len()), Some(1));
    }
}
