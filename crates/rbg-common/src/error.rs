//! Error types for RoleBasedGroup operations
//!
//! Errors are structured with fields to aid debugging in production.
//! Each variant carries the group it concerns and, where known, the
//! offending field path or resource kind.

use thiserror::Error;

/// Default context value when no specific context is available
pub const UNKNOWN_CONTEXT: &str = "unknown";

/// Main error type for RoleBasedGroup operations
#[derive(Debug, Error)]
pub enum Error {
    /// Validation error for CRD specs
    #[error("validation error for {group}: {message}")]
    Validation {
        /// Name of the RoleBasedGroup with invalid configuration
        group: String,
        /// Description of what's invalid
        message: String,
        /// The invalid field path (e.g., "spec.podGroupPolicy.volcanoScheduling.queue")
        field: Option<String>,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
        /// The resource kind being serialized (if known)
        kind: Option<String>,
    },
}

impl Error {
    /// Create a validation error with the given message
    ///
    /// For simple validation errors without group context.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            group: UNKNOWN_CONTEXT.to_string(),
            message: msg.into(),
            field: None,
        }
    }

    /// Create a validation error with group context
    pub fn validation_for(group: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Validation {
            group: group.into(),
            message: msg.into(),
            field: None,
        }
    }

    /// Create a validation error with group context and field path
    pub fn validation_for_field(
        group: impl Into<String>,
        field: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self::Validation {
            group: group.into(),
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Create a serialization error for a known resource kind
    pub fn serialization(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: Some(kind.into()),
        }
    }

    /// Check if this error is retryable
    ///
    /// Neither variant is: both require a spec or code fix, not a requeue.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Validation { .. } => false,
            Error::Serialization { .. } => false,
        }
    }

    /// Get the group name if this error is associated with a specific RoleBasedGroup
    pub fn group(&self) -> Option<&str> {
        match self {
            Error::Validation { group, .. } if group != UNKNOWN_CONTEXT => Some(group),
            _ => None,
        }
    }

    /// Get the field path if this is a validation error that names one
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::Validation { field, .. } => field.as_deref(),
            Error::Serialization { .. } => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization {
            message: e.to_string(),
            kind: None,
        }
    }
}
