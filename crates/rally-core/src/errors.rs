//! Unified error system for Rally
//!
//! A single error type shared by every layer above the navigation core.
//! Navigation and decode failures have their own narrow types in `rally-nav`
//! because they are always recovered locally.

use serde::{Deserialize, Serialize};

/// Unified error type for Rally operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum RallyError {
    /// Invalid input or configuration
    #[error("Invalid: {message}")]
    Invalid {
        /// Error message describing the invalid input
        message: String,
    },

    /// Resource not found
    #[error("Not found: {message}")]
    NotFound {
        /// Error message describing what was not found
        message: String,
    },

    /// Permission denied
    #[error("Permission denied: {message}")]
    PermissionDenied {
        /// Error message describing the permission issue
        message: String,
    },

    /// Network or transport error
    #[error("Network error: {message}")]
    Network {
        /// Error message describing the network issue
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message describing the serialization failure
        message: String,
    },

    /// Storage operation failed
    #[error("Storage error: {message}")]
    Storage {
        /// Error message describing the storage failure
        message: String,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal error
        message: String,
    },
}

impl RallyError {
    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a permission denied error
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Prefix the message with what was being attempted, keeping the category.
    #[must_use]
    pub fn with_context(self, context: impl std::fmt::Display) -> Self {
        let prefix = |message: String| format!("{context}: {message}");
        match self {
            Self::Invalid { message } => Self::Invalid {
                message: prefix(message),
            },
            Self::NotFound { message } => Self::NotFound {
                message: prefix(message),
            },
            Self::PermissionDenied { message } => Self::PermissionDenied {
                message: prefix(message),
            },
            Self::Network { message } => Self::Network {
                message: prefix(message),
            },
            Self::Serialization { message } => Self::Serialization {
                message: prefix(message),
            },
            Self::Storage { message } => Self::Storage {
                message: prefix(message),
            },
            Self::Internal { message } => Self::Internal {
                message: prefix(message),
            },
        }
    }

    /// Whether retrying the same operation may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Storage { .. })
    }

    /// Short message suitable for an error view, without the category prefix.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Invalid { message }
            | Self::NotFound { message }
            | Self::PermissionDenied { message }
            | Self::Network { message }
            | Self::Serialization { message }
            | Self::Storage { message }
            | Self::Internal { message } => message,
        }
    }
}

/// Standard Result type for Rally operations
pub type Result<T> = std::result::Result<T, RallyError>;

impl From<std::io::Error> for RallyError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::not_found(err.to_string()),
            std::io::ErrorKind::PermissionDenied => Self::permission_denied(err.to_string()),
            _ => Self::storage(err.to_string()),
        }
    }
}

impl From<crate::serialization::SerializationError> for RallyError {
    fn from(err: crate::serialization::SerializationError) -> Self {
        Self::serialization(err.to_string())
    }
}
