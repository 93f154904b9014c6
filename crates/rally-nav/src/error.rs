//! Navigation core errors.
//!
//! Both types are recovered inside the navigation core: a pop at the root is
//! a no-op, and a decode failure falls back to the default configuration.

use rally_core::SemanticVersion;

/// Errors from stack mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    /// Pop attempted while only the root entry remains.
    #[error("already at the navigation root")]
    AtRoot,

    /// A replacement history must contain at least one configuration.
    #[error("navigation history cannot be empty")]
    EmptyHistory,
}

/// Errors from decoding persisted configurations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Bytes are not a structurally valid encoding (truncated, corrupted, wrong shape).
    #[error("malformed navigation state: {0}")]
    Malformed(String),

    /// Written by an incompatible or newer schema.
    #[error("unsupported navigation schema {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version found in the persisted envelope
        found: SemanticVersion,
        /// Version this build reads
        expected: SemanticVersion,
    },

    /// Tag does not name any variant of the closed config set.
    #[error("unknown screen variant `{0}`")]
    UnknownVariant(String),

    /// Payload decoded to a different variant than its tag claims.
    #[error("screen tag `{expected}` does not match payload variant `{found}`")]
    TagMismatch {
        /// Tag recorded next to the payload
        expected: String,
        /// Tag of the decoded payload
        found: String,
    },

    /// Persisted history contained no entries.
    #[error("persisted navigation history is empty")]
    EmptyHistory,
}
