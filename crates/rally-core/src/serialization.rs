//! DAG-CBOR serialization for Rally persisted state
//!
//! This module provides the canonical binary format used to persist
//! navigation history and any other state that must survive process death.
//!
//! DAG-CBOR provides:
//! - Deterministic canonical encoding (equal values encode to equal bytes)
//! - Self-describing structure, so malformed input is detected on decode
//! - Compact binary encoding

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unified error type for serialization operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SerializationError {
    /// Value could not be encoded
    #[error("DAG-CBOR encode error: {0}")]
    Encode(String),

    /// Bytes are not a valid encoding of the requested type
    #[error("DAG-CBOR decode error: {0}")]
    Decode(String),
}

/// Standard Result type for serialization operations
pub type Result<T> = std::result::Result<T, SerializationError>;

/// Serialize any serde-compatible type to DAG-CBOR bytes
pub fn to_vec<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_ipld_dagcbor::to_vec(value).map_err(|e| SerializationError::Encode(e.to_string()))
}

/// Deserialize DAG-CBOR bytes to any serde-compatible type
pub fn from_slice<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T> {
    serde_ipld_dagcbor::from_slice(bytes).map_err(|e| SerializationError::Decode(e.to_string()))
}

/// Version information for semantic versioning support
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SemanticVersion {
    /// Major version number - increment for incompatible changes
    pub major: u16,
    /// Minor version number - increment for backwards-compatible additions
    pub minor: u16,
    /// Patch version number - increment for backwards-compatible bug fixes
    pub patch: u16,
}

impl SemanticVersion {
    /// Create a new semantic version
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Check if this version is compatible with another
    pub fn is_compatible(&self, other: &Self) -> bool {
        // Major version must match for compatibility
        self.major == other.major
    }

    /// Check if this version is newer than another
    pub fn is_newer(&self, other: &Self) -> bool {
        (self.major, self.minor, self.patch) > (other.major, other.minor, other.patch)
    }
}

impl std::fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Versioned envelope for persisted payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedMessage<T> {
    /// Schema version the payload was written with
    pub version: SemanticVersion,
    /// Message payload
    pub payload: T,
    /// Optional metadata for debugging
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl<T> VersionedMessage<T> {
    /// Create a new versioned message
    pub fn new(payload: T, version: SemanticVersion) -> Self {
        Self {
            version,
            payload,
            metadata: BTreeMap::new(),
        }
    }

    /// Add metadata to the message
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
