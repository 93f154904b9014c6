//! Persistent representation of screen configurations.
//!
//! ## Layout
//!
//! Both single configs and whole histories are DAG-CBOR encoded
//! [`VersionedMessage`] envelopes. The envelope carries the config type's
//! schema version and a `format` marker; the payload is one (or a sequence
//! of) `(tag, payload-bytes)` pairs where `payload-bytes` is the DAG-CBOR
//! encoding of the config value itself.
//!
//! Decoding checks, in order: envelope shape, format marker, schema version,
//! that every tag names a known variant, that every payload decodes, and
//! that each payload's variant matches its tag.

use std::marker::PhantomData;

use rally_core::serialization::{self, SerializationError, VersionedMessage};
use serde::{Deserialize, Serialize};

use crate::config::ScreenConfig;
use crate::error::DecodeError;

const FORMAT_KEY: &str = "format";
const CONFIG_FORMAT: &str = "rally.nav.config";
const HISTORY_FORMAT: &str = "rally.nav.history";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct PersistedEntry {
    tag: String,
    #[serde(with = "serde_bytes")]
    payload: Vec<u8>,
}

/// Converts configurations of type `C` to and from bytes.
pub struct ConfigSerializer<C> {
    _config: PhantomData<fn() -> C>,
}

impl<C: ScreenConfig> ConfigSerializer<C> {
    /// Create a serializer for `C`.
    pub fn new() -> Self {
        Self {
            _config: PhantomData,
        }
    }

    /// Serialize a single configuration.
    pub fn serialize(&self, config: &C) -> Result<Vec<u8>, SerializationError> {
        let envelope = VersionedMessage::new(Self::encode_entry(config)?, C::SCHEMA)
            .with_metadata(FORMAT_KEY, CONFIG_FORMAT);
        serialization::to_vec(&envelope)
    }

    /// Deserialize a single configuration.
    pub fn deserialize(&self, bytes: &[u8]) -> Result<C, DecodeError> {
        let envelope: VersionedMessage<PersistedEntry> = Self::open(bytes, CONFIG_FORMAT)?;
        Self::decode_entry(&envelope.payload)
    }

    /// Serialize a history, bottom entry first.
    pub fn serialize_history(&self, configs: &[C]) -> Result<Vec<u8>, SerializationError> {
        let entries = configs
            .iter()
            .map(Self::encode_entry)
            .collect::<Result<Vec<_>, _>>()?;
        let envelope =
            VersionedMessage::new(entries, C::SCHEMA).with_metadata(FORMAT_KEY, HISTORY_FORMAT);
        serialization::to_vec(&envelope)
    }

    /// Deserialize a history, bottom entry first. Never returns an empty list.
    pub fn deserialize_history(&self, bytes: &[u8]) -> Result<Vec<C>, DecodeError> {
        let envelope: VersionedMessage<Vec<PersistedEntry>> = Self::open(bytes, HISTORY_FORMAT)?;
        if envelope.payload.is_empty() {
            return Err(DecodeError::EmptyHistory);
        }
        envelope.payload.iter().map(Self::decode_entry).collect()
    }

    fn encode_entry(config: &C) -> Result<PersistedEntry, SerializationError> {
        Ok(PersistedEntry {
            tag: config.tag().to_string(),
            payload: serialization::to_vec(config)?,
        })
    }

    fn open<P>(bytes: &[u8], format: &str) -> Result<VersionedMessage<P>, DecodeError>
    where
        P: for<'de> Deserialize<'de>,
    {
        let envelope: VersionedMessage<P> =
            serialization::from_slice(bytes).map_err(|e| DecodeError::Malformed(e.to_string()))?;

        match envelope.metadata.get(FORMAT_KEY) {
            Some(found) if found == format => {}
            Some(found) => {
                return Err(DecodeError::Malformed(format!(
                    "expected `{format}` document, found `{found}`"
                )))
            }
            None => {
                return Err(DecodeError::Malformed(format!(
                    "missing format marker for `{format}` document"
                )))
            }
        }

        if !envelope.version.is_compatible(&C::SCHEMA) || envelope.version.is_newer(&C::SCHEMA) {
            return Err(DecodeError::UnsupportedVersion {
                found: envelope.version,
                expected: C::SCHEMA,
            });
        }
        Ok(envelope)
    }

    fn decode_entry(entry: &PersistedEntry) -> Result<C, DecodeError> {
        if !C::TAGS.contains(&entry.tag.as_str()) {
            return Err(DecodeError::UnknownVariant(entry.tag.clone()));
        }
        let config: C = serialization::from_slice(&entry.payload)
            .map_err(|e| DecodeError::Malformed(format!("`{}` payload: {e}", entry.tag)))?;
        if config.tag() != entry.tag {
            return Err(DecodeError::TagMismatch {
                expected: entry.tag.clone(),
                found: config.tag().to_string(),
            });
        }
        Ok(config)
    }
}

impl<C: ScreenConfig> Default for ConfigSerializer<C> {
    fn default() -> Self {
        Self::new()
    }
}
