//! Rally Core - runtime-agnostic foundation
//!
//! This crate provides the primitives every other Rally crate builds on.
//! It contains no navigation or screen logic.
//!
//! - [`errors`]: the unified [`RallyError`] type
//! - [`reactive`]: [`Observable`] state cells with replay-latest subscriptions
//! - [`task`]: structured [`TaskScope`]s with cascading cancellation
//! - [`serialization`]: canonical DAG-CBOR encoding and version envelopes

#![forbid(unsafe_code)]

/// Unified error handling
pub mod errors;

/// Observable values for controller state
pub mod reactive;

/// DAG-CBOR serialization (canonical persisted format)
pub mod serialization;

/// Structured task scopes and cancellation tokens
pub mod task;

pub use errors::{RallyError, Result};
pub use reactive::{Observable, Subscription};
pub use serialization::{SemanticVersion, SerializationError, VersionedMessage};
pub use task::{CancellationToken, NeverCancel, ScopeToken, TaskScope};
