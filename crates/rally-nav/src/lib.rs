//! Rally Nav - typed navigation back-stack
//!
//! A [`NavigationStack`] owns an ordered, never-empty history of screen
//! configurations. Each entry gets a controller from a [`ScreenFactory`]
//! the first time it is visible, and a child [`TaskScope`] that is cancelled
//! when the entry leaves the history. The configs (never the controllers)
//! round-trip through [`ConfigSerializer`] so a session can be restored.
//!
//! ```text
//! Navigator ──NavCommand──▶ NavigationStack ──HistorySnapshot──▶ subscribers
//!                               │
//!                               ├─ ScreenFactory::create (lazy, top entry only)
//!                               └─ ConfigSerializer (save / restore)
//! ```
//!
//! [`TaskScope`]: rally_core::TaskScope

#![forbid(unsafe_code)]

/// Screen configuration contract
pub mod config;

/// Navigation and decode errors
pub mod error;

/// Controller construction seam
pub mod factory;

/// Entries, history and snapshots
pub mod history;

/// Navigation commands and the navigator handle
pub mod navigator;

/// Persisted config format
pub mod serializer;

/// The navigation stack
pub mod stack;

pub use config::ScreenConfig;
pub use error::{DecodeError, NavigationError};
pub use factory::{ScreenContext, ScreenController, ScreenFactory};
pub use history::{EntryId, HistorySnapshot, NavigationEntry, SnapshotEntry};
pub use navigator::{NavCommand, Navigator, PopOutcome};
pub use serializer::ConfigSerializer;
pub use stack::{HistorySubscription, NavigationStack, RestoreSource};
