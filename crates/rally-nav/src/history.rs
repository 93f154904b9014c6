//! Navigation history: the ordered, never-empty sequence of entries.
//!
//! The root entry is stored apart from the entries above it, so the history
//! cannot become empty through `pop` or `replace`.

use std::fmt;
use std::sync::Arc;

use rally_core::TaskScope;
use serde::{Deserialize, Serialize};

use crate::config::ScreenConfig;
use crate::error::NavigationError;
use crate::factory::ScreenController;

/// Process-unique identity of a navigation entry.
///
/// Two entries holding equal configs still have distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryId(u64);

impl EntryId {
    /// Wrap a raw id. Stacks allocate their own; this exists for tests and
    /// for building a [`ScreenContext`](crate::ScreenContext) by hand.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry-{}", self.0)
    }
}

/// One position in the history: a config, its lazily created controller,
/// and the task scope bounding the controller's work.
pub struct NavigationEntry<C, S> {
    id: EntryId,
    config: C,
    controller: Option<S>,
    scope: TaskScope,
}

impl<C: ScreenConfig, S: ScreenController> NavigationEntry<C, S> {
    pub(crate) fn new(id: EntryId, config: C, scope: TaskScope) -> Self {
        Self {
            id,
            config,
            controller: None,
            scope,
        }
    }

    /// Entry id.
    pub fn id(&self) -> EntryId {
        self.id
    }

    /// Screen configuration of this entry.
    pub fn config(&self) -> &C {
        &self.config
    }

    /// Live controller, if one has been created.
    pub fn controller(&self) -> Option<&S> {
        self.controller.as_ref()
    }

    /// Scope owning this entry's asynchronous work.
    pub fn scope(&self) -> &TaskScope {
        &self.scope
    }

    pub(crate) fn has_controller(&self) -> bool {
        self.controller.is_some()
    }

    pub(crate) fn attach(&mut self, controller: S) {
        debug_assert!(self.controller.is_none(), "entry already has a controller");
        self.controller = Some(controller);
    }

    /// Tear the entry down: destroy the controller, then cancel its scope.
    ///
    /// Idempotent; the controller is destroyed at most once.
    pub(crate) fn release(&mut self) {
        if let Some(controller) = self.controller.take() {
            controller.on_destroy();
        }
        self.scope.cancel();
    }

    pub(crate) fn into_config(self) -> C {
        self.config
    }
}

impl<C: fmt::Debug, S> fmt::Debug for NavigationEntry<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationEntry")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("live", &self.controller.is_some())
            .finish()
    }
}

/// Ordered entries, bottom (root) to top.
pub(crate) struct NavigationHistory<C, S> {
    root: NavigationEntry<C, S>,
    above: Vec<NavigationEntry<C, S>>,
}

impl<C: ScreenConfig, S: ScreenController> NavigationHistory<C, S> {
    pub(crate) fn new(root: NavigationEntry<C, S>) -> Self {
        Self {
            root,
            above: Vec::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.above.len() + 1
    }

    pub(crate) fn top(&self) -> &NavigationEntry<C, S> {
        self.above.last().unwrap_or(&self.root)
    }

    pub(crate) fn top_mut(&mut self) -> &mut NavigationEntry<C, S> {
        self.above.last_mut().unwrap_or(&mut self.root)
    }

    pub(crate) fn get(&self, id: EntryId) -> Option<&NavigationEntry<C, S>> {
        self.iter().find(|entry| entry.id == id)
    }

    /// Entries bottom to top.
    pub(crate) fn iter(&self) -> impl DoubleEndedIterator<Item = &NavigationEntry<C, S>> {
        std::iter::once(&self.root).chain(self.above.iter())
    }

    pub(crate) fn push(&mut self, entry: NavigationEntry<C, S>) {
        self.above.push(entry);
    }

    /// Remove the top entry. Returns `None` at the root.
    pub(crate) fn pop(&mut self) -> Option<NavigationEntry<C, S>> {
        self.above.pop()
    }

    /// Install `entries` as the whole history and hand back the previous
    /// entries, top first, for the caller to release.
    pub(crate) fn replace(
        &mut self,
        entries: Vec<NavigationEntry<C, S>>,
    ) -> Result<Vec<NavigationEntry<C, S>>, NavigationError> {
        let mut entries = entries.into_iter();
        let root = entries.next().ok_or(NavigationError::EmptyHistory)?;

        let old_root = std::mem::replace(&mut self.root, root);
        let old_above = std::mem::replace(&mut self.above, entries.collect());

        let mut removed = old_above;
        removed.reverse();
        removed.push(old_root);
        Ok(removed)
    }

    /// Release every entry top to bottom. The history keeps its (released)
    /// root so it stays structurally non-empty.
    pub(crate) fn release_all(&mut self) {
        while let Some(mut entry) = self.above.pop() {
            entry.release();
        }
        self.root.release();
    }

    pub(crate) fn snapshot(&self, revision: u64) -> HistorySnapshot<C> {
        HistorySnapshot {
            revision,
            entries: self
                .iter()
                .map(|entry| SnapshotEntry {
                    id: entry.id,
                    config: entry.config.clone(),
                })
                .collect(),
        }
    }
}

/// Identity and config of one entry inside a [`HistorySnapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEntry<C> {
    /// Entry id
    pub id: EntryId,
    /// Screen configuration
    pub config: C,
}

/// Immutable view of the whole history after one mutation.
///
/// Cloning is cheap. Revisions increase by one per successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistorySnapshot<C> {
    revision: u64,
    entries: Arc<[SnapshotEntry<C>]>,
}

impl<C> HistorySnapshot<C> {
    /// Mutation counter of the stack that produced this snapshot.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Entries bottom to top.
    pub fn entries(&self) -> &[SnapshotEntry<C>] {
        &self.entries
    }

    /// Top (visible) entry.
    pub fn top(&self) -> Option<&SnapshotEntry<C>> {
        self.entries.last()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for snapshots produced by a running stack.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configs bottom to top.
    pub fn configs(&self) -> impl Iterator<Item = &C> {
        self.entries.iter().map(|entry| &entry.config)
    }

    /// Entry ids bottom to top.
    pub fn ids(&self) -> impl Iterator<Item = EntryId> + '_ {
        self.entries.iter().map(|entry| entry.id)
    }
}
