//! The navigation stack: history, lazy controller construction, snapshot
//! notification and persisted-state restore.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use rally_core::{RallyError, TaskScope};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::ScreenConfig;
use crate::error::{DecodeError, NavigationError};
use crate::factory::{ScreenContext, ScreenFactory};
use crate::history::{EntryId, HistorySnapshot, NavigationEntry, NavigationHistory};
use crate::navigator::{NavCommand, Navigator, PopOutcome};
use crate::serializer::ConfigSerializer;

/// Where the initial history of a stack came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreSource {
    /// Built from a caller-supplied config or history.
    Default,
    /// Decoded from persisted bytes.
    Persisted,
    /// Persisted bytes failed to decode; the default config was used.
    Fallback(DecodeError),
}

/// Back-stack of screen configs with one lazily created controller per entry.
///
/// All mutations take `&mut self` and never block. Every successful mutation
/// publishes a [`HistorySnapshot`] to every subscriber, in call order.
///
/// Dropping the stack is equivalent to [`NavigationStack::shutdown`].
pub struct NavigationStack<C, F>
where
    C: ScreenConfig,
    F: ScreenFactory<C>,
{
    factory: F,
    history: NavigationHistory<C, F::Controller>,
    root_scope: TaskScope,
    navigator: Navigator<C>,
    commands: mpsc::UnboundedReceiver<NavCommand<C>>,
    subscribers: Vec<mpsc::UnboundedSender<HistorySnapshot<C>>>,
    serializer: ConfigSerializer<C>,
    next_entry_id: u64,
    revision: u64,
    restore_source: RestoreSource,
    shut_down: bool,
}

impl<C, F> NavigationStack<C, F>
where
    C: ScreenConfig,
    F: ScreenFactory<C>,
{
    /// Start a session with a single entry. Its controller is created now.
    pub fn new(factory: F, initial: C) -> Self {
        Self::build(factory, initial, Vec::new(), RestoreSource::Default)
    }

    /// Start a session from an explicit history, bottom first.
    ///
    /// Only the top controller is created; entries beneath get theirs when
    /// they become visible again.
    pub fn with_history(factory: F, configs: Vec<C>) -> Result<Self, NavigationError> {
        let mut configs = configs.into_iter();
        let root = configs.next().ok_or(NavigationError::EmptyHistory)?;
        Ok(Self::build(
            factory,
            root,
            configs.collect(),
            RestoreSource::Default,
        ))
    }

    /// Start a session from persisted bytes, falling back to `[default]` when
    /// nothing was persisted or the bytes cannot be decoded.
    pub fn restore(factory: F, bytes: Option<&[u8]>, default: C) -> Self {
        let Some(bytes) = bytes else {
            info!(initial = default.tag(), "no persisted navigation history");
            return Self::build(factory, default, Vec::new(), RestoreSource::Default);
        };

        let decoded = ConfigSerializer::<C>::new().deserialize_history(bytes);
        match decoded.map(Vec::into_iter) {
            Ok(mut configs) => match configs.next() {
                Some(root) => {
                    let rest: Vec<C> = configs.collect();
                    info!(depth = rest.len() + 1, "navigation history restored");
                    Self::build(factory, root, rest, RestoreSource::Persisted)
                }
                None => Self::fallback(factory, default, DecodeError::EmptyHistory),
            },
            Err(err) => Self::fallback(factory, default, err),
        }
    }

    fn fallback(factory: F, default: C, err: DecodeError) -> Self {
        warn!(error = %err, fallback = default.tag(), "discarding persisted navigation history");
        Self::build(factory, default, Vec::new(), RestoreSource::Fallback(err))
    }

    fn build(factory: F, root: C, rest: Vec<C>, restore_source: RestoreSource) -> Self {
        let root_scope = TaskScope::new("navigation");
        let root_id = EntryId::new(0);
        let root = NavigationEntry::new(root_id, root, root_scope.child(root_id.to_string()));
        let (navigator, commands) = Navigator::channel();

        let mut stack = Self {
            factory,
            history: NavigationHistory::new(root),
            root_scope,
            navigator,
            commands,
            subscribers: Vec::new(),
            serializer: ConfigSerializer::new(),
            next_entry_id: 1,
            revision: 0,
            restore_source,
            shut_down: false,
        };
        for config in rest {
            let entry = stack.new_entry(config);
            stack.history.push(entry);
        }
        stack.ensure_top_controller();
        debug!(
            depth = stack.depth(),
            top = stack.current().tag(),
            "navigation stack created"
        );
        stack
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Config of the visible (top) entry.
    pub fn current(&self) -> &C {
        self.history.top().config()
    }

    /// Number of entries. Always at least one.
    pub fn depth(&self) -> usize {
        self.history.len()
    }

    /// Current history as a snapshot.
    pub fn snapshot(&self) -> HistorySnapshot<C> {
        self.history.snapshot(self.revision)
    }

    /// Controller of the visible entry.
    pub fn active_controller(&self) -> Option<&F::Controller> {
        self.history.top().controller()
    }

    /// Controller of a specific entry, if the entry is present and its
    /// controller has been created.
    pub fn controller(&self, id: EntryId) -> Option<&F::Controller> {
        self.history.get(id).and_then(NavigationEntry::controller)
    }

    /// Handle for queueing commands from controllers or other owners.
    pub fn navigator(&self) -> Navigator<C> {
        self.navigator.clone()
    }

    /// The factory building this stack's controllers.
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// How the initial history was obtained.
    pub fn restore_source(&self) -> &RestoreSource {
        &self.restore_source
    }

    /// Subscribe to history changes.
    ///
    /// The subscription yields the current snapshot first, then one snapshot
    /// per later mutation in order. It ends after shutdown.
    pub fn subscribe(&mut self) -> HistorySubscription<C> {
        let (tx, rx) = mpsc::unbounded_channel();
        if !self.shut_down && tx.send(self.snapshot()).is_ok() {
            self.subscribers.push(tx);
        }
        HistorySubscription { rx }
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Push `config` as a new top entry.
    ///
    /// The previous top keeps its controller. Pushing a config equal to the
    /// current one still creates a distinct entry.
    pub fn push(&mut self, config: C) {
        let entry = self.new_entry(config);
        debug!(entry = %entry.id(), tag = entry.config().tag(), "navigation push");
        self.history.push(entry);
        self.ensure_top_controller();
        self.publish();
    }

    /// Pop the top entry, destroying its controller.
    ///
    /// At the root this is a no-op: history, controller and subscribers are
    /// left untouched.
    pub fn pop(&mut self) -> PopOutcome<C> {
        let Some(mut entry) = self.history.pop() else {
            debug!(tag = self.current().tag(), "navigation pop ignored at root");
            return PopOutcome::AtRoot;
        };
        debug!(entry = %entry.id(), tag = entry.config().tag(), "navigation pop");
        entry.release();
        self.ensure_top_controller();
        self.publish();
        PopOutcome::Popped(entry.into_config())
    }

    /// Replace the whole history with a single entry for `config`.
    pub fn replace_all(&mut self, config: C) {
        let entry = self.new_entry(config);
        self.install(vec![entry]);
    }

    /// Replace the whole history with `configs`, bottom first.
    ///
    /// An empty list is rejected and leaves the stack unchanged.
    pub fn replace_all_with(&mut self, configs: Vec<C>) -> Result<(), NavigationError> {
        if configs.is_empty() {
            return Err(NavigationError::EmptyHistory);
        }
        let entries = configs
            .into_iter()
            .map(|config| self.new_entry(config))
            .collect();
        self.install(entries);
        Ok(())
    }

    fn install(&mut self, entries: Vec<NavigationEntry<C, F::Controller>>) {
        match self.history.replace(entries) {
            Ok(removed) => {
                debug!(
                    released = removed.len(),
                    depth = self.depth(),
                    top = self.current().tag(),
                    "navigation replace-all"
                );
                for mut entry in removed {
                    entry.release();
                }
                self.ensure_top_controller();
                self.publish();
            }
            Err(err) => debug!(error = %err, "navigation replace-all rejected"),
        }
    }

    /// Apply one command.
    pub fn dispatch(&mut self, command: NavCommand<C>) -> Result<(), NavigationError> {
        match command {
            NavCommand::Push(config) => {
                self.push(config);
                Ok(())
            }
            NavCommand::Pop => self.pop().into_result().map(|_| ()),
            NavCommand::ReplaceAll(config) => {
                self.replace_all(config);
                Ok(())
            }
            NavCommand::ReplaceAllWith(configs) => self.replace_all_with(configs),
        }
    }

    /// Apply every queued command without waiting. Returns how many ran.
    pub fn process_pending(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(command) = self.commands.try_recv() {
            if let Err(err) = self.dispatch(command) {
                debug!(error = %err, "queued navigation command had no effect");
            }
            processed += 1;
        }
        processed
    }

    /// Wait for the next queued command and apply it.
    pub async fn process_next(&mut self) -> Result<(), NavigationError> {
        // The stack holds a sender itself, so the queue never closes while
        // `self` is alive.
        match self.commands.recv().await {
            Some(command) => self.dispatch(command),
            None => Ok(()),
        }
    }

    // ========================================================================
    // Persistence and teardown
    // ========================================================================

    /// Serialize the configs of every entry, bottom first. Controllers are
    /// not persisted.
    pub fn save(&self) -> Result<Vec<u8>, RallyError> {
        let configs: Vec<C> = self.history.iter().map(|e| e.config().clone()).collect();
        Ok(self.serializer.serialize_history(&configs)?)
    }

    /// End the session: destroy every controller top to bottom, cancel all
    /// scoped work and end every subscription.
    pub fn shutdown(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        let depth = self.depth();
        self.history.release_all();
        self.root_scope.cancel();
        self.subscribers.clear();
        info!(depth, "navigation stack shut down");
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn new_entry(&mut self, config: C) -> NavigationEntry<C, F::Controller> {
        let id = EntryId::new(self.next_entry_id);
        self.next_entry_id += 1;
        let scope = self.root_scope.child(id.to_string());
        NavigationEntry::new(id, config, scope)
    }

    fn ensure_top_controller(&mut self) {
        let top = self.history.top_mut();
        if top.has_controller() {
            return;
        }
        let ctx = ScreenContext::new(top.id(), top.scope().clone(), self.navigator.clone());
        let controller = self.factory.create(top.config(), ctx);
        debug!(entry = %top.id(), tag = top.config().tag(), "screen controller created");
        top.attach(controller);
    }

    fn publish(&mut self) {
        self.revision += 1;
        let snapshot = self.snapshot();
        self.subscribers
            .retain(|subscriber| subscriber.send(snapshot.clone()).is_ok());
    }
}

impl<C, F> Drop for NavigationStack<C, F>
where
    C: ScreenConfig,
    F: ScreenFactory<C>,
{
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Ordered feed of [`HistorySnapshot`]s from one stack.
#[derive(Debug)]
pub struct HistorySubscription<C> {
    rx: mpsc::UnboundedReceiver<HistorySnapshot<C>>,
}

impl<C> HistorySubscription<C> {
    /// Next snapshot if one is already queued.
    pub fn try_recv(&mut self) -> Option<HistorySnapshot<C>> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next snapshot. `None` once the stack has shut down and
    /// every queued snapshot was delivered.
    pub async fn recv(&mut self) -> Option<HistorySnapshot<C>> {
        self.rx.recv().await
    }
}

impl<C> Stream for HistorySubscription<C> {
    type Item = HistorySnapshot<C>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}
