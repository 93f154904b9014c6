//! Loading lifecycle shared by every data-bearing screen.
//!
//! Controllers keep one [`Loadable`] per independently loaded piece of data
//! and one `Observable<ActionState>` per user action. Loads and actions run
//! inside the screen's task scope and always leave their state terminal,
//! unless the scope is cancelled first, in which case the state has already
//! been closed by the controller.
//!
//! A new load on a [`Loadable`] supersedes the one in flight: the older
//! request is aborted and its result, should it still arrive, is dropped.

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use rally_core::{Observable, RallyError, Subscription, TaskScope};
use tracing::{debug, warn};

/// State of data being loaded for a screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState<T> {
    /// Request in flight.
    #[default]
    Loading,
    /// Data available.
    Success(T),
    /// Request failed; recoverable by retrying.
    Error(String),
}

impl<T> LoadState<T> {
    /// Whether a request is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    /// Loaded value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            LoadState::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Error message, if the load failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Transform the loaded value, keeping `Loading` and `Error` as they are.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LoadState<U> {
        match self {
            LoadState::Loading => LoadState::Loading,
            LoadState::Success(value) => LoadState::Success(f(value)),
            LoadState::Error(message) => LoadState::Error(message),
        }
    }
}

impl<T> From<Result<T, RallyError>> for LoadState<T> {
    fn from(result: Result<T, RallyError>) -> Self {
        match result {
            Ok(value) => LoadState::Success(value),
            Err(err) => LoadState::Error(err.user_message().to_string()),
        }
    }
}

/// State of a one-shot user action (join, RSVP, submit, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ActionState {
    /// Nothing in flight.
    #[default]
    Idle,
    /// Action in flight.
    Pending,
    /// Last attempt failed; the user may try again.
    Failed(String),
}

impl ActionState {
    /// Whether an action is in flight.
    pub fn is_pending(&self) -> bool {
        matches!(self, ActionState::Pending)
    }
}

/// Data loaded for a screen.
///
/// Clones share the same state. Each [`Loadable::load`] runs in its own child
/// scope of the screen's scope and bumps a generation; only the latest
/// generation may write its result.
pub struct Loadable<T> {
    state: Observable<LoadState<T>>,
    slot: Arc<Mutex<LoadSlot>>,
}

#[derive(Default)]
struct LoadSlot {
    generation: u64,
    inflight: Option<TaskScope>,
}

impl LoadSlot {
    /// Invalidate the request in flight, if any.
    fn supersede(&mut self) -> u64 {
        if let Some(previous) = self.inflight.take() {
            previous.cancel();
        }
        self.generation += 1;
        self.generation
    }
}

impl<T> Clone for Loadable<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            slot: self.slot.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Default for Loadable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> Loadable<T> {
    /// Start out `Loading` with nothing in flight.
    pub fn new() -> Self {
        Self {
            state: Observable::new(LoadState::Loading),
            slot: Arc::default(),
        }
    }

    /// Current state.
    pub fn get(&self) -> LoadState<T> {
        self.state.get()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> Subscription<LoadState<T>> {
        self.state.subscribe()
    }

    /// Whether the last load failed.
    pub fn is_error(&self) -> bool {
        self.state.get().error().is_some()
    }

    /// Number of loads and resolutions issued so far.
    pub fn generation(&self) -> u64 {
        self.slot.lock().generation
    }

    /// Set `Loading` and resolve from `load` inside a child of `scope`,
    /// aborting any load still in flight.
    ///
    /// Returns `false` without touching the state if `scope` is cancelled or
    /// the state is closed.
    pub fn load<Fut>(&self, scope: &TaskScope, load: Fut) -> bool
    where
        Fut: Future<Output = Result<T, RallyError>> + Send + 'static,
    {
        let mut slot = self.slot.lock();
        if scope.is_cancelled() || self.state.is_closed() {
            return false;
        }
        let generation = slot.supersede();
        let child = scope.child(format!("{}/load-{generation}", scope.label()));
        self.state.set(LoadState::Loading);

        let state = self.state.clone();
        let shared = self.slot.clone();
        let label = child.label().to_string();
        let spawned = child.spawn(async move {
            let result = load.await;
            if let Err(err) = &result {
                warn!(scope = %label, error = %err, "screen load failed");
            }
            // Checked and written under the slot lock so a newer load cannot
            // slip in between.
            let slot = shared.lock();
            if slot.generation == generation {
                state.set(LoadState::from(result));
            } else {
                debug!(scope = %label, "superseded load discarded");
            }
        });
        slot.inflight = Some(child);
        spawned
    }

    /// Replace the state with fresher data, superseding any load in flight.
    pub fn resolve(&self, value: T) -> bool {
        let mut slot = self.slot.lock();
        if self.state.is_closed() {
            return false;
        }
        slot.supersede();
        self.state.set(LoadState::Success(value))
    }

    /// Edit loaded data in place. `Loading` and `Error` are left untouched
    /// and a load in flight keeps running.
    pub fn edit(&self, f: impl FnOnce(&mut T)) -> bool {
        let _slot = self.slot.lock();
        self.state.update(|state| {
            state.map(|mut value| {
                f(&mut value);
                value
            })
        })
    }

    /// Close the state and abort any load in flight.
    pub fn close(&self) -> bool {
        let mut slot = self.slot.lock();
        if let Some(inflight) = slot.inflight.take() {
            inflight.cancel();
        }
        self.state.close()
    }
}

impl<T: Clone + Send + Sync + std::fmt::Debug + 'static> std::fmt::Debug for Loadable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Loadable")
            .field("state", &self.state.get())
            .field("generation", &self.generation())
            .finish()
    }
}

/// Run a user action inside `scope`, tracking it in `status`.
///
/// Ignored (returns `false`) while a previous action on the same status is
/// still pending. On success `status` returns to `Idle` and `on_success`
/// receives the result; on failure `status` becomes `Failed`.
pub fn spawn_action<T, Fut, S>(
    scope: &TaskScope,
    status: &Observable<ActionState>,
    action: Fut,
    on_success: S,
) -> bool
where
    T: Send + 'static,
    Fut: Future<Output = Result<T, RallyError>> + Send + 'static,
    S: FnOnce(T) + Send + 'static,
{
    if scope.is_cancelled() {
        return false;
    }
    let mut started = false;
    status.update(|current| {
        if current.is_pending() {
            current
        } else {
            started = true;
            ActionState::Pending
        }
    });
    if !started {
        return false;
    }

    let status = status.clone();
    let label = scope.label().to_string();
    scope.spawn(async move {
        match action.await {
            Ok(value) => {
                // Closed status means the screen is gone; skip the follow-up.
                if status.set(ActionState::Idle) {
                    on_success(value);
                }
            }
            Err(err) => {
                warn!(scope = %label, error = %err, "screen action failed");
                status.set(ActionState::Failed(err.user_message().to_string()));
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::oneshot;

    async fn settle<T: Clone + Send + Sync + 'static>(
        mut sub: Subscription<T>,
        done: impl Fn(&T) -> bool,
    ) -> T {
        loop {
            let value = sub.get();
            if done(&value) {
                return value;
            }
            if sub.changed().await.is_none() {
                return sub.get();
            }
        }
    }

    async fn let_tasks_run() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn result_conversion_uses_user_message() {
        let state: LoadState<u8> = Err(RallyError::network("offline")).into();
        assert_eq!(state.error(), Some("offline"));
        let state: LoadState<u8> = Ok(3).into();
        assert_eq!(state.value(), Some(&3));
        assert_eq!(state.map(|v| v * 2), LoadState::Success(6));
    }

    #[tokio::test]
    async fn load_reaches_success() {
        let scope = TaskScope::new("test");
        let data = Loadable::new();
        assert!(data.load(&scope, async { Ok(5u32) }));
        assert!(data.get().is_loading());
        let value = settle(data.subscribe(), |s| !s.is_loading()).await;
        assert_eq!(value, LoadState::Success(5));
    }

    #[tokio::test]
    async fn load_reaches_error() {
        let scope = TaskScope::new("test");
        let data = Loadable::<u32>::new();
        data.load(&scope, async { Err(RallyError::not_found("gone")) });
        let value = settle(data.subscribe(), |s| !s.is_loading()).await;
        assert_eq!(value, LoadState::Error("gone".to_string()));
        assert!(data.is_error());
    }

    #[tokio::test]
    async fn cancelled_scope_rejects_load() {
        let scope = TaskScope::new("test");
        let data = Loadable::new();
        data.resolve(1u32);
        scope.cancel();
        assert!(!data.load(&scope, async { Ok(2) }));
        assert_eq!(data.get(), LoadState::Success(1));
    }

    #[tokio::test]
    async fn slow_older_load_cannot_overwrite_newer_one() {
        let scope = TaskScope::new("test");
        let data = Loadable::new();
        let (slow_tx, slow_rx) = oneshot::channel::<&'static str>();
        let (fast_tx, fast_rx) = oneshot::channel::<&'static str>();

        data.load(&scope, async move { Ok(slow_rx.await.unwrap_or("dropped")) });
        data.load(&scope, async move { Ok(fast_rx.await.unwrap_or("dropped")) });
        assert_eq!(data.generation(), 2);

        fast_tx.send("fast").unwrap();
        let value = settle(data.subscribe(), |s| !s.is_loading()).await;
        assert_eq!(value, LoadState::Success("fast"));

        // The older request was aborted, so nobody is listening any more.
        let_tasks_run().await;
        assert!(slow_tx.send("slow").is_err());
        let_tasks_run().await;
        assert_eq!(data.get(), LoadState::Success("fast"));
    }

    #[tokio::test]
    async fn resolve_supersedes_load_in_flight() {
        let scope = TaskScope::new("test");
        let data = Loadable::new();
        let (tx, rx) = oneshot::channel::<u32>();
        data.load(&scope, async move { Ok(rx.await.unwrap_or(0)) });

        assert!(data.resolve(9));
        let_tasks_run().await;
        assert!(tx.send(1).is_err());
        let_tasks_run().await;
        assert_eq!(data.get(), LoadState::Success(9));
    }

    #[tokio::test]
    async fn edit_only_touches_loaded_data() {
        let scope = TaskScope::new("test");
        let data = Loadable::new();
        let (tx, rx) = oneshot::channel::<Vec<u32>>();
        data.load(&scope, async move { Ok(rx.await.unwrap_or_default()) });

        data.edit(|list| list.push(7));
        assert!(data.get().is_loading());

        tx.send(vec![1]).unwrap();
        settle(data.subscribe(), |s| !s.is_loading()).await;
        data.edit(|list| list.push(2));
        assert_eq!(data.get(), LoadState::Success(vec![1, 2]));
    }

    #[tokio::test]
    async fn close_aborts_load_in_flight() {
        let scope = TaskScope::new("test");
        let data = Loadable::<u32>::new();
        let (tx, rx) = oneshot::channel::<u32>();
        data.load(&scope, async move { Ok(rx.await.unwrap_or(0)) });

        assert!(data.close());
        let_tasks_run().await;
        assert!(tx.send(3).is_err());
        assert!(!data.load(&scope, async { Ok(4) }));
        assert!(!data.resolve(5));
        assert!(data.get().is_loading());
        assert!(!scope.is_cancelled(), "only the load's own scope is cancelled");
    }

    #[tokio::test]
    async fn action_runs_follow_up_once() {
        let scope = TaskScope::new("test");
        let status = Observable::new(ActionState::Idle);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        assert!(spawn_action(
            &scope,
            &status,
            async move {
                let _ = rx.await;
                Ok(())
            },
            move |()| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        ));
        // Second attempt while pending is ignored.
        assert!(!spawn_action(&scope, &status, async { Ok(()) }, |()| {}));

        let _ = tx.send(());
        let value = settle(status.subscribe(), |s| !s.is_pending()).await;
        assert_eq!(value, ActionState::Idle);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn action_failure_is_reported() {
        let scope = TaskScope::new("test");
        let status = Observable::new(ActionState::Idle);
        spawn_action(
            &scope,
            &status,
            async { Err::<(), _>(RallyError::permission_denied("organizers only")) },
            |()| {},
        );
        let value = settle(status.subscribe(), |s| !s.is_pending()).await;
        assert_eq!(value, ActionState::Failed("organizers only".to_string()));
    }
}
