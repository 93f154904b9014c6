//! Structured task scopes.
//!
//! A [`TaskScope`] owns every task spawned into it. Cancelling the scope
//! aborts those tasks and fires its cancellation token; cancelling a parent
//! scope cancels all of its children. Dropping the last handle to a scope
//! cancels it, so no task outlives the scope that owns it.

use std::future::Future;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::trace;

/// Cooperative cancellation token.
#[async_trait]
pub trait CancellationToken: Send + Sync {
    /// Resolves when cancellation is requested.
    async fn cancelled(&self);

    /// Non-blocking cancellation check.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Cancellation token that never triggers.
pub struct NeverCancel;

#[async_trait]
impl CancellationToken for NeverCancel {
    async fn cancelled(&self) {
        futures::future::pending::<()>().await;
    }
}

struct ScopeInner {
    label: String,
    shutdown_tx: watch::Sender<bool>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    children: Mutex<Vec<Weak<ScopeInner>>>,
}

impl ScopeInner {
    fn new(label: String) -> Self {
        let (shutdown_tx, _shutdown_rx) = watch::channel(false);
        Self {
            label,
            shutdown_tx,
            handles: Mutex::new(Vec::new()),
            children: Mutex::new(Vec::new()),
        }
    }

    fn is_cancelled(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    fn cancel(&self) {
        // Flag first: `spawn` checks it while holding the handles lock.
        let was_cancelled = self.shutdown_tx.send_replace(true);
        let aborted = {
            let mut handles = self.handles.lock();
            let count = handles.len();
            for handle in handles.drain(..) {
                handle.abort();
            }
            count
        };
        let children: Vec<_> = self.children.lock().drain(..).collect();
        for child in children.iter().filter_map(Weak::upgrade) {
            child.cancel();
        }
        if !was_cancelled {
            trace!(scope = %self.label, aborted, "task scope cancelled");
        }
    }
}

impl Drop for ScopeInner {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// A cancellation domain bounding a group of asynchronous tasks.
///
/// Clones share the same scope. Spawning requires a Tokio runtime context.
#[derive(Clone)]
pub struct TaskScope {
    inner: Arc<ScopeInner>,
}

impl TaskScope {
    /// Create a new root scope.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ScopeInner::new(label.into())),
        }
    }

    /// Create a child scope that is cancelled together with this one.
    ///
    /// A child of an already cancelled scope starts out cancelled.
    pub fn child(&self, label: impl Into<String>) -> Self {
        let child = Self::new(label);
        {
            let mut children = self.inner.children.lock();
            children.retain(|weak| weak.strong_count() > 0);
            children.push(Arc::downgrade(&child.inner));
        }
        // Re-check after registering so a concurrent cancel cannot be missed.
        if self.inner.is_cancelled() {
            child.cancel();
        }
        child
    }

    /// Human-readable scope label used in logs.
    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// Spawn a task owned by this scope.
    ///
    /// The task is aborted when the scope is cancelled. Returns `false`
    /// without spawning if the scope is already cancelled.
    pub fn spawn<F>(&self, fut: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut handles = self.inner.handles.lock();
        if self.inner.is_cancelled() {
            trace!(scope = %self.inner.label, "spawn rejected: scope cancelled");
            return false;
        }
        handles.retain(|handle| !handle.is_finished());

        let mut shutdown_rx = self.inner.shutdown_tx.subscribe();
        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = wait_cancelled(&mut shutdown_rx) => {}
                _ = fut => {}
            }
        });
        handles.push(handle);
        true
    }

    /// Cancel every task in this scope and in all child scopes.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    /// Whether the scope has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    /// Number of spawned tasks that have not finished yet.
    pub fn active_tasks(&self) -> usize {
        self.inner
            .handles
            .lock()
            .iter()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    /// Return a cancellation token that fires when this scope is cancelled.
    pub fn token(&self) -> ScopeToken {
        ScopeToken {
            shutdown_rx: self.inner.shutdown_tx.subscribe(),
        }
    }
}

impl std::fmt::Debug for TaskScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskScope")
            .field("label", &self.inner.label)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

async fn wait_cancelled(shutdown_rx: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown_rx.borrow() {
            return;
        }
        if shutdown_rx.changed().await.is_err() {
            return;
        }
    }
}

/// Cancellation token bound to a [`TaskScope`].
///
/// The token also reports cancellation once the scope itself is gone.
#[derive(Debug, Clone)]
pub struct ScopeToken {
    shutdown_rx: watch::Receiver<bool>,
}

#[async_trait]
impl CancellationToken for ScopeToken {
    async fn cancelled(&self) {
        let mut shutdown_rx = self.shutdown_rx.clone();
        wait_cancelled(&mut shutdown_rx).await;
    }

    fn is_cancelled(&self) -> bool {
        *self.shutdown_rx.borrow() || self.shutdown_rx.has_changed().is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_spawned_task_runs_to_completion() {
        let scope = TaskScope::new("test");
        let (tx, rx) = tokio::sync::oneshot::channel();
        assert!(scope.spawn(async move {
            let _ = tx.send(7);
        }));
        assert_eq!(rx.await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_cancel_aborts_pending_task() {
        let scope = TaskScope::new("test");
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();
        scope.spawn(async move {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            flag.store(true, Ordering::SeqCst);
        });
        assert_eq!(scope.active_tasks(), 1);

        scope.cancel();
        tokio::task::yield_now().await;

        assert!(scope.is_cancelled());
        assert_eq!(scope.active_tasks(), 0);
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_spawn_after_cancel_is_rejected() {
        let scope = TaskScope::new("test");
        scope.cancel();
        assert!(!scope.spawn(async {}));
        assert_eq!(scope.active_tasks(), 0);
    }

    #[tokio::test]
    async fn test_parent_cancel_cascades_to_children() {
        let parent = TaskScope::new("parent");
        let child = parent.child("child");
        let grandchild = child.child("grandchild");
        let token = grandchild.token();

        parent.cancel();

        assert!(child.is_cancelled());
        assert!(grandchild.is_cancelled());
        assert!(token.is_cancelled());
        token.cancelled().await;
    }

    #[tokio::test]
    async fn test_child_cancel_leaves_parent_running() {
        let parent = TaskScope::new("parent");
        let child = parent.child("child");
        child.cancel();
        assert!(!parent.is_cancelled());
        assert!(parent.spawn(async {}));
    }

    #[test]
    fn test_child_of_cancelled_scope_starts_cancelled() {
        let parent = TaskScope::new("parent");
        parent.cancel();
        assert!(parent.child("late").is_cancelled());
    }

    #[test]
    fn test_dropping_last_handle_cancels() {
        let scope = TaskScope::new("dropped");
        let token = scope.token();
        assert!(!token.is_cancelled());
        drop(scope);
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_never_cancel() {
        let token = NeverCancel;
        assert!(!token.is_cancelled());
        let result = tokio::time::timeout(Duration::from_millis(10), token.cancelled()).await;
        assert!(result.is_err());
    }
}
