//! Observable<T> - a single-writer, multi-reader reactive value
//!
//! `Observable<T>` wraps a value and lets any number of readers subscribe to
//! it. New subscribers see the current value immediately (replay latest) and
//! every later update is observable through polling or awaiting.
//!
//! Unlike a plain channel, an observable can be **closed**: once closed,
//! every subsequent `set`/`update` is rejected and subscribers observe the
//! end of the stream after draining the last value written before closing.
//! Screen controllers close their state when their navigation entry is
//! destroyed, so no emission can reach the UI after teardown.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::Stream;
use parking_lot::Mutex;
use tokio::sync::watch;

/// Inner state of an Observable value.
struct ObservableInner<T> {
    /// Write side; `None` once the observable is closed.
    sender: Mutex<Option<watch::Sender<T>>>,
    /// Read side kept alive so the last value stays readable after close.
    receiver: watch::Receiver<T>,
    /// Version counter incremented on each accepted update.
    version: AtomicU64,
}

/// A reactive value that can be observed for changes.
///
/// `Observable<T>` provides:
/// - `get()`: synchronously read the current value
/// - `set()` / `update()`: write a new value (rejected after `close()`)
/// - `subscribe()`: obtain a [`Subscription`] for polling or awaiting changes
/// - `close()`: terminate the stream for every subscriber
///
/// Clones share the same underlying value. The single-writer discipline is a
/// convention of the owner: controllers keep the writable handle and hand out
/// subscriptions only.
///
/// # Example
///
/// ```rust,ignore
/// use rally_core::reactive::Observable;
///
/// let counter = Observable::new(0);
/// let mut sub = counter.subscribe();
///
/// counter.set(1);
/// assert_eq!(sub.poll(), Some(1));
///
/// counter.close();
/// assert!(!counter.set(2));
/// assert_eq!(counter.get(), 1);
/// ```
pub struct Observable<T> {
    inner: Arc<ObservableInner<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Observable<T> {
    /// Create a new Observable with the given initial value.
    pub fn new(value: T) -> Self {
        let (sender, receiver) = watch::channel(value);
        Self {
            inner: Arc::new(ObservableInner {
                sender: Mutex::new(Some(sender)),
                receiver,
                version: AtomicU64::new(0),
            }),
        }
    }

    /// Get the current value.
    ///
    /// After `close()` this keeps returning the last accepted value.
    pub fn get(&self) -> T {
        self.inner.receiver.borrow().clone()
    }

    /// Get the number of accepted updates so far.
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::Acquire)
    }

    /// Set a new value.
    ///
    /// Returns `false` (and drops the value) if the observable is closed.
    pub fn set(&self, value: T) -> bool {
        let guard = self.inner.sender.lock();
        match guard.as_ref() {
            Some(sender) => {
                sender.send_replace(value);
                self.inner.version.fetch_add(1, Ordering::Release);
                true
            }
            None => false,
        }
    }

    /// Update the value using a function of the current value.
    ///
    /// The read and the write happen under the writer lock, so concurrent
    /// updates never interleave. Returns `false` if the observable is closed.
    pub fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(T) -> T,
    {
        let guard = self.inner.sender.lock();
        match guard.as_ref() {
            Some(sender) => {
                let next = f(sender.borrow().clone());
                sender.send_replace(next);
                self.inner.version.fetch_add(1, Ordering::Release);
                true
            }
            None => false,
        }
    }

    /// Close the observable.
    ///
    /// Subscribers drain the last value (if unseen) and then observe the end
    /// of the stream. Returns `true` if this call performed the close.
    pub fn close(&self) -> bool {
        self.inner.sender.lock().take().is_some()
    }

    /// Whether `close()` has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.sender.lock().is_none()
    }

    /// Subscribe to value changes.
    ///
    /// The subscription starts at the current value: `get()` replays it and
    /// `poll()` only reports later updates.
    pub fn subscribe(&self) -> Subscription<T> {
        let guard = self.inner.sender.lock();
        let receiver = match guard.as_ref() {
            Some(sender) => sender.subscribe(),
            None => {
                let mut receiver = self.inner.receiver.clone();
                receiver.borrow_and_update();
                receiver
            }
        };
        Subscription { receiver }
    }
}

impl<T: Clone + Send + Sync + Default + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + Send + Sync + std::fmt::Debug + 'static> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.get())
            .field("version", &self.version())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// A read-only subscription to an [`Observable`].
pub struct Subscription<T> {
    receiver: watch::Receiver<T>,
}

impl<T: Clone + Send + Sync + 'static> Subscription<T> {
    /// Get the latest value regardless of whether it changed.
    pub fn get(&self) -> T {
        self.receiver.borrow().clone()
    }

    /// Poll for a new value.
    ///
    /// Returns `Some(value)` if the source was updated since the last poll,
    /// `None` otherwise. Updates are coalesced: only the latest is returned.
    pub fn poll(&mut self) -> Option<T> {
        let value = self.receiver.borrow_and_update();
        if value.has_changed() {
            Some(value.clone())
        } else {
            None
        }
    }

    /// Wait for the next update.
    ///
    /// Returns `None` once the source is closed and every value written
    /// before the close has been observed.
    pub async fn changed(&mut self) -> Option<T> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Whether the source observable has been closed.
    pub fn is_closed(&self) -> bool {
        self.receiver.has_changed().is_err()
    }

    /// Convert into a stream that yields the current value first and then
    /// every update, ending when the source is closed.
    pub fn into_stream(self) -> impl Stream<Item = T> + Send + 'static {
        futures::stream::unfold((self, true), |(mut sub, first)| async move {
            if first {
                let value = sub.receiver.borrow_and_update().clone();
                return Some((value, (sub, false)));
            }
            let value = sub.changed().await?;
            Some((value, (sub, false)))
        })
    }
}

impl<T> Clone for Subscription<T> {
    fn clone(&self) -> Self {
        Self {
            receiver: self.receiver.clone(),
        }
    }
}
