//! Stack navigator commands and the cloneable handle controllers use to
//! issue them.
//!
//! Controllers never borrow the stack. They hold a [`Navigator`] and queue
//! [`NavCommand`]s; the owner of the [`NavigationStack`] applies them in
//! send order.
//!
//! [`NavigationStack`]: crate::NavigationStack

use tokio::sync::mpsc;
use tracing::debug;

use crate::config::ScreenConfig;
use crate::error::NavigationError;

/// A queued stack mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavCommand<C> {
    /// Append a new entry on top.
    Push(C),
    /// Remove the top entry (no-op at the root).
    Pop,
    /// Discard the whole history and start over from one entry.
    ReplaceAll(C),
    /// Discard the whole history and install the given non-empty history.
    ReplaceAllWith(Vec<C>),
}

/// Result of a pop.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopOutcome<C> {
    /// The top entry was removed; carries its config.
    Popped(C),
    /// Only the root remained; nothing changed.
    AtRoot,
}

impl<C> PopOutcome<C> {
    /// Whether the pop was a no-op at the root.
    pub fn is_at_root(&self) -> bool {
        matches!(self, PopOutcome::AtRoot)
    }

    /// Convert to a `Result`, mapping the root case to [`NavigationError::AtRoot`].
    pub fn into_result(self) -> Result<C, NavigationError> {
        match self {
            PopOutcome::Popped(config) => Ok(config),
            PopOutcome::AtRoot => Err(NavigationError::AtRoot),
        }
    }
}

/// Cloneable handle for queueing navigation commands.
#[derive(Debug)]
pub struct Navigator<C> {
    tx: mpsc::UnboundedSender<NavCommand<C>>,
}

impl<C> Clone for Navigator<C> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<C: ScreenConfig> Navigator<C> {
    /// Create a handle and the receiving end a stack drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<NavCommand<C>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queue a push.
    pub fn push(&self, config: C) -> bool {
        self.send(NavCommand::Push(config))
    }

    /// Queue a pop.
    pub fn pop(&self) -> bool {
        self.send(NavCommand::Pop)
    }

    /// Queue a replace-all with a single entry.
    pub fn replace_all(&self, config: C) -> bool {
        self.send(NavCommand::ReplaceAll(config))
    }

    /// Queue a replace-all with a caller-specified history.
    pub fn replace_all_with(&self, configs: Vec<C>) -> bool {
        self.send(NavCommand::ReplaceAllWith(configs))
    }

    /// Queue a command. Returns `false` if the stack is gone; the command is
    /// dropped.
    pub fn send(&self, command: NavCommand<C>) -> bool {
        match self.tx.send(command) {
            Ok(()) => true,
            Err(mpsc::error::SendError(command)) => {
                debug!(?command, "navigation command dropped: stack shut down");
                false
            }
        }
    }

    /// Whether a stack is still draining this handle's queue.
    pub fn is_attached(&self) -> bool {
        !self.tx.is_closed()
    }
}
