//! Composition root.
//!
//! [`RallyApp`] is built once per session from an [`AppConfig`] and the
//! host's [`Services`]. It owns the navigation stack and the state store;
//! nothing else in the crate reaches for global state.

use rally_core::Result;
use rally_nav::{HistorySubscription, NavigationStack, RestoreSource, ScreenConfig};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::controllers::AppController;
use crate::domain::Services;
use crate::factory::AppScreenFactory;
use crate::persistence::StateStore;
use crate::screens::Screen;

/// The app's navigation stack type.
pub type AppStack = NavigationStack<Screen, AppScreenFactory>;

/// A running app session.
pub struct RallyApp {
    config: AppConfig,
    store: Option<StateStore>,
    stack: AppStack,
}

impl RallyApp {
    /// Restore the previous session, or start at the configured initial
    /// screen.
    ///
    /// Unreadable or undecodable persisted state is logged and ignored.
    /// Must be called inside a Tokio runtime: the first controller starts
    /// loading immediately.
    pub fn start(config: AppConfig, services: Services) -> Self {
        let store = config.state_path.clone().map(StateStore::new);
        let persisted = store.as_ref().and_then(|store| match store.load() {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(error = %err, "navigation state unreadable, starting fresh");
                None
            }
        });

        let stack = NavigationStack::restore(
            AppScreenFactory::new(services),
            persisted.as_deref(),
            config.initial_screen(),
        );
        info!(
            screen = stack.current().tag(),
            depth = stack.depth(),
            source = ?stack.restore_source(),
            "rally app started"
        );

        Self {
            config,
            store,
            stack,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The navigation stack.
    pub fn stack(&self) -> &AppStack {
        &self.stack
    }

    /// The navigation stack, for direct mutation and command processing.
    pub fn stack_mut(&mut self) -> &mut AppStack {
        &mut self.stack
    }

    /// Controller of the visible screen.
    pub fn active_controller(&self) -> Option<&AppController> {
        self.stack.active_controller()
    }

    /// How the session's history was obtained.
    pub fn restore_source(&self) -> &RestoreSource {
        self.stack.restore_source()
    }

    /// Subscribe to history changes.
    pub fn subscribe(&mut self) -> HistorySubscription<Screen> {
        self.stack.subscribe()
    }

    /// Apply queued navigation commands. Returns how many ran.
    pub fn process_pending(&mut self) -> usize {
        self.stack.process_pending()
    }

    /// Save the current history. No-op without a `state_path`.
    pub fn persist(&self) -> Result<()> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let bytes = self.stack.save()?;
        store.save(&bytes)
    }

    /// End the session, persisting first if configured.
    ///
    /// The stack is torn down even if persisting fails; the error is
    /// returned afterwards.
    pub fn shutdown(self) -> Result<()> {
        let persisted = if self.config.persist_on_shutdown {
            self.persist()
        } else {
            Ok(())
        };
        self.stack.shutdown();
        persisted
    }
}
