//! Screen construction seam.

use rally_core::TaskScope;

use crate::config::ScreenConfig;
use crate::history::EntryId;
use crate::navigator::Navigator;

/// A live screen controller owned by one navigation entry.
pub trait ScreenController: Send + 'static {
    /// Called exactly once when the owning entry leaves the history,
    /// before the entry's task scope is cancelled.
    ///
    /// Implementations close their observable state so late writes from
    /// in-flight work are rejected.
    fn on_destroy(&self);
}

/// Everything a controller receives from the stack at construction.
#[derive(Debug, Clone)]
pub struct ScreenContext<C> {
    entry_id: EntryId,
    scope: TaskScope,
    navigator: Navigator<C>,
}

impl<C: ScreenConfig> ScreenContext<C> {
    /// Build a context. The stack does this for every entry; tests may do it
    /// to construct controllers directly.
    pub fn new(entry_id: EntryId, scope: TaskScope, navigator: Navigator<C>) -> Self {
        Self {
            entry_id,
            scope,
            navigator,
        }
    }

    /// Id of the owning entry.
    pub fn entry_id(&self) -> EntryId {
        self.entry_id
    }

    /// Task scope cancelled when the owning entry is destroyed.
    pub fn scope(&self) -> &TaskScope {
        &self.scope
    }

    /// Handle for issuing navigation commands.
    pub fn navigator(&self) -> &Navigator<C> {
        &self.navigator
    }
}

/// Builds controllers for configs.
///
/// A factory does not cache: equal configs yield independent controllers.
/// The stack alone decides when construction happens.
pub trait ScreenFactory<C: ScreenConfig> {
    /// Controller type produced for every config.
    type Controller: ScreenController;

    /// Construct the controller for `config`.
    fn create(&self, config: &C, ctx: ScreenContext<C>) -> Self::Controller;
}
