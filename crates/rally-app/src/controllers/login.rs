use std::sync::Arc;

use rally_core::{Observable, Subscription};
use rally_nav::{ScreenContext, ScreenController};
use tracing::info;

use crate::domain::{AuthUseCases, Credentials, Services};
use crate::screens::Screen;
use crate::views::{spawn_action, ActionState};

/// Sign-in screen. A successful login replaces the whole history with
/// [`Screen::Home`].
pub struct LoginController {
    ctx: ScreenContext<Screen>,
    auth: Arc<dyn AuthUseCases>,
    status: Observable<ActionState>,
}

impl LoginController {
    /// Build the controller. Nothing is loaded up front.
    pub fn new(ctx: ScreenContext<Screen>, services: &Services) -> Self {
        Self {
            ctx,
            auth: services.auth.clone(),
            status: Observable::new(ActionState::Idle),
        }
    }

    /// Construction context.
    pub fn context(&self) -> &ScreenContext<Screen> {
        &self.ctx
    }

    /// Sign-in progress.
    pub fn status(&self) -> Subscription<ActionState> {
        self.status.subscribe()
    }

    /// Submit credentials. Ignored while a previous attempt is pending.
    pub fn login(&self, credentials: Credentials) -> bool {
        let auth = self.auth.clone();
        let navigator = self.ctx.navigator().clone();
        spawn_action(
            self.ctx.scope(),
            &self.status,
            async move { auth.login(credentials).await },
            move |session| {
                info!(user = %session.user_id, "signed in");
                navigator.replace_all(Screen::Home);
            },
        )
    }
}

impl ScreenController for LoginController {
    fn on_destroy(&self) {
        self.status.close();
    }
}
