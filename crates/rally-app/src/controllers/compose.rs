use std::sync::Arc;

use rally_core::{Observable, Subscription};
use rally_nav::{ScreenContext, ScreenController};
use tracing::debug;

use crate::domain::{CommunityId, PostDraft, PostUseCases, Services};
use crate::screens::Screen;
use crate::views::{spawn_action, ActionState};

/// Post composer. A published post replaces the composer with the new
/// post's screen.
pub struct ComposeController {
    ctx: ScreenContext<Screen>,
    community_id: CommunityId,
    posts_uc: Arc<dyn PostUseCases>,
    body: Observable<String>,
    submit: Observable<ActionState>,
}

impl ComposeController {
    /// Build the controller with an empty draft.
    pub fn new(ctx: ScreenContext<Screen>, community_id: CommunityId, services: &Services) -> Self {
        Self {
            ctx,
            community_id,
            posts_uc: services.posts.clone(),
            body: Observable::new(String::new()),
            submit: Observable::new(ActionState::Idle),
        }
    }

    /// Construction context.
    pub fn context(&self) -> &ScreenContext<Screen> {
        &self.ctx
    }

    /// Target feed.
    pub fn community_id(&self) -> &CommunityId {
        &self.community_id
    }

    /// Draft text.
    pub fn body(&self) -> Subscription<String> {
        self.body.subscribe()
    }

    /// Publishing progress.
    pub fn submit_status(&self) -> Subscription<ActionState> {
        self.submit.subscribe()
    }

    /// Draft edited.
    pub fn set_body(&self, body: impl Into<String>) -> bool {
        self.body.set(body.into())
    }

    /// Publish the current draft.
    pub fn submit(&self) -> bool {
        let posts = self.posts_uc.clone();
        let draft = PostDraft {
            community_id: self.community_id.clone(),
            body: self.body.get(),
        };
        let navigator = self.ctx.navigator().clone();
        spawn_action(
            self.ctx.scope(),
            &self.submit,
            async move { posts.submit(draft).await },
            move |post| {
                debug!(post = %post.id, "post published");
                navigator.pop();
                navigator.push(Screen::post(post.id));
            },
        )
    }

    /// Discard the draft.
    pub fn cancel(&self) -> bool {
        self.ctx.navigator().pop()
    }
}

impl ScreenController for ComposeController {
    fn on_destroy(&self) {
        self.body.close();
        self.submit.close();
    }
}
