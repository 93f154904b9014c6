use std::sync::Arc;

use rally_core::{Observable, Subscription};
use rally_nav::{ScreenContext, ScreenController};

use super::require;
use crate::domain::{Comment, Post, PostId, PostUseCases, Services};
use crate::screens::Screen;
use crate::views::{spawn_action, ActionState, LoadState, Loadable};

/// One post with its comment thread.
pub struct PostController {
    ctx: ScreenContext<Screen>,
    post_id: PostId,
    posts_uc: Arc<dyn PostUseCases>,
    post: Loadable<Post>,
    comments: Loadable<Vec<Comment>>,
    like: Observable<ActionState>,
    reply: Observable<ActionState>,
}

impl PostController {
    /// Build the controller and start loading the post and its comments.
    pub fn new(ctx: ScreenContext<Screen>, post_id: PostId, services: &Services) -> Self {
        let controller = Self {
            ctx,
            post_id,
            posts_uc: services.posts.clone(),
            post: Loadable::new(),
            comments: Loadable::new(),
            like: Observable::new(ActionState::Idle),
            reply: Observable::new(ActionState::Idle),
        };
        controller.load_post();
        controller.load_comments();
        controller
    }

    /// Construction context.
    pub fn context(&self) -> &ScreenContext<Screen> {
        &self.ctx
    }

    /// Post shown.
    pub fn post_id(&self) -> &PostId {
        &self.post_id
    }

    /// Post body and counters.
    pub fn post(&self) -> Subscription<LoadState<Post>> {
        self.post.subscribe()
    }

    /// Comment thread.
    pub fn comments(&self) -> Subscription<LoadState<Vec<Comment>>> {
        self.comments.subscribe()
    }

    /// Like progress.
    pub fn like_status(&self) -> Subscription<ActionState> {
        self.like.subscribe()
    }

    /// Comment submission progress.
    pub fn reply_status(&self) -> Subscription<ActionState> {
        self.reply.subscribe()
    }

    /// Reload whichever of post and comments failed.
    pub fn retry(&self) -> usize {
        let mut started = 0;
        if self.post.is_error() && self.load_post() {
            started += 1;
        }
        if self.comments.is_error() && self.load_comments() {
            started += 1;
        }
        started
    }

    /// Toggle the like; the post is replaced with the updated copy.
    pub fn like(&self) -> bool {
        let posts = self.posts_uc.clone();
        let id = self.post_id.clone();
        let post = self.post.clone();
        spawn_action(
            self.ctx.scope(),
            &self.like,
            async move { posts.like(&id).await },
            move |updated| {
                post.resolve(updated);
            },
        )
    }

    /// Add a comment; it is appended to the loaded thread.
    pub fn comment(&self, body: impl Into<String>) -> bool {
        let posts = self.posts_uc.clone();
        let id = self.post_id.clone();
        let body = body.into();
        let post = self.post.clone();
        let comments = self.comments.clone();
        spawn_action(
            self.ctx.scope(),
            &self.reply,
            async move { posts.comment(&id, body).await },
            move |comment| {
                comments.edit(|thread| thread.push(comment));
                post.edit(|p| p.comment_count += 1);
            },
        )
    }

    fn load_post(&self) -> bool {
        let posts = self.posts_uc.clone();
        let id = self.post_id.clone();
        self.post.load(self.ctx.scope(), async move {
            let found = posts.fetch_by_id(&id).await?;
            require(found, id)
        })
    }

    fn load_comments(&self) -> bool {
        let posts = self.posts_uc.clone();
        let id = self.post_id.clone();
        self.comments.load(self.ctx.scope(), async move {
            posts.fetch_comments(&id).await
        })
    }
}

impl ScreenController for PostController {
    fn on_destroy(&self) {
        self.post.close();
        self.comments.close();
        self.like.close();
        self.reply.close();
    }
}
