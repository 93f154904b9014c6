use std::sync::Arc;

use rally_core::{Observable, Subscription};
use rally_nav::{ScreenContext, ScreenController};

use super::require;
use crate::domain::{
    Community, CommunityId, CommunityUseCases, Event, EventId, EventUseCases, Post, PostId,
    PostUseCases, Services,
};
use crate::screens::Screen;
use crate::views::{spawn_action, ActionState, LoadState, Loadable};

/// One community: details, upcoming events and the feed.
///
/// The three sections load independently so one failing does not blank
/// the others.
pub struct CommunityController {
    ctx: ScreenContext<Screen>,
    community_id: CommunityId,
    communities_uc: Arc<dyn CommunityUseCases>,
    events_uc: Arc<dyn EventUseCases>,
    posts_uc: Arc<dyn PostUseCases>,
    community: Loadable<Community>,
    events: Loadable<Vec<Event>>,
    posts: Loadable<Vec<Post>>,
    join: Observable<ActionState>,
}

impl CommunityController {
    /// Build the controller and start loading every section.
    pub fn new(ctx: ScreenContext<Screen>, community_id: CommunityId, services: &Services) -> Self {
        let controller = Self {
            ctx,
            community_id,
            communities_uc: services.communities.clone(),
            events_uc: services.events.clone(),
            posts_uc: services.posts.clone(),
            community: Loadable::new(),
            events: Loadable::new(),
            posts: Loadable::new(),
            join: Observable::new(ActionState::Idle),
        };
        controller.load_community();
        controller.load_events();
        controller.load_posts();
        controller
    }

    /// Construction context.
    pub fn context(&self) -> &ScreenContext<Screen> {
        &self.ctx
    }

    /// Community shown.
    pub fn community_id(&self) -> &CommunityId {
        &self.community_id
    }

    /// Community details.
    pub fn community(&self) -> Subscription<LoadState<Community>> {
        self.community.subscribe()
    }

    /// Upcoming events.
    pub fn events(&self) -> Subscription<LoadState<Vec<Event>>> {
        self.events.subscribe()
    }

    /// Feed.
    pub fn posts(&self) -> Subscription<LoadState<Vec<Post>>> {
        self.posts.subscribe()
    }

    /// Join progress.
    pub fn join_status(&self) -> Subscription<ActionState> {
        self.join.subscribe()
    }

    /// Reload every section that failed. Returns how many reloads started.
    pub fn retry(&self) -> usize {
        let mut started = 0;
        if self.community.is_error() && self.load_community() {
            started += 1;
        }
        if self.events.is_error() && self.load_events() {
            started += 1;
        }
        if self.posts.is_error() && self.load_posts() {
            started += 1;
        }
        started
    }

    /// Join this community.
    pub fn join(&self) -> bool {
        let communities = self.communities_uc.clone();
        let id = self.community_id.clone();
        let community = self.community.clone();
        spawn_action(
            self.ctx.scope(),
            &self.join,
            async move { communities.join(&id).await },
            move |_membership| {
                community.edit(|c| {
                    if !c.is_member {
                        c.is_member = true;
                        c.member_count += 1;
                    }
                });
            },
        )
    }

    /// Event selected.
    pub fn open_event(&self, id: EventId) -> bool {
        self.ctx.navigator().push(Screen::event(id))
    }

    /// Post selected.
    pub fn open_post(&self, id: PostId) -> bool {
        self.ctx.navigator().push(Screen::post(id))
    }

    /// Write a new post in this community's feed.
    pub fn compose(&self) -> bool {
        self.ctx
            .navigator()
            .push(Screen::compose(self.community_id.clone()))
    }

    fn load_community(&self) -> bool {
        let communities = self.communities_uc.clone();
        let id = self.community_id.clone();
        self.community.load(self.ctx.scope(), async move {
            let found = communities.fetch_by_id(&id).await?;
            require(found, id)
        })
    }

    fn load_events(&self) -> bool {
        let events = self.events_uc.clone();
        let id = self.community_id.clone();
        self.events.load(self.ctx.scope(), async move {
            events.fetch_list(&id).await
        })
    }

    fn load_posts(&self) -> bool {
        let posts = self.posts_uc.clone();
        let id = self.community_id.clone();
        self.posts.load(self.ctx.scope(), async move {
            posts.fetch_list(&id).await
        })
    }
}

impl ScreenController for CommunityController {
    fn on_destroy(&self) {
        self.community.close();
        self.events.close();
        self.posts.close();
        self.join.close();
    }
}
