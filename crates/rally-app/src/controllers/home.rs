use std::sync::Arc;

use rally_core::{Observable, Subscription};
use rally_nav::{ScreenContext, ScreenController};

use crate::domain::{Community, CommunityFilter, CommunityId, CommunityUseCases, Services};
use crate::screens::Screen;
use crate::views::{LoadState, Loadable};

/// Community discovery: the signed-in root screen.
pub struct HomeController {
    ctx: ScreenContext<Screen>,
    communities_uc: Arc<dyn CommunityUseCases>,
    filter: Observable<CommunityFilter>,
    communities: Loadable<Vec<Community>>,
}

impl HomeController {
    /// Build the controller and start loading the community list.
    pub fn new(ctx: ScreenContext<Screen>, services: &Services) -> Self {
        let controller = Self {
            ctx,
            communities_uc: services.communities.clone(),
            filter: Observable::new(CommunityFilter::default()),
            communities: Loadable::new(),
        };
        controller.reload();
        controller
    }

    /// Construction context.
    pub fn context(&self) -> &ScreenContext<Screen> {
        &self.ctx
    }

    /// Community list.
    pub fn communities(&self) -> Subscription<LoadState<Vec<Community>>> {
        self.communities.subscribe()
    }

    /// Active discovery filter.
    pub fn filter(&self) -> CommunityFilter {
        self.filter.get()
    }

    /// Reload with the current filter, superseding any load in flight.
    pub fn retry(&self) -> bool {
        self.reload()
    }

    /// Change the filter and reload. Results for an earlier filter are
    /// discarded.
    pub fn set_filter(&self, filter: CommunityFilter) -> bool {
        self.filter.set(filter) && self.reload()
    }

    /// Community selected.
    pub fn open_community(&self, id: CommunityId) -> bool {
        self.ctx.navigator().push(Screen::community(id))
    }

    /// Invitations selected.
    pub fn open_invites(&self) -> bool {
        self.ctx.navigator().push(Screen::Invites)
    }

    /// Sign out: discard the history and return to the login screen.
    pub fn sign_out(&self) -> bool {
        self.ctx.navigator().replace_all(Screen::Login)
    }

    fn reload(&self) -> bool {
        let communities = self.communities_uc.clone();
        let filter = self.filter.get();
        self.communities.load(self.ctx.scope(), async move {
            communities.fetch_list(&filter).await
        })
    }
}

impl ScreenController for HomeController {
    fn on_destroy(&self) {
        self.communities.close();
        self.filter.close();
    }
}
