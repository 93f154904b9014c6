//! Maps every [`Screen`] to its controller.

use rally_nav::{ScreenContext, ScreenFactory};

use crate::controllers::{
    AppController, CheckInController, CommunityController, ComposeController, EventController,
    HomeController, InvitesController, LoginController, PostController,
};
use crate::domain::Services;
use crate::screens::Screen;

/// Builds app controllers from screen configs.
///
/// Dependencies are passed in once by the composition root and handed to
/// each controller at construction.
#[derive(Debug, Clone)]
pub struct AppScreenFactory {
    services: Services,
}

impl AppScreenFactory {
    /// Create a factory over `services`.
    pub fn new(services: Services) -> Self {
        Self { services }
    }

    /// Use-case handles passed to controllers.
    pub fn services(&self) -> &Services {
        &self.services
    }
}

impl ScreenFactory<Screen> for AppScreenFactory {
    type Controller = AppController;

    fn create(&self, config: &Screen, ctx: ScreenContext<Screen>) -> AppController {
        let services = &self.services;
        match config {
            Screen::Login => AppController::Login(LoginController::new(ctx, services)),
            Screen::Home => AppController::Home(HomeController::new(ctx, services)),
            Screen::Community { community_id } => AppController::Community(
                CommunityController::new(ctx, community_id.clone(), services),
            ),
            Screen::Event { event_id } => {
                AppController::Event(EventController::new(ctx, event_id.clone(), services))
            }
            Screen::CheckIn { event_id } => {
                AppController::CheckIn(CheckInController::new(ctx, event_id.clone(), services))
            }
            Screen::Post { post_id } => {
                AppController::Post(PostController::new(ctx, post_id.clone(), services))
            }
            Screen::Compose { community_id } => AppController::Compose(ComposeController::new(
                ctx,
                community_id.clone(),
                services,
            )),
            Screen::Invites => AppController::Invites(InvitesController::new(ctx, services)),
        }
    }
}
