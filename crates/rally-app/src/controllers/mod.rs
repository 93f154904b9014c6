//! Screen controllers, one per [`Screen`] variant.
//!
//! Every controller follows the same shape:
//!
//! - construction starts its initial loads inside the entry's task scope;
//! - state is exposed as read-only [`Subscription`]s over `Observable`s;
//! - intent methods either update local state or queue a navigation command;
//! - `on_destroy` closes every observable so in-flight work cannot emit.
//!
//! [`Subscription`]: rally_core::Subscription

mod check_in;
mod community;
mod compose;
mod event;
mod home;
mod invites;
mod login;
mod post;

pub use check_in::CheckInController;
pub use community::CommunityController;
pub use compose::ComposeController;
pub use event::EventController;
pub use home::HomeController;
pub use invites::InvitesController;
pub use login::LoginController;
pub use post::PostController;

use std::fmt::Display;

use rally_core::RallyError;
use rally_nav::{ScreenContext, ScreenController};

use crate::screens::Screen;

/// The controller of any screen.
pub enum AppController {
    /// [`Screen::Login`]
    Login(LoginController),
    /// [`Screen::Home`]
    Home(HomeController),
    /// [`Screen::Community`]
    Community(CommunityController),
    /// [`Screen::Event`]
    Event(EventController),
    /// [`Screen::CheckIn`]
    CheckIn(CheckInController),
    /// [`Screen::Post`]
    Post(PostController),
    /// [`Screen::Compose`]
    Compose(ComposeController),
    /// [`Screen::Invites`]
    Invites(InvitesController),
}

impl AppController {
    /// Context handed to the controller at construction.
    pub fn context(&self) -> &ScreenContext<Screen> {
        match self {
            AppController::Login(c) => c.context(),
            AppController::Home(c) => c.context(),
            AppController::Community(c) => c.context(),
            AppController::Event(c) => c.context(),
            AppController::CheckIn(c) => c.context(),
            AppController::Post(c) => c.context(),
            AppController::Compose(c) => c.context(),
            AppController::Invites(c) => c.context(),
        }
    }

    /// Back pressed: queue a pop. A no-op at the root.
    pub fn back(&self) -> bool {
        self.context().navigator().pop()
    }

    /// Short name of the controller kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AppController::Login(_) => "login",
            AppController::Home(_) => "home",
            AppController::Community(_) => "community",
            AppController::Event(_) => "event",
            AppController::CheckIn(_) => "check_in",
            AppController::Post(_) => "post",
            AppController::Compose(_) => "compose",
            AppController::Invites(_) => "invites",
        }
    }
}

impl ScreenController for AppController {
    fn on_destroy(&self) {
        match self {
            AppController::Login(c) => c.on_destroy(),
            AppController::Home(c) => c.on_destroy(),
            AppController::Community(c) => c.on_destroy(),
            AppController::Event(c) => c.on_destroy(),
            AppController::CheckIn(c) => c.on_destroy(),
            AppController::Post(c) => c.on_destroy(),
            AppController::Compose(c) => c.on_destroy(),
            AppController::Invites(c) => c.on_destroy(),
        }
    }
}

impl std::fmt::Debug for AppController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppController")
            .field("kind", &self.kind())
            .field("entry", &self.context().entry_id())
            .finish()
    }
}

/// Turn a missing lookup result into a not-found error.
pub(crate) fn require<T>(found: Option<T>, what: impl Display) -> Result<T, RallyError> {
    found.ok_or_else(|| RallyError::not_found(format!("{what} no longer exists")))
}
