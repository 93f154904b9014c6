use std::sync::Arc;

use rally_core::{Observable, Subscription};
use rally_nav::{ScreenContext, ScreenController};

use super::require;
use crate::domain::{Event, EventId, EventUseCases, RsvpStatus, Services};
use crate::screens::Screen;
use crate::views::{spawn_action, ActionState, LoadState, Loadable};

/// One event with RSVP and the entry point to check-in.
pub struct EventController {
    ctx: ScreenContext<Screen>,
    event_id: EventId,
    events_uc: Arc<dyn EventUseCases>,
    event: Loadable<Event>,
    rsvp: Observable<ActionState>,
}

impl EventController {
    /// Build the controller and start loading the event.
    pub fn new(ctx: ScreenContext<Screen>, event_id: EventId, services: &Services) -> Self {
        let controller = Self {
            ctx,
            event_id,
            events_uc: services.events.clone(),
            event: Loadable::new(),
            rsvp: Observable::new(ActionState::Idle),
        };
        controller.load();
        controller
    }

    /// Construction context.
    pub fn context(&self) -> &ScreenContext<Screen> {
        &self.ctx
    }

    /// Event shown.
    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    /// Event details.
    pub fn event(&self) -> Subscription<LoadState<Event>> {
        self.event.subscribe()
    }

    /// RSVP progress.
    pub fn rsvp_status(&self) -> Subscription<ActionState> {
        self.rsvp.subscribe()
    }

    /// Reload the event.
    pub fn retry(&self) -> bool {
        self.load()
    }

    /// Record an RSVP; the event is replaced with the updated copy.
    pub fn rsvp(&self, status: RsvpStatus) -> bool {
        let events = self.events_uc.clone();
        let id = self.event_id.clone();
        let event = self.event.clone();
        spawn_action(
            self.ctx.scope(),
            &self.rsvp,
            async move { events.rsvp(&id, status).await },
            move |updated| {
                event.resolve(updated);
            },
        )
    }

    /// Check in to this event.
    pub fn check_in(&self) -> bool {
        self.ctx
            .navigator()
            .push(Screen::check_in(self.event_id.clone()))
    }

    fn load(&self) -> bool {
        let events = self.events_uc.clone();
        let id = self.event_id.clone();
        self.event.load(self.ctx.scope(), async move {
            let found = events.fetch_by_id(&id).await?;
            require(found, id)
        })
    }
}

impl ScreenController for EventController {
    fn on_destroy(&self) {
        self.event.close();
        self.rsvp.close();
    }
}
