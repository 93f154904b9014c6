use std::sync::Arc;

use rally_core::{Observable, Subscription};
use rally_nav::{ScreenContext, ScreenController};
use tracing::info;

use crate::domain::{CheckInReceipt, EventId, EventUseCases, Services};
use crate::screens::Screen;
use crate::views::{spawn_action, ActionState};

/// Check-in confirmation.
///
/// Checking in is not idempotent, so nothing is submitted until the user
/// confirms. A restored `CheckIn` entry therefore never resubmits on its own,
/// and a second confirmation is refused while one is pending or after a
/// receipt was issued.
pub struct CheckInController {
    ctx: ScreenContext<Screen>,
    event_id: EventId,
    events_uc: Arc<dyn EventUseCases>,
    status: Observable<ActionState>,
    receipt: Observable<Option<CheckInReceipt>>,
}

impl CheckInController {
    /// Build the controller. No request is made yet.
    pub fn new(ctx: ScreenContext<Screen>, event_id: EventId, services: &Services) -> Self {
        Self {
            ctx,
            event_id,
            events_uc: services.events.clone(),
            status: Observable::new(ActionState::Idle),
            receipt: Observable::new(None),
        }
    }

    /// Construction context.
    pub fn context(&self) -> &ScreenContext<Screen> {
        &self.ctx
    }

    /// Event being checked into.
    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    /// Submission progress. `Failed` can be confirmed again.
    pub fn status(&self) -> Subscription<ActionState> {
        self.status.subscribe()
    }

    /// Receipt, once checked in.
    pub fn receipt(&self) -> Subscription<Option<CheckInReceipt>> {
        self.receipt.subscribe()
    }

    /// Submit the check-in. Refused while a submission is pending or once
    /// checked in.
    pub fn confirm(&self) -> bool {
        if self.receipt.get().is_some() {
            return false;
        }
        let events = self.events_uc.clone();
        let id = self.event_id.clone();
        let receipt = self.receipt.clone();
        spawn_action(
            self.ctx.scope(),
            &self.status,
            async move { events.check_in(&id).await },
            move |issued| {
                info!(event = %issued.event_id, "checked in");
                receipt.set(Some(issued));
            },
        )
    }

    /// Dismiss the confirmation.
    pub fn done(&self) -> bool {
        self.ctx.navigator().pop()
    }
}

impl ScreenController for CheckInController {
    fn on_destroy(&self) {
        self.status.close();
        self.receipt.close();
    }
}
