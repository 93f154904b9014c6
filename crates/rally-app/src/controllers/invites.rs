use std::sync::Arc;

use rally_core::{Observable, Subscription};
use rally_nav::{ScreenContext, ScreenController};
use tracing::info;

use crate::domain::{Invite, InviteCode, InviteUseCases, Services};
use crate::screens::Screen;
use crate::views::{spawn_action, ActionState, LoadState, Loadable};

/// Pending invitations. Accepting one opens the community it grants.
pub struct InvitesController {
    ctx: ScreenContext<Screen>,
    invites_uc: Arc<dyn InviteUseCases>,
    invites: Loadable<Vec<Invite>>,
    respond: Observable<ActionState>,
}

impl InvitesController {
    /// Build the controller and start loading invites.
    pub fn new(ctx: ScreenContext<Screen>, services: &Services) -> Self {
        let controller = Self {
            ctx,
            invites_uc: services.invites.clone(),
            invites: Loadable::new(),
            respond: Observable::new(ActionState::Idle),
        };
        controller.load();
        controller
    }

    /// Construction context.
    pub fn context(&self) -> &ScreenContext<Screen> {
        &self.ctx
    }

    /// Pending invites.
    pub fn invites(&self) -> Subscription<LoadState<Vec<Invite>>> {
        self.invites.subscribe()
    }

    /// Accept/decline progress.
    pub fn respond_status(&self) -> Subscription<ActionState> {
        self.respond.subscribe()
    }

    /// Reload the list.
    pub fn retry(&self) -> bool {
        self.load()
    }

    /// Accept an invite and open its community.
    pub fn accept(&self, code: InviteCode) -> bool {
        let invites_uc = self.invites_uc.clone();
        let invites = self.invites.clone();
        let navigator = self.ctx.navigator().clone();
        let accepted = code.clone();
        spawn_action(
            self.ctx.scope(),
            &self.respond,
            async move { invites_uc.accept(&accepted).await },
            move |membership| {
                info!(community = %membership.community_id, "invite accepted");
                remove_invite(&invites, &code);
                navigator.push(Screen::community(membership.community_id));
            },
        )
    }

    /// Decline an invite.
    pub fn decline(&self, code: InviteCode) -> bool {
        let invites_uc = self.invites_uc.clone();
        let invites = self.invites.clone();
        let declined = code.clone();
        spawn_action(
            self.ctx.scope(),
            &self.respond,
            async move { invites_uc.decline(&declined).await },
            move |()| remove_invite(&invites, &code),
        )
    }

    fn load(&self) -> bool {
        let invites = self.invites_uc.clone();
        self.invites.load(self.ctx.scope(), async move {
            invites.fetch_list().await
        })
    }
}

fn remove_invite(invites: &Loadable<Vec<Invite>>, code: &InviteCode) {
    invites.edit(|list| list.retain(|invite| &invite.code != code));
}

impl ScreenController for InvitesController {
    fn on_destroy(&self) {
        self.invites.close();
        self.respond.close();
    }
}
