//! Use-case interfaces consumed by screen controllers.
//!
//! The app core never talks to a backend. Hosts implement these traits
//! (network clients, local caches, fakes in tests) and hand them to the
//! composition root bundled in [`Services`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use rally_core::Result;

use super::entities::{
    CheckInReceipt, Comment, Community, CommunityFilter, Credentials, Event, Invite, Membership,
    Post, PostDraft, RsvpStatus, Session,
};
use super::ids::{CommunityId, EventId, InviteCode, PostId};

/// Authentication.
#[async_trait]
pub trait AuthUseCases: Send + Sync {
    /// Sign in and open a session.
    async fn login(&self, credentials: Credentials) -> Result<Session>;
}

/// Community discovery and membership.
#[async_trait]
pub trait CommunityUseCases: Send + Sync {
    /// List communities matching `filter`.
    async fn fetch_list(&self, filter: &CommunityFilter) -> Result<Vec<Community>>;

    /// Fetch one community. `Ok(None)` if it does not exist.
    async fn fetch_by_id(&self, id: &CommunityId) -> Result<Option<Community>>;

    /// Join a public community.
    async fn join(&self, id: &CommunityId) -> Result<Membership>;
}

/// Events, RSVPs and check-in.
#[async_trait]
pub trait EventUseCases: Send + Sync {
    /// Upcoming events of a community.
    async fn fetch_list(&self, community: &CommunityId) -> Result<Vec<Event>>;

    /// Fetch one event. `Ok(None)` if it does not exist.
    async fn fetch_by_id(&self, id: &EventId) -> Result<Option<Event>>;

    /// Record the user's RSVP and return the updated event.
    async fn rsvp(&self, id: &EventId, status: RsvpStatus) -> Result<Event>;

    /// Check the user into an event.
    async fn check_in(&self, id: &EventId) -> Result<CheckInReceipt>;
}

/// Community feed.
#[async_trait]
pub trait PostUseCases: Send + Sync {
    /// Posts in a community feed, newest first.
    async fn fetch_list(&self, community: &CommunityId) -> Result<Vec<Post>>;

    /// Fetch one post. `Ok(None)` if it does not exist.
    async fn fetch_by_id(&self, id: &PostId) -> Result<Option<Post>>;

    /// Comments on a post, oldest first.
    async fn fetch_comments(&self, post: &PostId) -> Result<Vec<Comment>>;

    /// Publish a draft.
    async fn submit(&self, draft: PostDraft) -> Result<Post>;

    /// Add a comment.
    async fn comment(&self, post: &PostId, body: String) -> Result<Comment>;

    /// Toggle the user's like and return the updated post.
    async fn like(&self, post: &PostId) -> Result<Post>;
}

/// Invite-based membership.
#[async_trait]
pub trait InviteUseCases: Send + Sync {
    /// Pending invites for the signed-in user.
    async fn fetch_list(&self) -> Result<Vec<Invite>>;

    /// Accept an invite.
    async fn accept(&self, code: &InviteCode) -> Result<Membership>;

    /// Decline an invite.
    async fn decline(&self, code: &InviteCode) -> Result<()>;
}

/// Every use-case handle a controller may need, built once by the host.
#[derive(Clone)]
pub struct Services {
    /// Authentication
    pub auth: Arc<dyn AuthUseCases>,
    /// Communities
    pub communities: Arc<dyn CommunityUseCases>,
    /// Events
    pub events: Arc<dyn EventUseCases>,
    /// Posts
    pub posts: Arc<dyn PostUseCases>,
    /// Invites
    pub invites: Arc<dyn InviteUseCases>,
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}
