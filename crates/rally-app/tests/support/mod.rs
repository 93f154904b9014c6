//! Test doubles for the use-case traits and helpers for driving controllers.
//!
//! [`FakeBackend`] implements every use-case trait over seeded in-memory
//! data. Calls can be held at a gate (to keep work in flight) and individual
//! operations can be made to fail once.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rally_app::domain::{
    AuthUseCases, CheckInReceipt, Comment, CommentId, Community, CommunityFilter, CommunityId,
    CommunityUseCases, Credentials, Event, EventId, EventUseCases, Invite, InviteCode,
    InviteUseCases, MemberRole, Membership, Post, PostDraft, PostId, PostUseCases, RsvpStatus,
    Services, Session, UserId,
};
use rally_app::{AppController, AppStack, Screen};
use rally_core::{RallyError, Result, Subscription};
use tokio::sync::watch;

pub const USER: &str = "u-ada";

#[derive(Debug, Default)]
struct Data {
    communities: Vec<Community>,
    events: Vec<Event>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    invites: Vec<Invite>,
    next_id: u32,
}

pub struct FakeBackend {
    data: Mutex<Data>,
    failures: Mutex<HashMap<&'static str, RallyError>>,
    delays: Mutex<HashMap<&'static str, Duration>>,
    calls: Mutex<Vec<&'static str>>,
    gate: watch::Sender<bool>,
}

impl FakeBackend {
    pub fn seeded() -> Arc<Self> {
        let (gate, _) = watch::channel(true);
        let data = Data {
            communities: vec![
                community("run-club", "Run Club", "running", true),
                community("dawn-riders", "Dawn Riders", "cycling", false),
            ],
            events: vec![event("e-tempo", "run-club", "Tempo Tuesday")],
            posts: vec![post("p-1", "run-club", "New route this week")],
            comments: vec![comment("c-1", "p-1", "See you there")],
            invites: vec![
                invite("INV-1", "dawn-riders", "Dawn Riders"),
                invite("INV-2", "lift-lab", "Lift Lab"),
            ],
            next_id: 100,
        };
        Arc::new(Self {
            data: Mutex::new(data),
            failures: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            gate,
        })
    }

    /// Make the next call to `op` fail with `err`.
    pub fn fail_next(&self, op: &'static str, err: RallyError) {
        self.failures.lock().insert(op, err);
    }

    /// Make the next call to `op` take `delay` longer than the others.
    pub fn delay(&self, op: &'static str, delay: Duration) {
        self.delays.lock().insert(op, delay);
    }

    /// Hold every call at the gate until [`FakeBackend::open`].
    pub fn hold(&self) {
        self.gate.send_replace(false);
    }

    pub fn open(&self) {
        self.gate.send_replace(true);
    }

    pub fn calls(&self, op: &str) -> usize {
        self.calls.lock().iter().filter(|c| **c == op).count()
    }

    pub fn services(self: &Arc<Self>) -> Services {
        Services {
            auth: self.clone(),
            communities: self.clone(),
            events: self.clone(),
            posts: self.clone(),
            invites: self.clone(),
        }
    }

    async fn enter(&self, op: &'static str) -> Result<()> {
        self.calls.lock().push(op);
        let mut gate = self.gate.subscribe();
        // The sender lives as long as `self`, so this only ends when opened.
        let _ = gate.wait_for(|open| *open).await;
        let delay = self.delays.lock().remove(op);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.failures.lock().remove(op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut data = self.data.lock();
        data.next_id += 1;
        format!("{prefix}-{}", data.next_id)
    }
}

#[async_trait]
impl AuthUseCases for FakeBackend {
    async fn login(&self, credentials: Credentials) -> Result<Session> {
        self.enter("auth.login").await?;
        if credentials.password != "hunter2" {
            return Err(RallyError::permission_denied("wrong email or password"));
        }
        Ok(Session {
            user_id: UserId::new(USER),
            display_name: "Ada".to_string(),
        })
    }
}

#[async_trait]
impl CommunityUseCases for FakeBackend {
    async fn fetch_list(&self, filter: &CommunityFilter) -> Result<Vec<Community>> {
        self.enter("communities.fetch_list").await?;
        Ok(self
            .data
            .lock()
            .communities
            .iter()
            .filter(|c| !filter.joined_only || c.is_member)
            .filter(|c| filter.sport.as_ref().map_or(true, |s| &c.sport == s))
            .cloned()
            .collect())
    }

    async fn fetch_by_id(&self, id: &CommunityId) -> Result<Option<Community>> {
        self.enter("communities.fetch_by_id").await?;
        Ok(self.data.lock().communities.iter().find(|c| &c.id == id).cloned())
    }

    async fn join(&self, id: &CommunityId) -> Result<Membership> {
        self.enter("communities.join").await?;
        Ok(Membership {
            community_id: id.clone(),
            user_id: UserId::new(USER),
            role: MemberRole::Member,
        })
    }
}

#[async_trait]
impl EventUseCases for FakeBackend {
    async fn fetch_list(&self, community: &CommunityId) -> Result<Vec<Event>> {
        self.enter("events.fetch_list").await?;
        Ok(self
            .data
            .lock()
            .events
            .iter()
            .filter(|e| &e.community_id == community)
            .cloned()
            .collect())
    }

    async fn fetch_by_id(&self, id: &EventId) -> Result<Option<Event>> {
        self.enter("events.fetch_by_id").await?;
        Ok(self.data.lock().events.iter().find(|e| &e.id == id).cloned())
    }

    async fn rsvp(&self, id: &EventId, status: RsvpStatus) -> Result<Event> {
        self.enter("events.rsvp").await?;
        let mut data = self.data.lock();
        let event = data
            .events
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| RallyError::not_found(id.to_string()))?;
        if status == RsvpStatus::Going && event.rsvp != Some(RsvpStatus::Going) {
            event.attendee_count += 1;
        }
        event.rsvp = Some(status);
        Ok(event.clone())
    }

    async fn check_in(&self, id: &EventId) -> Result<CheckInReceipt> {
        self.enter("events.check_in").await?;
        Ok(CheckInReceipt {
            event_id: id.clone(),
            user_id: UserId::new(USER),
            checked_in_at: 1_700_000_000_000,
        })
    }
}

#[async_trait]
impl PostUseCases for FakeBackend {
    async fn fetch_list(&self, community: &CommunityId) -> Result<Vec<Post>> {
        self.enter("posts.fetch_list").await?;
        Ok(self
            .data
            .lock()
            .posts
            .iter()
            .filter(|p| &p.community_id == community)
            .cloned()
            .collect())
    }

    async fn fetch_by_id(&self, id: &PostId) -> Result<Option<Post>> {
        self.enter("posts.fetch_by_id").await?;
        Ok(self.data.lock().posts.iter().find(|p| &p.id == id).cloned())
    }

    async fn fetch_comments(&self, post: &PostId) -> Result<Vec<Comment>> {
        self.enter("posts.fetch_comments").await?;
        Ok(self
            .data
            .lock()
            .comments
            .iter()
            .filter(|c| &c.post_id == post)
            .cloned()
            .collect())
    }

    async fn submit(&self, draft: PostDraft) -> Result<Post> {
        self.enter("posts.submit").await?;
        let id = self.next_id("p");
        let created = Post {
            id: PostId::new(id),
            community_id: draft.community_id,
            author_id: UserId::new(USER),
            author_name: "Ada".to_string(),
            body: draft.body,
            created_at: 1_700_000_000_000,
            like_count: 0,
            liked_by_me: false,
            comment_count: 0,
        };
        self.data.lock().posts.push(created.clone());
        Ok(created)
    }

    async fn comment(&self, post: &PostId, body: String) -> Result<Comment> {
        self.enter("posts.comment").await?;
        let id = self.next_id("c");
        let created = Comment {
            id: CommentId::new(id),
            post_id: post.clone(),
            author_id: UserId::new(USER),
            author_name: "Ada".to_string(),
            body,
            created_at: 1_700_000_000_000,
        };
        self.data.lock().comments.push(created.clone());
        Ok(created)
    }

    async fn like(&self, post: &PostId) -> Result<Post> {
        self.enter("posts.like").await?;
        let mut data = self.data.lock();
        let found = data
            .posts
            .iter_mut()
            .find(|p| &p.id == post)
            .ok_or_else(|| RallyError::not_found(post.to_string()))?;
        found.liked_by_me = !found.liked_by_me;
        if found.liked_by_me {
            found.like_count += 1;
        } else {
            found.like_count -= 1;
        }
        Ok(found.clone())
    }
}

#[async_trait]
impl InviteUseCases for FakeBackend {
    async fn fetch_list(&self) -> Result<Vec<Invite>> {
        self.enter("invites.fetch_list").await?;
        Ok(self.data.lock().invites.clone())
    }

    async fn accept(&self, code: &InviteCode) -> Result<Membership> {
        self.enter("invites.accept").await?;
        let mut data = self.data.lock();
        let index = data
            .invites
            .iter()
            .position(|i| &i.code == code)
            .ok_or_else(|| RallyError::not_found(code.to_string()))?;
        let invite = data.invites.remove(index);
        Ok(Membership {
            community_id: invite.community_id,
            user_id: UserId::new(USER),
            role: MemberRole::Member,
        })
    }

    async fn decline(&self, code: &InviteCode) -> Result<()> {
        self.enter("invites.decline").await?;
        self.data.lock().invites.retain(|i| &i.code != code);
        Ok(())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn community(id: &str, name: &str, sport: &str, is_member: bool) -> Community {
    Community {
        id: CommunityId::new(id),
        name: name.to_string(),
        description: format!("{name} meets every week"),
        sport: sport.to_string(),
        member_count: 12,
        is_member,
    }
}

fn event(id: &str, community_id: &str, title: &str) -> Event {
    Event {
        id: EventId::new(id),
        community_id: CommunityId::new(community_id),
        title: title.to_string(),
        starts_at: 1_700_000_000_000,
        location: "Track gate".to_string(),
        capacity: Some(20),
        attendee_count: 4,
        rsvp: None,
    }
}

fn post(id: &str, community_id: &str, body: &str) -> Post {
    Post {
        id: PostId::new(id),
        community_id: CommunityId::new(community_id),
        author_id: UserId::new("u-grace"),
        author_name: "Grace".to_string(),
        body: body.to_string(),
        created_at: 1_699_000_000_000,
        like_count: 2,
        liked_by_me: false,
        comment_count: 1,
    }
}

fn comment(id: &str, post_id: &str, body: &str) -> Comment {
    Comment {
        id: CommentId::new(id),
        post_id: PostId::new(post_id),
        author_id: UserId::new("u-grace"),
        author_name: "Grace".to_string(),
        body: body.to_string(),
        created_at: 1_699_000_100_000,
    }
}

fn invite(code: &str, community_id: &str, community_name: &str) -> Invite {
    Invite {
        code: InviteCode::new(code),
        community_id: CommunityId::new(community_id),
        community_name: community_name.to_string(),
        invited_by: "Grace".to_string(),
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Wait until `sub` holds a value satisfying `done`; returns that value.
///
/// Panics after two seconds, or if the source closes without reaching it.
pub async fn settle<T, F>(mut sub: Subscription<T>, done: F) -> T
where
    T: Clone + Send + Sync + std::fmt::Debug + 'static,
    F: Fn(&T) -> bool,
{
    let wait = async {
        loop {
            let value = sub.get();
            if done(&value) {
                return value;
            }
            if sub.changed().await.is_none() {
                let last = sub.get();
                assert!(done(&last), "source closed at {last:?}");
                return last;
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(2), wait)
        .await
        .expect("state did not settle in time")
}

/// Let spawned tasks run.
pub async fn yield_a_bit() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

pub fn configs(stack: &AppStack) -> Vec<Screen> {
    stack.snapshot().configs().cloned().collect()
}

pub fn active(stack: &AppStack) -> &AppController {
    stack.active_controller().expect("top entry has a controller")
}
