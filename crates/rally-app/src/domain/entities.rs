//! Data returned by the use-case layer.
//!
//! These are read models only. Validation and persistence rules belong to
//! whatever implements the use-case traits.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ids::{CommentId, CommunityId, EventId, InviteCode, PostId, UserId};

/// Timestamp in milliseconds since the Unix epoch.
pub type TimestampMs = u64;

// ============================================================================
// Accounts
// ============================================================================

/// Login credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
}

impl Credentials {
    /// Build credentials from an email and password.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Signed-in user
    pub user_id: UserId,
    /// Name shown in the app chrome
    pub display_name: String,
}

// ============================================================================
// Communities
// ============================================================================

/// A fitness community (club, crew, team).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Community {
    /// Community id
    pub id: CommunityId,
    /// Display name
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Primary activity, e.g. "running"
    pub sport: String,
    /// Current member count
    pub member_count: u32,
    /// Whether the signed-in user is a member
    pub is_member: bool,
}

/// Discovery filter for the community list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityFilter {
    /// Free-text search
    pub query: Option<String>,
    /// Restrict to one activity
    pub sport: Option<String>,
    /// Only communities the user belongs to
    pub joined_only: bool,
}

/// Role within a community.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberRole {
    /// Regular member
    Member,
    /// Can create events and manage invites
    Organizer,
}

/// Membership granted by joining or accepting an invite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    /// Community joined
    pub community_id: CommunityId,
    /// Member
    pub user_id: UserId,
    /// Role in the community
    pub role: MemberRole,
}

// ============================================================================
// Events
// ============================================================================

/// Attendance intent for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsvpStatus {
    /// Attending
    Going,
    /// Might attend
    Interested,
    /// Not attending
    NotGoing,
}

/// A scheduled community event (run, ride, class).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event id
    pub id: EventId,
    /// Hosting community
    pub community_id: CommunityId,
    /// Title
    pub title: String,
    /// Start time
    pub starts_at: TimestampMs,
    /// Meeting point
    pub location: String,
    /// Maximum attendees, if limited
    pub capacity: Option<u32>,
    /// Number of members going
    pub attendee_count: u32,
    /// The signed-in user's RSVP
    pub rsvp: Option<RsvpStatus>,
}

/// Proof of attendance returned by a check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInReceipt {
    /// Event checked into
    pub event_id: EventId,
    /// Attendee
    pub user_id: UserId,
    /// When the check-in was recorded
    pub checked_in_at: TimestampMs,
}

// ============================================================================
// Posts
// ============================================================================

/// A post on a community feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Post id
    pub id: PostId,
    /// Community feed the post belongs to
    pub community_id: CommunityId,
    /// Author
    pub author_id: UserId,
    /// Author display name
    pub author_name: String,
    /// Body text
    pub body: String,
    /// Creation time
    pub created_at: TimestampMs,
    /// Total likes
    pub like_count: u32,
    /// Whether the signed-in user liked it
    pub liked_by_me: bool,
    /// Total comments
    pub comment_count: u32,
}

/// A comment on a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment id
    pub id: CommentId,
    /// Parent post
    pub post_id: PostId,
    /// Author
    pub author_id: UserId,
    /// Author display name
    pub author_name: String,
    /// Body text
    pub body: String,
    /// Creation time
    pub created_at: TimestampMs,
}

/// A post being written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDraft {
    /// Target community
    pub community_id: CommunityId,
    /// Body text
    pub body: String,
}

// ============================================================================
// Invites
// ============================================================================

/// A pending invitation to join a community.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invite {
    /// Invite code
    pub code: InviteCode,
    /// Community the invite grants access to
    pub community_id: CommunityId,
    /// Community display name
    pub community_name: String,
    /// Display name of the inviter
    pub invited_by: String,
}
