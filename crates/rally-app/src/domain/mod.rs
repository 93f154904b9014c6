//! App domain: identifiers, read models and use-case seams.

pub mod entities;
pub mod ids;
pub mod use_cases;

pub use entities::{
    CheckInReceipt, Comment, Community, CommunityFilter, Credentials, Event, Invite, MemberRole,
    Membership, Post, PostDraft, RsvpStatus, Session, TimestampMs,
};
pub use ids::{CommentId, CommunityId, EventId, InviteCode, PostId, UserId};
pub use use_cases::{
    AuthUseCases, CommunityUseCases, EventUseCases, InviteUseCases, PostUseCases, Services,
};
