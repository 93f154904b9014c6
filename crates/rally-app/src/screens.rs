//! Navigation configurations for every reachable screen.

use rally_core::SemanticVersion;
use rally_nav::ScreenConfig;
use serde::{Deserialize, Serialize};

use crate::domain::{CommunityId, EventId, PostId};

/// A screen and the parameters needed to rebuild it.
///
/// Variants carry identifiers only, never loaded data: controllers fetch
/// what they display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Screen {
    /// Sign-in screen
    Login,
    /// Community discovery (the signed-in root)
    Home,
    /// One community: details, upcoming events and feed
    Community {
        /// Community shown
        community_id: CommunityId,
    },
    /// One event with RSVP
    Event {
        /// Event shown
        event_id: EventId,
    },
    /// Event check-in confirmation
    CheckIn {
        /// Event checked into
        event_id: EventId,
    },
    /// One post with comments
    Post {
        /// Post shown
        post_id: PostId,
    },
    /// New post composer
    Compose {
        /// Feed the post goes to
        community_id: CommunityId,
    },
    /// Pending invitations
    Invites,
}

impl Screen {
    /// Community screen for `id`.
    pub fn community(id: impl Into<CommunityId>) -> Self {
        Screen::Community {
            community_id: id.into(),
        }
    }

    /// Event screen for `id`.
    pub fn event(id: impl Into<EventId>) -> Self {
        Screen::Event { event_id: id.into() }
    }

    /// Check-in screen for `id`.
    pub fn check_in(id: impl Into<EventId>) -> Self {
        Screen::CheckIn { event_id: id.into() }
    }

    /// Post screen for `id`.
    pub fn post(id: impl Into<PostId>) -> Self {
        Screen::Post { post_id: id.into() }
    }

    /// Composer for the feed of `id`.
    pub fn compose(id: impl Into<CommunityId>) -> Self {
        Screen::Compose {
            community_id: id.into(),
        }
    }
}

impl ScreenConfig for Screen {
    // Bump the major version whenever a variant's fields change shape.
    const SCHEMA: SemanticVersion = SemanticVersion::new(1, 0, 0);

    const TAGS: &'static [&'static str] = &[
        "login",
        "home",
        "community",
        "event",
        "check_in",
        "post",
        "compose",
        "invites",
    ];

    fn tag(&self) -> &'static str {
        match self {
            Screen::Login => "login",
            Screen::Home => "home",
            Screen::Community { .. } => "community",
            Screen::Event { .. } => "event",
            Screen::CheckIn { .. } => "check_in",
            Screen::Post { .. } => "post",
            Screen::Compose { .. } => "compose",
            Screen::Invites => "invites",
        }
    }
}
