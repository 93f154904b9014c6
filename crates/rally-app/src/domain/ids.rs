//! Opaque identifiers for app entities.
//!
//! Identifiers are assigned by the backend and carried through navigation
//! configs, so they are plain strings with stable serde forms.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new identifier
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the inner string
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

string_id!(
    /// Community identifier
    CommunityId,
    "community"
);

string_id!(
    /// Scheduled event identifier
    EventId,
    "event"
);

string_id!(
    /// Community post identifier
    PostId,
    "post"
);

string_id!(
    /// Comment identifier
    CommentId,
    "comment"
);

string_id!(
    /// Member (user account) identifier
    UserId,
    "user"
);

string_id!(
    /// Invitation code granting membership in a private community
    InviteCode,
    "invite"
);
