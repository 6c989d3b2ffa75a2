//! Strong type definitions for forum identifiers.
//!
//! All identifiers are newtypes to prevent mixing a topic id with a post id
//! at compile time. Post, topic and category ids are strictly positive;
//! user id 0 is the guest viewer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

macro_rules! positive_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "u64", into = "u64")]
        pub struct $name(u64);

        impl $name {
            /// Create an identifier, rejecting zero.
            pub const fn new(raw: u64) -> Option<Self> {
                if raw == 0 {
                    None
                } else {
                    Some(Self(raw))
                }
            }

            /// Get the raw integer value.
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<u64> for $name {
            type Error = CoreError;

            fn try_from(raw: u64) -> Result<Self, Self::Error> {
                Self::new(raw).ok_or_else(|| CoreError::InvalidId {
                    kind: $kind,
                    raw: raw.to_string(),
                })
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> u64 {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .ok()
                    .and_then(Self::new)
                    .ok_or_else(|| CoreError::InvalidId {
                        kind: $kind,
                        raw: s.to_string(),
                    })
            }
        }
    };
}

positive_id!(
    /// Post identifier. Unique per post and never reused.
    PostId,
    "post"
);

positive_id!(
    /// Topic identifier. Every post belongs to exactly one topic.
    TopicId,
    "topic"
);

positive_id!(
    /// Category identifier.
    CategoryId,
    "category"
);

/// A user identifier. Zero denotes a guest (not logged in).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl UserId {
    /// The guest viewer.
    pub const GUEST: Self = Self(0);

    /// Whether this is the guest viewer.
    pub const fn is_guest(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for UserId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}
