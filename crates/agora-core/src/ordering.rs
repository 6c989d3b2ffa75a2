//! Ordering sets, sort modes and positions.
//!
//! Every topic keeps two ordering sets: one scored by post time and one
//! scored by votes. A viewer's [`SortMode`] decides which set is consulted
//! and whether the rank is taken from the head or the tail.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::types::{PostId, TopicId};

/// Key of a named ordering set in the sorted collection store.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SetKey(String);

impl SetKey {
    /// Wrap an arbitrary set name, e.g. `uid:5:posts`.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Time-ordered posts of a topic: `tid:{tid}:posts`.
    pub fn topic_posts(tid: TopicId) -> Self {
        Self(format!("tid:{}:posts", tid))
    }

    /// Vote-ordered posts of a topic: `tid:{tid}:posts:votes`.
    pub fn topic_votes(tid: TopicId) -> Self {
        Self(format!("tid:{}:posts:votes", tid))
    }

    /// The object key of a post record: `post:{pid}`.
    pub fn post_object(pid: PostId) -> Self {
        Self(format!("post:{}", pid))
    }

    /// The ordering set a sort mode reads for a topic.
    pub fn for_topic(tid: TopicId, mode: SortMode) -> Self {
        if mode.uses_votes() {
            Self::topic_votes(tid)
        } else {
            Self::topic_posts(tid)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SetKey({})", self.0)
    }
}

impl fmt::Display for SetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SetKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SetKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SetKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Which end of an ordering set ranks are counted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Ascending score; rank 0 is the lowest score.
    Forward,
    /// Descending score; rank 0 is the highest score.
    Reverse,
}

impl Direction {
    pub fn is_reverse(self) -> bool {
        matches!(self, Direction::Reverse)
    }
}

/// A viewer's preferred order for posts inside a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    NewestToOldest,
    MostVotes,
    /// Also what unrecognised stored values decode to.
    #[default]
    #[serde(other)]
    OldestToNewest,
}

impl SortMode {
    pub const ALL: [SortMode; 3] = [
        SortMode::OldestToNewest,
        SortMode::NewestToOldest,
        SortMode::MostVotes,
    ];

    /// Whether the vote-scored ordering set is consulted.
    pub fn uses_votes(self) -> bool {
        matches!(self, SortMode::MostVotes)
    }

    /// Newest-first and most-voted read the set from the tail.
    pub fn direction(self) -> Direction {
        match self {
            SortMode::OldestToNewest => Direction::Forward,
            SortMode::NewestToOldest | SortMode::MostVotes => Direction::Reverse,
        }
    }

    /// Interpret a stored setting value. Unknown values fall back to the default.
    pub fn from_setting(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::OldestToNewest => "oldest_to_newest",
            SortMode::NewestToOldest => "newest_to_oldest",
            SortMode::MostVotes => "most_votes",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "oldest_to_newest" => Ok(SortMode::OldestToNewest),
            "newest_to_oldest" => Ok(SortMode::NewestToOldest),
            "most_votes" => Ok(SortMode::MostVotes),
            other => Err(CoreError::UnknownSortMode(other.to_string())),
        }
    }
}

/// A 1-based position of a post inside its ordering set.
///
/// Zero means the post is not ranked: it is absent from the set or the
/// lookup arguments were invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Position(pub u64);

impl Position {
    /// Not found / indeterminate.
    pub const NONE: Self = Self(0);

    /// Convert a zero-based store rank into a position.
    pub fn from_rank(rank: Option<u64>) -> Self {
        match rank {
            Some(rank) => Self(rank.saturating_add(1)),
            None => Self::NONE,
        }
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub fn is_ranked(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<u64> for Position {
    fn eq(&self, other: &u64) -> bool {
        self.0 == *other
    }
}
