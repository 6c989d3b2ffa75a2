//! Post records and summaries.
//!
//! A [`PostRecord`] is the fully populated view of a single post as loaded
//! from the store. Records are created and mutated by the authoring side of
//! the forum; this workspace only reads and projects them.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::types::{CategoryId, PostId, TopicId, UserId};

/// The author sub-record embedded in a post view.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PostAuthor {
    pub uid: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub signature: String,
}

/// A single forum post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub pid: PostId,
    pub tid: TopicId,
    #[serde(default)]
    pub cid: Option<CategoryId>,
    /// The author.
    pub uid: UserId,
    /// Creation time (Unix ms).
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub deleted: bool,
    /// Set when the viewer authored this post.
    #[serde(default)]
    pub self_post: bool,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub user: Option<PostAuthor>,
    #[serde(default)]
    pub votes: i64,
    #[serde(default)]
    pub upvotes: u64,
    #[serde(default)]
    pub downvotes: u64,
}

impl PostRecord {
    /// Create a minimal record. Remaining fields take their defaults.
    pub fn new(pid: PostId, tid: TopicId, uid: UserId, content: impl Into<String>) -> Self {
        Self {
            pid,
            tid,
            cid: None,
            uid,
            timestamp: 0,
            deleted: false,
            self_post: false,
            content: content.into(),
            user: None,
            votes: 0,
            upvotes: 0,
            downvotes: 0,
        }
    }

    pub fn with_category(mut self, cid: CategoryId) -> Self {
        self.cid = Some(cid);
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_author(mut self, author: PostAuthor) -> Self {
        self.user = Some(author);
        self
    }

    pub fn with_votes(mut self, upvotes: u64, downvotes: u64) -> Self {
        self.upvotes = upvotes;
        self.downvotes = downvotes;
        self.votes = upvotes as i64 - downvotes as i64;
        self
    }

    pub fn deleted(mut self) -> Self {
        self.deleted = true;
        self
    }

    /// Decode a record from a JSON value, rejecting wrong shapes.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| CoreError::MalformedPost(e.to_string()))
    }
}

/// Short projection of a post used by listing pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub pid: PostId,
    pub tid: TopicId,
    pub uid: UserId,
    pub timestamp: i64,
    pub deleted: bool,
    pub content: String,
}

impl From<&PostRecord> for PostSummary {
    fn from(post: &PostRecord) -> Self {
        Self {
            pid: post.pid,
            tid: post.tid,
            uid: post.uid,
            timestamp: post.timestamp,
            deleted: post.deleted,
            content: post.content.clone(),
        }
    }
}
