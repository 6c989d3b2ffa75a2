//! Privilege grants and revocations.
//!
//! A grant gives one user one action, either forum-wide or inside a single
//! category. A revocation disables a previous grant.

use serde::{Deserialize, Serialize};

use agora_core::{CategoryId, UserId};

/// Well-known action names.
pub mod actions {
    /// Read topics and the posts inside them.
    pub const TOPICS_READ: &str = "topics:read";
    /// See the content of soft-deleted posts.
    pub const POSTS_VIEW_DELETED: &str = "posts:view_deleted";
    /// Edit other users' posts.
    pub const POSTS_EDIT: &str = "posts:edit";
    /// Delete other users' posts.
    pub const POSTS_DELETE: &str = "posts:delete";
    /// Implies every other action.
    pub const ADMIN: &str = "admin";

    /// Every action an administrator implicitly holds.
    pub const ALL: [&str; 5] = [TOPICS_READ, POSTS_VIEW_DELETED, POSTS_EDIT, POSTS_DELETE, ADMIN];
}

/// Identifier assigned to a grant by the table that recorded it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrantId(pub u64);

/// Where a grant applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum GrantScope {
    /// Every category.
    Global,
    /// One category only.
    Category { cid: CategoryId },
}

impl GrantScope {
    /// Whether this scope covers a post in the given category.
    ///
    /// Posts without a category are only covered by global grants.
    pub fn covers(&self, cid: Option<CategoryId>) -> bool {
        match self {
            GrantScope::Global => true,
            GrantScope::Category { cid: scoped } => cid == Some(*scoped),
        }
    }
}

/// Conditions that may limit a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Conditions {
    /// When the grant expires (Unix milliseconds).
    pub expires_at: Option<i64>,
}

impl Conditions {
    /// Create conditions with an expiration time.
    pub fn expires_at(timestamp: i64) -> Self {
        Self {
            expires_at: Some(timestamp),
        }
    }

    /// Check if conditions are satisfied at `now`.
    pub fn is_valid(&self, now: i64) -> bool {
        self.expires_at.map_or(true, |expires| now < expires)
    }
}

/// A request to grant an action to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// The user receiving the action.
    pub uid: UserId,

    /// Action name, see [`actions`].
    pub action: String,

    pub scope: GrantScope,

    #[serde(default)]
    pub conditions: Option<Conditions>,
}

impl Grant {
    /// Grant an action everywhere.
    pub fn global(uid: UserId, action: impl Into<String>) -> Self {
        Self {
            uid,
            action: action.into(),
            scope: GrantScope::Global,
            conditions: None,
        }
    }

    /// Grant an action inside one category.
    pub fn in_category(uid: UserId, action: impl Into<String>, cid: CategoryId) -> Self {
        Self {
            uid,
            action: action.into(),
            scope: GrantScope::Category { cid },
            conditions: None,
        }
    }

    /// Grant read access to topics everywhere.
    pub fn read_everywhere(uid: UserId) -> Self {
        Self::global(uid, actions::TOPICS_READ)
    }

    /// Add conditions to this grant.
    pub fn with_conditions(mut self, conditions: Conditions) -> Self {
        self.conditions = Some(conditions);
        self
    }
}

/// A revocation of a previous grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revoke {
    /// The grant being revoked.
    pub grant_id: GrantId,

    /// Optional reason for revocation.
    pub reason: Option<String>,
}

impl Revoke {
    pub fn new(grant_id: GrantId) -> Self {
        Self {
            grant_id,
            reason: None,
        }
    }

    pub fn with_reason(grant_id: GrantId, reason: impl Into<String>) -> Self {
        Self {
            grant_id,
            reason: Some(reason.into()),
        }
    }
}
