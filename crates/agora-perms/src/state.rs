//! In-memory grant table.
//!
//! Privilege state is computed by applying grants and revocations. This
//! module provides the data structures and logic for maintaining and
//! querying that state, and an implementation of [`PrivilegeService`] on top.

use std::collections::HashMap;

use async_trait::async_trait;

use agora_core::{CategoryId, PostId, UserId};

use crate::error::{PermsError, Result};
use crate::grant::{actions, Conditions, Grant, GrantId, GrantScope, Revoke};
use crate::privileges::{PrivilegeService, Privileges};

/// State of a single grant.
#[derive(Debug, Clone)]
pub struct GrantState {
    pub id: GrantId,

    /// Who received this action.
    pub uid: UserId,

    pub action: String,

    pub scope: GrantScope,

    pub conditions: Option<Conditions>,

    /// Whether this grant has been revoked.
    pub revoked: bool,

    /// Why it was revoked (if revoked with a reason).
    pub revoke_reason: Option<String>,
}

impl GrantState {
    /// Check if this grant is currently valid.
    pub fn is_valid(&self, now: i64) -> bool {
        if self.revoked {
            return false;
        }

        match self.conditions {
            Some(ref conditions) => conditions.is_valid(now),
            None => true,
        }
    }
}

/// Aggregated privilege state.
#[derive(Debug, Default)]
pub struct GrantTable {
    /// All grants indexed by id.
    grants: HashMap<GrantId, GrantState>,

    /// Index: user -> list of their grants.
    by_user: HashMap<UserId, Vec<GrantId>>,

    /// Index: (user, scope key) -> grant ids for quick lookups.
    by_scope: HashMap<(UserId, ScopeKey), Vec<GrantId>>,

    /// Category of each known post.
    post_categories: HashMap<PostId, CategoryId>,

    next_id: u64,
}

/// Simplified scope key for indexing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ScopeKey {
    Global(String),
    Category(CategoryId, String),
}

impl ScopeKey {
    fn new(scope: GrantScope, action: &str) -> Self {
        match scope {
            GrantScope::Global => ScopeKey::Global(action.to_string()),
            GrantScope::Category { cid } => ScopeKey::Category(cid, action.to_string()),
        }
    }
}

impl GrantTable {
    /// Create a new empty grant table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a grant and return its id.
    pub fn apply_grant(&mut self, grant: Grant) -> GrantId {
        self.next_id += 1;
        let id = GrantId(self.next_id);
        let scope_key = ScopeKey::new(grant.scope, &grant.action);

        self.by_user.entry(grant.uid).or_default().push(id);
        self.by_scope
            .entry((grant.uid, scope_key))
            .or_default()
            .push(id);

        self.grants.insert(
            id,
            GrantState {
                id,
                uid: grant.uid,
                action: grant.action,
                scope: grant.scope,
                conditions: grant.conditions,
                revoked: false,
                revoke_reason: None,
            },
        );

        id
    }

    /// Revoke a previous grant.
    pub fn apply_revoke(&mut self, revoke: Revoke) -> Result<()> {
        let grant = self
            .grants
            .get_mut(&revoke.grant_id)
            .ok_or(PermsError::GrantNotFound(revoke.grant_id.0))?;

        if grant.revoked {
            return Err(PermsError::GrantRevoked(revoke.grant_id.0));
        }

        grant.revoked = true;
        grant.revoke_reason = revoke.reason;
        Ok(())
    }

    /// Record which category a post lives in.
    pub fn assign_post(&mut self, pid: PostId, cid: CategoryId) {
        self.post_categories.insert(pid, cid);
    }

    /// Category of a post, if known.
    pub fn category_of(&self, pid: PostId) -> Option<CategoryId> {
        self.post_categories.get(&pid).copied()
    }

    fn holds_exact(&self, uid: UserId, key: ScopeKey, now: i64) -> bool {
        self.by_scope
            .get(&(uid, key))
            .into_iter()
            .flatten()
            .filter_map(|id| self.grants.get(id))
            .any(|grant| grant.is_valid(now))
    }

    fn holds(&self, uid: UserId, action: &str, cid: Option<CategoryId>, now: i64) -> bool {
        if self.holds_exact(uid, ScopeKey::Global(action.to_string()), now) {
            return true;
        }
        match cid {
            Some(cid) => self.holds_exact(uid, ScopeKey::Category(cid, action.to_string()), now),
            None => false,
        }
    }

    /// Check if a user may perform an action in a category.
    ///
    /// An `admin` grant covering the category implies every action.
    pub fn can(&self, uid: UserId, action: &str, cid: Option<CategoryId>, now: i64) -> bool {
        self.holds(uid, action, cid, now) || self.holds(uid, actions::ADMIN, cid, now)
    }

    /// The capability map of a user in a category.
    pub fn privileges_for(&self, uid: UserId, cid: Option<CategoryId>, now: i64) -> Privileges {
        if self.holds(uid, actions::ADMIN, cid, now) {
            return actions::ALL.into_iter().collect();
        }

        let mut privileges = Privileges::new();
        for grant in self.valid_grants_for(uid, now) {
            if grant.scope.covers(cid) {
                privileges.grant(grant.action.clone());
            }
        }
        privileges
    }

    /// Get a grant by id.
    pub fn get_grant(&self, id: GrantId) -> Option<&GrantState> {
        self.grants.get(&id)
    }

    /// List all grants for a user.
    pub fn grants_for(&self, uid: UserId) -> Vec<&GrantState> {
        self.by_user
            .get(&uid)
            .map(|ids| ids.iter().filter_map(|id| self.grants.get(id)).collect())
            .unwrap_or_default()
    }

    /// List all valid grants for a user.
    pub fn valid_grants_for(&self, uid: UserId, now: i64) -> Vec<&GrantState> {
        self.grants_for(uid)
            .into_iter()
            .filter(|g| g.is_valid(now))
            .collect()
    }
}

#[async_trait]
impl PrivilegeService for GrantTable {
    async fn filter(&self, action: &str, pids: Vec<PostId>, uid: UserId) -> Result<Vec<PostId>> {
        let now = now_millis();
        Ok(pids
            .into_iter()
            .filter(|pid| self.can(uid, action, self.category_of(*pid), now))
            .collect())
    }

    async fn privileges(&self, uid: UserId, cid: Option<CategoryId>) -> Result<Privileges> {
        Ok(self.privileges_for(uid, cid, now_millis()))
    }
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
