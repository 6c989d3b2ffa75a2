//! The privilege service contract and the capability map it hands out.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use agora_core::{CategoryId, PostId, UserId};

use crate::error::Result;

/// Capabilities a viewer holds in some context, keyed by action name
/// (e.g. `posts:view_deleted`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Privileges(BTreeMap<String, bool>);

impl Privileges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a capability to true.
    pub fn grant(&mut self, action: impl Into<String>) {
        self.0.insert(action.into(), true);
    }

    /// Builder form of [`Privileges::grant`].
    pub fn with(mut self, action: impl Into<String>) -> Self {
        self.grant(action);
        self
    }

    pub fn set(&mut self, action: impl Into<String>, allowed: bool) {
        self.0.insert(action.into(), allowed);
    }

    /// Whether the capability is present and true.
    pub fn has(&self, action: &str) -> bool {
        self.0.get(action).copied().unwrap_or(false)
    }

    /// Iterate over granted capabilities.
    pub fn granted(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, allowed)| **allowed)
            .map(|(action, _)| action.as_str())
    }
}

impl<'a> FromIterator<&'a str> for Privileges {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(|a| (a.to_string(), true)).collect())
    }
}

/// Privilege checks consumed by the post services.
#[async_trait]
pub trait PrivilegeService: Send + Sync {
    /// Keep only the posts on which `uid` may perform `action`.
    ///
    /// The result is an order-preserving subset of `pids`.
    async fn filter(&self, action: &str, pids: Vec<PostId>, uid: UserId) -> Result<Vec<PostId>>;

    /// The capability map of `uid` inside a category (or forum-wide for `None`).
    async fn privileges(&self, uid: UserId, cid: Option<CategoryId>) -> Result<Privileges>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privileges_lookup() {
        let mut privileges = Privileges::new().with("topics:read");
        privileges.set("posts:view_deleted", false);

        assert!(privileges.has("topics:read"));
        assert!(!privileges.has("posts:view_deleted"));
        assert!(!privileges.has("admin"));
        assert_eq!(privileges.granted().collect::<Vec<_>>(), vec!["topics:read"]);
    }

    #[test]
    fn test_privileges_json_map() {
        let privileges: Privileges =
            serde_json::from_str(r#"{"posts:view_deleted": true, "posts:edit": false}"#).unwrap();
        assert!(privileges.has("posts:view_deleted"));
        assert!(!privileges.has("posts:edit"));

        let collected: Privileges = ["a", "b"].into_iter().collect();
        assert!(collected.has("a") && collected.has("b"));
    }
}
