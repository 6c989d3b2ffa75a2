//! Service configuration.

use serde::{Deserialize, Serialize};

use agora_perms::actions;

use crate::error::{PostsError, Result};

/// Placeholder body shown instead of a deleted post's content.
pub const DELETED_PLACEHOLDER: &str = "[[topic:post_is_deleted]]";

/// Name of the filter hook fired after posts are materialized.
pub const FILTER_GET_POSTS: &str = "filter:post.getPosts";

/// Configuration for the [`PostService`](crate::PostService).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Action a viewer needs for a post to appear on a listing page.
    pub read_action: String,
    /// Capability that lets a viewer see deleted posts.
    pub view_deleted_privilege: String,
    /// Body substituted into deleted posts.
    pub deleted_placeholder: String,
    /// Hook fired by post materialization.
    pub filter_hook: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            read_action: actions::TOPICS_READ.to_string(),
            view_deleted_privilege: actions::POSTS_VIEW_DELETED.to_string(),
            deleted_placeholder: DELETED_PLACEHOLDER.to_string(),
            filter_hook: FILTER_GET_POSTS.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Load a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| PostsError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject empty action or hook names.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("read_action", &self.read_action),
            ("view_deleted_privilege", &self.view_deleted_privilege),
            ("filter_hook", &self.filter_hook),
        ] {
            if value.trim().is_empty() {
                return Err(PostsError::Config(format!("{} must not be empty", field)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.read_action, "topics:read");
        assert_eq!(config.view_deleted_privilege, "posts:view_deleted");
        assert_eq!(config.deleted_placeholder, "[[topic:post_is_deleted]]");
        assert_eq!(config.filter_hook, "filter:post.getPosts");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config = ServiceConfig::from_json(r#"{"deleted_placeholder": "[removed]"}"#).unwrap();
        assert_eq!(config.deleted_placeholder, "[removed]");
        assert_eq!(config.read_action, "topics:read");
    }

    #[test]
    fn test_from_json_rejects_empty_action() {
        assert!(matches!(
            ServiceConfig::from_json(r#"{"read_action": " "}"#),
            Err(PostsError::Config(_))
        ));
        assert!(ServiceConfig::from_json("not json").is_err());
    }
}
