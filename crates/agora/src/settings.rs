//! Viewer preferences consumed by rank resolution.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use agora_core::{SortMode, UserId};

/// The subset of user settings the post services read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    #[serde(alias = "topicPostSort")]
    pub topic_post_sort: SortMode,
}

/// Source of per-user settings.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    async fn get_settings(&self, uid: UserId) -> anyhow::Result<UserSettings>;
}

/// Fixed settings: one sort mode for everybody, with optional per-user overrides.
#[derive(Debug, Clone, Default)]
pub struct StaticSettings {
    default: UserSettings,
    overrides: HashMap<UserId, UserSettings>,
}

impl StaticSettings {
    pub fn new(topic_post_sort: SortMode) -> Self {
        Self {
            default: UserSettings { topic_post_sort },
            overrides: HashMap::new(),
        }
    }

    pub fn with_override(mut self, uid: UserId, topic_post_sort: SortMode) -> Self {
        self.overrides.insert(uid, UserSettings { topic_post_sort });
        self
    }
}

#[async_trait]
impl SettingsProvider for StaticSettings {
    async fn get_settings(&self, uid: UserId) -> anyhow::Result<UserSettings> {
        Ok(self.overrides.get(&uid).copied().unwrap_or(self.default))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_settings_override() {
        let settings = StaticSettings::new(SortMode::NewestToOldest)
            .with_override(UserId(4), SortMode::MostVotes);

        assert_eq!(
            settings.get_settings(UserId(1)).await.unwrap().topic_post_sort,
            SortMode::NewestToOldest
        );
        assert_eq!(
            settings.get_settings(UserId(4)).await.unwrap().topic_post_sort,
            SortMode::MostVotes
        );
    }

    #[test]
    fn test_user_settings_accepts_stored_key() {
        let settings: UserSettings =
            serde_json::from_str(r#"{"topicPostSort": "newest_to_oldest"}"#).unwrap();
        assert_eq!(settings.topic_post_sort, SortMode::NewestToOldest);

        let settings: UserSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.topic_post_sort, SortMode::OldestToNewest);

        let settings: UserSettings =
            serde_json::from_str(r#"{"topicPostSort": "sideways"}"#).unwrap();
        assert_eq!(settings.topic_post_sort, SortMode::OldestToNewest);
    }
}
