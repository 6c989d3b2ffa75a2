//! Masking of soft-deleted posts.

use std::collections::HashMap;

use agora_core::{CategoryId, PostRecord, UserId};
use agora_perms::{actions, Privileges};
use agora_store::SortedStore;

use crate::config::DELETED_PLACEHOLDER;
use crate::error::Result;
use crate::service::PostService;

/// Hide a deleted post's body and author signature from a viewer who did
/// not write it and lacks `posts:view_deleted`.
///
/// Does nothing for `None`. Applying it twice changes nothing further.
pub fn apply_deletion_mask(post: Option<&mut PostRecord>, privileges: &Privileges) {
    mask(post, privileges, actions::POSTS_VIEW_DELETED, DELETED_PLACEHOLDER);
}

fn mask(
    post: Option<&mut PostRecord>,
    privileges: &Privileges,
    capability: &str,
    placeholder: &str,
) -> bool {
    let Some(post) = post else {
        return false;
    };
    if !post.deleted || post.self_post || privileges.has(capability) {
        return false;
    }

    post.content = placeholder.to_string();
    if let Some(user) = post.user.as_mut() {
        user.signature.clear();
    }
    true
}

impl<S: SortedStore + 'static> PostService<S> {
    /// [`apply_deletion_mask`] with the configured capability and placeholder.
    pub fn apply_deletion_mask(&self, post: Option<&mut PostRecord>, privileges: &Privileges) {
        let pid = post.as_ref().map(|p| p.pid);
        if mask(
            post,
            privileges,
            &self.config.view_deleted_privilege,
            &self.config.deleted_placeholder,
        ) {
            tracing::trace!(?pid, "masked deleted post");
        }
    }

    /// Mark `viewer`'s own posts and mask the deleted posts they may not see.
    ///
    /// Privileges are looked up once per category that holds a maskable post.
    pub async fn redact_for_viewer(&self, posts: &mut [PostRecord], viewer: UserId) -> Result<()> {
        let mut by_category: HashMap<Option<CategoryId>, Privileges> = HashMap::new();

        for post in posts.iter_mut() {
            post.self_post = !viewer.is_guest() && post.uid == viewer;
            if !post.deleted || post.self_post {
                continue;
            }

            if !by_category.contains_key(&post.cid) {
                let privileges = self.privileges.privileges(viewer, post.cid).await?;
                by_category.insert(post.cid, privileges);
            }
            if let Some(privileges) = by_category.get(&post.cid) {
                self.apply_deletion_mask(Some(post), privileges);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use agora_core::{PostAuthor, PostId, TopicId};
    use agora_perms::{Grant, GrantTable};
    use agora_store::MemoryStore;

    use crate::config::ServiceConfig;

    fn deleted_post(author: UserId) -> PostRecord {
        PostRecord::new(PostId::new(1).unwrap(), TopicId::new(1).unwrap(), author, "secret")
            .with_author(PostAuthor {
                uid: author,
                username: "alice".into(),
                signature: "sig".into(),
            })
            .deleted()
    }

    #[test]
    fn test_mask_deleted_post() {
        let mut post = deleted_post(UserId(1));
        apply_deletion_mask(Some(&mut post), &Privileges::new());

        assert_eq!(post.content, "[[topic:post_is_deleted]]");
        assert_eq!(post.user.as_ref().unwrap().signature, "");
        assert_eq!(post.user.as_ref().unwrap().username, "alice");

        let once = post.clone();
        apply_deletion_mask(Some(&mut post), &Privileges::new());
        assert_eq!(post, once);
    }

    #[test]
    fn test_mask_without_author_record() {
        let mut post = deleted_post(UserId(1));
        post.user = None;
        apply_deletion_mask(Some(&mut post), &Privileges::new());
        assert_eq!(post.content, "[[topic:post_is_deleted]]");
        assert!(post.user.is_none());
    }

    #[test]
    fn test_mask_skips_visible_posts() {
        let mut own = deleted_post(UserId(1));
        own.self_post = true;
        let before = own.clone();
        apply_deletion_mask(Some(&mut own), &Privileges::new());
        assert_eq!(own, before);

        let mut moderated = deleted_post(UserId(1));
        let before = moderated.clone();
        apply_deletion_mask(Some(&mut moderated), &Privileges::new().with("posts:view_deleted"));
        assert_eq!(moderated, before);

        let mut live = deleted_post(UserId(1));
        live.deleted = false;
        let before = live.clone();
        apply_deletion_mask(Some(&mut live), &Privileges::new());
        assert_eq!(live, before);

        apply_deletion_mask(None, &Privileges::new());
    }

    #[test]
    fn test_configured_placeholder() {
        let config = ServiceConfig {
            deleted_placeholder: "[removed]".into(),
            ..ServiceConfig::default()
        };
        let service = PostService::new(MemoryStore::new(), Arc::new(GrantTable::new()), config);

        let mut post = deleted_post(UserId(1));
        service.apply_deletion_mask(Some(&mut post), &Privileges::new());
        assert_eq!(post.content, "[removed]");
    }

    #[tokio::test]
    async fn test_redact_for_viewer() {
        let cid = agora_core::CategoryId::new(3).unwrap();
        let mut grants = GrantTable::new();
        grants.apply_grant(Grant::in_category(UserId(7), "posts:view_deleted", cid));
        let service =
            PostService::new(MemoryStore::new(), Arc::new(grants), ServiceConfig::default());

        let mut posts = vec![
            deleted_post(UserId(1)),
            deleted_post(UserId(2)),
            deleted_post(UserId(1)).with_category(cid),
        ];
        service.redact_for_viewer(&mut posts, UserId(2)).await.unwrap();
        assert_eq!(posts[0].content, "[[topic:post_is_deleted]]");
        assert!(posts[1].self_post);
        assert_eq!(posts[1].content, "secret");
        assert_eq!(posts[2].content, "[[topic:post_is_deleted]]");

        let mut posts = vec![deleted_post(UserId(1)), deleted_post(UserId(1)).with_category(cid)];
        service.redact_for_viewer(&mut posts, UserId(7)).await.unwrap();
        assert_eq!(posts[0].content, "[[topic:post_is_deleted]]");
        assert_eq!(posts[1].content, "secret");
        assert_eq!(posts[1].user.as_ref().unwrap().signature, "sig");
    }

    #[tokio::test]
    async fn test_guest_never_owns_posts() {
        let service = PostService::new(
            MemoryStore::new(),
            Arc::new(GrantTable::new()),
            ServiceConfig::default(),
        );
        let mut posts = vec![deleted_post(UserId::GUEST)];
        service.redact_for_viewer(&mut posts, UserId::GUEST).await.unwrap();
        assert!(!posts[0].self_post);
        assert_eq!(posts[0].content, "[[topic:post_is_deleted]]");
    }
}
