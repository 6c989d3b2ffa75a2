//! Post materialization: ids in, rendered and hook-filtered records out.

use futures::future::try_join_all;

use agora_core::{PostId, PostRecord, UserId};
use agora_store::SortedStore;

use crate::error::{PostsError, Result};
use crate::hooks::PostsPayload;
use crate::service::PostService;

impl<S: SortedStore + 'static> PostService<S> {
    /// Load, parse and filter the posts for `pids` as seen by `viewer`.
    ///
    /// Parsing runs concurrently; results keep input order until the filter
    /// hook, which may reorder, drop or add posts. The output never contains
    /// gaps. Empty input returns immediately without firing the hook.
    pub async fn fetch_rendered_posts(
        &self,
        pids: &[PostId],
        viewer: UserId,
    ) -> Result<Vec<PostRecord>> {
        if pids.is_empty() {
            return Ok(Vec::new());
        }

        let records = self.store.get_posts(pids).await?;

        let parser = &self.parser;
        let posts = try_join_all(records.into_iter().map(|record| async move {
            match record {
                Some(post) => parser.parse(post).await.map(Some),
                None => Ok(None),
            }
        }))
        .await
        .map_err(|e| PostsError::Parser(e.into()))?;

        let hook = self.config.filter_hook.as_str();
        let filtered = self
            .filter
            .fire(hook, PostsPayload { posts, uid: viewer })
            .await
            .map_err(|e| PostsError::Hook {
                hook: hook.to_string(),
                source: e.into(),
            })?;

        let Some(payload) = filtered else {
            tracing::warn!(hook, requested = pids.len(), "filter hook returned no posts");
            return Ok(Vec::new());
        };

        Ok(payload.posts.into_iter().flatten().collect())
    }
}
