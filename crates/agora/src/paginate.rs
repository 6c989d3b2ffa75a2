//! Listing pages filtered by read privilege.

use serde::{Deserialize, Serialize};

use agora_core::{Direction, PostSummary, SetKey, UserId};
use agora_store::SortedStore;

use crate::error::{PostsError, Result};
use crate::service::PostService;
use crate::summary::SummaryOptions;

/// One page of post summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPage {
    pub posts: Vec<PostSummary>,
    /// Start index for the following page. Always `stop + 1`; an empty page
    /// marks the end of the set.
    pub next_start: i64,
}

impl<S: SortedStore + 'static> PostService<S> {
    /// Summaries of the posts at reverse indices `start..=stop` of `key` that
    /// `viewer` may read.
    ///
    /// Filtering can leave fewer posts than the range asked for.
    pub async fn page_from_ordering_set(
        &self,
        key: &SetKey,
        viewer: UserId,
        start: i64,
        stop: i64,
    ) -> Result<PostPage> {
        let pids = self.store.range(key, start, stop, Direction::Reverse).await?;
        let fetched = pids.len();

        let pids = self
            .privileges
            .filter(&self.config.read_action, pids, viewer)
            .await?;
        tracing::trace!(%key, fetched, readable = pids.len(), "filtered page");

        let posts = self
            .summarizer
            .summarize(&pids, viewer, SummaryOptions { strip_tags: false })
            .await
            .map_err(|e| PostsError::Summarizer(e.into()))?;

        Ok(PostPage {
            posts,
            next_start: stop.saturating_add(1),
        })
    }
}
