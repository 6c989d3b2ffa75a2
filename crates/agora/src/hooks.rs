//! Extensibility hooks run over materialized posts.
//!
//! Plugins see the full list of posts for a request and may drop, add,
//! replace or reorder entries. Returning `None` means "no posts".

use std::sync::Arc;

use async_trait::async_trait;

use agora_core::{PostRecord, UserId};

/// The payload passed through a posts filter hook.
#[derive(Debug, Clone, PartialEq)]
pub struct PostsPayload {
    /// Materialized posts. `None` marks an id with no record.
    pub posts: Vec<Option<PostRecord>>,
    /// The viewer.
    pub uid: UserId,
}

/// A filter over materialized posts.
#[async_trait]
pub trait PostsFilter: Send + Sync {
    /// Run the filter for `hook`. Filters ignore hooks they do not handle by
    /// returning the payload untouched.
    async fn fire(&self, hook: &str, payload: PostsPayload) -> anyhow::Result<Option<PostsPayload>>;
}

/// A filter that returns the payload untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFilter;

#[async_trait]
impl PostsFilter for NoopFilter {
    async fn fire(
        &self,
        _hook: &str,
        payload: PostsPayload,
    ) -> anyhow::Result<Option<PostsPayload>> {
        Ok(Some(payload))
    }
}

/// Runs filters in registration order, feeding each the previous output.
///
/// A filter returning `None` ends the chain with `None`.
#[derive(Default, Clone)]
pub struct FilterChain {
    filters: Vec<Arc<dyn PostsFilter>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, filter: impl PostsFilter + 'static) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

#[async_trait]
impl PostsFilter for FilterChain {
    async fn fire(
        &self,
        hook: &str,
        payload: PostsPayload,
    ) -> anyhow::Result<Option<PostsPayload>> {
        let mut current = payload;
        for filter in &self.filters {
            match filter.fire(hook, current).await? {
                Some(next) => current = next,
                None => {
                    tracing::debug!(hook, "filter chain cut short");
                    return Ok(None);
                }
            }
        }
        Ok(Some(current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::{PostId, TopicId};

    fn post(n: u64) -> PostRecord {
        PostRecord::new(PostId::new(n).unwrap(), TopicId::new(1).unwrap(), UserId(1), "")
    }

    struct Reverse;

    #[async_trait]
    impl PostsFilter for Reverse {
        async fn fire(
            &self,
            _hook: &str,
            mut payload: PostsPayload,
        ) -> anyhow::Result<Option<PostsPayload>> {
            payload.posts.reverse();
            Ok(Some(payload))
        }
    }

    struct Swallow;

    #[async_trait]
    impl PostsFilter for Swallow {
        async fn fire(
            &self,
            _hook: &str,
            _payload: PostsPayload,
        ) -> anyhow::Result<Option<PostsPayload>> {
            Ok(None)
        }
    }

    struct Fail;

    #[async_trait]
    impl PostsFilter for Fail {
        async fn fire(
            &self,
            hook: &str,
            _payload: PostsPayload,
        ) -> anyhow::Result<Option<PostsPayload>> {
            anyhow::bail!("plugin crashed on {}", hook)
        }
    }

    fn payload() -> PostsPayload {
        PostsPayload {
            posts: vec![Some(post(1)), None, Some(post(2))],
            uid: UserId(3),
        }
    }

    #[tokio::test]
    async fn test_empty_chain_is_identity() {
        let out = FilterChain::new().fire("h", payload()).await.unwrap();
        assert_eq!(out, Some(payload()));
    }

    #[tokio::test]
    async fn test_chain_runs_in_order() {
        let chain = FilterChain::new().register(Reverse).register(NoopFilter);
        assert_eq!(chain.len(), 2);

        let out = chain.fire("h", payload()).await.unwrap().unwrap();
        assert_eq!(out.posts[0].as_ref().map(|p| p.pid.get()), Some(2));
        assert!(out.posts[1].is_none());
    }

    #[tokio::test]
    async fn test_chain_stops_on_none() {
        let chain = FilterChain::new().register(Swallow).register(Fail);
        assert_eq!(chain.fire("h", payload()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_chain_propagates_failure() {
        let chain = FilterChain::new().register(NoopFilter).register(Fail);
        let err = chain.fire("filter:post.getPosts", payload()).await.unwrap_err();
        assert!(err.to_string().contains("filter:post.getPosts"));
    }
}
