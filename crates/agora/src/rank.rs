//! Rank resolution: 1-based positions of posts inside their topic.
//!
//! A post's position depends on the viewer's sort mode, which picks both the
//! ordering set (time or votes) and the direction the rank is read in. Many
//! posts are always resolved in a single batched store query.

use agora_core::{Direction, PostId, PostRecord, Position, SetKey, SortMode, TopicId, UserId};
use agora_store::{BatchRankQuery, SortedStore, SortedStoreExt};

use crate::error::{PostsError, Result};
use crate::service::PostService;

/// Anything that names a post and the topic it belongs to.
pub trait TopicPost {
    fn pid(&self) -> PostId;
    fn tid(&self) -> TopicId;
}

impl TopicPost for PostRecord {
    fn pid(&self) -> PostId {
        self.pid
    }

    fn tid(&self) -> TopicId {
        self.tid
    }
}

impl TopicPost for (PostId, TopicId) {
    fn pid(&self) -> PostId {
        self.0
    }

    fn tid(&self) -> TopicId {
        self.1
    }
}

impl<T: TopicPost> TopicPost for &T {
    fn pid(&self) -> PostId {
        (*self).pid()
    }

    fn tid(&self) -> TopicId {
        (*self).tid()
    }
}

/// The ordering set and read direction for a topic under a sort mode.
pub fn ordering_for(tid: TopicId, mode: SortMode) -> (SetKey, Direction) {
    (SetKey::for_topic(tid, mode), mode.direction())
}

impl<S: SortedStore + 'static> PostService<S> {
    /// Position of one post in its topic under `mode`.
    pub async fn resolve_single_rank(
        &self,
        pid: PostId,
        tid: TopicId,
        mode: SortMode,
    ) -> Result<Position> {
        let (key, direction) = ordering_for(tid, mode);
        let rank = self.store.rank(&key, pid, direction).await?;
        Ok(Position::from_rank(rank))
    }

    /// [`resolve_single_rank`](Self::resolve_single_rank) over unparsed ids.
    ///
    /// Returns [`Position::NONE`] without a store call when either id is not
    /// a positive integer.
    pub async fn resolve_single_rank_raw(
        &self,
        pid: &str,
        tid: &str,
        mode: SortMode,
    ) -> Result<Position> {
        match (pid.parse::<PostId>(), tid.parse::<TopicId>()) {
            (Ok(pid), Ok(tid)) => self.resolve_single_rank(pid, tid, mode).await,
            (Err(e), _) | (_, Err(e)) => {
                tracing::trace!(error = %e, "unranked: invalid id");
                Ok(Position::NONE)
            }
        }
    }

    /// Positions of `posts` for `viewer`, parallel to the input.
    ///
    /// Reads the viewer's sort mode once and issues exactly one batched rank
    /// query. Empty input returns immediately.
    pub async fn resolve_positions<P>(&self, posts: &[P], viewer: UserId) -> Result<Vec<Position>>
    where
        P: TopicPost + Sync,
    {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let settings = self
            .settings
            .get_settings(viewer)
            .await
            .map_err(|e| PostsError::Settings(e.into()))?;

        self.positions_in_mode(posts, settings.topic_post_sort).await
    }

    /// Positions of `posts` under an explicit sort mode.
    pub async fn positions_in_mode<P>(&self, posts: &[P], mode: SortMode) -> Result<Vec<Position>>
    where
        P: TopicPost + Sync,
    {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<SetKey> = posts.iter().map(|p| SetKey::for_topic(p.tid(), mode)).collect();
        let pids: Vec<PostId> = posts.iter().map(TopicPost::pid).collect();

        let query = BatchRankQuery::plan(&keys, &pids);
        tracing::debug!(
            posts = pids.len(),
            single_set = query.is_single_set(),
            mode = mode.as_str(),
            "resolving positions"
        );

        let ranks = self.store.batch_ranks(query, mode.direction()).await?;
        if ranks.len() != pids.len() {
            return Err(PostsError::RankCountMismatch {
                expected: pids.len(),
                got: ranks.len(),
            });
        }

        Ok(ranks.into_iter().map(Position::from_rank).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use agora_perms::GrantTable;
    use agora_store::{MemoryStore, StoreWriter};

    use crate::config::ServiceConfig;
    use crate::settings::StaticSettings;

    fn pid(n: u64) -> PostId {
        PostId::new(n).unwrap()
    }

    fn tid(n: u64) -> TopicId {
        TopicId::new(n).unwrap()
    }

    /// Topic 1 holds posts 5, 7, 9 in time order; votes rank 9 > 5 > 7.
    /// Topic 2 holds posts 11, 12.
    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        for (score, votes, n) in [(10.0, 2.0, 5), (20.0, 1.0, 7), (30.0, 3.0, 9)] {
            store.add_to_set(&SetKey::topic_posts(tid(1)), score, pid(n)).await.unwrap();
            store.add_to_set(&SetKey::topic_votes(tid(1)), votes, pid(n)).await.unwrap();
        }
        for (score, n) in [(40.0, 11), (50.0, 12)] {
            store.add_to_set(&SetKey::topic_posts(tid(2)), score, pid(n)).await.unwrap();
            store.add_to_set(&SetKey::topic_votes(tid(2)), 0.0, pid(n)).await.unwrap();
        }
        store
    }

    async fn service(mode: SortMode) -> PostService<MemoryStore> {
        PostService::new(seeded().await, Arc::new(GrantTable::new()), ServiceConfig::default())
            .with_settings(Arc::new(StaticSettings::new(mode)))
    }

    #[test]
    fn test_ordering_for_each_mode() {
        assert_eq!(
            ordering_for(tid(3), SortMode::OldestToNewest),
            (SetKey::new("tid:3:posts"), Direction::Forward)
        );
        assert_eq!(
            ordering_for(tid(3), SortMode::NewestToOldest),
            (SetKey::new("tid:3:posts"), Direction::Reverse)
        );
        assert_eq!(
            ordering_for(tid(3), SortMode::MostVotes),
            (SetKey::new("tid:3:posts:votes"), Direction::Reverse)
        );
    }

    #[tokio::test]
    async fn test_single_rank() {
        let service = service(SortMode::OldestToNewest).await;

        let pos = service.resolve_single_rank(pid(7), tid(1), SortMode::OldestToNewest).await;
        assert_eq!(pos.unwrap(), Position(2));

        let pos = service.resolve_single_rank(pid(5), tid(1), SortMode::NewestToOldest).await;
        assert_eq!(pos.unwrap(), Position(3));

        let pos = service.resolve_single_rank(pid(9), tid(1), SortMode::MostVotes).await;
        assert_eq!(pos.unwrap(), Position(1));
    }

    #[tokio::test]
    async fn test_single_rank_absent_is_zero() {
        let service = service(SortMode::OldestToNewest).await;
        let pos = service
            .resolve_single_rank(pid(11), tid(1), SortMode::OldestToNewest)
            .await
            .unwrap();
        assert_eq!(pos, Position::NONE);
        assert!(!pos.is_ranked());
    }

    #[tokio::test]
    async fn test_single_rank_raw() {
        let service = service(SortMode::OldestToNewest).await;

        let pos = service.resolve_single_rank_raw("9", "1", SortMode::OldestToNewest).await;
        assert_eq!(pos.unwrap(), Position(3));

        for (p, t) in [("abc", "1"), ("9", "NaN"), ("0", "1"), ("-3", "1"), ("", "")] {
            let pos = service.resolve_single_rank_raw(p, t, SortMode::OldestToNewest).await;
            assert_eq!(pos.unwrap(), Position::NONE, "pid={:?} tid={:?}", p, t);
        }
    }

    #[tokio::test]
    async fn test_positions_scenario() {
        let posts = [(pid(5), tid(1)), (pid(7), tid(1)), (pid(9), tid(1))];

        let oldest = service(SortMode::OldestToNewest).await;
        let positions = oldest.resolve_positions(&posts, UserId(1)).await.unwrap();
        assert_eq!(positions, vec![Position(1), Position(2), Position(3)]);

        let newest = service(SortMode::NewestToOldest).await;
        let positions = newest.resolve_positions(&posts, UserId(1)).await.unwrap();
        assert_eq!(positions, vec![Position(3), Position(2), Position(1)]);
    }

    #[tokio::test]
    async fn test_positions_across_topics() {
        let service = service(SortMode::OldestToNewest).await;
        let posts = [(pid(12), tid(2)), (pid(5), tid(1)), (pid(12), tid(1))];

        let positions = service.resolve_positions(&posts, UserId(1)).await.unwrap();
        assert_eq!(positions, vec![Position(2), Position(1), Position::NONE]);
    }

    #[tokio::test]
    async fn test_positions_from_records() {
        let service = service(SortMode::MostVotes).await;
        let posts = vec![
            PostRecord::new(pid(7), tid(1), UserId(1), ""),
            PostRecord::new(pid(9), tid(1), UserId(1), ""),
        ];

        let positions = service.resolve_positions(&posts, UserId(1)).await.unwrap();
        assert_eq!(positions, vec![Position(3), Position(1)]);
    }

    #[tokio::test]
    async fn test_positions_empty() {
        let service = service(SortMode::OldestToNewest).await;
        let posts: [(PostId, TopicId); 0] = [];
        assert!(service.resolve_positions(&posts, UserId(1)).await.unwrap().is_empty());
    }
}
