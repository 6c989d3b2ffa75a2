//! Position resolution against a call-counting store.

use std::sync::Arc;

use async_trait::async_trait;
use proptest::prelude::*;

use agora::store::{MemoryStore, SortedStore, StoreError};
use agora::{
    Direction, Position, PostId, PostRecord, PostService, PostsError, ServiceConfig, SetKey,
    SortMode, TopicId, UserId,
};
use agora_testkit::generators::{forum, lookups, sort_mode};
use agora_testkit::{
    grant_table, init_tracing, CountingSettings, CountingStore, StoreOp, TopicFixture,
};

const VIEWER: UserId = UserId(3);

async fn counting_service(
    topics: &[TopicFixture],
    mode: SortMode,
) -> (PostService<CountingStore<MemoryStore>>, Arc<CountingSettings>) {
    init_tracing();
    let store = CountingStore::new(MemoryStore::new());
    for topic in topics {
        topic.seed(&store).await.unwrap();
    }
    let settings = Arc::new(CountingSettings::new(mode));
    let service = PostService::new(store, Arc::new(grant_table(topics)), ServiceConfig::default())
        .with_settings(settings.clone());
    (service, settings)
}

#[tokio::test]
async fn test_oldest_first_scenario() {
    let topic = TopicFixture::new(1, &[5, 7, 9]);
    let (service, _) = counting_service(&[topic.clone()], SortMode::OldestToNewest).await;

    let positions = service.resolve_positions(&topic.pairs(), VIEWER).await.unwrap();
    assert_eq!(positions, vec![Position(1), Position(2), Position(3)]);
}

#[tokio::test]
async fn test_newest_first_scenario() {
    let topic = TopicFixture::new(1, &[5, 7, 9]);
    let (service, _) = counting_service(&[topic.clone()], SortMode::NewestToOldest).await;

    let positions = service.resolve_positions(&topic.pairs(), VIEWER).await.unwrap();
    assert_eq!(positions, vec![Position(3), Position(2), Position(1)]);
}

#[tokio::test]
async fn test_one_topic_uses_single_set_query() {
    let topic = TopicFixture::new(1, &(1..=50).collect::<Vec<_>>());
    let (service, settings) = counting_service(&[topic.clone()], SortMode::MostVotes).await;

    let positions = service.resolve_positions(&topic.posts, VIEWER).await.unwrap();
    assert_eq!(positions.len(), 50);
    assert!(positions.iter().all(|p| p.is_ranked()));

    let store = service.store();
    assert_eq!(store.calls(StoreOp::Ranks), 1);
    assert_eq!(store.calls(StoreOp::RanksMulti), 0);
    assert_eq!(store.calls(StoreOp::Rank), 0);
    assert_eq!(store.total_calls(), 1);
    assert_eq!(settings.calls(), 1);
}

#[tokio::test]
async fn test_many_topics_use_multi_set_query() {
    let topics = [TopicFixture::new(1, &[1, 2, 3]), TopicFixture::new(2, &[4, 5])];
    let (service, settings) = counting_service(&topics, SortMode::OldestToNewest).await;

    let posts: Vec<_> = topics.iter().flat_map(TopicFixture::pairs).collect();
    let positions = service.resolve_positions(&posts, VIEWER).await.unwrap();
    assert_eq!(
        positions,
        vec![Position(1), Position(2), Position(3), Position(1), Position(2)]
    );

    let store = service.store();
    assert_eq!(store.calls(StoreOp::RanksMulti), 1);
    assert_eq!(store.calls(StoreOp::Ranks), 0);
    assert_eq!(store.rank_calls(), 1);
    assert_eq!(settings.calls(), 1);
}

#[tokio::test]
async fn test_empty_input_makes_no_calls() {
    let topic = TopicFixture::new(1, &[1, 2]);
    let (service, settings) = counting_service(&[topic], SortMode::NewestToOldest).await;

    let posts: Vec<PostRecord> = Vec::new();
    assert!(service.resolve_positions(&posts, VIEWER).await.unwrap().is_empty());
    assert_eq!(service.store().total_calls(), 0);
    assert_eq!(settings.calls(), 0);
}

#[tokio::test]
async fn test_invalid_ids_make_no_calls() {
    let topic = TopicFixture::new(1, &[1, 2]);
    let (service, _) = counting_service(&[topic], SortMode::OldestToNewest).await;

    let pos = service
        .resolve_single_rank_raw("2", "abc", SortMode::OldestToNewest)
        .await
        .unwrap();
    assert_eq!(pos, Position::NONE);
    assert_eq!(service.store().total_calls(), 0);

    let pos = service
        .resolve_single_rank_raw("2", "1", SortMode::OldestToNewest)
        .await
        .unwrap();
    assert_eq!(pos, Position(2));
    assert_eq!(service.store().calls(StoreOp::Rank), 1);
}

#[tokio::test]
async fn test_removed_post_is_unranked() {
    use agora::store::StoreWriter;

    let topic = TopicFixture::new(1, &[1, 2, 3]);
    let (service, _) = counting_service(&[topic.clone()], SortMode::OldestToNewest).await;
    service
        .store()
        .remove_from_set(&topic.time_key(), PostId::new(2).unwrap())
        .await
        .unwrap();

    let positions = service.resolve_positions(&topic.pairs(), VIEWER).await.unwrap();
    assert_eq!(positions, vec![Position(1), Position::NONE, Position(2)]);
}

/// A store whose every read fails.
struct BrokenStore;

#[async_trait]
impl SortedStore for BrokenStore {
    async fn range(
        &self,
        _: &SetKey,
        _: i64,
        _: i64,
        _: Direction,
    ) -> agora::store::Result<Vec<PostId>> {
        Err(StoreError::Task("connection reset".into()))
    }

    async fn rank(&self, _: &SetKey, _: PostId, _: Direction) -> agora::store::Result<Option<u64>> {
        Err(StoreError::Task("connection reset".into()))
    }

    async fn ranks(
        &self,
        _: &SetKey,
        _: &[PostId],
        _: Direction,
    ) -> agora::store::Result<Vec<Option<u64>>> {
        Err(StoreError::Task("connection reset".into()))
    }

    async fn ranks_multi(
        &self,
        _: &[SetKey],
        _: &[PostId],
        _: Direction,
    ) -> agora::store::Result<Vec<Option<u64>>> {
        Err(StoreError::Task("connection reset".into()))
    }

    async fn exists(&self, _: &[SetKey]) -> agora::store::Result<Vec<bool>> {
        Err(StoreError::Task("connection reset".into()))
    }

    async fn get_posts(&self, _: &[PostId]) -> agora::store::Result<Vec<Option<PostRecord>>> {
        Err(StoreError::Task("connection reset".into()))
    }
}

#[tokio::test]
async fn test_store_failure_fails_whole_batch() {
    let service = PostService::new(
        BrokenStore,
        Arc::new(agora::perms::GrantTable::new()),
        ServiceConfig::default(),
    );
    let posts = [(PostId::new(1).unwrap(), TopicId::new(1).unwrap())];

    let err = service.resolve_positions(&posts, VIEWER).await.unwrap_err();
    assert!(matches!(err, PostsError::Store(StoreError::Task(_))));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn test_batched_matches_per_post(
        (topics, posts) in forum(4, 8).prop_flat_map(|f| {
            let picks = lookups(&f, 16);
            (Just(f), picks)
        }),
        mode in sort_mode(),
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        rt.block_on(async {
            let (service, _) = counting_service(&topics, mode).await;

            let batched = service.resolve_positions(&posts, VIEWER).await.unwrap();
            prop_assert_eq!(batched.len(), posts.len());
            if !posts.is_empty() {
                prop_assert_eq!(service.store().rank_calls(), 1);
            }

            for (&(pid, tid), position) in posts.iter().zip(&batched) {
                let single = service.resolve_single_rank(pid, tid, mode).await.unwrap();
                prop_assert_eq!(single, *position);
            }
            Ok(())
        })?;
    }
}
