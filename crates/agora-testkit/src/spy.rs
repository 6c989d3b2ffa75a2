//! Instrumented collaborators that record how they were called.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use agora::{PostsFilter, PostsPayload, SettingsProvider, UserSettings};
use agora_core::{Direction, PostId, PostRecord, SetKey, SortMode, UserId};
use agora_store::{Result, SortedStore, StoreWriter};

/// A read operation of the sorted collection store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Range,
    Rank,
    Ranks,
    RanksMulti,
    Exists,
    GetPosts,
}

impl StoreOp {
    pub const ALL: [StoreOp; 6] = [
        StoreOp::Range,
        StoreOp::Rank,
        StoreOp::Ranks,
        StoreOp::RanksMulti,
        StoreOp::Exists,
        StoreOp::GetPosts,
    ];

    fn slot(self) -> usize {
        self as usize
    }
}

/// Wraps a store and counts read calls per operation.
///
/// Writes pass through uncounted.
pub struct CountingStore<S> {
    inner: S,
    calls: [AtomicUsize; 6],
}

impl<S> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: Default::default(),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Calls made to one operation.
    pub fn calls(&self, op: StoreOp) -> usize {
        self.calls[op.slot()].load(Ordering::SeqCst)
    }

    /// Calls made to any read operation.
    pub fn total_calls(&self) -> usize {
        StoreOp::ALL.iter().map(|&op| self.calls(op)).sum()
    }

    /// Calls made to rank operations, single or batched.
    pub fn rank_calls(&self) -> usize {
        self.calls(StoreOp::Rank) + self.calls(StoreOp::Ranks) + self.calls(StoreOp::RanksMulti)
    }

    pub fn reset(&self) {
        for counter in &self.calls {
            counter.store(0, Ordering::SeqCst);
        }
    }

    fn record(&self, op: StoreOp) {
        self.calls[op.slot()].fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl<S: SortedStore> SortedStore for CountingStore<S> {
    async fn range(
        &self,
        key: &SetKey,
        start: i64,
        stop: i64,
        direction: Direction,
    ) -> Result<Vec<PostId>> {
        self.record(StoreOp::Range);
        self.inner.range(key, start, stop, direction).await
    }

    async fn rank(
        &self,
        key: &SetKey,
        member: PostId,
        direction: Direction,
    ) -> Result<Option<u64>> {
        self.record(StoreOp::Rank);
        self.inner.rank(key, member, direction).await
    }

    async fn ranks(
        &self,
        key: &SetKey,
        members: &[PostId],
        direction: Direction,
    ) -> Result<Vec<Option<u64>>> {
        self.record(StoreOp::Ranks);
        self.inner.ranks(key, members, direction).await
    }

    async fn ranks_multi(
        &self,
        keys: &[SetKey],
        members: &[PostId],
        direction: Direction,
    ) -> Result<Vec<Option<u64>>> {
        self.record(StoreOp::RanksMulti);
        self.inner.ranks_multi(keys, members, direction).await
    }

    async fn exists(&self, keys: &[SetKey]) -> Result<Vec<bool>> {
        self.record(StoreOp::Exists);
        self.inner.exists(keys).await
    }

    async fn get_posts(&self, pids: &[PostId]) -> Result<Vec<Option<PostRecord>>> {
        self.record(StoreOp::GetPosts);
        self.inner.get_posts(pids).await
    }
}

#[async_trait]
impl<S: StoreWriter> StoreWriter for CountingStore<S> {
    async fn add_to_set(&self, key: &SetKey, score: f64, member: PostId) -> Result<()> {
        self.inner.add_to_set(key, score, member).await
    }

    async fn remove_from_set(&self, key: &SetKey, member: PostId) -> Result<bool> {
        self.inner.remove_from_set(key, member).await
    }

    async fn put_post(&self, post: &PostRecord) -> Result<()> {
        self.inner.put_post(post).await
    }
}

/// Settings provider returning one sort mode and counting lookups.
#[derive(Debug, Default)]
pub struct CountingSettings {
    mode: SortMode,
    calls: AtomicUsize,
}

impl CountingSettings {
    pub fn new(mode: SortMode) -> Self {
        Self {
            mode,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SettingsProvider for CountingSettings {
    async fn get_settings(&self, _uid: UserId) -> anyhow::Result<UserSettings> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(UserSettings {
            topic_post_sort: self.mode,
        })
    }
}

type Rewrite = Box<dyn Fn(PostsPayload) -> Option<PostsPayload> + Send + Sync>;

/// Filter that records every hook it sees and optionally rewrites the
/// payload.
#[derive(Default)]
pub struct RecordingFilter {
    fired: Mutex<Vec<String>>,
    rewrite: Option<Rewrite>,
}

impl RecordingFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace each payload with `rewrite(payload)`.
    pub fn rewriting(
        rewrite: impl Fn(PostsPayload) -> Option<PostsPayload> + Send + Sync + 'static,
    ) -> Self {
        Self {
            fired: Mutex::new(Vec::new()),
            rewrite: Some(Box::new(rewrite)),
        }
    }

    /// Hook names fired so far, in order.
    pub fn fired(&self) -> Vec<String> {
        self.fired.lock().expect("recording filter lock poisoned").clone()
    }
}

#[async_trait]
impl PostsFilter for RecordingFilter {
    async fn fire(
        &self,
        hook: &str,
        payload: PostsPayload,
    ) -> anyhow::Result<Option<PostsPayload>> {
        self.fired
            .lock()
            .map_err(|_| anyhow::anyhow!("recording filter lock poisoned"))?
            .push(hook.to_string());
        Ok(match &self.rewrite {
            Some(rewrite) => rewrite(payload),
            None => Some(payload),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_store::MemoryStore;

    #[tokio::test]
    async fn test_counting_store_counts_reads_only() {
        let store = CountingStore::new(MemoryStore::new());
        let key = SetKey::new("tid:1:posts");
        let pid = PostId::new(1).unwrap();

        store.add_to_set(&key, 1.0, pid).await.unwrap();
        assert_eq!(store.total_calls(), 0);

        store.rank(&key, pid, Direction::Forward).await.unwrap();
        store.ranks(&key, &[pid], Direction::Reverse).await.unwrap();
        store.exists(&[key.clone()]).await.unwrap();
        assert_eq!(store.calls(StoreOp::Rank), 1);
        assert_eq!(store.calls(StoreOp::Ranks), 1);
        assert_eq!(store.rank_calls(), 2);
        assert_eq!(store.total_calls(), 3);

        store.reset();
        assert_eq!(store.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_recording_filter() {
        let filter = RecordingFilter::rewriting(|_| None);
        let payload = PostsPayload {
            posts: Vec::new(),
            uid: UserId(1),
        };
        assert_eq!(filter.fire("a", payload).await.unwrap(), None);
        assert_eq!(filter.fired(), vec!["a".to_string()]);
    }
}
