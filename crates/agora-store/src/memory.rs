//! In-memory implementation of the store traits.
//!
//! This is primarily for testing. It has the same ordering semantics as
//! SQLite but keeps everything in memory with no persistence.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use agora_core::{Direction, PostId, PostRecord, SetKey};

use crate::error::{Result, StoreError};
use crate::traits::{check_parallel, normalize_range, post_object_id, SortedStore, StoreWriter};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Ordering sets by key.
    sets: HashMap<SetKey, OrderedSet>,

    /// Post records by id.
    posts: HashMap<PostId, PostRecord>,
}

/// One ordering set, kept sorted by `(score, member)`.
#[derive(Default)]
struct OrderedSet {
    entries: Vec<(f64, PostId)>,
    scores: HashMap<PostId, f64>,
}

fn entry_order(a: &(f64, PostId), b: &(f64, PostId)) -> Ordering {
    a.0.total_cmp(&b.0).then(a.1.cmp(&b.1))
}

impl OrderedSet {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn insert(&mut self, score: f64, member: PostId) {
        self.remove(member);
        let entry = (score, member);
        let at = self
            .entries
            .binary_search_by(|candidate| entry_order(candidate, &entry))
            .unwrap_or_else(|insert_at| insert_at);
        self.entries.insert(at, entry);
        self.scores.insert(member, score);
    }

    fn remove(&mut self, member: PostId) -> bool {
        let Some(score) = self.scores.remove(&member) else {
            return false;
        };
        if let Ok(at) = self
            .entries
            .binary_search_by(|candidate| entry_order(candidate, &(score, member)))
        {
            self.entries.remove(at);
        }
        true
    }

    fn rank(&self, member: PostId, direction: Direction) -> Option<u64> {
        let score = *self.scores.get(&member)?;
        let forward = self
            .entries
            .binary_search_by(|candidate| entry_order(candidate, &(score, member)))
            .ok()?;
        let rank = match direction {
            Direction::Forward => forward,
            Direction::Reverse => self.len() - 1 - forward,
        };
        Some(rank as u64)
    }

    fn range(&self, start: i64, stop: i64, direction: Direction) -> Vec<PostId> {
        let Some((start, stop)) = normalize_range(start, stop, self.len()) else {
            return Vec::new();
        };
        match direction {
            Direction::Forward => self.entries[start..=stop].iter().map(|(_, m)| *m).collect(),
            Direction::Reverse => self
                .entries
                .iter()
                .rev()
                .skip(start)
                .take(stop - start + 1)
                .map(|(_, m)| *m)
                .collect(),
        }
    }
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStoreInner {
    fn rank(&self, key: &SetKey, member: PostId, direction: Direction) -> Option<u64> {
        self.sets.get(key)?.rank(member, direction)
    }
}

#[async_trait]
impl SortedStore for MemoryStore {
    async fn range(
        &self,
        key: &SetKey,
        start: i64,
        stop: i64,
        direction: Direction,
    ) -> Result<Vec<PostId>> {
        let inner = self.read()?;
        Ok(inner
            .sets
            .get(key)
            .map(|set| set.range(start, stop, direction))
            .unwrap_or_default())
    }

    async fn rank(
        &self,
        key: &SetKey,
        member: PostId,
        direction: Direction,
    ) -> Result<Option<u64>> {
        let inner = self.read()?;
        Ok(inner.rank(key, member, direction))
    }

    async fn ranks(
        &self,
        key: &SetKey,
        members: &[PostId],
        direction: Direction,
    ) -> Result<Vec<Option<u64>>> {
        let inner = self.read()?;
        let Some(set) = inner.sets.get(key) else {
            return Ok(vec![None; members.len()]);
        };
        Ok(members.iter().map(|m| set.rank(*m, direction)).collect())
    }

    async fn ranks_multi(
        &self,
        keys: &[SetKey],
        members: &[PostId],
        direction: Direction,
    ) -> Result<Vec<Option<u64>>> {
        check_parallel(keys, members)?;
        let inner = self.read()?;
        Ok(keys
            .iter()
            .zip(members)
            .map(|(key, member)| inner.rank(key, *member, direction))
            .collect())
    }

    async fn exists(&self, keys: &[SetKey]) -> Result<Vec<bool>> {
        let inner = self.read()?;
        Ok(keys
            .iter()
            .map(|key| match post_object_id(key) {
                Some(pid) => inner.posts.contains_key(&pid),
                None => inner.sets.get(key).is_some_and(|set| set.len() > 0),
            })
            .collect())
    }

    async fn get_posts(&self, pids: &[PostId]) -> Result<Vec<Option<PostRecord>>> {
        let inner = self.read()?;
        Ok(pids.iter().map(|pid| inner.posts.get(pid).cloned()).collect())
    }
}

#[async_trait]
impl StoreWriter for MemoryStore {
    async fn add_to_set(&self, key: &SetKey, score: f64, member: PostId) -> Result<()> {
        if score.is_nan() {
            return Err(StoreError::InvalidArgument(format!(
                "score for {} in {} is NaN",
                member, key
            )));
        }
        // -0.0 and 0.0 tie, then order by member.
        let score = if score == 0.0 { 0.0 } else { score };
        let mut inner = self.write()?;
        inner.sets.entry(key.clone()).or_default().insert(score, member);
        Ok(())
    }

    async fn remove_from_set(&self, key: &SetKey, member: PostId) -> Result<bool> {
        let mut inner = self.write()?;
        let removed = match inner.sets.get_mut(key) {
            Some(set) => set.remove(member),
            None => false,
        };
        if inner.sets.get(key).is_some_and(|set| set.len() == 0) {
            inner.sets.remove(key);
        }
        Ok(removed)
    }

    async fn put_post(&self, post: &PostRecord) -> Result<()> {
        let mut inner = self.write()?;
        inner.posts.insert(post.pid, post.clone());
        Ok(())
    }
}
