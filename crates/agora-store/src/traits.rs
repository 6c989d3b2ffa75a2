//! Store traits: the abstract interface to the sorted collection store.
//!
//! The read-side services are storage-agnostic. Implementations include
//! SQLite and in-memory (for tests).

use async_trait::async_trait;
use agora_core::{Direction, PostId, PostRecord, SetKey};

use crate::error::{Result, StoreError};

/// The sorted collection store: ordered sets of post ids plus post records.
///
/// # Contract
///
/// - Results preserve input order.
/// - A member missing from a set yields `None`, never a numeric sentinel.
/// - Every operation accepts empty input and returns empty output.
///
/// Within a set, members are ordered by ascending `(score, member)`.
/// [`Direction::Reverse`] is the exact reversal of that order.
#[async_trait]
pub trait SortedStore: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Range Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Members at indices `start..=stop` in the given direction.
    ///
    /// Negative indices count from the end (`-1` is the last member).
    /// Out-of-bounds or inverted ranges yield an empty vector.
    async fn range(
        &self,
        key: &SetKey,
        start: i64,
        stop: i64,
        direction: Direction,
    ) -> Result<Vec<PostId>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Rank Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Zero-based rank of a single member.
    async fn rank(&self, key: &SetKey, member: PostId, direction: Direction)
        -> Result<Option<u64>>;

    /// Ranks of many members inside one set.
    async fn ranks(
        &self,
        key: &SetKey,
        members: &[PostId],
        direction: Direction,
    ) -> Result<Vec<Option<u64>>>;

    /// Ranks of many members, each inside its own set.
    ///
    /// `keys` and `members` are parallel arrays and must have equal length.
    async fn ranks_multi(
        &self,
        keys: &[SetKey],
        members: &[PostId],
        direction: Direction,
    ) -> Result<Vec<Option<u64>>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Object Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Whether each key exists. A set exists while it has members.
    async fn exists(&self, keys: &[SetKey]) -> Result<Vec<bool>>;

    /// Load post records, `None` for ids with no record.
    async fn get_posts(&self, pids: &[PostId]) -> Result<Vec<Option<PostRecord>>>;
}

/// Write access used by seeding code and tests.
///
/// The read-side services never write.
#[async_trait]
pub trait StoreWriter: SortedStore {
    /// Add a member or update its score.
    async fn add_to_set(&self, key: &SetKey, score: f64, member: PostId) -> Result<()>;

    /// Remove a member. Returns whether it was present.
    async fn remove_from_set(&self, key: &SetKey, member: PostId) -> Result<bool>;

    /// Insert or replace a post record.
    async fn put_post(&self, post: &PostRecord) -> Result<()>;
}

/// A batched rank lookup: one set for every member, or one set per member.
#[derive(Debug, Clone, Copy)]
pub enum BatchRankQuery<'a> {
    SingleSet {
        key: &'a SetKey,
        members: &'a [PostId],
    },
    MultiSet {
        keys: &'a [SetKey],
        members: &'a [PostId],
    },
}

impl<'a> BatchRankQuery<'a> {
    /// Plan a lookup from per-member keys, collapsing to a single-set query
    /// when every member shares the same key.
    pub fn plan(keys: &'a [SetKey], members: &'a [PostId]) -> Self {
        match keys.split_first() {
            Some((first, rest)) if rest.iter().all(|k| k == first) => BatchRankQuery::SingleSet {
                key: first,
                members,
            },
            _ => BatchRankQuery::MultiSet { keys, members },
        }
    }

    pub fn members(&self) -> &'a [PostId] {
        match self {
            BatchRankQuery::SingleSet { members, .. }
            | BatchRankQuery::MultiSet { members, .. } => members,
        }
    }

    pub fn is_single_set(&self) -> bool {
        matches!(self, BatchRankQuery::SingleSet { .. })
    }
}

/// Extension trait for common store patterns.
pub trait SortedStoreExt: SortedStore {
    /// Run a batched rank query in one store round trip.
    fn batch_ranks(
        &self,
        query: BatchRankQuery<'_>,
        direction: Direction,
    ) -> impl std::future::Future<Output = Result<Vec<Option<u64>>>> + Send;
}

impl<S: SortedStore + ?Sized> SortedStoreExt for S {
    async fn batch_ranks(
        &self,
        query: BatchRankQuery<'_>,
        direction: Direction,
    ) -> Result<Vec<Option<u64>>> {
        match query {
            BatchRankQuery::SingleSet { key, members } => self.ranks(key, members, direction).await,
            BatchRankQuery::MultiSet { keys, members } => {
                self.ranks_multi(keys, members, direction).await
            }
        }
    }
}

/// Resolve a possibly negative inclusive index range against a set length.
///
/// Returns `None` when the range selects nothing.
pub fn normalize_range(start: i64, stop: i64, len: usize) -> Option<(usize, usize)> {
    let len = len as i64;
    if len == 0 {
        return None;
    }

    let start = if start < 0 { (start + len).max(0) } else { start };
    let stop = if stop < 0 { stop + len } else { stop.min(len - 1) };

    if start > stop || start >= len {
        return None;
    }
    Some((start as usize, stop as usize))
}

/// Reject parallel arrays of different lengths.
pub(crate) fn check_parallel(keys: &[SetKey], members: &[PostId]) -> Result<()> {
    if keys.len() != members.len() {
        return Err(StoreError::InvalidArgument(format!(
            "ranks_multi expects parallel arrays, got {} keys and {} members",
            keys.len(),
            members.len()
        )));
    }
    Ok(())
}

/// Parse a `post:{pid}` object key.
pub(crate) fn post_object_id(key: &SetKey) -> Option<PostId> {
    key.as_str().strip_prefix("post:")?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(n: u64) -> PostId {
        PostId::new(n).unwrap()
    }

    #[test]
    fn test_normalize_range() {
        assert_eq!(normalize_range(0, 9, 3), Some((0, 2)));
        assert_eq!(normalize_range(0, -1, 3), Some((0, 2)));
        assert_eq!(normalize_range(-2, -1, 3), Some((1, 2)));
        assert_eq!(normalize_range(-10, 0, 3), Some((0, 0)));
        assert_eq!(normalize_range(2, 1, 3), None);
        assert_eq!(normalize_range(3, 5, 3), None);
        assert_eq!(normalize_range(0, -5, 3), None);
        assert_eq!(normalize_range(0, 0, 0), None);
    }

    #[test]
    fn test_plan_collapses_shared_key() {
        let keys = vec![SetKey::new("a"), SetKey::new("a")];
        let members = vec![pid(1), pid(2)];
        let query = BatchRankQuery::plan(&keys, &members);
        assert!(query.is_single_set());
        assert_eq!(query.members().len(), 2);

        let keys = vec![SetKey::new("a"), SetKey::new("b")];
        assert!(!BatchRankQuery::plan(&keys, &members).is_single_set());
    }

    #[test]
    fn test_post_object_id() {
        assert_eq!(post_object_id(&SetKey::new("post:12")), Some(pid(12)));
        assert_eq!(post_object_id(&SetKey::new("post:x")), None);
        assert_eq!(post_object_id(&SetKey::new("tid:1:posts")), None);
    }

    #[test]
    fn test_check_parallel() {
        assert!(check_parallel(&[SetKey::new("a")], &[pid(1)]).is_ok());
        assert!(matches!(
            check_parallel(&[SetKey::new("a")], &[]),
            Err(StoreError::InvalidArgument(_))
        ));
    }
}
