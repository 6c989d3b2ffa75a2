//! SQLite implementation of the store traits.
//!
//! Ordering sets are rows of `(set_key, member, score)`; ranks are counted
//! in SQL under `(score, member)` ordering. Post records are stored as CBOR
//! blobs. All queries run on the blocking pool via `tokio::spawn_blocking`.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use agora_core::{Direction, PostId, PostRecord, SetKey};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{check_parallel, normalize_range, post_object_id, SortedStore, StoreWriter};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking operation on the connection.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Poisoned(format!("mutex poisoned: {}", e)))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(format!("spawn_blocking failed: {}", e)))?
    }
}

fn member_param(member: PostId) -> Result<i64> {
    i64::try_from(member.get()).map_err(|_| {
        StoreError::InvalidArgument(format!("post id {} exceeds SQLite integer range", member))
    })
}

/// A member as stored, or `None` when it cannot have been written.
fn stored_member(member: PostId) -> Option<i64> {
    i64::try_from(member.get()).ok()
}

fn member_from_row(raw: i64) -> Result<PostId> {
    u64::try_from(raw)
        .ok()
        .and_then(PostId::new)
        .ok_or_else(|| StoreError::InvalidData(format!("stored member {} is not a post id", raw)))
}

fn encode_post(post: &PostRecord) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(post, &mut buf).map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(buf)
}

fn decode_post(bytes: &[u8]) -> Result<PostRecord> {
    ciborium::from_reader(bytes)
        .map_err(|e| StoreError::InvalidData(format!("post record: {}", e)))
}

fn set_len(conn: &Connection, key: &SetKey) -> Result<usize> {
    let len: i64 = conn
        .prepare_cached("SELECT COUNT(*) FROM sorted_set_members WHERE set_key = ?1")?
        .query_row(params![key.as_str()], |row| row.get(0))?;
    Ok(len as usize)
}

fn rank_of(
    conn: &Connection,
    key: &SetKey,
    member: PostId,
    direction: Direction,
) -> Result<Option<u64>> {
    let Some(member) = stored_member(member) else {
        return Ok(None);
    };

    let score: Option<f64> = conn
        .prepare_cached("SELECT score FROM sorted_set_members WHERE set_key = ?1 AND member = ?2")?
        .query_row(params![key.as_str(), member], |row| row.get(0))
        .optional()?;

    let Some(score) = score else {
        return Ok(None);
    };

    let sql = match direction {
        Direction::Forward => {
            "SELECT COUNT(*) FROM sorted_set_members
             WHERE set_key = ?1 AND (score < ?2 OR (score = ?2 AND member < ?3))"
        }
        Direction::Reverse => {
            "SELECT COUNT(*) FROM sorted_set_members
             WHERE set_key = ?1 AND (score > ?2 OR (score = ?2 AND member > ?3))"
        }
    };

    let before: i64 = conn
        .prepare_cached(sql)?
        .query_row(params![key.as_str(), score, member], |row| row.get(0))?;
    Ok(Some(before as u64))
}

fn key_exists(conn: &Connection, key: &SetKey) -> Result<bool> {
    let exists: bool = match post_object_id(key) {
        Some(pid) => match stored_member(pid) {
            Some(pid) => conn
                .prepare_cached("SELECT EXISTS(SELECT 1 FROM posts WHERE pid = ?1)")?
                .query_row(params![pid], |row| row.get(0))?,
            None => false,
        },
        None => conn
            .prepare_cached("SELECT EXISTS(SELECT 1 FROM sorted_set_members WHERE set_key = ?1)")?
            .query_row(params![key.as_str()], |row| row.get(0))?,
    };
    Ok(exists)
}

#[async_trait]
impl SortedStore for SqliteStore {
    async fn range(
        &self,
        key: &SetKey,
        start: i64,
        stop: i64,
        direction: Direction,
    ) -> Result<Vec<PostId>> {
        let key = key.clone();

        self.run(move |conn| {
            let tx = conn.transaction()?;
            let Some((start, stop)) = normalize_range(start, stop, set_len(&tx, &key)?) else {
                return Ok(Vec::new());
            };

            let sql = match direction {
                Direction::Forward => {
                    "SELECT member FROM sorted_set_members WHERE set_key = ?1
                     ORDER BY score ASC, member ASC LIMIT ?2 OFFSET ?3"
                }
                Direction::Reverse => {
                    "SELECT member FROM sorted_set_members WHERE set_key = ?1
                     ORDER BY score DESC, member DESC LIMIT ?2 OFFSET ?3"
                }
            };

            let raw: Vec<i64> = tx
                .prepare_cached(sql)?
                .query_map(
                    params![key.as_str(), (stop - start + 1) as i64, start as i64],
                    |row| row.get(0),
                )?
                .collect::<std::result::Result<_, _>>()?;

            raw.into_iter().map(member_from_row).collect()
        })
        .await
    }

    async fn rank(
        &self,
        key: &SetKey,
        member: PostId,
        direction: Direction,
    ) -> Result<Option<u64>> {
        let key = key.clone();
        self.run(move |conn| rank_of(conn, &key, member, direction)).await
    }

    async fn ranks(
        &self,
        key: &SetKey,
        members: &[PostId],
        direction: Direction,
    ) -> Result<Vec<Option<u64>>> {
        if members.is_empty() {
            return Ok(Vec::new());
        }
        let key = key.clone();
        let members = members.to_vec();

        self.run(move |conn| {
            let tx = conn.transaction()?;
            let ranks = members
                .iter()
                .map(|member| rank_of(&tx, &key, *member, direction))
                .collect::<Result<Vec<_>>>()?;
            Ok(ranks)
        })
        .await
    }

    async fn ranks_multi(
        &self,
        keys: &[SetKey],
        members: &[PostId],
        direction: Direction,
    ) -> Result<Vec<Option<u64>>> {
        check_parallel(keys, members)?;
        if members.is_empty() {
            return Ok(Vec::new());
        }
        let keys = keys.to_vec();
        let members = members.to_vec();

        self.run(move |conn| {
            let tx = conn.transaction()?;
            let ranks = keys
                .iter()
                .zip(&members)
                .map(|(key, member)| rank_of(&tx, key, *member, direction))
                .collect::<Result<Vec<_>>>()?;
            Ok(ranks)
        })
        .await
    }

    async fn exists(&self, keys: &[SetKey]) -> Result<Vec<bool>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let keys = keys.to_vec();

        self.run(move |conn| keys.iter().map(|key| key_exists(conn, key)).collect())
            .await
    }

    async fn get_posts(&self, pids: &[PostId]) -> Result<Vec<Option<PostRecord>>> {
        if pids.is_empty() {
            return Ok(Vec::new());
        }
        let pids = pids.to_vec();

        self.run(move |conn| {
            let tx = conn.transaction()?;
            let mut posts = Vec::with_capacity(pids.len());
            for pid in &pids {
                let Some(pid) = stored_member(*pid) else {
                    posts.push(None);
                    continue;
                };
                let blob: Option<Vec<u8>> = tx
                    .prepare_cached("SELECT record FROM posts WHERE pid = ?1")?
                    .query_row(params![pid], |row| row.get(0))
                    .optional()?;
                posts.push(blob.as_deref().map(decode_post).transpose()?);
            }
            Ok(posts)
        })
        .await
    }
}

#[async_trait]
impl StoreWriter for SqliteStore {
    async fn add_to_set(&self, key: &SetKey, score: f64, member: PostId) -> Result<()> {
        if score.is_nan() {
            return Err(StoreError::InvalidArgument(format!(
                "score for {} in {} is NaN",
                member, key
            )));
        }
        let key = key.clone();
        let member = member_param(member)?;

        self.run(move |conn| {
            conn.execute(
                "INSERT INTO sorted_set_members (set_key, member, score) VALUES (?1, ?2, ?3)
                 ON CONFLICT(set_key, member) DO UPDATE SET score = excluded.score",
                params![key.as_str(), member, score],
            )?;
            Ok(())
        })
        .await
    }

    async fn remove_from_set(&self, key: &SetKey, member: PostId) -> Result<bool> {
        let key = key.clone();
        let member = member_param(member)?;

        self.run(move |conn| {
            let removed = conn.execute(
                "DELETE FROM sorted_set_members WHERE set_key = ?1 AND member = ?2",
                params![key.as_str(), member],
            )?;
            Ok(removed > 0)
        })
        .await
    }

    async fn put_post(&self, post: &PostRecord) -> Result<()> {
        let pid = member_param(post.pid)?;
        let record = encode_post(post)?;

        self.run(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO posts (pid, record, updated_at) VALUES (?1, ?2, ?3)",
                params![pid, record, migration::now_millis()],
            )?;
            tracing::trace!(pid, "stored post record");
            Ok(())
        })
        .await
    }
}
