//! # Agora Store
//!
//! The sorted collection store contract consumed by the Agora read-side, with
//! SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! Ordering sets are named collections of post ids with a score. The store
//! answers range and rank queries over them, single-member and batched, and
//! hands out post records by id. The services never write; the
//! [`StoreWriter`] trait exists for seeding and tests.
//!
//! ## Key Types
//!
//! - [`SortedStore`] - The async trait for all read operations
//! - [`StoreWriter`] - Seeding operations (add/remove members, put records)
//! - [`BatchRankQuery`] - Single-set or multi-set batched rank lookup
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use agora_store::{MemoryStore, SortedStore, StoreWriter};
//! use agora_core::{Direction, PostId, SetKey};
//!
//! async fn example() {
//!     let store = MemoryStore::new();
//!     let key = SetKey::new("tid:1:posts");
//!     let pid = PostId::new(5).unwrap();
//!
//!     store.add_to_set(&key, 1_700_000_000_000.0, pid).await.unwrap();
//!     let rank = store.rank(&key, pid, Direction::Forward).await.unwrap();
//!     assert_eq!(rank, Some(0));
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Explicit absence**: a missing member is `None`, never a magic number
//! - **Order preserving**: batched results line up with their inputs
//! - **Empty in, empty out**: no operation fails on empty input

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{normalize_range, BatchRankQuery, SortedStore, SortedStoreExt, StoreWriter};
