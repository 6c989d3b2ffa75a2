//! # Agora
//!
//! Read-side post services for the Agora forum: post positions, rendered
//! post loading, privilege-gated listing pages and deleted-post masking.
//!
//! ## Overview
//!
//! [`PostService`] sits on top of a sorted collection store and a handful of
//! narrow collaborator traits:
//!
//! - **Rank resolution**: 1-based position of one or many posts in their
//!   topic under the viewer's sort mode, in one batched store query
//! - **Materialization**: ids to parsed post records, passed through a
//!   plugin filter hook
//! - **Pagination**: a reverse range of an ordering set, filtered by read
//!   privilege and summarized, with a cursor for the next page
//! - **Redaction**: masking of deleted posts for viewers who may not see them
//!
//! ## Key Concepts
//!
//! - **Ordering set**: per-topic sorted set of post ids, by time or by votes
//! - **Sort mode**: viewer preference picking the ordering set and direction
//! - **Position**: rank + 1, or `0` when the post is not in the set
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use agora::{PostService, ServiceConfig, StaticSettings};
//! use agora::core::{PostId, SortMode, TopicId, UserId};
//! use agora::perms::GrantTable;
//! use agora::store::SqliteStore;
//!
//! async fn example() {
//!     let store = SqliteStore::open("forum.db").unwrap();
//!     let service = PostService::new(store, Arc::new(GrantTable::new()), ServiceConfig::default())
//!         .with_settings(Arc::new(StaticSettings::new(SortMode::NewestToOldest)));
//!
//!     let posts = [(PostId::new(5).unwrap(), TopicId::new(1).unwrap())];
//!     let positions = service.resolve_positions(&posts, UserId(3)).await.unwrap();
//!     println!("post 5 is #{}", positions[0]);
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `agora::core` - Identifiers, sort modes, post records
//! - `agora::store` - Sorted collection store contract, SQLite and memory
//! - `agora::perms` - Privilege service and grant table

pub mod config;
pub mod error;
pub mod hooks;
pub mod materialize;
pub mod paginate;
pub mod parse;
pub mod rank;
pub mod redact;
pub mod service;
pub mod settings;
pub mod summary;

// Re-export component crates
pub use agora_core as core;
pub use agora_perms as perms;
pub use agora_store as store;

// Re-export main types for convenience
pub use config::{ServiceConfig, DELETED_PLACEHOLDER, FILTER_GET_POSTS};
pub use error::{BoxError, PostsError, Result};
pub use hooks::{FilterChain, NoopFilter, PostsFilter, PostsPayload};
pub use paginate::PostPage;
pub use parse::{ContentParser, PassthroughParser};
pub use rank::{ordering_for, TopicPost};
pub use redact::apply_deletion_mask;
pub use service::PostService;
pub use settings::{SettingsProvider, StaticSettings, UserSettings};
pub use summary::{strip_tags, StoreSummarizer, Summarizer, SummaryOptions};

// Re-export commonly used core types
pub use agora_core::{
    CategoryId, Direction, PostAuthor, PostId, PostRecord, PostSummary, Position, SetKey,
    SortMode, TopicId, UserId,
};
