//! # Agora Testkit
//!
//! Testing utilities for the Agora read-side.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: Topics with posts, seeded into a store in one call
//! - **Generators**: Proptest strategies for forums, lookups and sort modes
//! - **Spies**: A call-counting store wrapper and recording collaborators
//!
//! ## Test Fixtures
//!
//! Quickly set up test scenarios:
//!
//! ```rust
//! use agora_testkit::fixtures::{seeded_store, TopicFixture};
//!
//! # async fn example() {
//! let topic = TopicFixture::new(1, &[5, 7, 9]).with_votes(&[2, 0, 4]);
//! let store = seeded_store(&[topic]).await;
//! # }
//! ```
//!
//! ## Counting Store Calls
//!
//! ```rust
//! use agora_store::MemoryStore;
//! use agora_testkit::spy::{CountingStore, StoreOp};
//!
//! let store = CountingStore::new(MemoryStore::new());
//! assert_eq!(store.calls(StoreOp::Ranks), 0);
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use agora_testkit::generators::{forum, sort_mode};
//!
//! proptest! {
//!     #[test]
//!     fn every_forum_has_a_topic(topics in forum(3, 5), mode in sort_mode()) {
//!         prop_assert!(!topics.is_empty());
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod spy;

pub use fixtures::{grant_table, seeded_store, TopicFixture};
pub use spy::{CountingSettings, CountingStore, RecordingFilter, StoreOp};

/// Install a test subscriber filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
