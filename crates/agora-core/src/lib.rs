//! # Agora Core
//!
//! Pure primitives for the Agora post read-side: identifiers, ordering sets,
//! sort modes, positions and post records.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`PostId`], [`TopicId`], [`CategoryId`], [`UserId`] - Typed identifiers
//! - [`SetKey`] - Name of an ordering set in the sorted collection store
//! - [`SortMode`] - Viewer preference selecting ordering set and direction
//! - [`Position`] - 1-based position, `0` meaning "not ranked"
//! - [`PostRecord`] - A fully populated post

pub mod error;
pub mod ordering;
pub mod post;
pub mod types;

pub use error::{CoreError, Result};
pub use ordering::{Direction, Position, SetKey, SortMode};
pub use post::{PostAuthor, PostRecord, PostSummary};
pub use types::{CategoryId, PostId, TopicId, UserId};
