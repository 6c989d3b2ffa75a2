//! # Agora Permissions
//!
//! Privilege checks for the Agora read-side.
//!
//! ## Overview
//!
//! The post services never build privilege tables themselves. They consume
//! the [`PrivilegeService`] trait: an order-preserving post filter for an
//! action, and a capability map ([`Privileges`]) for a viewer in a category.
//!
//! [`GrantTable`] is an in-memory implementation built from [`Grant`] and
//! [`Revoke`] records. A grant applies forum-wide or to one category; an
//! `admin` grant implies every action in its scope.
//!
//! ## Usage
//!
//! ```rust
//! use agora_perms::{actions, Grant, GrantTable};
//! use agora_core::{CategoryId, UserId};
//!
//! let mut table = GrantTable::new();
//! let cid = CategoryId::new(1).unwrap();
//! table.apply_grant(Grant::in_category(UserId(5), actions::POSTS_VIEW_DELETED, cid));
//!
//! let privileges = table.privileges_for(UserId(5), Some(cid), 0);
//! assert!(privileges.has(actions::POSTS_VIEW_DELETED));
//! ```

pub mod error;
pub mod grant;
pub mod privileges;
pub mod state;

pub use error::{PermsError, Result};
pub use grant::{actions, Conditions, Grant, GrantId, GrantScope, Revoke};
pub use privileges::{PrivilegeService, Privileges};
pub use state::{GrantState, GrantTable};
