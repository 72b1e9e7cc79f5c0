#![forbid(unsafe_code)]

//! Value layer for the spacetree state container.
//!
//! # Role in spacetree
//! `spacetree-core` owns everything about state *values* and nothing about
//! the tree: how an update merges into or replaces a backing value, how a
//! list element is identified by its unique `id`, and how a child's snapshot
//! splices over its attachment point during composition. The tree layer
//! (`spacetree`) builds `Space` nodes, propagation, and subscriptions on top
//! of these primitives.
//!
//! # Primary responsibilities
//! - **Merge semantics**: shallow object merge vs full replacement
//!   ([`merge`]).
//! - **List identity**: resolving and removing array elements by `id`
//!   ([`identity`]).
//! - **Snapshot primitives**: attachment-key classification, raw-value
//!   extraction, and child-snapshot splicing ([`snapshot`]).
//! - **Error taxonomy**: every failure a space operation can surface
//!   ([`error`]).

pub mod error;
pub mod identity;
pub mod merge;
pub mod snapshot;

pub use error::SpaceError;
pub use merge::Applied;
pub use snapshot::KeyKind;
