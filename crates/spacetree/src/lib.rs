#![forbid(unsafe_code)]

//! Hierarchical immutable state container.
//!
//! # Role
//! A tree of **spaces**, each owning a slice of application state
//! (represented as [`serde_json::Value`]), each able to spawn child spaces
//! over nested attributes or list items, and each able to notify observers
//! when its own state or any descendant's state changes. Rendering layers
//! subscribe at whatever granularity they need and hand [`Handler`]s into
//! event bindings.
//!
//! # Model
//! - Reads return immutable, memoized snapshots ([`Space::state`]).
//! - Writes go through [`Space::set_state`] (merge/replace/remove) or
//!   through bound [`Handler`]s; every write propagates synchronously up the
//!   parent chain, notifying each node's subscribers with a cause label of
//!   the form `"<space>#<label>"`.
//! - Child spaces attach lazily and idempotently ([`Space::sub_space`]);
//!   list items are identified by a unique `id` field, never by index.
//! - Ancestors are reachable by name ([`Space::parent_space`]).
//!
//! Execution is single-threaded, synchronous, and cooperative: `Space` is
//! `Rc`-based and every operation runs to completion before returning.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use spacetree::Space;
//!
//! let app = Space::new(json!({"todos": [{"id": "1", "done": false}]}));
//! let _sub = app.subscribe(|cause| println!("changed: {cause}"));
//!
//! let todo = app.sub_space("todos")?.sub_space("1")?;
//! let toggle = todo.handler("toggle", |space, _event| {
//!     let done = space.state().get("done").and_then(|v| v.as_bool()).unwrap_or(false);
//!     json!({"done": !done})
//! });
//! toggle.call(&json!({}))?;
//!
//! assert_eq!(*app.state(), json!({"todos": [{"id": "1", "done": true}]}));
//! # Ok::<(), spacetree::SpaceError>(())
//! ```

pub mod handler;
pub mod space;
pub mod subscription;

pub use handler::Handler;
pub use space::{ROOT_NAME, Space};
pub use spacetree_core::{Applied, KeyKind, SpaceError};
pub use subscription::{CAUSE_INITIALIZED, Subscription};
