#![forbid(unsafe_code)]

//! Update application: shallow object merge or full replacement.
//!
//! A settled update value mutates backing state in exactly one of two ways:
//!
//! - **Merge** — backing and update are both objects: each key of the update
//!   overwrites the equally-named key of the backing state. The merge is
//!   shallow; nested objects are overwritten wholesale, not recursed into.
//! - **Replace** — any other pairing (list replaced by list, scalar by
//!   scalar, or a shape change): the update becomes the new backing value.
//!
//! The removal signal (`Value::Null`) is not an update and never reaches
//! this module; the tree layer routes it before applying.
//!
//! # Invariants
//!
//! 1. Merge preserves every backing key absent from the update.
//! 2. Merge takes the update's value for every key present in the update.
//! 3. Replace discards the previous backing value entirely.

use serde_json::Value;

/// How an update was applied to backing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Object-onto-object shallow key merge.
    Merged,
    /// Full value replacement.
    Replaced,
}

/// Apply `update` to `backing` in place.
pub fn apply(backing: &mut Value, update: Value) -> Applied {
    debug_assert!(!update.is_null(), "removal signal must be routed before apply");
    match (backing, update) {
        (Value::Object(base), Value::Object(incoming)) => {
            for (key, value) in incoming {
                base.insert(key, value);
            }
            Applied::Merged
        }
        (backing, update) => {
            *backing = update;
            Applied::Replaced
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
