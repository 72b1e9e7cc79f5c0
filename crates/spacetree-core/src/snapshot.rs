#![forbid(unsafe_code)]

//! Snapshot composition primitives.
//!
//! A node's published snapshot is its backing value with every child's own
//! snapshot spliced in over the raw value at the child's attachment point.
//! This module provides the per-attachment pieces of that composition; the
//! tree layer drives the recursion.
//!
//! An attachment key addresses a composite value in one of two ways,
//! resolved once at attach time and carried as a [`KeyKind`] tag:
//!
//! - [`KeyKind::Attribute`] — direct key into an object backing.
//! - [`KeyKind::ListItem`] — `id`-scan into an array backing
//!   (see [`crate::identity`]).
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Extract from absent attribute | Key not in object | `MissingAttribute` |
//! | Extract with unknown id | No element matches | `MissingListIdentity` |
//! | Splice onto a vanished point | Backing later replaced | Splice skipped |

use serde_json::Value;
use tracing::trace;

use crate::error::SpaceError;
use crate::identity;

/// How an attachment key addresses the backing value it was attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Direct attribute of an object backing.
    Attribute,
    /// Element of an array backing, located by unique `id`.
    ListItem,
}

impl KeyKind {
    /// Classify how keys address `backing`. Scalars host no children.
    #[must_use]
    pub fn classify(backing: &Value) -> Option<Self> {
        match backing {
            Value::Object(_) => Some(Self::Attribute),
            Value::Array(_) => Some(Self::ListItem),
            _ => None,
        }
    }
}

/// Copy the raw value at `key` out of `backing` for a new child space.
pub fn extract(backing: &Value, kind: KeyKind, key: &str) -> Result<Value, SpaceError> {
    match kind {
        KeyKind::Attribute => backing
            .get(key)
            .cloned()
            .ok_or_else(|| SpaceError::MissingAttribute { key: key.to_string() }),
        KeyKind::ListItem => {
            let items = backing
                .as_array()
                .ok_or_else(|| SpaceError::MissingListIdentity { key: key.to_string() })?;
            let idx = identity::resolve(items, key)?;
            Ok(items[idx].clone())
        }
    }
}

/// Splice a child's snapshot over its attachment point in `base`.
///
/// Returns whether the splice landed. A stale attachment point (the backing
/// was replaced since the child attached, or a duplicate id crept in) skips
/// the splice rather than failing the read.
pub fn splice(base: &mut Value, kind: KeyKind, key: &str, child: Value) -> bool {
    match kind {
        KeyKind::Attribute => {
            if let Some(map) = base.as_object_mut() {
                map.insert(key.to_string(), child);
                return true;
            }
        }
        KeyKind::ListItem => {
            if let Some(items) = base.as_array_mut() {
                if let Ok(idx) = identity::resolve(items, key) {
                    items[idx] = child;
                    return true;
                }
            }
        }
    }
    trace!(key, ?kind, "attachment point gone; splice skipped");
    false
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
