#![forbid(unsafe_code)]

//! Error taxonomy for space-tree operations.
//!
//! Every failure in the value and tree layers is synchronous and local to the
//! call that triggered it. Nothing here is retried or deferred.
//!
//! # Failure Modes
//!
//! | Variant | Cause | Surfaced by |
//! |---------|-------|-------------|
//! | `InvalidRemoval` | Removal signal on a node that is not a list item | `set_state` / `Handler::call` |
//! | `MissingListIdentity` | No element in the owning array carries the id | `sub_space`, removal routing |
//! | `DuplicateListIdentity` | Two elements share the id; resolution is ambiguous | `sub_space` |
//! | `MissingAttribute` | Attachment key absent from the object backing | `sub_space` |
//! | `ScalarAttachment` | Attachment attempted on scalar backing state | `sub_space` |
//! | `Detached` | Mutation or attachment on a node removed from its list | `set_state`, `sub_space` |

/// Errors from space-tree operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpaceError {
    /// A mutation returned the removal signal, but the node is not attached
    /// as a list item, so there is no containing collection to remove from.
    InvalidRemoval {
        /// Name of the offending space.
        space: String,
    },
    /// No element of the owning array has an `id` field equal to the key.
    MissingListIdentity {
        /// The id that failed to resolve.
        key: String,
    },
    /// More than one element of the owning array matches the id.
    DuplicateListIdentity {
        /// The ambiguous id.
        key: String,
    },
    /// The attachment key names no attribute of the object backing state.
    MissingAttribute {
        /// The absent attribute name.
        key: String,
    },
    /// The backing state is a scalar and cannot host child spaces.
    ScalarAttachment {
        /// The key that was requested.
        key: String,
    },
    /// The node was removed from its owning list and no longer accepts
    /// mutations or attachments.
    Detached {
        /// Name of the removed space.
        space: String,
    },
}

impl std::fmt::Display for SpaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRemoval { space } => {
                write!(f, "space '{space}' is not a list item; nothing to remove it from")
            }
            Self::MissingListIdentity { key } => {
                write!(f, "no list element with id '{key}'")
            }
            Self::DuplicateListIdentity { key } => {
                write!(f, "multiple list elements share id '{key}'")
            }
            Self::MissingAttribute { key } => {
                write!(f, "backing state has no attribute '{key}'")
            }
            Self::ScalarAttachment { key } => {
                write!(f, "cannot attach '{key}': backing state is a scalar")
            }
            Self::Detached { space } => {
                write!(f, "space '{space}' was removed from its owning list")
            }
        }
    }
}

impl std::error::Error for SpaceError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_key() {
        let err = SpaceError::MissingListIdentity { key: "2".into() };
        assert_eq!(err.to_string(), "no list element with id '2'");

        let err = SpaceError::DuplicateListIdentity { key: "x".into() };
        assert!(err.to_string().contains("share id 'x'"));
    }

    #[test]
    fn display_names_the_space() {
        let err = SpaceError::InvalidRemoval { space: "filter".into() };
        assert!(err.to_string().contains("'filter'"));

        let err = SpaceError::Detached { space: "2".into() };
        assert!(err.to_string().contains("removed from its owning list"));
    }

    #[test]
    fn error_trait_object() {
        let err: Box<dyn std::error::Error> =
            Box::new(SpaceError::ScalarAttachment { key: "a".into() });
        assert!(err.to_string().contains("scalar"));
    }
}
