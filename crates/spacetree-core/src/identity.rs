#![forbid(unsafe_code)]

//! List identity resolution: locating an array element by its unique `id`.
//!
//! List-item child spaces are correlated with their elements by an `id`
//! field, never by positional index — positions shift as siblings are added
//! and removed, ids do not. String and numeric ids are compared textually,
//! so the key `"2"` matches both `"id": "2"` and `"id": 2`.
//!
//! # Invariants
//!
//! 1. Resolution scans the whole array: a duplicate id is always detected,
//!    regardless of where the duplicates sit.
//! 2. Elements without an `id` field never match any key.
//! 3. Exactly one match resolves; zero is [`SpaceError::MissingListIdentity`]
//!    and two or more is [`SpaceError::DuplicateListIdentity`].

use serde_json::Value;

use crate::error::SpaceError;

/// Whether `element` carries an `id` field textually equal to `key`.
fn id_matches(element: &Value, key: &str) -> bool {
    match element.get("id") {
        Some(Value::String(s)) => s == key,
        Some(Value::Number(n)) => n.to_string() == key,
        _ => false,
    }
}

/// Resolve `key` to the index of the unique matching element of `items`.
pub fn resolve(items: &[Value], key: &str) -> Result<usize, SpaceError> {
    let mut found: Option<usize> = None;
    for (idx, element) in items.iter().enumerate() {
        if id_matches(element, key) {
            if found.is_some() {
                return Err(SpaceError::DuplicateListIdentity { key: key.to_string() });
            }
            found = Some(idx);
        }
    }
    found.ok_or_else(|| SpaceError::MissingListIdentity { key: key.to_string() })
}

/// Remove and return the unique element of `items` whose id equals `key`.
pub fn remove(items: &mut Vec<Value>, key: &str) -> Result<Value, SpaceError> {
    let idx = resolve(items, key)?;
    Ok(items.remove(idx))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn todos() -> Vec<Value> {
        vec![
            json!({"id": "1", "done": false}),
            json!({"id": "2", "done": true}),
            json!({"id": 3, "done": false}),
        ]
    }

    #[test]
    fn resolves_string_id() {
        assert_eq!(resolve(&todos(), "2"), Ok(1));
    }

    #[test]
    fn resolves_numeric_id_textually() {
        assert_eq!(resolve(&todos(), "3"), Ok(2));
    }

    #[test]
    fn missing_id_is_an_error() {
        assert_eq!(
            resolve(&todos(), "9"),
            Err(SpaceError::MissingListIdentity { key: "9".into() })
        );
    }

    #[test]
    fn duplicate_id_is_an_error() {
        let items = vec![json!({"id": "a"}), json!({"id": "b"}), json!({"id": "a"})];
        assert_eq!(
            resolve(&items, "a"),
            Err(SpaceError::DuplicateListIdentity { key: "a".into() })
        );
    }

    #[test]
    fn elements_without_id_never_match() {
        let items = vec![json!({"label": "no id"}), json!({"id": "x"})];
        assert_eq!(resolve(&items, "x"), Ok(1));
        assert_eq!(
            resolve(&items, "label"),
            Err(SpaceError::MissingListIdentity { key: "label".into() })
        );
    }

    #[test]
    fn empty_list_is_missing() {
        assert_eq!(
            resolve(&[], "1"),
            Err(SpaceError::MissingListIdentity { key: "1".into() })
        );
    }

    #[test]
    fn remove_extracts_the_element() {
        let mut items = todos();
        let removed = remove(&mut items, "2").unwrap();
        assert_eq!(removed, json!({"id": "2", "done": true}));
        assert_eq!(items.len(), 2);
        assert!(resolve(&items, "2").is_err());
    }

    #[test]
    fn remove_missing_leaves_list_untouched() {
        let mut items = todos();
        assert!(remove(&mut items, "9").is_err());
        assert_eq!(items.len(), 3);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Resolution finds the planted element regardless of position
            /// or of how many id-less neighbors surround it.
            #[test]
            fn planted_unique_id_always_resolves(
                prefix in proptest::collection::vec(0u32..100, 0..8),
                suffix in proptest::collection::vec(0u32..100, 0..8),
            ) {
                let mut items: Vec<Value> =
                    prefix.iter().map(|n| json!({"value": n})).collect();
                let planted = items.len();
                items.push(json!({"id": "needle", "value": 0}));
                items.extend(suffix.iter().map(|n| json!({"value": n})));

                prop_assert_eq!(resolve(&items, "needle"), Ok(planted));
            }

            /// Removing the resolved element makes the id unresolvable and
            /// shrinks the list by exactly one.
            #[test]
            fn remove_then_resolve_fails(
                ids in proptest::collection::hash_set("[a-z]{1,4}", 1..6),
            ) {
                let mut items: Vec<Value> =
                    ids.iter().map(|id| json!({"id": id})).collect();
                let target = ids.iter().next().unwrap().clone();
                let before = items.len();

                remove(&mut items, &target).unwrap();
                prop_assert_eq!(items.len(), before - 1);
                prop_assert!(resolve(&items, &target).is_err());
            }
        }
    }
}
