#![forbid(unsafe_code)]

//! Bound event handlers: a callback wrapped with its owning space.
//!
//! A [`Handler`] is the value-type form of "`set_state` with a callback": it
//! captures the owning [`Space`] and the user callback, and exposes a single
//! [`Handler::call`] entry point taking an opaque event value. No async
//! machinery is involved; calling a handler is a pure synchronous
//! indirection into the owning node's mutation path.
//!
//! The callback receives the owning space (so it can read `state`, call
//! `set_state`, or attach sub-spaces without external binding) and the event
//! value. Its return value is interpreted exactly like a direct `set_state`
//! argument: object merge, full replacement, or `Value::Null` as the removal
//! signal.

use std::rc::Rc;

use serde_json::Value;

use spacetree_core::SpaceError;

use crate::space::Space;

type HandlerCallback = Rc<dyn Fn(&Space, &Value) -> Value>;

/// An event handler bound to the space that created it.
///
/// Built by [`Space::handler`]; the handler's name becomes the cause label
/// (`"<space>#<name>"`) for every mutation it produces.
pub struct Handler {
    space: Space,
    name: String,
    callback: HandlerCallback,
}

// Manual Clone: shares the space handle and the callback.
impl Clone for Handler {
    fn clone(&self) -> Self {
        Self {
            space: self.space.clone(),
            name: self.name.clone(),
            callback: Rc::clone(&self.callback),
        }
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("space", &self.space.name())
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Handler {
    pub(crate) fn new(space: Space, name: String, callback: HandlerCallback) -> Self {
        Self {
            space,
            name,
            callback,
        }
    }

    /// This handler's name, used as the cause label of its mutations.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The space this handler is bound to.
    #[must_use]
    pub fn space(&self) -> &Space {
        &self.space
    }

    /// Invoke the callback with the owning space and `event`, then apply its
    /// return value as a mutation of the owning space.
    pub fn call(&self, event: &Value) -> Result<(), SpaceError> {
        let update = (self.callback)(&self.space, event);
        self.space.apply_update(update, &self.name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    #[test]
    fn callback_sees_space_and_event() {
        let space = Space::new(json!({"count": 1}));
        let handler = space.handler("increment", |space, event| {
            let step = event.get("step").and_then(Value::as_i64).unwrap_or(1);
            let count = space.state().get("count").and_then(Value::as_i64).unwrap_or(0);
            json!({"count": count + step})
        });

        handler.call(&json!({"step": 4})).unwrap();
        assert_eq!(*space.state(), json!({"count": 5}));
    }

    #[test]
    fn handler_name_labels_the_cause() {
        let space = Space::new(json!({"n": 0}));
        let causes = Rc::new(RefCell::new(Vec::new()));
        let causes_clone = Rc::clone(&causes);
        let _sub = space.subscribe(move |cause| causes_clone.borrow_mut().push(cause.to_string()));

        let handler = space.handler("tick", |_, _| json!({"n": 1}));
        handler.call(&Value::Null).unwrap();
        assert_eq!(*causes.borrow(), vec!["initialized", "root#tick"]);
    }

    #[test]
    fn null_return_removes_list_items_only() {
        let list = Space::new(json!([{"id": "a"}, {"id": "b"}]));
        let item = list.sub_space("b").unwrap();
        let remove = item.handler("dismiss", |_, _| Value::Null);

        remove.call(&json!({})).unwrap();
        assert_eq!(*list.state(), json!([{"id": "a"}]));

        let root = Space::new(json!({"n": 0}));
        let bad = root.handler("dismiss", |_, _| Value::Null);
        assert_eq!(
            bad.call(&json!({})),
            Err(SpaceError::InvalidRemoval { space: "root".into() })
        );
    }

    #[test]
    fn full_list_replacement_through_handler() {
        let list = Space::new(json!(["x", "y"]));
        let prepend = list.handler("prepend", |space, event| {
            let mut items = space.state().as_array().cloned().unwrap_or_default();
            items.insert(0, event.clone());
            Value::Array(items)
        });

        prepend.call(&json!("z")).unwrap();
        assert_eq!(*list.state(), json!(["z", "x", "y"]));
    }

    #[test]
    fn clone_shares_the_binding() {
        let space = Space::new(json!({"n": 0}));
        let handler = space.handler("tick", |_, _| json!({"n": 1}));
        let clone = handler.clone();
        assert_eq!(clone.name(), "tick");

        clone.call(&Value::Null).unwrap();
        assert_eq!(*space.state(), json!({"n": 1}));
        assert!(handler.space().ptr_eq(clone.space()));
    }
}
