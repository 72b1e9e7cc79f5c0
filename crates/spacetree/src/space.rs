#![forbid(unsafe_code)]

//! The space node: a tree unit owning a slice of application state.
//!
//! # Design
//!
//! [`Space`] is a cheap handle over shared, reference-counted interior state
//! (`Rc<RefCell<..>>`). Cloning a `Space` creates a second handle to the
//! **same** node. The tree has exactly one owning edge per node — the
//! parent's `children` map — while child→parent links are `Weak`, so
//! dropping a parent cascades destruction of its subtree and never the
//! reverse.
//!
//! Reads go through composed snapshots: a node's published state is its
//! backing value with every child's own snapshot spliced in over the raw
//! value at the child's attachment point. Snapshots are memoized as
//! `Rc<Value>` and invalidated on every mutation of the node or any
//! descendant.
//!
//! # Invariants
//!
//! 1. At most one child exists per (parent, attachment key); repeated
//!    [`Space::sub_space`] calls return the same node.
//! 2. Two `state()` reads without an intervening mutation return the same
//!    `Rc` allocation (`Rc::ptr_eq`-stable).
//! 3. Propagation is one synchronous pass, child before parent, with one
//!    notification per node per mutation.
//! 4. Backing state is never handed out; only frozen snapshots are.
//!
//! # Failure Modes
//!
//! Re-entrant mutation from inside a subscriber callback panics on the
//! `RefCell` borrow. That is intentional: re-entrant `set_state` during a
//! notification pass indicates a design bug in the subscriber graph.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use serde_json::Value;
use tracing::{debug, trace};

use spacetree_core::merge;
use spacetree_core::snapshot::{self, KeyKind};
use spacetree_core::{SpaceError, identity};

use crate::handler::Handler;
use crate::subscription::{self, CAUSE_INITIALIZED, CallbackRc, SubscriberSet, Subscription};

/// Default name of an unnamed top-level space.
pub const ROOT_NAME: &str = "root";

/// Label used in cause strings when the caller supplies none.
const ANONYMOUS_LABEL: &str = "anonymous";

/// A child handle plus how its key addresses the parent's backing value.
struct ChildEntry {
    kind: KeyKind,
    space: Space,
}

/// Shared interior for [`Space`].
struct SpaceInner {
    name: String,
    /// Authoritative, not-yet-frozen value for this node. Never exposed.
    backing: Value,
    /// Non-owning back-reference; traversal only. `None` for the root and
    /// for detached nodes.
    parent: Option<Weak<RefCell<SpaceInner>>>,
    /// How this node is attached under its parent. `None` for the root.
    attached_as: Option<KeyKind>,
    /// Sole owning edges of the tree, keyed by attachment key.
    children: HashMap<String, ChildEntry>,
    subscribers: SubscriberSet,
    /// Memoized frozen composition; `None` when invalidated.
    snapshot: Option<Rc<Value>>,
    /// Set when a list-item node is removed from its owning array.
    detached: bool,
}

/// A node of the state tree.
///
/// Cloning shares the node; equality of nodes is [`Space::ptr_eq`].
pub struct Space {
    inner: Rc<RefCell<SpaceInner>>,
}

// Manual Clone: shares the same Rc.
impl Clone for Space {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl std::fmt::Debug for Space {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Space")
            .field("name", &inner.name)
            .field("children", &inner.children.len())
            .field("subscribers", &inner.subscribers.len())
            .field("detached", &inner.detached)
            .finish()
    }
}

impl Space {
    /// Create a root space named [`ROOT_NAME`] over `initial` state.
    #[must_use]
    pub fn new(initial: Value) -> Self {
        Self::with_name(ROOT_NAME, initial)
    }

    /// Create a root space with an explicit name.
    #[must_use]
    pub fn with_name(name: impl Into<String>, initial: Value) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SpaceInner {
                name: name.into(),
                backing: initial,
                parent: None,
                attached_as: None,
                children: HashMap::new(),
                subscribers: SubscriberSet::default(),
                snapshot: None,
                detached: false,
            })),
        }
    }

    /// This node's name. Roots default to [`ROOT_NAME`]; a child's name is
    /// its attachment key.
    #[must_use]
    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    /// Whether the two handles refer to the same node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Whether this node was removed from its owning list.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.inner.borrow().detached
    }

    /// Whether a child is attached under `key`.
    #[must_use]
    pub fn has_child(&self, key: &str) -> bool {
        self.inner.borrow().children.contains_key(key)
    }

    /// Number of registered subscribers (including dead ones not yet pruned).
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    // -- state access -------------------------------------------------------

    /// The immutable composed snapshot of this node and its descendants.
    ///
    /// Memoized: repeated reads without an intervening mutation return the
    /// same `Rc` allocation. Recomputed lazily after invalidation.
    #[must_use]
    pub fn state(&self) -> Rc<Value> {
        if let Some(snap) = self.inner.borrow().snapshot.as_ref() {
            return Rc::clone(snap);
        }
        trace!(space = %self.name(), "rebuilding snapshot");
        let composed = Rc::new(self.compose());
        self.inner.borrow_mut().snapshot = Some(Rc::clone(&composed));
        composed
    }

    /// Deep-compose the backing value with every child's snapshot spliced in
    /// at its attachment point.
    fn compose(&self) -> Value {
        let children: Vec<(String, KeyKind, Space)> = self
            .inner
            .borrow()
            .children
            .iter()
            .map(|(key, entry)| (key.clone(), entry.kind, entry.space.clone()))
            .collect();

        let mut base = self.inner.borrow().backing.clone();
        for (key, kind, child) in children {
            let child_snapshot = (*child.state()).clone();
            snapshot::splice(&mut base, kind, &key, child_snapshot);
        }
        base
    }

    // -- mutation dispatch --------------------------------------------------

    /// Apply an update to this node's state.
    ///
    /// An object update merges shallowly onto an object backing; any other
    /// pairing replaces the backing wholesale. `Value::Null` is the removal
    /// signal: valid only on list-item nodes, where it deletes the owning
    /// array element (see the module docs of [`spacetree_core::identity`]).
    ///
    /// Propagation is fully synchronous: by the time this returns, every
    /// affected snapshot is invalidated and every subscriber on this node
    /// and its ancestors has been notified once.
    pub fn set_state(&self, update: Value) -> Result<(), SpaceError> {
        self.apply_update(update, ANONYMOUS_LABEL)
    }

    /// Like [`Space::set_state`], with `label` naming the mutation in the
    /// cause string (`"<name>#<label>"`) delivered to subscribers.
    pub fn set_state_labeled(&self, update: Value, label: &str) -> Result<(), SpaceError> {
        self.apply_update(update, label)
    }

    /// Bind a callback into an event handler owned by this node.
    ///
    /// The returned [`Handler`] invokes `callback` with this space and the
    /// event value; the callback's return value is interpreted exactly as in
    /// [`Space::set_state`], with `name` as the cause label.
    pub fn handler<F>(&self, name: impl Into<String>, callback: F) -> Handler
    where
        F: Fn(&Space, &Value) -> Value + 'static,
    {
        Handler::new(self.clone(), name.into(), Rc::new(callback))
    }

    pub(crate) fn apply_update(&self, update: Value, label: &str) -> Result<(), SpaceError> {
        let cause = {
            let inner = self.inner.borrow();
            if inner.detached {
                return Err(SpaceError::Detached {
                    space: inner.name.clone(),
                });
            }
            format!("{}#{label}", inner.name)
        };

        if update.is_null() {
            return self.remove_from_parent(&cause);
        }

        let applied = {
            let mut inner = self.inner.borrow_mut();
            merge::apply(&mut inner.backing, update)
        };
        debug!(space = %self.name(), %cause, ?applied, "state mutated");
        self.propagate(&cause);
        Ok(())
    }

    /// Handle the removal signal: delete this list item from its owning
    /// array, detach it, and propagate the mutation from the parent.
    fn remove_from_parent(&self, cause: &str) -> Result<(), SpaceError> {
        let (parent_inner, key) = {
            let inner = self.inner.borrow();
            let parent = inner.parent.as_ref().and_then(Weak::upgrade);
            match (inner.attached_as, parent) {
                (Some(KeyKind::ListItem), Some(rc)) => (rc, inner.name.clone()),
                _ => {
                    return Err(SpaceError::InvalidRemoval {
                        space: inner.name.clone(),
                    });
                }
            }
        };
        let parent = Space {
            inner: parent_inner,
        };

        {
            let mut p = parent.inner.borrow_mut();
            let items = p
                .backing
                .as_array_mut()
                .ok_or_else(|| SpaceError::MissingListIdentity { key: key.clone() })?;
            identity::remove(items, &key)?;
            p.children.remove(&key);
        }
        {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.clear();
            inner.snapshot = None;
            inner.parent = None;
            inner.detached = true;
        }
        debug!(space = %key, %cause, "list item removed");

        // The parent's backing array changed size: this is its mutation.
        parent.propagate(cause);
        Ok(())
    }

    // -- propagation engine -------------------------------------------------

    /// Invalidate this node's snapshot and every ancestor's, then notify
    /// subscribers innermost-to-outermost with the same cause label.
    fn propagate(&self, cause: &str) {
        let mut chain = vec![self.clone()];
        chain.extend(self.ancestors());

        for node in &chain {
            node.inner.borrow_mut().snapshot = None;
        }
        for node in &chain {
            node.notify(cause);
        }
    }

    /// The parent chain, nearest ancestor first. Unresolvable weak links end
    /// the walk.
    fn ancestors(&self) -> Vec<Space> {
        let mut out = Vec::new();
        let mut current = self.inner.borrow().parent.clone();
        while let Some(weak) = current {
            let Some(rc) = weak.upgrade() else { break };
            current = rc.borrow().parent.clone();
            out.push(Self { inner: rc });
        }
        out
    }

    /// Notify this node's live subscribers. Callbacks run outside any
    /// borrow, each isolated at the dispatch boundary.
    fn notify(&self, cause: &str) {
        let live = self.inner.borrow_mut().subscribers.collect_live();
        for callback in &live {
            subscription::dispatch(callback, cause);
        }
    }

    // -- child attachment ---------------------------------------------------

    /// The child space attached at `key`, created lazily on first call.
    ///
    /// Object backing resolves `key` as an attribute name; array backing
    /// resolves it as a list-item `id`. The child's backing becomes the raw
    /// value found there, which the child's snapshot thereafter shadows.
    /// Attachment alone mutates nothing and notifies no one.
    pub fn sub_space(&self, key: &str) -> Result<Self, SpaceError> {
        {
            let inner = self.inner.borrow();
            if inner.detached {
                return Err(SpaceError::Detached {
                    space: inner.name.clone(),
                });
            }
            if let Some(entry) = inner.children.get(key) {
                return Ok(entry.space.clone());
            }
        }

        let (kind, raw) = {
            let inner = self.inner.borrow();
            let kind = KeyKind::classify(&inner.backing)
                .ok_or_else(|| SpaceError::ScalarAttachment { key: key.to_string() })?;
            let raw = snapshot::extract(&inner.backing, kind, key)?;
            (kind, raw)
        };

        let child = Self {
            inner: Rc::new(RefCell::new(SpaceInner {
                name: key.to_string(),
                backing: raw,
                parent: Some(Rc::downgrade(&self.inner)),
                attached_as: Some(kind),
                children: HashMap::new(),
                subscribers: SubscriberSet::default(),
                snapshot: None,
                detached: false,
            })),
        };
        self.inner.borrow_mut().children.insert(
            key.to_string(),
            ChildEntry {
                kind,
                space: child.clone(),
            },
        );
        trace!(space = %self.name(), key, ?kind, "child space attached");
        Ok(child)
    }

    // -- subscription -------------------------------------------------------

    /// Register a change observer on this exact node.
    ///
    /// The callback is invoked once immediately and synchronously with cause
    /// [`CAUSE_INITIALIZED`], then on every mutation of this node or any
    /// descendant. Hold the returned [`Subscription`] guard for as long as
    /// the observer should stay live; dropping it unsubscribes.
    pub fn subscribe(&self, callback: impl Fn(&str) + 'static) -> Subscription {
        let strong: CallbackRc = Rc::new(callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&strong));
        subscription::dispatch(&strong, CAUSE_INITIALIZED);
        Subscription::new(Box::new(strong))
    }

    // -- named parent lookup ------------------------------------------------

    /// The nearest ancestor named `name`, starting at the immediate parent
    /// (never this node itself). `None` when the chain is exhausted — always
    /// `None` on a root.
    #[must_use]
    pub fn parent_space(&self, name: &str) -> Option<Self> {
        self.ancestors()
            .into_iter()
            .find(|node| node.inner.borrow().name == name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
