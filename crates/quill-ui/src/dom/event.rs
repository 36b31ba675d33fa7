//! DOM events
//!
//! Events bubble from their target up through every ancestor. Any listener
//! may cancel the default action or stop further bubbling.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::node::Node;

/// Listener callback registered on a node
pub type Listener = Rc<dyn Fn(&Event)>;

/// Identifies a registered listener for later removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// An event being dispatched
pub struct Event {
    kind: String,
    target: RefCell<Option<Node>>,
    current_target: RefCell<Option<Node>>,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl Event {
    /// Create an event of the given type (e.g. "click", "input")
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            target: RefCell::new(None),
            current_target: RefCell::new(None),
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }
    }

    /// Event type
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The node the event was dispatched on
    pub fn target(&self) -> Option<Node> {
        self.target.borrow().clone()
    }

    /// The node whose listeners are currently running
    pub fn current_target(&self) -> Option<Node> {
        self.current_target.borrow().clone()
    }

    /// Cancel the default action
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    /// Stop bubbling after the current node's listeners
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }

    pub(crate) fn set_target(&self, node: &Node) {
        *self.target.borrow_mut() = Some(node.clone());
    }

    pub(crate) fn set_current_target(&self, node: Option<&Node>) {
        *self.current_target.borrow_mut() = node.cloned();
    }
}

impl std::fmt::Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("kind", &self.kind)
            .field("default_prevented", &self.default_prevented.get())
            .finish()
    }
}
