//! Document nodes
//!
//! A [`Node`] is a cheap, clonable handle to a shared tree node. The tree is
//! single-threaded: parents own their children, children point back at their
//! parent weakly.
//!
//! Appending a node that already has a parent moves it. Appending a fragment
//! moves the fragment's children and leaves the fragment empty.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::warn;

use super::event::{Event, Listener, ListenerId};
use super::html;

/// Element namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Html,
    Svg,
}

impl Namespace {
    /// Namespace URI as used by the platform
    pub fn uri(&self) -> &'static str {
        match self {
            Namespace::Html => "http://www.w3.org/1999/xhtml",
            Namespace::Svg => "http://www.w3.org/2000/svg",
        }
    }
}

pub(crate) struct ElementData {
    pub(crate) tag: String,
    pub(crate) namespace: Namespace,
    pub(crate) attributes: RefCell<Vec<(String, String)>>,
    pub(crate) style: RefCell<Vec<(String, String)>>,
    value: RefCell<String>,
    checked: Cell<bool>,
}

pub(crate) enum NodeKind {
    Document,
    Element(ElementData),
    Text(RefCell<String>),
    Fragment,
}

pub(crate) struct NodeInner {
    pub(crate) kind: NodeKind,
    parent: RefCell<Weak<NodeInner>>,
    children: RefCell<Vec<Node>>,
    listeners: RefCell<Vec<(ListenerId, String, Listener)>>,
    next_listener: Cell<u64>,
}

/// Handle to a node in a document tree
#[derive(Clone)]
pub struct Node(pub(crate) Rc<NodeInner>);

impl Node {
    fn from_kind(kind: NodeKind) -> Self {
        Node(Rc::new(NodeInner {
            kind,
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
        }))
    }

    /// Create a document root
    pub fn document() -> Self {
        Self::from_kind(NodeKind::Document)
    }

    /// Create an HTML element
    pub fn element(tag: &str) -> Self {
        Self::element_ns(Namespace::Html, tag)
    }

    /// Create an element in the given namespace
    pub fn element_ns(namespace: Namespace, tag: &str) -> Self {
        Self::from_kind(NodeKind::Element(ElementData {
            tag: tag.to_string(),
            namespace,
            attributes: RefCell::new(Vec::new()),
            style: RefCell::new(Vec::new()),
            value: RefCell::new(String::new()),
            checked: Cell::new(false),
        }))
    }

    /// Create a text node
    pub fn text(content: impl Into<String>) -> Self {
        Self::from_kind(NodeKind::Text(RefCell::new(content.into())))
    }

    /// Create an empty fragment
    pub fn fragment() -> Self {
        Self::from_kind(NodeKind::Fragment)
    }

    // ==================== Identity ====================

    /// Same underlying node
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Handle that does not keep the node alive
    ///
    /// Listeners that need to reach their own node or an ancestor hold one
    /// of these, so a detached tree can be freed.
    pub fn downgrade(&self) -> WeakNode {
        WeakNode(Rc::downgrade(&self.0))
    }

    pub fn is_element(&self) -> bool {
        matches!(self.0.kind, NodeKind::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self.0.kind, NodeKind::Text(_))
    }

    pub fn is_fragment(&self) -> bool {
        matches!(self.0.kind, NodeKind::Fragment)
    }

    pub fn is_document(&self) -> bool {
        matches!(self.0.kind, NodeKind::Document)
    }

    /// Element tag name
    pub fn tag_name(&self) -> Option<&str> {
        self.element_data().map(|e| e.tag.as_str())
    }

    /// Element namespace
    pub fn namespace(&self) -> Option<Namespace> {
        self.element_data().map(|e| e.namespace)
    }

    pub(crate) fn element_data(&self) -> Option<&ElementData> {
        match &self.0.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    // ==================== Attributes ====================

    /// Set an attribute, replacing any previous value
    ///
    /// Ignored on non-element nodes.
    pub fn set_attribute(&self, name: &str, value: &str) {
        let Some(data) = self.element_data() else {
            return;
        };
        let mut attributes = data.attributes.borrow_mut();
        match attributes.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => attributes.push((name.to_string(), value.to_string())),
        }
    }

    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.element_data()?
            .attributes
            .borrow()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.get_attribute(name).is_some()
    }

    pub fn remove_attribute(&self, name: &str) {
        if let Some(data) = self.element_data() {
            data.attributes.borrow_mut().retain(|(n, _)| n != name);
        }
    }

    /// All attributes in insertion order
    pub fn attributes(&self) -> Vec<(String, String)> {
        self.element_data()
            .map(|d| d.attributes.borrow().clone())
            .unwrap_or_default()
    }

    /// Space-separated classes of the `class` attribute
    pub fn class_list(&self) -> Vec<String> {
        self.get_attribute("class")
            .map(|c| c.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class_list().iter().any(|c| c == class)
    }

    /// Add each whitespace-separated class not already present
    pub fn add_classes(&self, classes: &str) {
        let mut list = self.class_list();
        for class in classes.split_whitespace() {
            if !list.iter().any(|c| c == class) {
                list.push(class.to_string());
            }
        }
        self.set_attribute("class", &list.join(" "));
    }

    /// Remove each whitespace-separated class
    pub fn remove_classes(&self, classes: &str) {
        let remove: Vec<&str> = classes.split_whitespace().collect();
        let list: Vec<String> = self
            .class_list()
            .into_iter()
            .filter(|c| !remove.contains(&c.as_str()))
            .collect();
        self.set_attribute("class", &list.join(" "));
    }

    // ==================== Properties ====================

    /// Set one inline style property
    pub fn set_style(&self, property: &str, value: &str) {
        let Some(data) = self.element_data() else {
            return;
        };
        let mut style = data.style.borrow_mut();
        match style.iter_mut().find(|(p, _)| p == property) {
            Some(slot) => slot.1 = value.to_string(),
            None => style.push((property.to_string(), value.to_string())),
        }
    }

    pub fn style(&self, property: &str) -> Option<String> {
        self.element_data()?
            .style
            .borrow()
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.clone())
    }

    /// Current form value (inputs, text areas)
    pub fn value(&self) -> String {
        self.element_data()
            .map(|d| d.value.borrow().clone())
            .unwrap_or_default()
    }

    pub fn set_value(&self, value: &str) {
        if let Some(data) = self.element_data() {
            *data.value.borrow_mut() = value.to_string();
        }
    }

    /// Checked state (checkboxes, radios)
    pub fn checked(&self) -> bool {
        self.element_data().map(|d| d.checked.get()).unwrap_or(false)
    }

    pub fn set_checked(&self, checked: bool) {
        if let Some(data) = self.element_data() {
            data.checked.set(checked);
        }
    }

    // ==================== Tree ====================

    pub fn parent(&self) -> Option<Node> {
        self.0.parent.borrow().upgrade().map(Node)
    }

    /// Snapshot of the children
    pub fn children(&self) -> Vec<Node> {
        self.0.children.borrow().clone()
    }

    pub fn child_count(&self) -> usize {
        self.0.children.borrow().len()
    }

    pub fn first_child(&self) -> Option<Node> {
        self.0.children.borrow().first().cloned()
    }

    /// Append `child`, detaching it from any previous parent
    ///
    /// A fragment contributes its children instead of itself. Appending a
    /// node to itself or to one of its descendants is ignored.
    pub fn append_child(&self, child: &Node) {
        if self.is_inclusive_descendant_of(child) {
            warn!(
                "Ignoring append of {} into its own subtree",
                child.tag_name().unwrap_or("node")
            );
            return;
        }
        if child.is_fragment() {
            let moved = std::mem::take(&mut *child.0.children.borrow_mut());
            for grandchild in moved {
                *grandchild.0.parent.borrow_mut() = Weak::new();
                self.append_child(&grandchild);
            }
            return;
        }

        child.detach();
        *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        self.0.children.borrow_mut().push(child.clone());
    }

    fn is_inclusive_descendant_of(&self, other: &Node) -> bool {
        let mut current = Some(self.clone());
        while let Some(node) = current {
            if node.ptr_eq(other) {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// Remove `child`, returning whether it was a child of this node
    pub fn remove_child(&self, child: &Node) -> bool {
        let mut children = self.0.children.borrow_mut();
        let Some(pos) = children.iter().position(|c| c.ptr_eq(child)) else {
            return false;
        };
        let removed = children.remove(pos);
        *removed.0.parent.borrow_mut() = Weak::new();
        true
    }

    /// Remove every child
    pub fn clear_children(&self) {
        let removed = std::mem::take(&mut *self.0.children.borrow_mut());
        for child in removed {
            *child.0.parent.borrow_mut() = Weak::new();
        }
    }

    /// Remove this node from its parent
    pub fn detach(&self) {
        if let Some(parent) = self.parent() {
            parent.remove_child(self);
        }
    }

    /// Nearest inclusive ancestor matching `pred`
    pub fn closest(&self, pred: impl Fn(&Node) -> bool) -> Option<Node> {
        let mut current = Some(self.clone());
        while let Some(node) = current {
            if pred(&node) {
                return Some(node);
            }
            current = node.parent();
        }
        None
    }

    /// First inclusive descendant matching `pred`, depth-first
    pub fn find(&self, pred: impl Fn(&Node) -> bool) -> Option<Node> {
        self.find_dyn(&pred)
    }

    fn find_dyn(&self, pred: &dyn Fn(&Node) -> bool) -> Option<Node> {
        if pred(self) {
            return Some(self.clone());
        }
        self.children().iter().find_map(|child| child.find_dyn(pred))
    }

    /// Every inclusive descendant matching `pred`, depth-first
    pub fn find_all(&self, pred: impl Fn(&Node) -> bool) -> Vec<Node> {
        let mut out = Vec::new();
        self.collect_dyn(&pred, &mut out);
        out
    }

    fn collect_dyn(&self, pred: &dyn Fn(&Node) -> bool, out: &mut Vec<Node>) {
        if pred(self) {
            out.push(self.clone());
        }
        for child in self.children() {
            child.collect_dyn(pred, out);
        }
    }

    /// Descendant element with the given `id` attribute
    pub fn find_by_id(&self, id: &str) -> Option<Node> {
        self.find(|n| n.get_attribute("id").as_deref() == Some(id))
    }

    /// Descendant elements with the given tag name
    pub fn find_by_tag(&self, tag: &str) -> Vec<Node> {
        self.find_all(|n| n.tag_name() == Some(tag))
    }

    // ==================== Text ====================

    /// Concatenated text of this node and its descendants
    pub fn text_content(&self) -> String {
        match &self.0.kind {
            NodeKind::Text(text) => text.borrow().clone(),
            _ => self.children().iter().map(Node::text_content).collect(),
        }
    }

    /// Replace content with a single text node (or the text itself for a
    /// text node)
    pub fn set_text_content(&self, content: &str) {
        match &self.0.kind {
            NodeKind::Text(text) => *text.borrow_mut() = content.to_string(),
            _ => {
                self.clear_children();
                if !content.is_empty() {
                    self.append_child(&Node::text(content));
                }
            }
        }
    }

    /// Serialized markup of this node and its descendants
    pub fn outer_html(&self) -> String {
        html::serialize(self)
    }

    // ==================== Events ====================

    /// Register a listener for events of type `kind`
    pub fn add_event_listener(&self, kind: &str, listener: impl Fn(&Event) + 'static) -> ListenerId {
        let id = ListenerId(self.0.next_listener.get());
        self.0.next_listener.set(id.0 + 1);
        self.0
            .listeners
            .borrow_mut()
            .push((id, kind.to_string(), Rc::new(listener)));
        id
    }

    /// Remove a listener, returning whether it was registered here
    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.0.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(lid, _, _)| *lid != id);
        listeners.len() != before
    }

    /// Number of listeners for `kind` on this node
    pub fn listener_count(&self, kind: &str) -> usize {
        self.0
            .listeners
            .borrow()
            .iter()
            .filter(|(_, k, _)| k == kind)
            .count()
    }

    /// Dispatch `event` on this node and bubble it to the root
    ///
    /// Returns `false` if a listener cancelled the default action.
    pub fn dispatch_event(&self, event: &Event) -> bool {
        event.set_target(self);
        let mut current = Some(self.clone());
        while let Some(node) = current {
            event.set_current_target(Some(&node));
            // Snapshot so listeners may add or remove listeners while running
            let listeners: Vec<Listener> = node
                .0
                .listeners
                .borrow()
                .iter()
                .filter(|(_, kind, _)| kind == event.kind())
                .map(|(_, _, l)| l.clone())
                .collect();
            for listener in listeners {
                listener(event);
            }
            if event.propagation_stopped() {
                break;
            }
            current = node.parent();
        }
        event.set_current_target(None);
        !event.default_prevented()
    }

    /// Dispatch a bare event of type `kind`
    pub fn dispatch(&self, kind: &str) -> bool {
        self.dispatch_event(&Event::new(kind))
    }

    /// Simulate a click
    pub fn click(&self) -> bool {
        self.dispatch("click")
    }

    /// Simulate typing: set the value, then dispatch `input`
    pub fn input(&self, value: &str) -> bool {
        self.set_value(value);
        self.dispatch("input")
    }

    pub(crate) fn text_data(&self) -> Option<String> {
        match &self.0.kind {
            NodeKind::Text(text) => Some(text.borrow().clone()),
            _ => None,
        }
    }

    pub(crate) fn style_pairs(&self) -> Vec<(String, String)> {
        self.element_data()
            .map(|d| d.style.borrow().clone())
            .unwrap_or_default()
    }
}

/// Non-owning node handle
#[derive(Clone, Default)]
pub struct WeakNode(Weak<NodeInner>);

impl WeakNode {
    pub fn upgrade(&self) -> Option<Node> {
        self.0.upgrade().map(Node)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.kind {
            NodeKind::Document => write!(f, "#document"),
            NodeKind::Element(data) => write!(f, "<{}>", data.tag),
            NodeKind::Text(text) => write!(f, "{:?}", text.borrow()),
            NodeKind::Fragment => write!(f, "#fragment"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_moves_node() {
        let a = Node::element("div");
        let b = Node::element("div");
        let child = Node::element("span");

        a.append_child(&child);
        b.append_child(&child);

        assert_eq!(a.child_count(), 0);
        assert_eq!(b.child_count(), 1);
        assert!(child.parent().unwrap().ptr_eq(&b));
    }

    #[test]
    fn test_append_into_own_subtree_is_ignored() {
        let outer = Node::element("div");
        let inner = Node::element("span");
        outer.append_child(&inner);

        outer.append_child(&outer);
        inner.append_child(&outer);

        assert!(outer.parent().is_none());
        assert!(inner.parent().unwrap().ptr_eq(&outer));
        assert_eq!(inner.child_count(), 0);
        assert_eq!(outer.outer_html(), "<div><span></span></div>");
    }

    #[test]
    fn test_append_fragment_moves_children() {
        let fragment = Node::fragment();
        fragment.append_child(&Node::text("a"));
        fragment.append_child(&Node::text("b"));

        let host = Node::element("div");
        host.append_child(&fragment);

        assert_eq!(host.text_content(), "ab");
        assert_eq!(fragment.child_count(), 0);
        assert!(host.first_child().unwrap().parent().unwrap().ptr_eq(&host));
    }

    #[test]
    fn test_attributes_replace_in_place() {
        let el = Node::element("input");
        el.set_attribute("type", "text");
        el.set_attribute("name", "title");
        el.set_attribute("type", "radio");

        assert_eq!(
            el.attributes(),
            vec![
                ("type".to_string(), "radio".to_string()),
                ("name".to_string(), "title".to_string())
            ]
        );
        el.remove_attribute("type");
        assert!(!el.has_attribute("type"));
    }

    #[test]
    fn test_class_helpers() {
        let el = Node::element("span");
        el.set_attribute("class", "badge bg-green-100 text-green-800");
        el.remove_classes("bg-green-100 text-green-800");
        el.add_classes("bg-red-100 badge");
        assert_eq!(el.get_attribute("class").unwrap(), "badge bg-red-100");
        assert!(el.has_class("bg-red-100"));
    }

    #[test]
    fn test_closest_and_find() {
        let root = Node::element("div");
        let link = Node::element("a");
        link.set_attribute("data-link", "");
        let inner = Node::element("span");
        link.append_child(&inner);
        root.append_child(&link);

        let found = inner.closest(|n| n.has_attribute("data-link")).unwrap();
        assert!(found.ptr_eq(&link));
        assert!(root.closest(|n| n.has_attribute("data-link")).is_none());
        assert_eq!(root.find_by_tag("span").len(), 1);
    }

    #[test]
    fn test_event_bubbles_and_stops() {
        let outer = Node::element("div");
        let inner = Node::element("button");
        outer.append_child(&inner);

        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        outer.add_event_listener("click", move |e| {
            assert!(e.target().unwrap().tag_name() == Some("button"));
            l.borrow_mut().push("outer");
        });
        let l = log.clone();
        inner.add_event_listener("click", move |_| l.borrow_mut().push("inner"));

        inner.click();
        assert_eq!(*log.borrow(), vec!["inner", "outer"]);

        inner.add_event_listener("click", |e| e.stop_propagation());
        inner.click();
        assert_eq!(*log.borrow(), vec!["inner", "outer", "inner"]);
    }

    #[test]
    fn test_prevent_default_and_remove_listener() {
        let el = Node::element("a");
        let id = el.add_event_listener("click", |e| e.prevent_default());
        assert!(!el.click());
        assert!(el.remove_event_listener(id));
        assert!(!el.remove_event_listener(id));
        assert!(el.click());
    }

    #[test]
    fn test_weak_node_does_not_keep_alive() {
        let el = Node::element("div");
        let weak = el.downgrade();
        assert!(weak.upgrade().unwrap().ptr_eq(&el));
        drop(el);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_text_content() {
        let el = Node::element("p");
        el.append_child(&Node::text("Hello, "));
        el.append_child(&Node::text("world"));
        assert_eq!(el.text_content(), "Hello, world");

        el.set_text_content("42");
        assert_eq!(el.child_count(), 1);
        assert_eq!(el.text_content(), "42");
    }
}
