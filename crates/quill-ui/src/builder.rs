//! Element builder
//!
//! [`h`] turns a tag, a [`Props`] value and a child list straight into
//! document nodes. There is no intermediate tree: component functions run
//! immediately and their nodes are returned as-is.
//!
//! ## Usage
//!
//! ```ignore
//! let button = h(
//!     "button",
//!     Props::new().class("btn").on("click", |_| save()),
//!     children!["Save"],
//! );
//! ```
//!
//! Property keys are applied in a fixed order: class, style, default
//! value, default checked, event handlers, then plain attributes. Boolean
//! attributes are present with an empty value when `true` and absent when
//! `false`. Null attributes are skipped.

use std::fmt;
use std::rc::Rc;

use tracing::{trace, warn};

use crate::dom::{Event, Namespace, Node};

/// Tags created in the SVG namespace
const SVG_TAGS: &[&str] = &[
    "svg",
    "path",
    "circle",
    "ellipse",
    "rect",
    "line",
    "polyline",
    "polygon",
    "g",
    "defs",
    "use",
    "symbol",
    "clipPath",
    "mask",
    "linearGradient",
    "radialGradient",
    "stop",
    "tspan",
];

/// Event handler attached by the builder
pub type Handler = Rc<dyn Fn(&Event)>;

// ==================== Tags ====================

/// What [`h`] should build
#[derive(Clone)]
pub enum Tag {
    /// A platform element by name
    Element(String),
    /// A component function, called with the props and children
    Component(Component),
    /// Groups children without a root node of its own
    Fragment,
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        Tag::Element(name.to_string())
    }
}

impl From<String> for Tag {
    fn from(name: String) -> Self {
        Tag::Element(name)
    }
}

impl From<Component> for Tag {
    fn from(component: Component) -> Self {
        Tag::Component(component)
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Element(name) => write!(f, "<{}>", name),
            Tag::Component(_) => write!(f, "<Component>"),
            Tag::Fragment => write!(f, "<Fragment>"),
        }
    }
}

/// A component function
#[derive(Clone)]
pub struct Component(Rc<dyn Fn(ComponentProps) -> Node>);

impl Component {
    pub fn new(render: impl Fn(ComponentProps) -> Node + 'static) -> Self {
        Component(Rc::new(render))
    }

    pub fn render(&self, props: ComponentProps) -> Node {
        (self.0)(props)
    }
}

/// Arguments a component is called with
pub struct ComponentProps {
    pub props: Props,
    pub children: Children,
}

/// Children passed to a component: nothing, one child, or a list
pub enum Children {
    None,
    Single(Child),
    Many(Vec<Child>),
}

impl Children {
    fn from_vec(mut children: Vec<Child>) -> Self {
        match children.len() {
            0 => Children::None,
            1 => Children::Single(children.remove(0)),
            _ => Children::Many(children),
        }
    }

    pub fn into_vec(self) -> Vec<Child> {
        match self {
            Children::None => Vec::new(),
            Children::Single(child) => vec![child],
            Children::Many(children) => children,
        }
    }
}

// ==================== Props ====================

/// Value of a plain attribute
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Bool(bool),
    Text(String),
    Number(f64),
    Null,
}

impl AttrValue {
    /// Attribute text, `None` when the attribute should be omitted
    pub fn render(&self) -> Option<String> {
        match self {
            AttrValue::Bool(true) => Some(String::new()),
            AttrValue::Bool(false) | AttrValue::Null => None,
            AttrValue::Text(text) => Some(text.clone()),
            AttrValue::Number(n) => Some(format_number(*n)),
        }
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Text(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Text(v)
    }
}

impl From<&String> for AttrValue {
    fn from(v: &String) -> Self {
        AttrValue::Text(v.clone())
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Number(v)
    }
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        AttrValue::Number(v.into())
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Text(v.to_string())
    }
}

impl From<usize> for AttrValue {
    fn from(v: usize) -> Self {
        AttrValue::Text(v.to_string())
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(AttrValue::Null)
    }
}

/// Properties for one element
///
/// Each recognised key has its own field. Setting the same key twice keeps
/// the last value.
#[derive(Clone, Default)]
pub struct Props {
    class: Option<String>,
    style: Vec<(String, String)>,
    default_value: Option<String>,
    default_checked: Option<bool>,
    handlers: Vec<(String, Handler)>,
    attributes: Vec<(String, AttrValue)>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `class` attribute, exactly as written
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// One inline style property, merged onto the element's style
    pub fn style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        let property = property.into();
        let value = value.into();
        match self.style.iter_mut().find(|(p, _)| *p == property) {
            Some(slot) => slot.1 = value,
            None => self.style.push((property, value)),
        }
        self
    }

    /// Initial value of a text control; not kept in sync afterwards
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Initial checked state of a checkbox or radio button
    pub fn default_checked(mut self, checked: bool) -> Self {
        self.default_checked = Some(checked);
        self
    }

    /// Listen for the native event `event` (e.g. "click")
    pub fn on(mut self, event: &str, handler: impl Fn(&Event) + 'static) -> Self {
        self.set_handler(event.to_string(), Rc::new(handler));
        self
    }

    /// Attach an already shared handler
    pub fn on_handler(mut self, event: &str, handler: Handler) -> Self {
        self.set_handler(event.to_string(), handler);
        self
    }

    /// Listen using a prefixed key such as `onClick` or `onInput`
    ///
    /// The event is the lowercased remainder of the key. A key that does
    /// not follow the convention is ignored.
    pub fn on_prop(mut self, key: &str, handler: impl Fn(&Event) + 'static) -> Self {
        match handler_event_name(key) {
            Some(event) => self.set_handler(event, Rc::new(handler)),
            None => warn!("Ignoring handler prop '{}': expected on<Event>", key),
        }
        self
    }

    /// A plain attribute
    ///
    /// `class` is routed to [`Props::class`] so it follows the same rule.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        let name = name.into();
        let value = value.into();
        if name == "class" {
            if let Some(class) = value.render() {
                self.class = Some(class);
            }
            return self;
        }
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
        self
    }

    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id.into())
    }

    /// Handler registered for `event`
    pub fn handler(&self, event: &str) -> Option<Handler> {
        self.handlers
            .iter()
            .find(|(e, _)| e == event)
            .map(|(_, h)| h.clone())
    }

    /// Plain attribute value
    pub fn get_attr(&self, name: &str) -> Option<&AttrValue> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn get_class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.class.is_none()
            && self.style.is_empty()
            && self.default_value.is_none()
            && self.default_checked.is_none()
            && self.handlers.is_empty()
            && self.attributes.is_empty()
    }

    fn set_handler(&mut self, event: String, handler: Handler) {
        match self.handlers.iter_mut().find(|(e, _)| *e == event) {
            Some(slot) => slot.1 = handler,
            None => self.handlers.push((event, handler)),
        }
    }

    fn apply(self, element: &Node) {
        if let Some(class) = self.class {
            element.set_attribute("class", &class);
        }
        for (property, value) in &self.style {
            element.set_style(property, value);
        }
        if let Some(value) = self.default_value {
            element.set_value(&value);
        }
        if let Some(checked) = self.default_checked {
            element.set_checked(checked);
        }
        for (event, handler) in self.handlers {
            element.add_event_listener(&event, move |e| handler(e));
        }
        for (name, value) in self.attributes {
            if let Some(text) = value.render() {
                element.set_attribute(&name, &text);
            }
        }
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers: Vec<&str> = self.handlers.iter().map(|(e, _)| e.as_str()).collect();
        f.debug_struct("Props")
            .field("class", &self.class)
            .field("style", &self.style)
            .field("default_value", &self.default_value)
            .field("default_checked", &self.default_checked)
            .field("handlers", &handlers)
            .field("attributes", &self.attributes)
            .finish()
    }
}

/// `onClick` -> `click`
fn handler_event_name(key: &str) -> Option<String> {
    let rest = key.strip_prefix("on")?;
    let first = rest.chars().next()?;
    if !first.is_ascii_uppercase() {
        return None;
    }
    Some(rest.to_ascii_lowercase())
}

/// Number text the way script engines print it
fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let magnitude = n.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        // 1e21 -> 1e+21, 1e-7 stays as is
        let exp = format!("{:e}", n);
        return match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => {
                format!("{}e+{}", mantissa, power)
            }
            _ => exp,
        };
    }
    n.to_string()
}

// ==================== Children ====================

/// One entry of a child list
#[derive(Clone)]
pub enum Child {
    Node(Node),
    Text(String),
    /// Dropped, so conditions can be written inline
    Bool(bool),
    /// Dropped
    Null,
    /// Flattened into the surrounding list
    List(Vec<Child>),
}

impl Child {
    /// Whether this child produces a node (after flattening)
    pub fn is_renderable(&self) -> bool {
        matches!(self, Child::Node(_) | Child::Text(_))
    }
}

impl fmt::Debug for Child {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Child::Node(node) => write!(f, "{:?}", node),
            Child::Text(text) => write!(f, "{:?}", text),
            Child::Bool(b) => write!(f, "{}", b),
            Child::Null => write!(f, "null"),
            Child::List(list) => f.debug_list().entries(list).finish(),
        }
    }
}

impl PartialEq for Child {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Child::Node(a), Child::Node(b)) => a.ptr_eq(b),
            (Child::Text(a), Child::Text(b)) => a == b,
            (Child::Bool(a), Child::Bool(b)) => a == b,
            (Child::Null, Child::Null) => true,
            (Child::List(a), Child::List(b)) => a == b,
            _ => false,
        }
    }
}

impl From<Node> for Child {
    fn from(node: Node) -> Self {
        Child::Node(node)
    }
}

impl From<&Node> for Child {
    fn from(node: &Node) -> Self {
        Child::Node(node.clone())
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(text.to_string())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}

impl From<&String> for Child {
    fn from(text: &String) -> Self {
        Child::Text(text.clone())
    }
}

impl From<bool> for Child {
    fn from(b: bool) -> Self {
        Child::Bool(b)
    }
}

impl From<()> for Child {
    fn from(_: ()) -> Self {
        Child::Null
    }
}

impl From<f64> for Child {
    fn from(n: f64) -> Self {
        Child::Text(format_number(n))
    }
}

macro_rules! child_from_integer {
    ($($t:ty),*) => {
        $(impl From<$t> for Child {
            fn from(n: $t) -> Self {
                Child::Text(n.to_string())
            }
        })*
    };
}

child_from_integer!(i32, i64, u32, u64, usize);

impl<T: Into<Child>> From<Option<T>> for Child {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Child::Null)
    }
}

impl<T: Into<Child>> From<Vec<T>> for Child {
    fn from(list: Vec<T>) -> Self {
        Child::List(list.into_iter().map(Into::into).collect())
    }
}

/// Build a child list from heterogeneous values
#[macro_export]
macro_rules! children {
    () => { ::std::vec::Vec::<$crate::builder::Child>::new() };
    ($($child:expr),+ $(,)?) => {
        ::std::vec![$($crate::builder::Child::from($child)),+]
    };
}

/// Flatten nested lists and drop booleans and nulls
pub fn flatten(children: impl IntoIterator<Item = Child>) -> Vec<Child> {
    let mut out = Vec::new();
    flatten_into(children, &mut out);
    out
}

fn flatten_into(children: impl IntoIterator<Item = Child>, out: &mut Vec<Child>) {
    for child in children {
        match child {
            Child::List(list) => flatten_into(list, out),
            Child::Bool(_) | Child::Null => {}
            leaf => out.push(leaf),
        }
    }
}

fn append_children(parent: &Node, children: Vec<Child>) {
    for child in flatten(children) {
        match child {
            Child::Node(node) => parent.append_child(&node),
            Child::Text(text) => parent.append_child(&Node::text(text)),
            Child::Bool(_) | Child::Null | Child::List(_) => {}
        }
    }
}

// ==================== Build ====================

/// Build nodes for `tag`
pub fn h(tag: impl Into<Tag>, props: Props, children: Vec<Child>) -> Node {
    match tag.into() {
        Tag::Component(component) => component.render(ComponentProps {
            props,
            children: Children::from_vec(children),
        }),
        Tag::Fragment => {
            if !props.is_empty() {
                trace!("Ignoring props on fragment");
            }
            let fragment = Node::fragment();
            append_children(&fragment, children);
            fragment
        }
        Tag::Element(name) => {
            let element = if SVG_TAGS.contains(&name.as_str()) {
                Node::element_ns(Namespace::Svg, &name)
            } else {
                Node::element(&name)
            };
            props.apply(&element);
            append_children(&element, children);
            element
        }
    }
}

/// Build a fragment
pub fn fragment(children: Vec<Child>) -> Node {
    h(Tag::Fragment, Props::new(), children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn texts(children: Vec<Child>) -> Vec<String> {
        flatten(children)
            .into_iter()
            .map(|c| match c {
                Child::Text(t) => t,
                other => format!("{:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_flatten_is_associative() {
        let flat = texts(children!["a", "b", "c", "d"]);
        let left = texts(children![vec![vec!["a", "b"], vec!["c"]], "d"]);
        let right = texts(children!["a", vec![Child::from("b"), Child::from(vec!["c", "d"])]]);
        let deep = texts(children![vec![vec![vec![vec!["a"]]]], "b", vec!["c", "d"]]);

        assert_eq!(flat, vec!["a", "b", "c", "d"]);
        assert_eq!(left, flat);
        assert_eq!(right, flat);
        assert_eq!(deep, flat);
    }

    #[test]
    fn test_flatten_drops_booleans_and_nulls() {
        let show = false;
        let out = flatten(children![
            "x",
            true,
            false,
            (),
            None::<&str>,
            show.then(|| "hidden"),
            Some("y"),
            3,
        ]);
        assert_eq!(out, children!["x", "y", "3"]);
    }

    #[test]
    fn test_numbers_print_like_script_strings() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-1.5e22), "-1.5e+22");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn test_boolean_attributes() {
        let el = h(
            "input",
            Props::new()
                .attr("disabled", true)
                .attr("required", false)
                .attr("readonly", None::<bool>)
                .attr("maxlength", 10),
            children![],
        );

        assert_eq!(el.get_attribute("disabled").as_deref(), Some(""));
        assert!(!el.has_attribute("required"));
        assert!(!el.has_attribute("readonly"));
        assert_eq!(el.get_attribute("maxlength").as_deref(), Some("10"));
        assert!(el
            .attributes()
            .iter()
            .all(|(_, v)| v != "true" && v != "false"));
    }

    #[test]
    fn test_class_style_and_defaults() {
        let el = h(
            "textarea",
            Props::new()
                .attr("class", "ignored")
                .class("w-full font-mono")
                .style("color", "red")
                .style("color", "blue")
                .style("width", "10px")
                .default_value("draft"),
            children![],
        );

        assert_eq!(el.get_attribute("class").as_deref(), Some("w-full font-mono"));
        assert_eq!(el.style("color").as_deref(), Some("blue"));
        assert_eq!(el.style("width").as_deref(), Some("10px"));
        assert_eq!(el.value(), "draft");

        // Seeded once, no binding afterwards
        el.set_value("typed");
        assert_eq!(el.value(), "typed");

        let radio = h("input", Props::new().default_checked(true), children![]);
        assert!(radio.checked());
    }

    #[test]
    fn test_handlers_map_to_native_events() {
        let clicks = Rc::new(Cell::new(0));
        let c = clicks.clone();
        let c2 = clicks.clone();
        let el = h(
            "button",
            Props::new()
                .on_prop("onClick", move |_| c.set(c.get() + 1))
                .on_prop("onClick", move |_| c2.set(c2.get() + 10))
                .on_prop("onclick", |_| panic!("not a handler key"))
                .on_prop("click", |_| panic!("not a handler key")),
            children!["Go"],
        );

        assert_eq!(el.listener_count("click"), 1);
        el.click();
        assert_eq!(clicks.get(), 10);
    }

    #[test]
    fn test_svg_namespace() {
        let svg = h(
            "svg",
            Props::new().attr("viewBox", "0 0 24 24"),
            children![h("path", Props::new().attr("d", "M0 0"), children![])],
        );
        assert_eq!(svg.namespace(), Some(Namespace::Svg));
        assert_eq!(svg.first_child().unwrap().namespace(), Some(Namespace::Svg));
        assert_eq!(h("div", Props::new(), children![]).namespace(), Some(Namespace::Html));
    }

    #[test]
    fn test_fragment_has_no_root_attributes() {
        let host = Node::element("div");
        let frag = h(Tag::Fragment, Props::new().class("nope"), children!["a", vec!["b"]]);
        assert!(frag.is_fragment());
        host.append_child(&frag);
        assert_eq!(host.outer_html(), "<div>ab</div>");
    }

    #[test]
    fn test_component_receives_props_and_children() {
        let card = Component::new(|ComponentProps { props, children }| {
            let count = match &children {
                Children::None => 0,
                Children::Single(_) => 1,
                Children::Many(list) => list.len(),
            };
            h(
                "section",
                Props::new().class(props.get_class().unwrap_or_default().to_string()),
                children![format!("{} children", count), children.into_vec()],
            )
        });

        let single = h(card.clone(), Props::new().class("card"), children!["x"]);
        assert_eq!(single.outer_html(), r#"<section class="card">1 childrenx</section>"#);

        let none = h(card, Props::new(), children![]);
        assert_eq!(none.text_content(), "0 children");
    }

    #[test]
    fn test_existing_nodes_are_appended_in_order() {
        let a = Node::element("b");
        let out = h("p", Props::new(), children!["1", &a, 2.5, 2.0]);
        assert_eq!(out.outer_html(), "<p>1<b></b>2.52</p>");
    }
}
