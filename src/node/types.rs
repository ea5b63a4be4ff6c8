//! Node types - The abstract UI tree.
//!
//! An [`AbstractNode`] is an immutable description of one tree position.
//! A fresh tree is produced for every render pass; nodes are never mutated
//! in place, so the previous tree stays a faithful record of what the
//! native tree currently shows.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

// =============================================================================
// Attribute Name Conventions
// =============================================================================

/// Attribute names starting with this prefix denote event handlers.
pub const EVENT_PREFIX: &str = "on";

/// Attribute mirrored onto the native value property of form-like nodes.
pub const VALUE_ATTRIBUTE: &str = "value";

/// Check whether an attribute name is an event name (`onclick`, `oninput`, ...).
pub fn is_event_attribute(name: &str) -> bool {
    name.len() > EVENT_PREFIX.len() && name.starts_with(EVENT_PREFIX)
}

/// Native event name for an event attribute: `onClick` -> `click`.
pub fn event_name(attribute: &str) -> String {
    attribute
        .strip_prefix(EVENT_PREFIX)
        .unwrap_or(attribute)
        .to_ascii_lowercase()
}

// =============================================================================
// Events
// =============================================================================

/// Event delivered to a handler by the host.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Event {
    /// Native event name (e.g. "click", "keydown")
    pub name: String,
    /// Optional payload (key text, input value)
    pub value: Option<String>,
}

impl Event {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }
}

/// Opaque user callback registered as an event listener.
///
/// Rc so the same handler can live in the abstract tree and in the native
/// tree at once. Hosts clone it out before calling, which keeps the native
/// tree unborrowed while the handler dispatches actions.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&Event)>);

impl EventHandler {
    pub fn new(f: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invoke the handler.
    pub fn call(&self, event: &Event) {
        (self.0)(event)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EventHandler")
    }
}

/// Shorthand for [`EventHandler::new`].
pub fn handler(f: impl Fn(&Event) + 'static) -> EventHandler {
    EventHandler::new(f)
}

// =============================================================================
// Attribute Values
// =============================================================================

/// Value of one element attribute.
#[derive(Clone, Debug)]
pub enum AttributeValue {
    /// Plain attribute, set on the native node as a string.
    Text(String),
    /// Event handler, registered as a native listener.
    Handler(EventHandler),
}

impl AttributeValue {
    /// String form, `None` for handlers.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            AttributeValue::Handler(_) => None,
        }
    }

    pub fn as_handler(&self) -> Option<&EventHandler> {
        match self {
            AttributeValue::Handler(h) => Some(h),
            AttributeValue::Text(_) => None,
        }
    }
}

/// Handlers compare by presence only: closures are rebuilt on every render,
/// so two handlers at the same name never count as a change.
impl PartialEq for AttributeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AttributeValue::Text(a), AttributeValue::Text(b)) => a == b,
            (AttributeValue::Handler(_), AttributeValue::Handler(_)) => true,
            _ => false,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<&String> for AttributeValue {
    fn from(value: &String) -> Self {
        AttributeValue::Text(value.clone())
    }
}

impl From<EventHandler> for AttributeValue {
    fn from(value: EventHandler) -> Self {
        AttributeValue::Handler(value)
    }
}

/// Attribute mapping. Ordered, so equality is independent of insertion order.
pub type Attributes = BTreeMap<String, AttributeValue>;

// =============================================================================
// Leaf Values
// =============================================================================

/// Content of a text leaf.
///
/// Equality follows the rendered form: numbers that display the same are
/// equal (`NaN == NaN`) and numbers that display differently are not
/// (`-0 != 0`).
#[derive(Clone, Debug)]
pub enum LeafValue {
    Text(String),
    Number(f64),
}

impl PartialEq for LeafValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (LeafValue::Text(a), LeafValue::Text(b)) => a == b,
            (LeafValue::Number(a), LeafValue::Number(b)) => {
                (a.is_nan() && b.is_nan())
                    || (a == b && a.is_sign_negative() == b.is_sign_negative())
            }
            _ => false,
        }
    }
}

impl LeafValue {
    /// True when both values share the same primitive type.
    pub fn same_kind(&self, other: &LeafValue) -> bool {
        matches!(
            (self, other),
            (LeafValue::Text(_), LeafValue::Text(_)) | (LeafValue::Number(_), LeafValue::Number(_))
        )
    }
}

impl fmt::Display for LeafValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeafValue::Text(s) => f.write_str(s),
            LeafValue::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for LeafValue {
    fn from(value: &str) -> Self {
        LeafValue::Text(value.to_string())
    }
}

impl From<String> for LeafValue {
    fn from(value: String) -> Self {
        LeafValue::Text(value)
    }
}

// 64-bit integers above 2^53 round to the nearest representable f64.
macro_rules! number_leaf {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for LeafValue {
                fn from(value: $ty) -> Self {
                    LeafValue::Number(value as f64)
                }
            }
        )*
    };
}

number_leaf!(i32, i64, u32, u64, usize, f32, f64);

// =============================================================================
// Abstract Node
// =============================================================================

/// Element payload: tag, attributes and ordered children.
///
/// Fields are private; an element is fixed once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    tag: String,
    attributes: Attributes,
    children: Vec<AbstractNode>,
}

impl Element {
    pub fn new(
        tag: impl Into<String>,
        attributes: Attributes,
        children: Vec<AbstractNode>,
    ) -> Self {
        Self {
            tag: tag.into(),
            attributes,
            children,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// The `"value"` attribute as a string, if present.
    pub fn value(&self) -> Option<&str> {
        self.attributes.get(VALUE_ATTRIBUTE).and_then(AttributeValue::as_text)
    }

    pub fn children(&self) -> &[AbstractNode] {
        &self.children
    }
}

/// One position in the abstract UI tree.
#[derive(Clone, Debug, PartialEq)]
pub enum AbstractNode {
    Element(Element),
    Leaf(LeafValue),
}

impl AbstractNode {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            AbstractNode::Element(el) => Some(el),
            AbstractNode::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafValue> {
        match self {
            AbstractNode::Leaf(v) => Some(v),
            AbstractNode::Element(_) => None,
        }
    }

    /// Children of an element, empty for leaves.
    pub fn children(&self) -> &[AbstractNode] {
        match self {
            AbstractNode::Element(el) => el.children(),
            AbstractNode::Leaf(_) => &[],
        }
    }
}

impl From<Element> for AbstractNode {
    fn from(value: Element) -> Self {
        AbstractNode::Element(value)
    }
}

impl From<LeafValue> for AbstractNode {
    fn from(value: LeafValue) -> Self {
        AbstractNode::Leaf(value)
    }
}

macro_rules! leaf_node {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for AbstractNode {
                fn from(value: $ty) -> Self {
                    AbstractNode::Leaf(LeafValue::from(value))
                }
            }
        )*
    };
}

leaf_node!(&str, String, i32, i64, u32, u64, usize, f32, f64);

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_attribute_names() {
        assert!(is_event_attribute("onclick"));
        assert!(is_event_attribute("onInput"));
        assert!(!is_event_attribute("on"));
        assert!(!is_event_attribute("class"));
        assert!(!is_event_attribute("value"));

        assert_eq!(event_name("onclick"), "click");
        assert_eq!(event_name("onKeyDown"), "keydown");
    }

    #[test]
    fn test_handlers_compare_by_presence() {
        let a = AttributeValue::from(handler(|_| {}));
        let b = AttributeValue::from(handler(|_| {}));
        assert_eq!(a, b);
        assert_ne!(a, AttributeValue::from("x"));
        assert_eq!(AttributeValue::from("x"), AttributeValue::from("x".to_string()));
    }

    #[test]
    fn test_leaf_display() {
        assert_eq!(LeafValue::from(1).to_string(), "1");
        assert_eq!(LeafValue::from(1.5).to_string(), "1.5");
        assert_eq!(LeafValue::from("hi").to_string(), "hi");
    }

    #[test]
    fn test_number_leaves_compare_by_rendered_form() {
        assert_eq!(LeafValue::from(f64::NAN), LeafValue::from(f64::NAN));
        assert_ne!(LeafValue::from(-0.0), LeafValue::from(0.0));
        assert_eq!(LeafValue::from(-0.0).to_string(), "-0");
        assert_eq!(LeafValue::from(0.0), LeafValue::from(0));
        assert_ne!(LeafValue::from(1), LeafValue::from("1"));
    }

    #[test]
    fn test_leaf_kinds() {
        assert!(LeafValue::from(1).same_kind(&LeafValue::from(2.0)));
        assert!(!LeafValue::from(1).same_kind(&LeafValue::from("1")));
    }

    #[test]
    fn test_element_value() {
        let mut attrs = Attributes::new();
        attrs.insert("value".into(), "abc".into());
        attrs.insert("oninput".into(), handler(|_| {}).into());
        let el = Element::new("input", attrs, vec![]);
        assert_eq!(el.value(), Some("abc"));
        assert!(el.attribute("oninput").and_then(AttributeValue::as_handler).is_some());

        let plain = Element::new("input", Attributes::new(), vec![]);
        assert_eq!(plain.value(), None);
    }

    #[test]
    fn test_handler_call() {
        use std::cell::Cell;
        let hits = Rc::new(Cell::new(0));
        let hits_clone = hits.clone();
        let h = handler(move |event| {
            assert_eq!(event.name, "click");
            hits_clone.set(hits_clone.get() + 1);
        });
        h.call(&Event::new("click"));
        h.clone().call(&Event::new("click"));
        assert_eq!(hits.get(), 2);
    }
}
