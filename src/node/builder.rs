//! Tree construction helpers.
//!
//! `h` is a pure data constructor. Tag names are not checked against any
//! vocabulary; the host decides what a tag means.

use super::types::{AbstractNode, AttributeValue, Attributes, Element, LeafValue};

/// Build an element node.
///
/// # Example
///
/// ```ignore
/// use spark_vdom::node::{h, text};
///
/// let node = h("div", [("class", "counter")], [text(0), h("button", [("id", "inc")], ["+"])]);
/// ```
pub fn h<K, V, C>(
    tag: impl Into<String>,
    attributes: impl IntoIterator<Item = (K, V)>,
    children: impl IntoIterator<Item = C>,
) -> AbstractNode
where
    K: Into<String>,
    V: Into<AttributeValue>,
    C: Into<AbstractNode>,
{
    let attributes: Attributes = attributes
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();
    let children = children.into_iter().map(Into::into).collect();
    AbstractNode::Element(Element::new(tag, attributes, children))
}

/// Build a text/number leaf.
pub fn text(value: impl Into<LeafValue>) -> AbstractNode {
    AbstractNode::Leaf(value.into())
}

/// Element with mixed attribute and child types.
///
/// ```ignore
/// use spark_vdom::{h, node::handler};
///
/// let view = h!("div", { "class" => "row" },
///     h!("span", {}, count),
///     h!("button", { "onclick" => handler(|_| {}) }, "+"),
/// );
/// ```
#[macro_export]
macro_rules! h {
    ($tag:expr) => {
        $crate::node::AbstractNode::Element($crate::node::Element::new(
            $tag,
            $crate::node::Attributes::new(),
            ::std::vec::Vec::new(),
        ))
    };
    ($tag:expr, { $($key:expr => $value:expr),* $(,)? } $(, $child:expr)* $(,)?) => {{
        #[allow(unused_mut)]
        let mut attributes = $crate::node::Attributes::new();
        $(
            attributes.insert(
                ::std::string::String::from($key),
                $crate::node::AttributeValue::from($value),
            );
        )*
        let children: ::std::vec::Vec<$crate::node::AbstractNode> =
            ::std::vec![$($crate::node::AbstractNode::from($child)),*];
        $crate::node::AbstractNode::Element($crate::node::Element::new($tag, attributes, children))
    }};
}
