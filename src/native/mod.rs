//! Native Tree Adapter - The host rendering target seen by the core.
//!
//! The core never manipulates a host tree directly. Everything goes through
//! the [`NativeTree`] capability surface plus [`materialize`], which turns an
//! abstract subtree into fresh native nodes.
//!
//! [`MemoryTree`] is an arena-backed host used by the terminal host, the
//! demos and the tests.

mod memory;

pub use memory::{Listener, MemoryTree, Mutation, NativeData, NodeId};

use tracing::trace;

use crate::node::{is_event_attribute, AbstractNode, AttributeValue, EventHandler};

/// Capability surface of a host rendering target.
///
/// All operations are atomic and synchronous. Passing a handle that does not
/// belong to the tree is a programming error and may panic.
pub trait NativeTree {
    /// Handle to one native node.
    type Node: Copy + Eq + std::fmt::Debug;

    /// Resolve a mount lookup key to a container node.
    fn lookup(&self, key: &str) -> Option<Self::Node>;

    fn create_element(&mut self, tag: &str) -> Self::Node;
    fn create_text(&mut self, text: &str) -> Self::Node;

    fn set_attribute(&mut self, node: Self::Node, name: &str, value: &str);
    fn remove_attribute(&mut self, node: Self::Node, name: &str);

    /// Set the value property of a value-bearing node.
    fn set_value(&mut self, node: Self::Node, value: &str);

    /// Register `handler` for the event attribute `attribute` as written
    /// (`onClick`). Adapters derive the native event with
    /// [`event_name`](crate::node::event_name).
    fn add_listener(&mut self, node: Self::Node, attribute: &str, handler: EventHandler);
    fn remove_listener(&mut self, node: Self::Node, attribute: &str);

    fn append_child(&mut self, parent: Self::Node, child: Self::Node);
    fn remove_child(&mut self, parent: Self::Node, child: Self::Node);
    /// Put `new` where `old` currently is.
    fn replace_child(&mut self, parent: Self::Node, new: Self::Node, old: Self::Node);

    fn child_at(&self, parent: Self::Node, index: usize) -> Option<Self::Node>;
}

/// Build a native subtree for `node`.
///
/// Plain attributes become native attributes, event attributes become
/// listeners, leaves become text nodes holding the value's string form.
pub fn materialize<T: NativeTree + ?Sized>(tree: &mut T, node: &AbstractNode) -> T::Node {
    match node {
        AbstractNode::Leaf(value) => tree.create_text(&value.to_string()),
        AbstractNode::Element(el) => {
            let native = tree.create_element(el.tag());
            for (name, value) in el.attributes() {
                match value {
                    AttributeValue::Handler(handler) if is_event_attribute(name) => {
                        tree.add_listener(native, name, handler.clone());
                    }
                    AttributeValue::Text(text) => tree.set_attribute(native, name, text),
                    AttributeValue::Handler(_) => {
                        trace!(attribute = %name, "handler without event prefix ignored");
                    }
                }
            }
            for child in el.children() {
                let child_native = materialize(tree, child);
                tree.append_child(native, child_native);
            }
            native
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
