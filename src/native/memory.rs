//! MemoryTree - Arena-backed native tree.
//!
//! Nodes live in a slot vector and are addressed by [`NodeId`]. Detached
//! subtrees are released back to a free pool so long-running apps don't grow
//! the arena on every replacement.
//!
//! Every mutation primitive is recorded in a log. Tests use it to assert
//! exactly which native operations a reconciliation pass issued. Long-running
//! hosts switch recording off with [`MemoryTree::set_recording`].

use std::collections::{BTreeMap, HashMap};

use crate::node::{
    event_name, AbstractNode, AttributeValue, Attributes, Element, EventHandler, LeafValue,
    VALUE_ATTRIBUTE,
};

use super::NativeTree;

/// Handle to a node in a [`MemoryTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A registered listener and the event attribute it came from.
#[derive(Clone, Debug)]
pub struct Listener {
    /// Event attribute as written in the abstract tree (`onClick`).
    pub attribute: String,
    pub handler: EventHandler,
}

/// Payload of one native node.
#[derive(Clone, Debug)]
pub enum NativeData {
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
        /// Value property, distinct from the `value` attribute.
        value: Option<String>,
        /// Keyed by native event name (`click`).
        listeners: BTreeMap<String, Listener>,
        children: Vec<NodeId>,
    },
    Text(String),
}

#[derive(Debug)]
struct Slot {
    data: NativeData,
    parent: Option<NodeId>,
}

/// One recorded native mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mutation {
    CreateElement { node: NodeId, tag: String },
    CreateText { node: NodeId, text: String },
    SetAttribute { node: NodeId, name: String, value: String },
    RemoveAttribute { node: NodeId, name: String },
    SetValue { node: NodeId, value: String },
    AddListener { node: NodeId, event: String },
    RemoveListener { node: NodeId, event: String },
    AppendChild { parent: NodeId, child: NodeId },
    RemoveChild { parent: NodeId, child: NodeId },
    ReplaceChild { parent: NodeId, new: NodeId, old: NodeId },
}

/// In-memory native tree.
#[derive(Debug)]
pub struct MemoryTree {
    slots: Vec<Option<Slot>>,
    free: Vec<usize>,
    containers: HashMap<String, NodeId>,
    log: Vec<Mutation>,
    recording: bool,
}

impl Default for MemoryTree {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            containers: HashMap::new(),
            log: Vec::new(),
            recording: true,
        }
    }
}

impl MemoryTree {
    /// Empty tree with mutation recording on.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tree with one registered container element (tag `div`) under `key`.
    pub fn with_container(key: &str) -> Self {
        let mut tree = Self::new();
        tree.add_container(key);
        tree
    }

    /// Register a new container element under a lookup key.
    ///
    /// Container creation is host setup and is not recorded in the log.
    pub fn add_container(&mut self, key: &str) -> NodeId {
        let id = self.alloc(NativeData::Element {
            tag: "div".to_string(),
            attributes: BTreeMap::from([("id".to_string(), key.to_string())]),
            value: None,
            listeners: BTreeMap::new(),
            children: Vec::new(),
        });
        self.containers.insert(key.to_string(), id);
        id
    }

    // -------------------------------------------------------------------------
    // Slot allocation
    // -------------------------------------------------------------------------

    fn alloc(&mut self, data: NativeData) -> NodeId {
        let slot = Some(Slot { data, parent: None });
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = slot;
                NodeId(index)
            }
            None => {
                self.slots.push(slot);
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Release a detached node and its whole subtree.
    fn release(&mut self, id: NodeId) {
        let Some(slot) = self.slots.get_mut(id.0).and_then(Option::take) else {
            return;
        };
        if let NativeData::Element { children, .. } = slot.data {
            for child in children {
                self.release(child);
            }
        }
        self.free.push(id.0);
    }

    fn slot(&self, id: NodeId) -> &Slot {
        match self.slots.get(id.0).and_then(Option::as_ref) {
            Some(slot) => slot,
            None => panic!("dangling native node {id:?}"),
        }
    }

    fn slot_mut(&mut self, id: NodeId) -> &mut Slot {
        match self.slots.get_mut(id.0).and_then(Option::as_mut) {
            Some(slot) => slot,
            None => panic!("dangling native node {id:?}"),
        }
    }

    fn children_mut(&mut self, id: NodeId) -> &mut Vec<NodeId> {
        match &mut self.slot_mut(id).data {
            NativeData::Element { children, .. } => children,
            NativeData::Text(_) => panic!("text node {id:?} cannot have children"),
        }
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    /// Whether `id` refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        matches!(self.slots.get(id.0), Some(Some(_)))
    }

    pub fn data(&self, id: NodeId) -> Option<&NativeData> {
        self.slots.get(id.0).and_then(Option::as_ref).map(|s| &s.data)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots.get(id.0).and_then(Option::as_ref).and_then(|s| s.parent)
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.data(id)? {
            NativeData::Element { tag, .. } => Some(tag.as_str()),
            NativeData::Text(_) => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.data(id)? {
            NativeData::Text(text) => Some(text.as_str()),
            NativeData::Element { .. } => None,
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.data(id)? {
            NativeData::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            NativeData::Text(_) => None,
        }
    }

    /// Current value property, falling back to the `value` attribute.
    pub fn value(&self, id: NodeId) -> Option<&str> {
        match self.data(id)? {
            NativeData::Element { value: Some(value), .. } => Some(value.as_str()),
            NativeData::Element { attributes, .. } => {
                attributes.get(VALUE_ATTRIBUTE).map(String::as_str)
            }
            NativeData::Text(_) => None,
        }
    }

    /// Registered listener, cloned out so callers can fire it unborrowed.
    pub fn listener(&self, id: NodeId, event: &str) -> Option<EventHandler> {
        match self.data(id)? {
            NativeData::Element { listeners, .. } => {
                listeners.get(event).map(|l| l.handler.clone())
            }
            NativeData::Text(_) => None,
        }
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.data(id) {
            Some(NativeData::Element { children, .. }) => children,
            _ => &[],
        }
    }

    /// Concatenated text of every text node under `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.data(id) {
            Some(NativeData::Text(text)) => out.push_str(text),
            Some(NativeData::Element { children, .. }) => {
                for &child in children {
                    self.collect_text(child, out);
                }
            }
            None => {}
        }
    }

    /// Nodes under `root` (inclusive) listening for `event`, in document order.
    pub fn listening(&self, root: NodeId, event: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.collect_listening(root, event, &mut found);
        found
    }

    fn collect_listening(&self, id: NodeId, event: &str, found: &mut Vec<NodeId>) {
        if let Some(NativeData::Element { listeners, children, .. }) = self.data(id) {
            if listeners.contains_key(event) {
                found.push(id);
            }
            for &child in children {
                self.collect_listening(child, event, found);
            }
        }
    }

    /// Reconstruct the abstract structure of a native subtree.
    ///
    /// Text nodes read back as text leaves. The value property, when set,
    /// reads back as the `value` attribute; listeners read back as handler
    /// attributes under the name they were registered with.
    pub fn read_back(&self, id: NodeId) -> Option<AbstractNode> {
        match self.data(id)? {
            NativeData::Text(text) => Some(AbstractNode::Leaf(LeafValue::Text(text.clone()))),
            NativeData::Element {
                tag,
                attributes,
                value,
                listeners,
                children,
            } => {
                let mut attrs: Attributes = attributes
                    .iter()
                    .map(|(k, v)| (k.clone(), AttributeValue::Text(v.clone())))
                    .collect();
                if let Some(value) = value {
                    attrs.insert(VALUE_ATTRIBUTE.to_string(), AttributeValue::Text(value.clone()));
                }
                for listener in listeners.values() {
                    attrs.insert(
                        listener.attribute.clone(),
                        AttributeValue::Handler(listener.handler.clone()),
                    );
                }
                let children = children
                    .iter()
                    .map(|&child| self.read_back(child))
                    .collect::<Option<Vec<_>>>()?;
                Some(AbstractNode::Element(Element::new(tag.clone(), attrs, children)))
            }
        }
    }

    // -------------------------------------------------------------------------
    // Mutation log
    // -------------------------------------------------------------------------

    /// Turn the mutation log on or off. Turning it off drops what was logged.
    pub fn set_recording(&mut self, on: bool) {
        self.recording = on;
        if !on {
            self.log = Vec::new();
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    fn record(&mut self, mutation: impl FnOnce() -> Mutation) {
        if self.recording {
            self.log.push(mutation());
        }
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.log
    }

    pub fn mutation_count(&self) -> usize {
        self.log.len()
    }

    /// Drain the log.
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.log)
    }

    fn detach(&mut self, parent: NodeId, child: NodeId) -> usize {
        let children = self.children_mut(parent);
        let Some(position) = children.iter().position(|&c| c == child) else {
            panic!("{child:?} is not a child of {parent:?}");
        };
        children.remove(position);
        position
    }
}

impl NativeTree for MemoryTree {
    type Node = NodeId;

    fn lookup(&self, key: &str) -> Option<NodeId> {
        self.containers.get(key).copied().filter(|&id| self.contains(id))
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        let node = self.alloc(NativeData::Element {
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
            value: None,
            listeners: BTreeMap::new(),
            children: Vec::new(),
        });
        self.record(|| Mutation::CreateElement { node, tag: tag.to_string() });
        node
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        let node = self.alloc(NativeData::Text(text.to_string()));
        self.record(|| Mutation::CreateText { node, text: text.to_string() });
        node
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let NativeData::Element { attributes, .. } = &mut self.slot_mut(node).data {
            attributes.insert(name.to_string(), value.to_string());
        }
        self.record(|| Mutation::SetAttribute {
            node,
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let NativeData::Element { attributes, .. } = &mut self.slot_mut(node).data {
            attributes.remove(name);
        }
        self.record(|| Mutation::RemoveAttribute { node, name: name.to_string() });
    }

    fn set_value(&mut self, node: NodeId, new_value: &str) {
        if let NativeData::Element { value, .. } = &mut self.slot_mut(node).data {
            *value = Some(new_value.to_string());
        }
        self.record(|| Mutation::SetValue { node, value: new_value.to_string() });
    }

    fn add_listener(&mut self, node: NodeId, attribute: &str, handler: EventHandler) {
        let event = event_name(attribute);
        if let NativeData::Element { listeners, .. } = &mut self.slot_mut(node).data {
            let listener = Listener {
                attribute: attribute.to_string(),
                handler,
            };
            listeners.insert(event.clone(), listener);
        }
        self.record(|| Mutation::AddListener { node, event });
    }

    fn remove_listener(&mut self, node: NodeId, attribute: &str) {
        let event = event_name(attribute);
        if let NativeData::Element { listeners, .. } = &mut self.slot_mut(node).data {
            listeners.remove(&event);
        }
        self.record(|| Mutation::RemoveListener { node, event });
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(old_parent) = self.slot(child).parent {
            self.detach(old_parent, child);
        }
        self.children_mut(parent).push(child);
        self.slot_mut(child).parent = Some(parent);
        self.record(|| Mutation::AppendChild { parent, child });
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(parent, child);
        self.release(child);
        self.record(|| Mutation::RemoveChild { parent, child });
    }

    fn replace_child(&mut self, parent: NodeId, new: NodeId, old: NodeId) {
        let position = self.detach(parent, old);
        self.children_mut(parent).insert(position, new);
        self.slot_mut(new).parent = Some(parent);
        self.release(old);
        self.record(|| Mutation::ReplaceChild { parent, new, old });
    }

    fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.children(parent).get(index).copied()
    }
}

// =============================================================================
// Tests
// =============================================================================
