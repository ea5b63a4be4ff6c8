//! Reconciler - Positional tree synchronization.
//!
//! Walks an old and a new abstract tree in lockstep and applies the minimal
//! native mutation for each [`ChangeKind`]:
//!
//! | Change | Native effect | Recurse |
//! |---|---|---|
//! | `TypeChanged`, `TextChanged`, `TagChanged` | materialize + replace | no |
//! | `ValueChanged` | set value property | no |
//! | `AttributesChanged` | remove/set plain attributes | yes |
//! | `None` | nothing | yes |
//!
//! Matching is strictly by position. There are no keys and no moves.
//! The reconciler keeps no state between calls.

use tracing::trace;

use crate::diff::{classify, ChangeKind};
use crate::native::{materialize, NativeTree};
use crate::node::{is_event_attribute, AbstractNode, AttributeValue, Element};

bitflags::bitflags! {
    /// Summary of the native mutations issued by one reconcile call.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Patched: u8 {
        const APPENDED = 1 << 0;
        const REMOVED = 1 << 1;
        const REPLACED = 1 << 2;
        const VALUE = 1 << 3;
        const ATTRIBUTES = 1 << 4;
    }
}

/// Reconcile the child of `parent` at `index`.
///
/// - `old` absent: materialize `new` and append it.
/// - `new` absent: remove the native child at `index`.
/// - both present: classify and patch, then recurse over children.
///
/// # Panics
///
/// Panics if `old` is present but `parent` has no native child at `index`,
/// which means the native tree no longer matches the previous tree.
pub fn reconcile<T: NativeTree + ?Sized>(
    tree: &mut T,
    parent: T::Node,
    old: Option<&AbstractNode>,
    new: Option<&AbstractNode>,
    index: usize,
) -> Patched {
    match (old, new) {
        (None, None) => Patched::empty(),
        (None, Some(new)) => {
            let native = materialize(tree, new);
            tree.append_child(parent, native);
            Patched::APPENDED
        }
        (Some(_), None) => {
            match tree.child_at(parent, index) {
                Some(native) => tree.remove_child(parent, native),
                None => panic!("no native child at index {index} to remove"),
            }
            Patched::REMOVED
        }
        (Some(old), Some(new)) => {
            let Some(native) = tree.child_at(parent, index) else {
                panic!("no native child at index {index} to patch");
            };
            patch(tree, parent, native, old, new)
        }
    }
}

fn patch<T: NativeTree + ?Sized>(
    tree: &mut T,
    parent: T::Node,
    native: T::Node,
    old: &AbstractNode,
    new: &AbstractNode,
) -> Patched {
    let kind = classify(Some(old), Some(new));

    // Replacement is authoritative: nothing else happens at this position.
    if kind.replaces_node() {
        trace!(?kind, ?native, "replacing node");
        let fresh = materialize(tree, new);
        tree.replace_child(parent, fresh, native);
        return Patched::REPLACED;
    }

    let (AbstractNode::Element(old_el), AbstractNode::Element(new_el)) = (old, new) else {
        // Equal leaves.
        return Patched::empty();
    };

    let mut patched = Patched::empty();
    match kind {
        ChangeKind::ValueChanged => {
            tree.set_value(native, new_el.value().unwrap_or_default());
            return Patched::VALUE;
        }
        ChangeKind::AttributesChanged => {
            update_attributes(tree, native, old_el, new_el);
            patched |= Patched::ATTRIBUTES;
        }
        _ => {}
    }

    patched | reconcile_children(tree, native, old_el.children(), new_el.children())
}

/// Remove plain attributes that disappeared, then set every plain attribute
/// of the new mapping. Event attributes are left alone.
fn update_attributes<T: NativeTree + ?Sized>(
    tree: &mut T,
    native: T::Node,
    old: &Element,
    new: &Element,
) {
    for name in old.attributes().keys() {
        if is_event_attribute(name) || new.attributes().contains_key(name) {
            continue;
        }
        tree.remove_attribute(native, name);
    }
    for (name, value) in new.attributes() {
        if is_event_attribute(name) {
            continue;
        }
        if let AttributeValue::Text(text) = value {
            tree.set_attribute(native, name, text);
        }
    }
}

/// Positional child walk.
///
/// Shared and appended positions go front to back. Surplus old positions are
/// removed back to front so each removal index still points at its node.
fn reconcile_children<T: NativeTree + ?Sized>(
    tree: &mut T,
    native: T::Node,
    old: &[AbstractNode],
    new: &[AbstractNode],
) -> Patched {
    let mut patched = Patched::empty();
    for (i, new_child) in new.iter().enumerate() {
        patched |= reconcile(tree, native, old.get(i), Some(new_child), i);
    }
    for i in (new.len()..old.len()).rev() {
        patched |= reconcile(tree, native, old.get(i), None, i);
    }
    patched
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::h;
    use crate::native::{MemoryTree, Mutation};
    use crate::node::{handler, text};
    use pretty_assertions::assert_eq;

    /// Mount `old` under a fresh container and clear the log.
    fn mounted(old: &AbstractNode) -> (MemoryTree, crate::native::NodeId) {
        let mut tree = MemoryTree::with_container("app");
        let root = tree.lookup("app").unwrap();
        reconcile(&mut tree, root, None, Some(old), 0);
        tree.take_mutations();
        (tree, root)
    }

    fn sample() -> AbstractNode {
        h!("div", { "class" => "app" },
            h!("h1", {}, "Title"),
            h!("input", { "value" => "x", "oninput" => handler(|_| {}) }),
            h!("ul", {}, h!("li", {}, "a"), h!("li", {}, 2)),
        )
    }

    #[test]
    fn test_first_mount_appends() {
        let mut tree = MemoryTree::with_container("app");
        let root = tree.lookup("app").unwrap();
        let patched = reconcile(&mut tree, root, None, Some(&sample()), 0);
        assert_eq!(patched, Patched::APPENDED);
        let child = tree.child_at(root, 0).unwrap();
        assert_eq!(tree.read_back(child), Some(h!("div", { "class" => "app" },
            h!("h1", {}, "Title"),
            h!("input", { "value" => "x", "oninput" => handler(|_| {}) }),
            h!("ul", {}, h!("li", {}, "a"), h!("li", {}, "2")),
        )));
    }

    #[test]
    fn test_identical_trees_issue_no_mutations() {
        let tree_a = sample();
        let (mut tree, root) = mounted(&tree_a);

        let patched = reconcile(&mut tree, root, Some(&tree_a), Some(&tree_a), 0);
        assert_eq!(patched, Patched::empty());
        assert_eq!(tree.mutation_count(), 0);

        // Structurally equal but separately built.
        let patched = reconcile(&mut tree, root, Some(&tree_a), Some(&sample()), 0);
        assert_eq!(patched, Patched::empty());
        assert_eq!(tree.mutation_count(), 0);
    }

    #[test]
    fn test_attribute_change_keeps_identity() {
        let old = h!("div", { "class" => "a" });
        let new = h!("div", { "class" => "b" });
        let (mut tree, root) = mounted(&old);
        let node = tree.child_at(root, 0).unwrap();

        let patched = reconcile(&mut tree, root, Some(&old), Some(&new), 0);
        assert_eq!(patched, Patched::ATTRIBUTES);
        assert_eq!(tree.child_at(root, 0), Some(node));
        assert_eq!(tree.attribute(node, "class"), Some("b"));
    }

    #[test]
    fn test_removed_attribute() {
        let old = h!("div", { "class" => "a", "title" => "t" });
        let new = h!("div", { "class" => "a" });
        let (mut tree, root) = mounted(&old);
        let node = tree.child_at(root, 0).unwrap();

        reconcile(&mut tree, root, Some(&old), Some(&new), 0);
        assert_eq!(tree.attribute(node, "title"), None);
        assert_eq!(tree.attribute(node, "class"), Some("a"));
        assert!(tree.mutations().contains(&Mutation::RemoveAttribute {
            node,
            name: "title".into(),
        }));
    }

    #[test]
    fn test_attribute_update_never_touches_listeners() {
        let old = h!("button", { "class" => "a", "onclick" => handler(|_| {}) });
        let new = h!("button", { "class" => "b" });
        let (mut tree, root) = mounted(&old);
        let node = tree.child_at(root, 0).unwrap();

        reconcile(&mut tree, root, Some(&old), Some(&new), 0);
        assert!(tree.listener(node, "click").is_some());
        assert!(tree.mutations().iter().all(|m| !matches!(
            m,
            Mutation::AddListener { .. } | Mutation::RemoveListener { .. }
        )));
    }

    #[test]
    fn test_tag_change_replaces() {
        let old = h!("div");
        let new = h!("span");
        let (mut tree, root) = mounted(&old);
        let old_node = tree.child_at(root, 0).unwrap();

        let patched = reconcile(&mut tree, root, Some(&old), Some(&new), 0);
        assert_eq!(patched, Patched::REPLACED);
        let new_node = tree.child_at(root, 0).unwrap();
        assert_eq!(tree.tag(new_node), Some("span"));
        assert!(tree.mutations().contains(&Mutation::ReplaceChild {
            parent: root,
            new: new_node,
            old: old_node,
        }));
        // No follow-up value update at a replaced position.
        assert!(!tree.mutations().iter().any(|m| matches!(m, Mutation::SetValue { .. })));
    }

    #[test]
    fn test_tag_change_with_value_is_only_a_replace() {
        let old = h!("input", { "value" => "a" });
        let new = h!("textarea", { "value" => "b" });
        let (mut tree, root) = mounted(&old);

        let patched = reconcile(&mut tree, root, Some(&old), Some(&new), 0);
        assert_eq!(patched, Patched::REPLACED);
        assert!(!tree.mutations().iter().any(|m| matches!(m, Mutation::SetValue { .. })));
    }

    #[test]
    fn test_value_change_updates_property_only() {
        let old = h!("input", { "value" => "a", "class" => "x" }, h!("span", {}, "kept"));
        let new = h!("input", { "value" => "ab", "class" => "x" }, h!("span", {}, "kept"));
        let (mut tree, root) = mounted(&old);
        let node = tree.child_at(root, 0).unwrap();

        let patched = reconcile(&mut tree, root, Some(&old), Some(&new), 0);
        assert_eq!(patched, Patched::VALUE);
        assert_eq!(tree.child_at(root, 0), Some(node));
        assert_eq!(tree.value(node), Some("ab"));
        assert_eq!(
            tree.take_mutations(),
            vec![Mutation::SetValue { node, value: "ab".into() }]
        );
    }

    #[test]
    fn test_value_change_leaves_children_and_attributes_alone() {
        let old = h!("select", { "value" => "a", "class" => "x" }, h!("option", {}, "first"));
        let new = h!("select", { "value" => "b", "class" => "y" },
            h!("option", {}, "second"),
            h!("option", {}, "third"),
        );
        let (mut tree, root) = mounted(&old);
        let node = tree.child_at(root, 0).unwrap();
        let option = tree.child_at(node, 0).unwrap();
        let label = tree.child_at(option, 0).unwrap();

        let patched = reconcile(&mut tree, root, Some(&old), Some(&new), 0);
        assert_eq!(patched, Patched::VALUE);
        assert_eq!(
            tree.take_mutations(),
            vec![Mutation::SetValue { node, value: "b".into() }]
        );
        assert_eq!(tree.children(node), &[option]);
        assert_eq!(tree.child_at(option, 0), Some(label));
        assert_eq!(tree.text_content(node), "first");
        assert_eq!(tree.attribute(node, "class"), Some("x"));
    }

    #[test]
    fn test_number_leaf_idempotence_and_signed_zero() {
        let nan = h!("p", {}, f64::NAN);
        let (mut tree, root) = mounted(&nan);
        assert_eq!(reconcile(&mut tree, root, Some(&nan), Some(&nan), 0), Patched::empty());
        assert_eq!(tree.mutation_count(), 0);

        let old = h!("p", {}, -0.0);
        let new = h!("p", {}, 0.0);
        let (mut tree, root) = mounted(&old);
        let p = tree.child_at(root, 0).unwrap();
        assert_eq!(tree.text_content(p), "-0");
        assert_eq!(reconcile(&mut tree, root, Some(&old), Some(&new), 0), Patched::REPLACED);
        assert_eq!(tree.text_content(p), "0");
    }

    #[test]
    fn test_text_change_swaps_leaf_only() {
        let old = h!("p", { "class" => "count" }, 0);
        let new = h!("p", { "class" => "count" }, 1);
        let (mut tree, root) = mounted(&old);
        let p = tree.child_at(root, 0).unwrap();

        let patched = reconcile(&mut tree, root, Some(&old), Some(&new), 0);
        assert_eq!(patched, Patched::REPLACED);
        assert_eq!(tree.child_at(root, 0), Some(p));
        assert_eq!(tree.text_content(p), "1");
    }

    #[test]
    fn test_growing_child_list() {
        let old = h!("ul", {}, h!("li", {}, "a"));
        let new = h!("ul", {}, h!("li", {}, "a"), h!("li", {}, "b"), h!("li", {}, "c"));
        let (mut tree, root) = mounted(&old);
        let ul = tree.child_at(root, 0).unwrap();
        let first = tree.child_at(ul, 0).unwrap();

        let patched = reconcile(&mut tree, root, Some(&old), Some(&new), 0);
        assert_eq!(patched, Patched::APPENDED);
        assert_eq!(tree.child_at(ul, 0), Some(first));
        assert_eq!(tree.text_content(ul), "abc");
    }

    #[test]
    fn test_shrinking_child_list() {
        let a = h!("li", {}, "a");
        let b = h!("li", {}, "b");
        let old = h!("ul", {}, a.clone(), b);
        let new = h!("ul", {}, a);
        let (mut tree, root) = mounted(&old);
        let ul = tree.child_at(root, 0).unwrap();
        let first = tree.child_at(ul, 0).unwrap();
        let second = tree.child_at(ul, 1).unwrap();

        let patched = reconcile(&mut tree, root, Some(&old), Some(&new), 0);
        assert_eq!(patched, Patched::REMOVED);
        assert_eq!(tree.children(ul), &[first]);
        assert_eq!(
            tree.take_mutations(),
            vec![Mutation::RemoveChild { parent: ul, child: second }]
        );
    }

    #[test]
    fn test_shrinking_by_several() {
        let old = h!("ul", {}, "a", "b", "c", "d");
        let new = h!("ul", {}, "a");
        let (mut tree, root) = mounted(&old);
        let ul = tree.child_at(root, 0).unwrap();

        reconcile(&mut tree, root, Some(&old), Some(&new), 0);
        assert_eq!(tree.children(ul).len(), 1);
        assert_eq!(tree.text_content(ul), "a");
    }

    #[test]
    fn test_new_tree_absent_removes() {
        let old = h!("div");
        let (mut tree, root) = mounted(&old);
        let patched = reconcile(&mut tree, root, Some(&old), None, 0);
        assert_eq!(patched, Patched::REMOVED);
        assert!(tree.children(root).is_empty());
    }

    #[test]
    fn test_nested_changes_accumulate() {
        let old = h!("div", { "class" => "a" }, h!("span", {}, "x"), text("tail"));
        let new = h!("div", { "class" => "b" }, h!("em", {}, "x"));
        let (mut tree, root) = mounted(&old);

        let patched = reconcile(&mut tree, root, Some(&old), Some(&new), 0);
        assert_eq!(patched, Patched::ATTRIBUTES | Patched::REPLACED | Patched::REMOVED);
        let div = tree.child_at(root, 0).unwrap();
        assert_eq!(tree.read_back(div), Some(new));
    }

    #[test]
    fn test_result_matches_new_tree() {
        let old = sample();
        let new = h!("div", { "class" => "app", "id" => "main" },
            h!("h2", {}, "Title"),
            h!("input", { "value" => "x", "oninput" => handler(|_| {}) }),
            h!("ul", {}, h!("li", {}, "a")),
            "footer",
        );
        let (mut tree, root) = mounted(&old);
        reconcile(&mut tree, root, Some(&old), Some(&new), 0);
        let div = tree.child_at(root, 0).unwrap();
        assert_eq!(tree.read_back(div), Some(new));
    }
}
