//! Difference detector.
//!
//! Classifies two nodes occupying the same tree position. The order of the
//! checks decides which native mutation the reconciler issues:
//!
//! 1. Variant or leaf primitive type differs -> `TypeChanged`
//! 2. Leaves with different values -> `TextChanged`
//! 3. Elements with different tags -> `TagChanged`
//! 4. Elements with different `value` attribute -> `ValueChanged`
//! 5. Elements with different attribute mappings -> `AttributesChanged`
//! 6. Otherwise -> `None`
//!
//! `ValueChanged` wins over `AttributesChanged` so form-like nodes get a
//! property update instead of anything that could disturb focus or cursor.

use crate::node::{AbstractNode, Element};

/// Relationship between an old and a new node at one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    None,
    TypeChanged,
    TextChanged,
    TagChanged,
    ValueChanged,
    AttributesChanged,
}

impl ChangeKind {
    /// Kinds handled by replacing the native node wholesale.
    pub fn replaces_node(self) -> bool {
        matches!(
            self,
            ChangeKind::TypeChanged | ChangeKind::TextChanged | ChangeKind::TagChanged
        )
    }
}

/// Classify the change between two nodes. Defined for every pair.
pub fn classify(old: Option<&AbstractNode>, new: Option<&AbstractNode>) -> ChangeKind {
    match (old, new) {
        (None, None) => ChangeKind::None,
        (None, Some(_)) | (Some(_), None) => ChangeKind::TypeChanged,
        (Some(AbstractNode::Leaf(a)), Some(AbstractNode::Leaf(b))) => {
            if !a.same_kind(b) {
                ChangeKind::TypeChanged
            } else if a != b {
                ChangeKind::TextChanged
            } else {
                ChangeKind::None
            }
        }
        (Some(AbstractNode::Element(a)), Some(AbstractNode::Element(b))) => classify_elements(a, b),
        (Some(_), Some(_)) => ChangeKind::TypeChanged,
    }
}

fn classify_elements(old: &Element, new: &Element) -> ChangeKind {
    if old.tag() != new.tag() {
        ChangeKind::TagChanged
    } else if old.value() != new.value() {
        ChangeKind::ValueChanged
    } else if old.attributes() != new.attributes() {
        ChangeKind::AttributesChanged
    } else {
        ChangeKind::None
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::h;
    use crate::node::{handler, text};

    #[test]
    fn test_absent_positions() {
        let node = text("a");
        assert_eq!(classify(None, None), ChangeKind::None);
        assert_eq!(classify(None, Some(&node)), ChangeKind::TypeChanged);
        assert_eq!(classify(Some(&node), None), ChangeKind::TypeChanged);
    }

    #[test]
    fn test_variant_and_leaf_type_changes() {
        let el = h!("div");
        assert_eq!(classify(Some(&text("a")), Some(&el)), ChangeKind::TypeChanged);
        assert_eq!(classify(Some(&el), Some(&text("a"))), ChangeKind::TypeChanged);
        assert_eq!(classify(Some(&text(1)), Some(&text("1"))), ChangeKind::TypeChanged);
    }

    #[test]
    fn test_leaf_text() {
        assert_eq!(classify(Some(&text("0")), Some(&text("1"))), ChangeKind::TextChanged);
        assert_eq!(classify(Some(&text(0)), Some(&text(1))), ChangeKind::TextChanged);
        assert_eq!(classify(Some(&text("x")), Some(&text("x"))), ChangeKind::None);
    }

    #[test]
    fn test_number_leaves_follow_rendered_text() {
        let nan = text(f64::NAN);
        assert_eq!(classify(Some(&nan), Some(&nan)), ChangeKind::None);
        assert_eq!(classify(Some(&text(-0.0)), Some(&text(0.0))), ChangeKind::TextChanged);
    }

    #[test]
    fn test_tag_changed() {
        assert_eq!(classify(Some(&h!("div")), Some(&h!("span"))), ChangeKind::TagChanged);
    }

    #[test]
    fn test_tag_beats_value() {
        let a = h!("input", { "value" => "a" });
        let b = h!("textarea", { "value" => "b" });
        assert_eq!(classify(Some(&a), Some(&b)), ChangeKind::TagChanged);
    }

    #[test]
    fn test_value_beats_attributes() {
        let a = h!("input", { "value" => "a", "class" => "x" });
        let b = h!("input", { "value" => "b", "class" => "y" });
        assert_eq!(classify(Some(&a), Some(&b)), ChangeKind::ValueChanged);

        let c = h!("input", { "value" => "b", "class" => "x" });
        assert_eq!(classify(Some(&a), Some(&c)), ChangeKind::ValueChanged);
    }

    #[test]
    fn test_value_absent_differs_from_present() {
        let a = h!("input", {});
        let b = h!("input", { "value" => "" });
        assert_eq!(classify(Some(&a), Some(&b)), ChangeKind::ValueChanged);
        assert_eq!(classify(Some(&b), Some(&a)), ChangeKind::ValueChanged);
    }

    #[test]
    fn test_attributes_changed() {
        let a = h!("div", { "class" => "a" });
        let b = h!("div", { "class" => "b" });
        assert_eq!(classify(Some(&a), Some(&b)), ChangeKind::AttributesChanged);

        let c = h!("div", { "class" => "a", "id" => "x" });
        assert_eq!(classify(Some(&a), Some(&c)), ChangeKind::AttributesChanged);
    }

    #[test]
    fn test_attribute_order_is_irrelevant() {
        let a = h!("div", { "class" => "a", "id" => "x" });
        let b = h!("div", { "id" => "x", "class" => "a" });
        assert_eq!(classify(Some(&a), Some(&b)), ChangeKind::None);
    }

    #[test]
    fn test_fresh_handlers_are_not_a_change() {
        let a = h!("button", { "onclick" => handler(|_| {}) }, "+");
        let b = h!("button", { "onclick" => handler(|_| {}) }, "+");
        assert_eq!(classify(Some(&a), Some(&b)), ChangeKind::None);
    }

    #[test]
    fn test_children_do_not_affect_classification() {
        let a = h!("ul", {}, h!("li", {}, "a"));
        let b = h!("ul", {}, h!("li", {}, "b"), h!("li", {}, "c"));
        assert_eq!(classify(Some(&a), Some(&b)), ChangeKind::None);
    }

    #[test]
    fn test_replaces_node() {
        assert!(ChangeKind::TagChanged.replaces_node());
        assert!(ChangeKind::TextChanged.replaces_node());
        assert!(ChangeKind::TypeChanged.replaces_node());
        assert!(!ChangeKind::ValueChanged.replaces_node());
        assert!(!ChangeKind::AttributesChanged.replaces_node());
        assert!(!ChangeKind::None.replaces_node());
    }
}
