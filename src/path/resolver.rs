//! Segment Resolution
//!
//! Resolves one `Segment` against a context node, creating whatever is
//! missing so that the returned node is the one the fragment addresses.

use super::segment::{PredicateTarget, Segment};
use crate::dom::{NodeId, NodeKind, ValueFormat, XmlTree};
use crate::error::ConvertError;
use tracing::{debug, trace};

/// Resolve `segment` under `context`. `path` is the full write path and is
/// only used for error reporting.
pub fn resolve(
    tree: &mut XmlTree,
    context: NodeId,
    segment: &Segment,
    path: &str,
) -> Result<NodeId, ConvertError> {
    let kind = tree
        .get_node(context)
        .map(|n| n.kind)
        .ok_or_else(|| ConvertError::invalid_path(path))?;

    match (kind, segment) {
        (NodeKind::Element, Segment::Attribute(name)) => resolve_attribute(tree, context, name),
        (NodeKind::Document | NodeKind::Element, Segment::Plain(name)) => {
            resolve_indexed(tree, context, name, 1, path)
        }
        (NodeKind::Document | NodeKind::Element, Segment::Indexed { name, count }) => {
            resolve_indexed(tree, context, name, *count, path)
        }
        (
            NodeKind::Document | NodeKind::Element,
            Segment::ChildPredicate {
                parent,
                target,
                value,
            },
        ) => resolve_predicate(tree, context, parent, target, value),
        // Attributes on the document, or anything under an attribute or text
        _ => Err(ConvertError::invalid_path(path)),
    }
}

/// Find or create the attribute `name` on `element`
fn resolve_attribute(
    tree: &mut XmlTree,
    element: NodeId,
    name: &str,
) -> Result<NodeId, ConvertError> {
    if let Some(existing) = tree.attribute(element, name) {
        return Ok(existing);
    }
    let attr = tree.create_attribute(name);
    tree.append_child(element, attr)?;
    trace!(name, element, "created attribute");
    Ok(attr)
}

/// Return the `count`-th child named `name`, padding with empty siblings
fn resolve_indexed(
    tree: &mut XmlTree,
    context: NodeId,
    name: &str,
    count: usize,
    path: &str,
) -> Result<NodeId, ConvertError> {
    let mut siblings = tree.children_named(context, name);

    if siblings.len() < count {
        let missing = count - siblings.len();
        if missing > 1 {
            debug!(name, existing = siblings.len(), count, "padding siblings");
        }
        for _ in 0..missing {
            let element = tree.create_element(name);
            tree.append_child(context, element)?;
            siblings.push(element);
        }
        trace!(name, context, count, "created element");
    }

    count
        .checked_sub(1)
        .and_then(|i| siblings.get(i).copied())
        .ok_or_else(|| ConvertError::invalid_path(path))
}

/// Reuse the first `parent` child whose `target` has `value`, or build one
fn resolve_predicate(
    tree: &mut XmlTree,
    context: NodeId,
    parent: &str,
    target: &PredicateTarget,
    value: &str,
) -> Result<NodeId, ConvertError> {
    let existing = tree
        .children_named(context, parent)
        .into_iter()
        .find(|&candidate| match target {
            PredicateTarget::Element(child) => tree
                .children_named(candidate, child)
                .into_iter()
                .any(|c| tree.value_of(c).as_deref() == Some(value)),
            PredicateTarget::Attribute(attr) => tree.get_attribute(candidate, attr) == Some(value),
        });
    if let Some(found) = existing {
        trace!(parent, found, "reusing predicate match");
        return Ok(found);
    }

    let element = tree.create_element(parent);
    let keyed = match target {
        PredicateTarget::Element(child) => tree.create_element(child),
        PredicateTarget::Attribute(attr) => tree.create_attribute(attr),
    };
    tree.append_child(element, keyed)?;
    tree.set_value(keyed, Some(value), ValueFormat::Escaped)?;
    tree.append_child(context, element)?;
    debug!(parent, value, "created predicate element");
    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::segment::parse_segment;

    fn resolve_str(tree: &mut XmlTree, context: NodeId, fragment: &str) -> Result<NodeId, ConvertError> {
        let segment = parse_segment(fragment, fragment)?;
        resolve(tree, context, &segment, fragment)
    }

    fn with_root() -> (XmlTree, NodeId) {
        let mut tree = XmlTree::new();
        let root = resolve_str(&mut tree, XmlTree::DOCUMENT, "root").unwrap();
        (tree, root)
    }

    #[test]
    fn test_plain_is_reused() {
        let (mut tree, root) = with_root();
        let a = resolve_str(&mut tree, root, "a").unwrap();
        let again = resolve_str(&mut tree, root, "a").unwrap();
        assert_eq!(a, again);
        assert_eq!(tree.children_named(root, "a").len(), 1);
    }

    #[test]
    fn test_indexed_pads_siblings() {
        let (mut tree, root) = with_root();
        let third = resolve_str(&mut tree, root, "item[3]").unwrap();
        let items = tree.children_named(root, "item");
        assert_eq!(items.len(), 3);
        assert_eq!(items[2], third);
        assert!(tree.get_node(items[0]).is_some_and(|n| !n.has_children()));

        let first = resolve_str(&mut tree, root, "item[1]").unwrap();
        assert_eq!(first, items[0]);
        assert_eq!(tree.children_named(root, "item").len(), 3);
    }

    #[test]
    fn test_attribute_never_duplicates() {
        let (mut tree, root) = with_root();
        let id = resolve_str(&mut tree, root, "@id").unwrap();
        assert_eq!(resolve_str(&mut tree, root, "@id").unwrap(), id);
        assert_eq!(tree.attributes(root).len(), 1);
    }

    #[test]
    fn test_predicate_creates_then_reuses() {
        let (mut tree, root) = with_root();
        let book = resolve_str(&mut tree, root, "book[title=\"Dune\"]").unwrap();
        assert_eq!(tree.value_of(book), Some("Dune".to_string()));

        let other = resolve_str(&mut tree, root, "book[title=\"Emma\"]").unwrap();
        assert_ne!(book, other);
        assert_eq!(resolve_str(&mut tree, root, "book[title=\"Dune\"]").unwrap(), book);
        assert_eq!(tree.children_named(root, "book").len(), 2);
    }

    #[test]
    fn test_attribute_predicate() {
        let (mut tree, root) = with_root();
        let en = resolve_str(&mut tree, root, "name[@lang='en']").unwrap();
        assert_eq!(tree.get_attribute(en, "lang"), Some("en"));
        assert_eq!(resolve_str(&mut tree, root, "name[@lang='en']").unwrap(), en);
    }

    #[test]
    fn test_invalid_contexts() {
        let (mut tree, root) = with_root();
        let attr = resolve_str(&mut tree, root, "@id").unwrap();
        assert!(matches!(
            resolve_str(&mut tree, attr, "child"),
            Err(ConvertError::InvalidPathSyntax { .. })
        ));
        assert!(matches!(
            resolve_str(&mut tree, XmlTree::DOCUMENT, "@id"),
            Err(ConvertError::InvalidPathSyntax { .. })
        ));
    }
}
