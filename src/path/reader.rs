//! Path Reader
//!
//! Walks a tree in document order and emits one `(path, value)` pair per
//! leaf element and per attribute, using the same path shape the
//! unflattener consumes (`a/b/2/@id` rather than `/a/b[2]/@id`).

use crate::dom::{DocumentAccess, NodeId, XmlTree};
use crate::error::ConvertError;
use crate::query::{self, Query, QueryCache};

/// A flattened `(path, value)` pair
pub type PathPair = (String, Option<String>);

/// Collect every leaf element and attribute of the tree
pub fn collect<D: DocumentAccess>(doc: &D) -> Vec<PathPair> {
    let mut pairs = Vec::new();
    for id in doc.descendants_vec(doc.document_node_id()) {
        let Some(node) = doc.get_node(id) else {
            continue;
        };
        if !node.is_element() {
            continue;
        }

        let has_element_children = doc
            .children_vec(id)
            .into_iter()
            .any(|c| doc.get_node(c).is_some_and(|n| n.is_element()));
        if !has_element_children {
            pairs.push((render_path(&doc.full_path(id)), doc.value_of(id)));
        }

        for &attr in doc.attributes(id) {
            pairs.push((render_path(&doc.full_path(attr)), doc.value_of(attr)));
        }
    }
    pairs
}

/// Turn a full node path into a pair path: the leading `/` goes and every
/// `[n]` position becomes its own `/n` segment
pub fn render_path(full_path: &str) -> String {
    let trimmed = full_path.trim_start_matches('/');
    let mut out = String::with_capacity(trimmed.len());
    for c in trimmed.chars() {
        match c {
            '[' => out.push('/'),
            ']' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Value of the first node `path` selects, or None when nothing matches
pub fn read_path<D: DocumentAccess>(doc: &D, path: &str) -> Result<Option<String>, ConvertError> {
    let query = query::compile(path).map_err(|_| ConvertError::invalid_path(path))?;
    Ok(read_compiled(doc, &query))
}

/// Same as [`read_path`], compiling through a session cache
pub fn read_path_cached(
    tree: &XmlTree,
    cache: &mut QueryCache,
    path: &str,
) -> Result<Option<String>, ConvertError> {
    let query = cache
        .get_or_compile(path)
        .map_err(|_| ConvertError::invalid_path(path))?;
    Ok(read_compiled(tree, &query))
}

/// Read with an already compiled query
pub fn read_compiled<D: DocumentAccess>(doc: &D, query: &Query) -> Option<String> {
    let first: NodeId = *query::select(doc, query, doc.document_node_id()).first()?;
    doc.value_of(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WriteOptions;
    use crate::path::write_path;

    fn build(pairs: &[(&str, Option<&str>)]) -> XmlTree {
        let mut tree = XmlTree::new();
        for (path, value) in pairs {
            write_path(&mut tree, path, *value, &WriteOptions::default()).unwrap();
        }
        tree
    }

    fn owned(pairs: &[(&str, Option<&str>)]) -> Vec<PathPair> {
        pairs
            .iter()
            .map(|(p, v)| (p.to_string(), v.map(str::to_string)))
            .collect()
    }

    #[test]
    fn test_render_path() {
        assert_eq!(render_path("/a/b[2]/c"), "a/b/2/c");
        assert_eq!(render_path("/a/b[10]/@id"), "a/b/10/@id");
        assert_eq!(render_path("/"), "");
    }

    #[test]
    fn test_collect_document_order() {
        let tree = build(&[
            ("root/@version", Some("1")),
            ("root/item[1]/name", Some("a")),
            ("root/item[2]/name", Some("b")),
            ("root/item[2]/@id", Some("x")),
            ("root/empty", None),
        ]);
        assert_eq!(
            collect(&tree),
            owned(&[
                ("root/@version", Some("1")),
                ("root/item/1/name", Some("a")),
                ("root/item/2/@id", Some("x")),
                ("root/item/2/name", Some("b")),
                ("root/empty", None),
            ])
        );
    }

    #[test]
    fn test_element_with_attribute_only() {
        let tree = build(&[("foo/@id", Some("bar"))]);
        assert_eq!(
            collect(&tree),
            owned(&[("foo", None), ("foo/@id", Some("bar"))])
        );
    }

    #[test]
    fn test_collect_empty_tree() {
        assert!(collect(&XmlTree::new()).is_empty());
    }

    #[test]
    fn test_read_path() {
        let tree = build(&[("a/b[2]/c", Some("x")), ("a/@n", Some("1"))]);
        assert_eq!(read_path(&tree, "a/b[2]/c").unwrap(), Some("x".to_string()));
        assert_eq!(read_path(&tree, "/a/@n").unwrap(), Some("1".to_string()));
        assert_eq!(read_path(&tree, "a/b[1]").unwrap(), None);
        assert_eq!(read_path(&tree, "a/missing").unwrap(), None);
        assert_eq!(
            read_path(&tree, "[1]/foo"),
            Err(ConvertError::invalid_path("[1]/foo"))
        );
    }

    #[test]
    fn test_read_path_cached() {
        let tree = build(&[("a/b", Some("x"))]);
        let mut cache = QueryCache::default();
        assert_eq!(read_path_cached(&tree, &mut cache, "a/b").unwrap(), Some("x".to_string()));
        assert_eq!(read_path_cached(&tree, &mut cache, "a/b").unwrap(), Some("x".to_string()));
        assert_eq!(cache.len(), 1);
    }
}
