//! Path Writer
//!
//! Writes one value at one path: an existing node matched by the whole
//! path is overwritten in place, otherwise the path is built fragment by
//! fragment from the document node.

use super::resolver::resolve;
use super::segment::{parse_path, split_fragments};
use crate::config::WriteOptions;
use crate::dom::{NodeId, XmlTree};
use crate::error::ConvertError;
use crate::query::{self, Query, QueryCache};
use tracing::trace;

/// Write `value` at `path`, returning the node that now holds it
pub fn write_path(
    tree: &mut XmlTree,
    path: &str,
    value: Option<&str>,
    options: &WriteOptions,
) -> Result<NodeId, ConvertError> {
    let query = query::compile(path).map_err(|_| ConvertError::invalid_path(path))?;
    write_compiled(tree, path, &query, value, options)
}

/// Same as [`write_path`], compiling through a session cache
pub fn write_path_cached(
    tree: &mut XmlTree,
    cache: &mut QueryCache,
    path: &str,
    value: Option<&str>,
    options: &WriteOptions,
) -> Result<NodeId, ConvertError> {
    let query = cache
        .get_or_compile(path)
        .map_err(|_| ConvertError::invalid_path(path))?;
    write_compiled(tree, path, &query, value, options)
}

/// Write with an already compiled query for `path`
pub fn write_compiled(
    tree: &mut XmlTree,
    path: &str,
    query: &Query,
    value: Option<&str>,
    options: &WriteOptions,
) -> Result<NodeId, ConvertError> {
    if split_fragments(path).is_empty() {
        return Err(ConvertError::invalid_path(path));
    }

    let existing = query::select(&*tree, query, XmlTree::DOCUMENT)
        .into_iter()
        .next()
        .filter(|&id| {
            tree.get_node(id)
                .is_some_and(|n| n.is_element() || n.is_attribute())
        });
    if let Some(node) = existing {
        trace!(path, node, "overwriting existing node");
        tree.set_value(node, value, options.format())?;
        return Ok(node);
    }

    // Classify every fragment before the tree is touched
    let segments = parse_path(path)?;

    let mut pointer = XmlTree::DOCUMENT;
    for segment in &segments {
        pointer = resolve(tree, pointer, segment, path)?;
    }
    tree.set_value(pointer, value, options.format())?;
    Ok(pointer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{to_xml, XmlOptions};

    fn xml(tree: &XmlTree) -> String {
        to_xml(tree, &XmlOptions::default())
    }

    fn write(tree: &mut XmlTree, path: &str, value: Option<&str>) -> Result<NodeId, ConvertError> {
        write_path(tree, path, value, &WriteOptions::default())
    }

    #[test]
    fn test_absolute_path_then_overwrite() {
        let mut tree = XmlTree::new();
        let node = write(&mut tree, "/path/to/node", Some("value")).unwrap();
        assert_eq!(
            xml(&tree),
            "<?xml version=\"1.0\"?>\n<path><to><node>value</node></to></path>\n"
        );

        let again = write(&mut tree, "/path/to/node", Some("other")).unwrap();
        assert_eq!(node, again);
        assert_eq!(
            xml(&tree),
            "<?xml version=\"1.0\"?>\n<path><to><node>other</node></to></path>\n"
        );
    }

    #[test]
    fn test_repeated_overwrites_do_not_grow_tree() {
        let mut tree = XmlTree::new();
        write(&mut tree, "a/b", Some("x")).unwrap();
        write(&mut tree, "a/@id", Some("1")).unwrap();
        let count = tree.node_count();
        for i in 0..1000 {
            let value = i.to_string();
            write(&mut tree, "a/b", Some(value.as_str())).unwrap();
            write(&mut tree, "a/@id", Some(value.as_str())).unwrap();
        }
        assert_eq!(tree.node_count(), count);
        assert_eq!(
            xml(&tree),
            "<?xml version=\"1.0\"?>\n<a id=\"999\"><b>999</b></a>\n"
        );

        // overwriting the parent drops the old child for good
        write(&mut tree, "a", Some("flat")).unwrap();
        assert_eq!(tree.node_count(), count - 1);
    }

    #[test]
    fn test_attribute_path() {
        let mut tree = XmlTree::new();
        write(&mut tree, "/path/to/node/with/@attribute", Some("v")).unwrap();
        assert_eq!(
            xml(&tree),
            "<?xml version=\"1.0\"?>\n<path><to><node><with attribute=\"v\"/></node></to></path>\n"
        );
    }

    #[test]
    fn test_idempotent_write() {
        let mut tree = XmlTree::new();
        write(&mut tree, "a/b[2]/c", Some("x")).unwrap();
        let once = xml(&tree);
        write(&mut tree, "a/b[2]/c", Some("x")).unwrap();
        assert_eq!(xml(&tree), once);
        assert_eq!(
            once,
            "<?xml version=\"1.0\"?>\n<a><b/><b><c>x</c></b></a>\n"
        );
    }

    #[test]
    fn test_predicate_reuse_across_writes() {
        let mut tree = XmlTree::new();
        write(&mut tree, "books/book[title=\"Dune\"]/year", Some("1965")).unwrap();
        write(&mut tree, "books/book[title=\"Dune\"]/author", Some("Herbert")).unwrap();
        write(&mut tree, "books/book[title=\"Emma\"]/year", Some("1815")).unwrap();
        assert_eq!(
            xml(&tree),
            "<?xml version=\"1.0\"?>\n<books>\
<book><title>Dune</title><year>1965</year><author>Herbert</author></book>\
<book><title>Emma</title><year>1815</year></book></books>\n"
        );
    }

    #[test]
    fn test_marked_literal() {
        let mut tree = XmlTree::new();
        let options = WriteOptions {
            use_marked_literal: true,
        };
        write_path(&mut tree, "doc/body", Some("<p>hi</p>"), &options).unwrap();
        write_path(&mut tree, "doc/@kind", Some("<raw>"), &options).unwrap();
        assert_eq!(
            xml(&tree),
            "<?xml version=\"1.0\"?>\n<doc kind=\"&lt;raw&gt;\"><body><![CDATA[<p>hi</p>]]></body></doc>\n"
        );
    }

    #[test]
    fn test_null_value_leaves_empty_element() {
        let mut tree = XmlTree::new();
        write(&mut tree, "a/b", Some("x")).unwrap();
        write(&mut tree, "a/b", None).unwrap();
        assert_eq!(xml(&tree), "<?xml version=\"1.0\"?>\n<a><b/></a>\n");
    }

    #[test]
    fn test_invalid_paths() {
        let mut tree = XmlTree::new();
        let err = write(&mut tree, "[1]/foo", Some("x")).unwrap_err();
        assert_eq!(err.to_string(), "XPath [1]/foo is not valid.");

        for path in ["", "/", "a/1b", "a/b[0]", "@id"] {
            assert_eq!(
                write(&mut tree, path, Some("x")),
                Err(ConvertError::invalid_path(path)),
                "{path:?}"
            );
        }
        assert!(tree.is_empty());
    }

    #[test]
    fn test_cached_write_matches_uncached() {
        let mut cached = XmlTree::new();
        let mut cache = QueryCache::default();
        let mut plain = XmlTree::new();
        for (path, value) in [("r/i[1]", "a"), ("r/i[2]", "b"), ("r/i[1]", "c")] {
            write_path_cached(&mut cached, &mut cache, path, Some(value), &WriteOptions::default())
                .unwrap();
            write(&mut plain, path, Some(value)).unwrap();
        }
        assert_eq!(xml(&cached), xml(&plain));
        assert_eq!(cache.len(), 2);
    }
}
