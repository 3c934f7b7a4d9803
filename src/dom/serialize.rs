//! XML Text Output
//!
//! Serializes a tree to XML text, with an optional indented layout.

use super::{DocumentAccess, NodeId, NodeKind};
use crate::core::entities::{encode_attribute, encode_text, write_cdata};

const XML_DECLARATION: &str = "<?xml version=\"1.0\"?>\n";

/// Output options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XmlOptions {
    /// Indent nested elements by two spaces per level. Elements holding
    /// text are always written inline.
    pub format_output: bool,
}

/// Serialize a whole document, declaration included
pub fn to_xml<D: DocumentAccess>(doc: &D, options: &XmlOptions) -> String {
    let mut buf = String::with_capacity(1024);
    buf.push_str(XML_DECLARATION);
    for child in doc.children_vec(doc.document_node_id()) {
        serialize_node(doc, child, options, &mut buf);
        buf.push('\n');
    }
    buf
}

/// Serialize a node to XML text
/// Uses iterative approach with explicit stack to avoid stack overflow on deep trees
pub fn serialize_node<D: DocumentAccess>(
    doc: &D,
    node_id: NodeId,
    options: &XmlOptions,
    buf: &mut String,
) {
    // Stack entries: Either entering a node or need to write closing tag
    enum StackEntry {
        Enter { id: NodeId, depth: usize, indent: bool },
        Close { id: NodeId, depth: usize, block: bool },
    }

    let mut stack: Vec<StackEntry> = Vec::with_capacity(64);
    stack.push(StackEntry::Enter {
        id: node_id,
        depth: 0,
        indent: false,
    });

    while let Some(entry) = stack.pop() {
        match entry {
            StackEntry::Close { id, depth, block } => {
                if block {
                    newline_indent(buf, depth);
                }
                buf.push_str("</");
                buf.push_str(doc.node_name(id).unwrap_or(""));
                buf.push('>');
            }
            StackEntry::Enter { id, depth, indent } => {
                let node = match doc.get_node(id) {
                    Some(n) => n,
                    None => continue,
                };

                match node.kind {
                    NodeKind::Element => {
                        if indent {
                            newline_indent(buf, depth);
                        }
                        buf.push('<');
                        buf.push_str(doc.node_name(id).unwrap_or(""));

                        for &attr in doc.attributes(id) {
                            let name = doc.node_name(attr).unwrap_or("");
                            let value = doc
                                .get_node(attr)
                                .and_then(|a| a.value.as_deref())
                                .unwrap_or("");
                            buf.push(' ');
                            buf.push_str(name);
                            buf.push_str("=\"");
                            buf.push_str(&encode_attribute(value));
                            buf.push('"');
                        }

                        let children = doc.children_vec(id);
                        if children.is_empty() {
                            buf.push_str("/>");
                            continue;
                        }
                        buf.push('>');

                        // Only element-only content is laid out on separate lines
                        let block = options.format_output
                            && children
                                .iter()
                                .all(|&c| doc.get_node(c).is_some_and(|n| n.is_element()));

                        // Push closing tag first (processed after children)
                        stack.push(StackEntry::Close { id, depth, block });
                        for &child in children.iter().rev() {
                            stack.push(StackEntry::Enter {
                                id: child,
                                depth: depth + 1,
                                indent: block,
                            });
                        }
                    }
                    NodeKind::Text => {
                        buf.push_str(&encode_text(node.value.as_deref().unwrap_or("")));
                    }
                    NodeKind::CData => {
                        write_cdata(node.value.as_deref().unwrap_or(""), buf);
                    }
                    NodeKind::Attribute => {
                        buf.push_str(&encode_attribute(node.value.as_deref().unwrap_or("")));
                    }
                    NodeKind::Document => {
                        for child in doc.children_vec(id).into_iter().rev() {
                            stack.push(StackEntry::Enter {
                                id: child,
                                depth,
                                indent: false,
                            });
                        }
                    }
                }
            }
        }
    }
}

#[inline]
fn newline_indent(buf: &mut String, depth: usize) {
    buf.push('\n');
    for _ in 0..depth {
        buf.push_str("  ");
    }
}
