//! Tree Node representation
//!
//! Uses NodeId (u32) for compact, cache-friendly node references.
//! Attributes are arena nodes too, so one handle type addresses both.

/// Compact node identifier (index into arena)
pub type NodeId = u32;

/// Type of tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Document root
    Document,
    /// Element node
    Element,
    /// Attribute owned by an element
    Attribute,
    /// Escaped text content
    Text,
    /// Marked literal (CDATA section)
    CData,
}

/// A node in the arena
#[derive(Debug, Clone)]
pub struct XmlNode {
    /// Type of this node
    pub kind: NodeKind,
    /// Parent node (owner element for attributes, None while detached)
    pub parent: Option<NodeId>,
    /// First child node
    pub first_child: Option<NodeId>,
    /// Last child node
    pub last_child: Option<NodeId>,
    /// Previous sibling
    pub prev_sibling: Option<NodeId>,
    /// Next sibling
    pub next_sibling: Option<NodeId>,
    /// Index into string pool for the name (elements, attributes), or 0
    pub name_id: u32,
    /// Text content (text/CDATA nodes) or attribute value
    pub value: Option<String>,
    /// Attribute nodes of an element, in insertion order
    pub attrs: Vec<NodeId>,
}

impl XmlNode {
    fn new(kind: NodeKind, name_id: u32, value: Option<String>) -> Self {
        XmlNode {
            kind,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            name_id,
            value,
            attrs: Vec::new(),
        }
    }

    /// Create a new document root node
    pub fn document() -> Self {
        Self::new(NodeKind::Document, 0, None)
    }

    /// Create a new, detached element node
    pub fn element(name_id: u32) -> Self {
        Self::new(NodeKind::Element, name_id, None)
    }

    /// Create a new, detached attribute node without a value
    pub fn attribute(name_id: u32) -> Self {
        Self::new(NodeKind::Attribute, name_id, None)
    }

    /// Create a new text node
    pub fn text(content: String) -> Self {
        Self::new(NodeKind::Text, 0, Some(content))
    }

    /// Create a new CDATA node
    pub fn cdata(content: String) -> Self {
        Self::new(NodeKind::CData, 0, Some(content))
    }

    /// Placeholder left in a released arena slot
    pub fn released() -> Self {
        Self::new(NodeKind::Text, 0, None)
    }

    /// Check if this is an element node
    #[inline]
    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    /// Check if this is an attribute node
    #[inline]
    pub fn is_attribute(&self) -> bool {
        self.kind == NodeKind::Attribute
    }

    /// Check if this is a text or CDATA node
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text | NodeKind::CData)
    }

    /// Check if this node has children
    #[inline]
    pub fn has_children(&self) -> bool {
        self.first_child.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_creation() {
        let doc = XmlNode::document();
        assert_eq!(doc.kind, NodeKind::Document);
        assert!(doc.parent.is_none());
        assert!(!doc.has_children());
    }

    #[test]
    fn test_element_node() {
        let elem = XmlNode::element(1);
        assert_eq!(elem.kind, NodeKind::Element);
        assert!(elem.parent.is_none());
        assert_eq!(elem.name_id, 1);
        assert!(elem.attrs.is_empty());
    }

    #[test]
    fn test_text_kinds() {
        assert!(XmlNode::text("a".into()).is_text());
        assert!(XmlNode::cdata("a".into()).is_text());
        assert!(!XmlNode::attribute(2).is_text());
    }
}
