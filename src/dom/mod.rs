//! DOM Module - Arena-based mutable XML tree
//!
//! Implements the tree store the path writer builds into:
//! - Arena allocation for nodes
//! - NodeId (u32) indices for cache-friendly traversal
//! - String interning for element/attribute names
//! - XML text output

pub mod document;
pub mod node;
pub mod serialize;
pub mod strings;

pub use document::{ValueFormat, XmlTree};
pub use node::{NodeId, NodeKind, XmlNode};
pub use serialize::{to_xml, XmlOptions};

/// Read-only tree access - the query engine, reader and serializer are
/// written against this rather than against `XmlTree` directly
pub trait DocumentAccess {
    /// Get document node ID
    fn document_node_id(&self) -> NodeId;

    /// Get a node by ID
    fn get_node(&self, id: NodeId) -> Option<&XmlNode>;

    /// Get node name as string
    fn node_name(&self, id: NodeId) -> Option<&str>;

    /// Get the parent (or owner element for attributes)
    fn parent_of(&self, id: NodeId) -> Option<NodeId>;

    /// Get attribute nodes for an element
    fn attributes(&self, id: NodeId) -> &[NodeId];

    /// Value of an element (text content) or attribute
    fn value_of(&self, id: NodeId) -> Option<String>;

    /// Full structural path of a node
    fn full_path(&self, id: NodeId) -> String;

    /// Iterate over children - returns collected Vec for trait object compatibility
    fn children_vec(&self, id: NodeId) -> Vec<NodeId>;

    /// Iterate over descendants - returns collected Vec for trait object compatibility
    fn descendants_vec(&self, id: NodeId) -> Vec<NodeId>;
}
