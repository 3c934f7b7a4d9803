//! Error types for tree construction and data conversion.

use crate::dom::NodeId;
use thiserror::Error;

/// Errors raised by the arena tree when an operation would break its shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A node cannot be placed under the requested parent
    #[error("cannot append {child} node to {parent} node")]
    HierarchyRequest { parent: String, child: String },

    /// A handle does not refer to any node of this tree
    #[error("node {0} does not exist")]
    NoSuchNode(NodeId),
}

/// Errors raised while converting between nested data and a tree.
///
/// Every error is terminal for the call that produced it; there is no
/// partial result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// A path (or one of its fragments) matches no supported grammar
    #[error("XPath {path} is not valid.")]
    InvalidPathSyntax { path: String },

    /// A map key cannot be rendered as a node name
    #[error("{name} is not a valid tag name.")]
    InvalidTagName { name: String },

    /// Reconstruction met a value where a populated container already lives
    #[error("conflicting structure at {path}")]
    StructuralConflict { path: String },

    #[error(transparent)]
    Tree(#[from] TreeError),
}

impl ConvertError {
    pub(crate) fn invalid_path(path: &str) -> Self {
        ConvertError::InvalidPathSyntax {
            path: path.to_string(),
        }
    }

    pub(crate) fn invalid_tag(name: &str) -> Self {
        ConvertError::InvalidTagName {
            name: name.to_string(),
        }
    }
}
