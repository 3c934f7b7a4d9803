//! XML Tree - mutable arena-based DOM
//!
//! Efficient tree storage with:
//! - Arena allocation for nodes (element, attribute, text all share it)
//! - NodeId indices for traversal
//! - String interning for names
//!
//! Nodes are created detached and linked with `append_child`, which is the
//! only way the shape of the tree changes.

use super::node::{NodeId, NodeKind, XmlNode};
use super::strings::StringPool;
use crate::error::TreeError;

/// How a leaf value is stored under an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueFormat {
    /// Plain text, escaped when serialized
    #[default]
    Escaped,
    /// Marked literal (CDATA section), written verbatim
    Literal,
}

/// An XML tree stored in arena format
#[derive(Debug)]
pub struct XmlTree {
    /// Arena of nodes; index 0 is the document node
    nodes: Vec<XmlNode>,
    /// Interned element and attribute names
    pub strings: StringPool,
    /// Released arena slots, reused before the arena grows
    free: Vec<NodeId>,
}

impl Default for XmlTree {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlTree {
    /// Document node ID (always the first arena slot)
    pub const DOCUMENT: NodeId = 0;

    /// Create an empty tree holding only the document node
    pub fn new() -> Self {
        let mut nodes = Vec::with_capacity(64);
        nodes.push(XmlNode::document());
        XmlTree {
            nodes,
            strings: StringPool::new(),
            free: Vec::new(),
        }
    }

    /// True when the document has no content at all
    pub fn is_empty(&self) -> bool {
        !self.nodes[Self::DOCUMENT as usize].has_children()
    }

    fn push(&mut self, node: XmlNode) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.nodes[id as usize] = node;
            return id;
        }
        let id = self.nodes.len() as NodeId;
        self.nodes.push(node);
        id
    }

    /// Return a detached node and everything below it to the free list.
    /// Handles into the released subtree must not be used afterwards.
    fn release(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = std::mem::replace(&mut self.nodes[current as usize], XmlNode::released());
            stack.extend(node.attrs);
            let mut child = node.first_child;
            while let Some(c) = child {
                child = self.nodes[c as usize].next_sibling;
                stack.push(c);
            }
            self.free.push(current);
        }
    }

    fn node(&self, id: NodeId) -> Result<&XmlNode, TreeError> {
        self.nodes.get(id as usize).ok_or(TreeError::NoSuchNode(id))
    }

    /// Create a detached element
    pub fn create_element(&mut self, name: &str) -> NodeId {
        let name_id = self.strings.intern(name);
        self.push(XmlNode::element(name_id))
    }

    /// Create a detached attribute without a value
    pub fn create_attribute(&mut self, name: &str) -> NodeId {
        let name_id = self.strings.intern(name);
        self.push(XmlNode::attribute(name_id))
    }

    /// Append `child` to `parent`.
    ///
    /// Attributes are attached to the owner element's attribute list,
    /// replacing an attribute of the same name. Any other node is detached
    /// from its current position first and linked as the last child.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let parent_kind = self.node(parent)?.kind;
        let child_kind = self.node(child)?.kind;

        let allowed = match child_kind {
            NodeKind::Attribute => parent_kind == NodeKind::Element,
            NodeKind::Element => matches!(parent_kind, NodeKind::Document | NodeKind::Element),
            NodeKind::Text | NodeKind::CData => parent_kind == NodeKind::Element,
            NodeKind::Document => false,
        };
        if !allowed || self.is_ancestor_or_self(child, parent) {
            return Err(TreeError::HierarchyRequest {
                parent: kind_name(parent_kind).to_string(),
                child: kind_name(child_kind).to_string(),
            });
        }

        self.detach(child);

        if child_kind == NodeKind::Attribute {
            let name_id = self.nodes[child as usize].name_id;
            let existing = self.nodes[parent as usize]
                .attrs
                .iter()
                .position(|&a| self.nodes[a as usize].name_id == name_id);
            match existing {
                Some(pos) => {
                    let old = self.nodes[parent as usize].attrs[pos];
                    self.nodes[parent as usize].attrs[pos] = child;
                    self.release(old);
                }
                None => self.nodes[parent as usize].attrs.push(child),
            }
            self.nodes[child as usize].parent = Some(parent);
        } else {
            self.link_child(parent, child);
        }
        Ok(())
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == candidate {
                return true;
            }
            match self.nodes[node as usize].parent {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    /// Link a child node to its parent
    fn link_child(&mut self, parent_id: NodeId, child_id: NodeId) {
        // Get parent's last_child first to avoid borrow issues
        let last_child_opt = self.nodes[parent_id as usize].last_child;

        if let Some(last_child_id) = last_child_opt {
            // Link to previous sibling
            self.nodes[child_id as usize].prev_sibling = Some(last_child_id);
            self.nodes[last_child_id as usize].next_sibling = Some(child_id);
        } else {
            // First child
            self.nodes[parent_id as usize].first_child = Some(child_id);
        }
        self.nodes[parent_id as usize].last_child = Some(child_id);
        self.nodes[child_id as usize].parent = Some(parent_id);
    }

    /// Remove a node from wherever it is attached. The node stays in the arena.
    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.nodes[id as usize].parent.take() else {
            return;
        };

        if self.nodes[id as usize].is_attribute() {
            self.nodes[parent as usize].attrs.retain(|&a| a != id);
            return;
        }

        let prev = self.nodes[id as usize].prev_sibling.take();
        let next = self.nodes[id as usize].next_sibling.take();
        match prev {
            Some(p) => self.nodes[p as usize].next_sibling = next,
            None => self.nodes[parent as usize].first_child = next,
        }
        match next {
            Some(n) => self.nodes[n as usize].prev_sibling = prev,
            None => self.nodes[parent as usize].last_child = prev,
        }
    }

    /// Detach every child of a node and release their subtrees
    pub fn remove_children(&mut self, id: NodeId) {
        while let Some(child) = self.nodes.get(id as usize).and_then(|n| n.first_child) {
            self.detach(child);
            self.release(child);
        }
    }

    /// Assign a value to an element or attribute.
    ///
    /// For elements the existing children are replaced by a single text
    /// (or CDATA) child; `None` leaves the element empty.
    pub fn set_value(
        &mut self,
        id: NodeId,
        value: Option<&str>,
        format: ValueFormat,
    ) -> Result<(), TreeError> {
        match self.node(id)?.kind {
            NodeKind::Attribute => {
                self.nodes[id as usize].value = value.map(str::to_string);
            }
            NodeKind::Text | NodeKind::CData => {
                self.nodes[id as usize].value = Some(value.unwrap_or_default().to_string());
            }
            NodeKind::Element => {
                let text_kind = match format {
                    ValueFormat::Escaped => NodeKind::Text,
                    ValueFormat::Literal => NodeKind::CData,
                };
                let element = &self.nodes[id as usize];
                if let (Some(v), Some(only)) = (value, element.first_child) {
                    if element.last_child == Some(only)
                        && self.nodes[only as usize].kind == text_kind
                    {
                        self.nodes[only as usize].value = Some(v.to_string());
                        return Ok(());
                    }
                }
                self.remove_children(id);
                if let Some(v) = value {
                    let text = match format {
                        ValueFormat::Escaped => XmlNode::text(v.to_string()),
                        ValueFormat::Literal => XmlNode::cdata(v.to_string()),
                    };
                    let text_id = self.push(text);
                    self.link_child(id, text_id);
                }
            }
            NodeKind::Document => {
                return Err(TreeError::HierarchyRequest {
                    parent: kind_name(NodeKind::Document).to_string(),
                    child: kind_name(NodeKind::Text).to_string(),
                });
            }
        }
        Ok(())
    }

    /// Get the value of a node.
    ///
    /// Attributes yield their value; elements the concatenation of their
    /// descendant text, or None when they hold no text node at all.
    pub fn value_of(&self, id: NodeId) -> Option<String> {
        let node = self.get_node(id)?;
        match node.kind {
            NodeKind::Attribute | NodeKind::Text | NodeKind::CData => node.value.clone(),
            NodeKind::Element | NodeKind::Document => {
                let mut found = false;
                let mut result = String::new();
                for desc in self.descendants(id) {
                    let d = &self.nodes[desc as usize];
                    if d.is_text() {
                        found = true;
                        result.push_str(d.value.as_deref().unwrap_or(""));
                    }
                }
                found.then_some(result)
            }
        }
    }

    /// Get a node by ID
    pub fn get_node(&self, id: NodeId) -> Option<&XmlNode> {
        self.nodes.get(id as usize)
    }

    /// Get node name as string (elements and attributes)
    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        let node = self.get_node(id)?;
        match node.kind {
            NodeKind::Element | NodeKind::Attribute => self.strings.get_str(node.name_id),
            _ => None,
        }
    }

    /// Get the parent (or owner element) of a node
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id)?.parent
    }

    /// Get attribute nodes of an element
    pub fn attributes(&self, id: NodeId) -> &[NodeId] {
        self.get_node(id).map(|n| n.attrs.as_slice()).unwrap_or(&[])
    }

    /// Find an attribute node by name
    pub fn attribute(&self, element: NodeId, name: &str) -> Option<NodeId> {
        let name_id = self.strings.lookup(name)?;
        self.attributes(element)
            .iter()
            .copied()
            .find(|&a| self.nodes[a as usize].name_id == name_id)
    }

    /// Get attribute value by name
    pub fn get_attribute(&self, element: NodeId, name: &str) -> Option<&str> {
        let attr = self.attribute(element, name)?;
        self.nodes[attr as usize].value.as_deref()
    }

    /// Direct element children with the given name, in document order
    pub fn children_named(&self, id: NodeId, name: &str) -> Vec<NodeId> {
        let Some(name_id) = self.strings.lookup(name) else {
            return Vec::new();
        };
        self.children(id)
            .filter(|&c| {
                let node = &self.nodes[c as usize];
                node.is_element() && node.name_id == name_id
            })
            .collect()
    }

    /// Full structural path of a node.
    ///
    /// A `[n]` position is only rendered when the element has a same-named
    /// sibling; attributes render as `@name`.
    pub fn full_path(&self, id: NodeId) -> String {
        let mut parts: Vec<String> = Vec::new();
        let mut current = Some(id);

        while let Some(cid) = current {
            let Some(node) = self.get_node(cid) else {
                break;
            };
            match node.kind {
                NodeKind::Document => break,
                NodeKind::Attribute => {
                    parts.push(format!("@{}", self.node_name(cid).unwrap_or("")));
                }
                NodeKind::Element => {
                    let name = self.node_name(cid).unwrap_or("");
                    match self.sibling_position(cid) {
                        Some(pos) => parts.push(format!("{}[{}]", name, pos)),
                        None => parts.push(name.to_string()),
                    }
                }
                NodeKind::Text | NodeKind::CData => parts.push("text()".to_string()),
            }
            current = node.parent;
        }

        let mut path = String::new();
        for part in parts.iter().rev() {
            path.push('/');
            path.push_str(part);
        }
        if path.is_empty() {
            path.push('/');
        }
        path
    }

    /// 1-based position among same-named siblings, or None if the name is unique
    fn sibling_position(&self, id: NodeId) -> Option<usize> {
        let node = &self.nodes[id as usize];
        let parent = node.parent?;
        let mut position = 0;
        let mut total = 0;
        for sibling in self.children(parent) {
            let s = &self.nodes[sibling as usize];
            if s.is_element() && s.name_id == node.name_id {
                total += 1;
                if sibling == id {
                    position = total;
                }
            }
        }
        (total > 1).then_some(position)
    }

    /// Iterate over children of a node
    pub fn children(&self, id: NodeId) -> ChildIter<'_> {
        let first = self.get_node(id).and_then(|n| n.first_child);
        ChildIter { tree: self, next: first }
    }

    /// Iterate over all descendants of a node (depth-first, document order)
    pub fn descendants(&self, id: NodeId) -> DescendantIter<'_> {
        // Initialize stack with all children in reverse order (so first is processed first)
        let mut stack = Vec::new();
        if let Some(node) = self.get_node(id) {
            let mut child_id = node.last_child;
            while let Some(cid) = child_id {
                stack.push(cid);
                child_id = self.get_node(cid).and_then(|n| n.prev_sibling);
            }
        }
        DescendantIter { tree: self, stack }
    }

    /// Number of allocated nodes, detached ones included. Released slots
    /// are not counted.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }
}

fn kind_name(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Document => "document",
        NodeKind::Element => "element",
        NodeKind::Attribute => "attribute",
        NodeKind::Text => "text",
        NodeKind::CData => "cdata",
    }
}

/// Iterator over child nodes
pub struct ChildIter<'a> {
    tree: &'a XmlTree,
    next: Option<NodeId>,
}

impl<'a> Iterator for ChildIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.get_node(current).and_then(|n| n.next_sibling);
        Some(current)
    }
}

/// Iterator over descendant nodes (depth-first)
pub struct DescendantIter<'a> {
    tree: &'a XmlTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for DescendantIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;

        // Add children to stack in reverse order (so first child is processed first)
        if let Some(node) = self.tree.get_node(current) {
            let mut child_id = node.last_child;
            while let Some(id) = child_id {
                self.stack.push(id);
                child_id = self.tree.get_node(id).and_then(|n| n.prev_sibling);
            }
        }

        Some(current)
    }
}

// =============================================================================
// DocumentAccess trait implementation
// =============================================================================

use super::DocumentAccess;

impl DocumentAccess for XmlTree {
    fn document_node_id(&self) -> NodeId {
        Self::DOCUMENT
    }

    fn get_node(&self, id: NodeId) -> Option<&XmlNode> {
        self.nodes.get(id as usize)
    }

    fn node_name(&self, id: NodeId) -> Option<&str> {
        XmlTree::node_name(self, id)
    }

    fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        XmlTree::parent_of(self, id)
    }

    fn attributes(&self, id: NodeId) -> &[NodeId] {
        XmlTree::attributes(self, id)
    }

    fn value_of(&self, id: NodeId) -> Option<String> {
        XmlTree::value_of(self, id)
    }

    fn full_path(&self, id: NodeId) -> String {
        XmlTree::full_path(self, id)
    }

    fn children_vec(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id).collect()
    }

    fn descendants_vec(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id).collect()
    }
}
