//! Arena-backed node tree
//!
//! All nodes of a document live in one `Vec<Node>` owned by the [`Tree`] and
//! refer to each other through [`NodeId`] indices. A parent owns its child
//! list through `first_child`, each child owns the rest of the list through
//! `next_sibling`, and `parent` is a plain back-link. Dropping the tree frees
//! every node at once, so a node can never be freed twice or outlive it.

use std::fmt;

use crate::error::{MarkupError, Result, StructureError};
use crate::reader::Attribute;

/// Index of a node inside its [`Tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// A named element of the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    name: String,
    value: Option<String>,
    attributes: Vec<Attribute>,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    next_sibling: Option<NodeId>,
}

impl Node {
    fn new(name: String, attributes: Vec<Attribute>) -> Self {
        Self {
            name,
            value: None,
            attributes,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Text read between this node's opening tag and the next tag
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// First attribute with the given name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn first_child(&self) -> Option<NodeId> {
        self.first_child
    }

    pub fn next_sibling(&self) -> Option<NodeId> {
        self.next_sibling
    }
}

/// A parsed document tree with exactly one root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Create a tree holding only a root node
    pub fn new(name: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        Self {
            nodes: vec![Node::new(name.into(), attributes)],
        }
    }

    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn root_node(&self) -> Option<&Node> {
        self.node(self.root())
    }

    /// Number of nodes, detached ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a node that is not linked anywhere yet
    pub fn create_node(&mut self, name: impl Into<String>, attributes: Vec<Attribute>) -> NodeId {
        self.nodes.push(Node::new(name.into(), attributes));
        NodeId(self.nodes.len() - 1)
    }

    /// Append `child` at the end of `parent`'s child list
    ///
    /// The parent keeps a link to its last child, so appending does not walk
    /// the sibling chain. Fails if either id is unknown, if `child` is the
    /// root or already has a parent, or if the link would close a cycle.
    pub fn attach_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let invalid = || MarkupError::from(StructureError::InvalidAttachment);

        if child == self.root() || self.node(parent).is_none() {
            return Err(invalid());
        }
        match self.node(child) {
            Some(node) if node.parent.is_none() => {}
            _ => return Err(invalid()),
        }
        if self.ancestors(parent).any(|id| id == child) {
            return Err(invalid());
        }

        let tail = self.node(parent).and_then(|node| node.last_child);
        match tail {
            Some(tail) => self.node_mut(tail)?.next_sibling = Some(child),
            None => self.node_mut(parent)?.first_child = Some(child),
        }
        self.node_mut(parent)?.last_child = Some(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// First child of `parent` named `name`, in insertion order
    ///
    /// Later siblings with the same name are never returned.
    pub fn find_child_by_name(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children(parent)
            .find(|&id| self.node(id).is_some_and(|node| node.name == name))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::parent)
    }

    /// Children of `id` in insertion order
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.node(id).and_then(Node::first_child),
        }
    }

    /// `id` itself, then its parent, up to the root
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.node(id).map(|_| id),
        }
    }

    /// Number of edges between `id` and the top of its tree
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count().saturating_sub(1)
    }

    pub fn set_value(&mut self, id: NodeId, value: impl Into<String>) -> Result<()> {
        self.node_mut(id)?.value = Some(value.into());
        Ok(())
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id.0)
            .ok_or_else(|| StructureError::InvalidAttachment.into())
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId, indent: usize) -> fmt::Result {
        let Some(node) = self.node(id) else {
            return Ok(());
        };
        write!(f, "{:indent$}{}", "", node.name, indent = indent * 2)?;
        if !node.attributes.is_empty() {
            let attrs: Vec<String> = node
                .attributes
                .iter()
                .map(|attr| format!("{}=\"{}\"", attr.name, attr.value))
                .collect();
            write!(f, " [{}]", attrs.join(", "))?;
        }
        if let Some(value) = &node.value {
            write!(f, " = {:?}", value)?;
        }
        writeln!(f)?;
        for child in self.children(id) {
            self.fmt_node(f, child, indent + 1)?;
        }
        Ok(())
    }
}

/// Indented outline of the tree, one node per line
impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, self.root(), 0)
    }
}

/// Iterator over a node's children
#[derive(Debug, Clone)]
pub struct Children<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.node(current).and_then(Node::next_sibling);
        Some(current)
    }
}

/// Iterator from a node up through its parents
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}
