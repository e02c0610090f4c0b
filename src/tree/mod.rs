//! Rooted phylogenetic tree stored as an arena of nodes.
//!
//! Nodes live in a contiguous vector and refer to each other by [NodeIndex]:
//! a node owns the ordered list of its children's indices and keeps a plain
//! index back to its parent. Topology is fixed once the tree is built; all
//! per-node analysis state is held outside the tree in arrays indexed by
//! [NodeIndex].

pub mod newick;

use std::collections::HashSet;

pub use newick::{parse_newick, read_newick, NewickError};

/// Index of a node in a [Tree].
pub type NodeIndex = usize;

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    index: NodeIndex,
    label: Option<String>,
    edge_length: Option<f64>,
    parent: Option<NodeIndex>,
    children: Vec<NodeIndex>,
}

impl Node {
    fn new(index: NodeIndex, parent: Option<NodeIndex>) -> Self {
        Self {
            index,
            label: None,
            edge_length: None,
            parent,
            children: Vec::new(),
        }
    }

    pub fn index(&self) -> NodeIndex {
        self.index
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Length of the edge to the parent, if the input supplied one.
    pub fn edge_length(&self) -> Option<f64> {
        self.edge_length
    }

    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// A rooted tree with any number of children per node.
///
/// The root always exists, so a tree has at least one node. Nodes are only
/// ever appended (see [`Tree::add_child`]), which keeps every index stable.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeIndex,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Creates a tree consisting of a single unlabeled root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(0, None)],
            root: 0,
        }
    }

    /// Appends a new unlabeled child to `parent` and returns its index.
    ///
    /// # Panics
    /// Panics if `parent` is not a node of this tree.
    pub fn add_child(&mut self, parent: NodeIndex) -> NodeIndex {
        let index = self.nodes.len();
        self.nodes[parent].children.push(index);
        self.nodes.push(Node::new(index, Some(parent)));
        index
    }

    pub fn set_label(&mut self, index: NodeIndex, label: impl Into<String>) {
        self.nodes[index].label = Some(label.into());
    }

    pub fn set_edge_length(&mut self, index: NodeIndex, edge_length: f64) {
        self.nodes[index].edge_length = Some(edge_length);
    }

    pub fn root_index(&self) -> NodeIndex {
        self.root
    }

    pub fn root(&self) -> &Node {
        &self.nodes[self.root]
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_leaves(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf()).count()
    }

    /// Labeled nodes in preorder, one per distinct label.
    ///
    /// When a label occurs more than once the first node in preorder wins.
    pub fn labeled_nodes(&self) -> Vec<NodeIndex> {
        let mut seen = HashSet::new();
        self.preorder()
            .filter_map(|node| node.label().map(|label| (node.index(), label)))
            .filter(|(_, label)| seen.insert(*label))
            .map(|(index, _)| index)
            .collect()
    }

    /// Number of labels that occur on more than one node.
    pub fn duplicate_labels(&self) -> usize {
        let mut seen = HashSet::new();
        let mut duplicated = HashSet::new();
        for label in self.nodes.iter().filter_map(Node::label) {
            if !seen.insert(label) {
                duplicated.insert(label);
            }
        }
        duplicated.len()
    }

    /// Iterates over all nodes, children before their parent.
    pub fn postorder(&self) -> PostOrderIter<'_> {
        PostOrderIter::new(self)
    }

    /// Iterates over all nodes, parents before their children.
    pub fn preorder(&self) -> PreOrderIter<'_> {
        PreOrderIter::new(self)
    }
}

impl std::ops::Index<NodeIndex> for Tree {
    type Output = Node;

    fn index(&self, index: NodeIndex) -> &Self::Output {
        &self.nodes[index]
    }
}

/// Stack-based post-order traversal; children are visited in stored order.
pub struct PostOrderIter<'a> {
    tree: &'a Tree,
    stack: Vec<(NodeIndex, bool)>, // (index, children_pushed)
}

impl<'a> PostOrderIter<'a> {
    fn new(tree: &'a Tree) -> Self {
        Self {
            tree,
            stack: vec![(tree.root, false)],
        }
    }
}

impl<'a> Iterator for PostOrderIter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((index, children_pushed)) = self.stack.pop() {
            let node = &self.tree.nodes[index];
            if children_pushed || node.is_leaf() {
                return Some(node);
            }
            self.stack.push((index, true));
            // Reverse so the first child is popped first
            self.stack
                .extend(node.children.iter().rev().map(|&child| (child, false)));
        }
        None
    }
}

/// Stack-based pre-order traversal; children are visited in stored order.
pub struct PreOrderIter<'a> {
    tree: &'a Tree,
    stack: Vec<NodeIndex>,
}

impl<'a> PreOrderIter<'a> {
    fn new(tree: &'a Tree) -> Self {
        Self {
            tree,
            stack: vec![tree.root],
        }
    }
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let node = &self.tree.nodes[index];
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
