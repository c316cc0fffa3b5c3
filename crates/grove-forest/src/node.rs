//! Tree nodes for categorical decision trees.

use std::collections::BTreeMap;

use crate::item::{AttributeValue, Item, Label};

/// A node in a categorical decision tree.
///
/// Children of a split are keyed by the category code observed during
/// training, so a tree is a finite, acyclic tree of mappings.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Node {
    /// A terminal node.
    Leaf {
        /// Majority label of the training subset that reached this node.
        label: Label,
    },
    /// An interior decision node.
    Split {
        /// Attribute tested at this node.
        attribute: String,
        /// One child per category code seen in training.
        children: BTreeMap<AttributeValue, Node>,
        /// Majority label at this node, used for codes with no child.
        default_label: Label,
    },
}

impl Node {
    /// Create a leaf.
    #[must_use]
    pub fn leaf(label: Label) -> Self {
        Node::Leaf { label }
    }

    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Walk from this node to a label for `item`.
    ///
    /// A split whose attribute is missing from `item`, or whose value has no
    /// child, answers with its default label.
    #[must_use]
    pub fn evaluate(&self, item: &Item) -> Label {
        let mut node = self;
        loop {
            match node {
                Node::Leaf { label } => return *label,
                Node::Split {
                    attribute,
                    children,
                    default_label,
                } => match item.value(attribute).and_then(|v| children.get(&v)) {
                    Some(child) => node = child,
                    None => return *default_label,
                },
            }
        }
    }

    /// Number of nodes in the subtree rooted here.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Split { children, .. } => 1 + children.values().map(Node::n_nodes).sum::<usize>(),
        }
    }

    /// Number of leaves in the subtree rooted here.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Split { children, .. } => children.values().map(Node::n_leaves).sum(),
        }
    }

    /// Depth of the subtree rooted here; a leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Split { children, .. } => {
                1 + children.values().map(Node::depth).max().unwrap_or(0)
            }
        }
    }
}
