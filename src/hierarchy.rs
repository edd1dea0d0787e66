//! Linked representation and conversions
//!
//! [`TreeNode`] is the conventional pointer-per-child shape, convenient to
//! build by hand and to hand to code that expects a recursive structure.
//! [`encode`] and [`decode`] convert between it and the flat encoding; both
//! run on an explicit stack, so conversion depth is bounded by heap, not by
//! the call stack.

use crate::encoded::EncodedTree;
use crate::slice::LazySlice;

/// A node of the linked representation: a value and its children in
/// left-to-right order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeNode<T> {
    /// Payload of this node.
    pub value: T,
    /// Direct children, leftmost first.
    pub children: Vec<TreeNode<T>>,
}

impl<T> TreeNode<T> {
    /// A node with children.
    pub fn new(value: T, children: Vec<TreeNode<T>>) -> Self {
        Self { value, children }
    }

    /// A node without children.
    pub fn leaf(value: T) -> Self {
        Self {
            value,
            children: Vec::new(),
        }
    }

    /// Whether this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Total number of nodes in this subtree, counted iteratively.
    pub fn size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

/// A tree in either representation.
///
/// Code that only reads through the facade can hold the encoded variant;
/// code that restructures heavily may prefer the linked one. Either way the
/// conversions are explicit and linear-time.
#[derive(Debug, Clone)]
pub enum Tree<T> {
    /// The flat slice-pair encoding.
    Encoded(EncodedTree<T>),
    /// The conventional linked shape.
    Linked(TreeNode<T>),
}

impl<T> Tree<T> {
    /// Number of nodes, whichever representation is held.
    pub fn len(&self) -> usize {
        match self {
            Tree::Encoded(tree) => tree.len(),
            Tree::Linked(node) => node.size(),
        }
    }

    /// Whether the tree holds no nodes. Only the encoded variant can be
    /// empty; a [`TreeNode`] is at least its own root.
    pub fn is_empty(&self) -> bool {
        match self {
            Tree::Encoded(tree) => tree.is_empty(),
            Tree::Linked(_) => false,
        }
    }

    /// Extract the linked shape, converting if needed.
    pub fn into_linked(self) -> Option<TreeNode<T>> {
        match self {
            Tree::Encoded(tree) => decode(&tree),
            Tree::Linked(node) => Some(node),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Tree<T> {
    /// Extract the flat encoding, converting if needed.
    pub fn into_encoded(self) -> EncodedTree<T> {
        match self {
            Tree::Encoded(tree) => tree,
            Tree::Linked(node) => encode(&node),
        }
    }
}

/// Flatten a linked tree into the slice-pair encoding.
///
/// Children are emitted before their parent and siblings left to right, so
/// the result places every subtree in a contiguous range with the root at
/// the last index. The walk keeps a stack of (node, next-child cursor)
/// pairs instead of recursing.
pub fn encode<T: Clone + Send + Sync + 'static>(root: &TreeNode<T>) -> EncodedTree<T> {
    let mut structure = Vec::new();
    let mut values = Vec::new();
    let mut stack: Vec<(&TreeNode<T>, usize)> = vec![(root, 0)];
    loop {
        let (node, cursor) = match stack.last_mut() {
            Some(top) => {
                let pair = *top;
                if pair.1 < pair.0.children.len() {
                    top.1 += 1;
                }
                pair
            }
            None => break,
        };
        if cursor < node.children.len() {
            stack.push((&node.children[cursor], 0));
        } else {
            structure.push(node.children.len());
            values.push(node.value.clone());
            stack.pop();
        }
    }
    EncodedTree::from_frozen(LazySlice::from_vec(structure), LazySlice::from_vec(values))
}

/// Rebuild the linked shape from an encoding; `None` for the empty tree.
///
/// A single forward pass: each position's children are exactly the last
/// `count` completed subtrees, so a stack of finished nodes and one
/// `split_off` per position reassemble the tree bottom-up.
pub fn decode<T>(tree: &EncodedTree<T>) -> Option<TreeNode<T>> {
    let mut stack: Vec<TreeNode<T>> = Vec::new();
    for (count, value) in tree.structure().iter().zip(tree.values().iter()) {
        assert!(count <= stack.len(), "corrupt encoding");
        let children = stack.split_off(stack.len() - count);
        stack.push(TreeNode { value, children });
    }
    stack.pop()
}
