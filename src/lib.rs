//! # Pointer-Free Linear Tree Encoding
//!
//! This library stores rooted, ordered, multi-child trees as two flat,
//! parallel sequences instead of a graph of linked nodes:
//!
//! 1. **Structure sequence**: `structure[i]` is the number of direct
//!    children of the node at position `i`; the root sits at the last index.
//! 2. **Value sequence**: `values[i]` carries the payload of that node.
//! 3. **Contiguous subtrees**: every subtree occupies the index range
//!    `[bottom_index(i), i]`, so slicing a subtree is O(1).
//! 4. **Iterative algorithms**: traversal and mutation run on explicit
//!    stacks and worklists, never native recursion, so depth is bounded by
//!    heap rather than call stack.
//!
//! Result: no per-node allocation, cheap structural sharing, and a pair of
//! flat arrays that can be copied, sliced and persisted directly.
//!
//! ## Usage Example
//!
//! ```
//! use linden::TreeNode;
//!
//! let root = TreeNode::new("a", vec![
//!     TreeNode::leaf("b"),
//!     TreeNode::new("c", vec![TreeNode::leaf("d")]),
//! ]);
//! let tree = linden::hierarchy::encode(&root);
//! assert_eq!(tree.len(), 4);
//! assert_eq!(tree.root_value(), Some("a"));
//!
//! // The subtree rooted at "c" is a contiguous slice of the encoding.
//! let c = tree.children_of(tree.root_index().unwrap()).unwrap()[1];
//! assert_eq!(tree.subtree(c).unwrap().root_value(), Some("c"));
//! ```

#![warn(missing_docs, missing_debug_implementations)]
#![allow(clippy::new_without_default)]

// Core modules - each implements one component of the encoding engine
pub mod algebra; // index arithmetic over the structure sequence
pub mod buffer; // growable buffers backing the two arrays
pub mod encoded; // the frozen, immutable slice-pair tree
pub mod hierarchy; // linked representation and conversions
pub mod mutate; // in-place mutation engine
pub mod slice; // lazy zero-copy views
pub mod traverse; // iterative node/branch/path traversal

// Re-exports for convenience
pub use buffer::{StructureBuf, ValueBuf};
pub use encoded::EncodedTree;
pub use hierarchy::{Tree, TreeNode};
pub use mutate::TreeBuf;
pub use slice::LazySlice;
pub use traverse::PathTrace;

use thiserror::Error;

/// Errors raised by the encoding engine.
///
/// Every fallible operation validates before its first write, so any error
/// below leaves the underlying buffers exactly as they were.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Index outside the encoded range - a recoverable precondition
    /// violation.
    #[error("index {index} out of bounds for tree of size {size}")]
    IndexOutOfBounds {
        /// The offending index.
        index: usize,
        /// Size of the sequence that was indexed.
        size: usize,
    },

    /// The structure sequence declares children that are not present - a
    /// corrupt or truncated encoding, not a transient condition.
    #[error("incomplete encoding: walked {walked} nodes with {missing} declared children missing")]
    IncompleteTree {
        /// Number of nodes accounted for before the walk ran out of room.
        walked: usize,
        /// Number of declared children still unaccounted for.
        missing: usize,
    },

    /// Structure and value sequences must always have equal length.
    #[error("structure length {structure} does not match value length {values}")]
    LengthMismatch {
        /// Length of the structure sequence.
        structure: usize,
        /// Length of the value sequence.
        values: usize,
    },

    /// Inserting relative to a node of an empty tree is meaningless.
    #[error("cannot insert at index {index} of an empty tree")]
    EmptyTreeInsert {
        /// The index the caller asked for.
        index: usize,
    },

    /// Removing a root with more than one child has no unambiguous result;
    /// the engine refuses rather than picking an arbitrary replacement.
    #[error("cannot remove root with {children} children: replacement is ambiguous")]
    AmbiguousRootRemoval {
        /// Number of children the root had.
        children: usize,
    },

    /// A merge recipient nested inside the donor must be one of the donor's
    /// direct children; anything deeper would reparent a node under its own
    /// descendant.
    #[error("merge recipient {recipient} is nested in donor {donor} but is not a direct child")]
    InvalidMergeTarget {
        /// Index of the would-be recipient.
        recipient: usize,
        /// Index of the donor.
        donor: usize,
    },
}

/// Shorthand for results produced by this crate.
pub type TreeResult<T> = Result<T, TreeError>;
