//! The frozen, immutable encoded tree
//!
//! An [`EncodedTree`] is a pair of equal-length lazy views - child counts
//! and values, root at the last index - validated once at construction and
//! never written again. Because every subtree is a contiguous range of the
//! encoding, [`EncodedTree::subtree`] is O(1) structural sharing: no copy,
//! just a narrower window over the same backing arrays.
//!
//! Mutation goes through [`TreeBuf`]: thaw a copy with
//! [`EncodedTree::to_buf`], edit, freeze again.

use std::fmt;

use crate::algebra;
use crate::mutate::TreeBuf;
use crate::slice::LazySlice;
use crate::traverse::{self, BranchIndexIter, NodeIndexIter, PathTrace};
use crate::TreeResult;

/// An immutable tree encoded as parallel structure/value sequences.
///
/// Cloning shares the backing arrays; it never copies elements.
pub struct EncodedTree<T> {
    structure: LazySlice<usize>,
    values: LazySlice<T>,
}

impl<T> Clone for EncodedTree<T> {
    fn clone(&self) -> Self {
        Self {
            structure: self.structure.clone(),
            values: self.values.clone(),
        }
    }
}

impl<T> EncodedTree<T> {
    /// The empty tree - explicitly distinguished, never encoded as a node.
    pub fn empty() -> Self {
        Self {
            structure: LazySlice::empty(),
            values: LazySlice::empty(),
        }
    }

    /// Wrap already-validated views; used when freezing buffers and when
    /// slicing subtrees, both of which preserve well-formedness.
    pub(crate) fn from_frozen(structure: LazySlice<usize>, values: LazySlice<T>) -> Self {
        Self { structure, values }
    }

    /// Number of encoded nodes.
    pub fn len(&self) -> usize {
        self.structure.len()
    }

    /// Whether this is the empty tree.
    pub fn is_empty(&self) -> bool {
        self.structure.is_empty()
    }

    /// Index of the root node, if any - always the last index.
    pub fn root_index(&self) -> Option<usize> {
        self.len().checked_sub(1)
    }

    /// The structure sequence: child count per node.
    pub fn structure(&self) -> &LazySlice<usize> {
        &self.structure
    }

    /// The value sequence.
    pub fn values(&self) -> &LazySlice<T> {
        &self.values
    }

    /// The value of the node at `index`.
    pub fn value(&self, index: usize) -> TreeResult<T> {
        self.values.get(index)
    }

    /// The root value, if any.
    pub fn root_value(&self) -> Option<T> {
        self.values.last()
    }

    /// Size of the subtree rooted at `index`.
    pub fn size_of(&self, index: usize) -> TreeResult<usize> {
        algebra::tree_size(&self.structure, index)
    }

    /// Lowest index of the subtree rooted at `index`.
    pub fn bottom_of(&self, index: usize) -> TreeResult<usize> {
        algebra::bottom_index(&self.structure, index)
    }

    /// Parent of the node at `index`; `None` for the root.
    pub fn parent_of(&self, index: usize) -> Option<usize> {
        algebra::parent_index(&self.structure, index)
    }

    /// Children of the node at `index`, left to right.
    pub fn children_of(&self, index: usize) -> TreeResult<Vec<usize>> {
        algebra::children_indexes(&self.structure, index)
    }

    /// The subtree rooted at `index` as a tree of its own.
    ///
    /// O(1): the subtree is the contiguous range `[bottom_of(index), index]`
    /// of this encoding, so the result is two narrower views over the same
    /// backing arrays.
    pub fn subtree(&self, index: usize) -> TreeResult<EncodedTree<T>> {
        let bottom = self.bottom_of(index)?;
        Ok(Self {
            structure: self.structure.slice(bottom, index + 1),
            values: self.values.slice(bottom, index + 1),
        })
    }

    /// Depth-first preorder iterator over node indices.
    pub fn node_indexes(&self) -> NodeIndexIter<'_, LazySlice<usize>> {
        match self.root_index() {
            Some(root) => NodeIndexIter::new(&self.structure, root),
            None => NodeIndexIter::new(&self.structure, 0),
        }
    }

    /// As [`EncodedTree::node_indexes`], descending at most `max_depth`
    /// levels below the root.
    pub fn node_indexes_limited(&self, max_depth: usize) -> NodeIndexIter<'_, LazySlice<usize>> {
        let start = self.root_index().unwrap_or(0);
        NodeIndexIter::with_limit(&self.structure, start, Some(max_depth))
    }

    /// Preorder iterator over values passing `filter`, with an optional
    /// depth limit.
    pub fn values_where<'a>(
        &'a self,
        max_depth: Option<usize>,
        filter: impl Fn(&T) -> bool + 'a,
    ) -> impl Iterator<Item = T> + 'a {
        let start = self.root_index().unwrap_or(0);
        NodeIndexIter::with_limit(&self.structure, start, max_depth)
            .filter_map(move |index| self.values.get(index).ok())
            .filter(move |value| filter(value))
    }

    /// Iterator over branches as index paths, left to right.
    pub fn branches(&self, max_depth: Option<usize>) -> BranchIndexIter<'_, LazySlice<usize>> {
        let start = self.root_index().unwrap_or(0);
        BranchIndexIter::new(&self.structure, start, max_depth)
    }

    /// Iterator over branches as value paths, left to right.
    pub fn branch_values(&self, max_depth: Option<usize>) -> impl Iterator<Item = Vec<T>> + '_ {
        self.branches(max_depth)
            .map(|path| path.iter().filter_map(|&i| self.values.get(i).ok()).collect())
    }

    /// Fold every branch, left to right, without allocating a path per
    /// branch.
    pub fn fold_branches<A>(
        &self,
        max_depth: Option<usize>,
        init: A,
        f: impl FnMut(A, &[usize]) -> A,
    ) -> A {
        let start = self.root_index().unwrap_or(0);
        traverse::fold_branches(&self.structure, start, max_depth, init, f)
    }

    /// Walk `items` down from the root, matching each against children by
    /// the key extracted with `key`.
    pub fn trace_path<K, I>(
        &self,
        items: I,
        key: impl Fn(&T) -> K,
    ) -> TreeResult<PathTrace<K, I::IntoIter>>
    where
        K: PartialEq,
        I: IntoIterator<Item = K>,
    {
        match self.root_index() {
            Some(root) => traverse::follow_path(&self.structure, root, items, |index| {
                key(&(self.values.get(index)).unwrap_or_else(|_| {
                    unreachable!("traversal stays within the validated encoding")
                }))
            }),
            None => {
                let mut items = items.into_iter();
                Ok(PathTrace {
                    visited: Vec::new(),
                    unmatched: items.next(),
                    remaining: items,
                    at_leaf: false,
                })
            }
        }
    }

    /// Whether `items` spells out a complete root-to-leaf branch.
    pub fn contains_branch<K, I>(&self, items: I, key: impl Fn(&T) -> K) -> TreeResult<bool>
    where
        K: PartialEq,
        I: IntoIterator<Item = K>,
    {
        Ok(self.trace_path(items, key)?.is_branch())
    }

    /// Whether `items` spells out a path from the root, leaf or not.
    pub fn contains_path<K, I>(&self, items: I, key: impl Fn(&T) -> K) -> TreeResult<bool>
    where
        K: PartialEq,
        I: IntoIterator<Item = K>,
    {
        Ok(self.trace_path(items, key)?.fully_matched())
    }

    /// Thaw into a fresh mutable buffer pair holding a copy of this tree.
    pub fn to_buf(&self) -> TreeBuf<T> {
        TreeBuf {
            structure: crate::buffer::StructureBuf::from_vec(self.structure.to_vec()),
            values: crate::buffer::ValueBuf::from_vec(self.values.to_vec()),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> EncodedTree<T> {
    /// Build and validate a tree from its raw sequence pair.
    ///
    /// Fails with [`crate::TreeError::LengthMismatch`] on unequal lengths
    /// and with [`crate::TreeError::IncompleteTree`] when the declared child
    /// counts do not account for exactly the whole encoding.
    pub fn from_parts(structure: Vec<usize>, values: Vec<T>) -> TreeResult<Self> {
        Ok(TreeBuf::from_parts(structure, values)?.freeze())
    }
}

impl<T: PartialEq> PartialEq for EncodedTree<T> {
    fn eq(&self, other: &Self) -> bool {
        self.structure == other.structure && self.values == other.values
    }
}

impl<T: Eq> Eq for EncodedTree<T> {}

impl<T: fmt::Debug> fmt::Debug for EncodedTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedTree")
            .field("structure", &self.structure)
            .field("values", &self.values)
            .finish()
    }
}

impl<T: fmt::Display> fmt::Display for EncodedTree<T> {
    /// One line per branch, values separated by `/`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "(empty)");
        }
        let rendered = self.fold_branches(None, String::new(), |mut out, path| {
            if !out.is_empty() {
                out.push('\n');
            }
            for (position, &index) in path.iter().enumerate() {
                if position > 0 {
                    out.push_str(" / ");
                }
                if let Ok(value) = self.values.get(index) {
                    use fmt::Write;
                    let _ = write!(out, "{value}");
                }
            }
            out
        });
        f.write_str(&rendered)
    }
}

#[cfg(feature = "visualize")]
impl<T: serde::Serialize> serde::Serialize for EncodedTree<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("EncodedTree", 2)?;
        state.serialize_field("structure", &self.structure.to_vec())?;
        state.serialize_field("values", &self.values.to_vec())?;
        state.end()
    }
}
