//! Linear tree index algebra
//!
//! Pure arithmetic over the structure sequence alone: no tree is ever
//! materialized, no pointers are stored. Every relationship - subtree size,
//! subtree bottom, parent, children - is recovered from child counts.
//!
//! The encoding reads like postfix notation: children occupy a contiguous
//! block immediately before their parent, partitioned right-to-left into one
//! sub-block per child. The node at `parent - 1` is therefore always the
//! last (rightmost) child, and every subtree is the contiguous range
//! `[bottom_index(i), i]`.

use crate::buffer::StructureBuf;
use crate::slice::LazySlice;
use crate::{TreeError, TreeResult};

/// Read access to a child-count sequence.
///
/// The seam between the algebra and whatever holds the counts: buffers,
/// frozen slices and plain slices all qualify. `count` is total - out of
/// range means "no node here" and reads as zero.
pub trait StructureRead {
    /// Number of encoded nodes.
    fn len(&self) -> usize;

    /// Child count at `index`; `0` when out of range.
    fn count(&self, index: usize) -> usize;

    /// Whether the sequence encodes no nodes at all.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StructureRead for StructureBuf {
    fn len(&self) -> usize {
        StructureBuf::len(self)
    }

    fn count(&self, index: usize) -> usize {
        self.get(index)
    }
}

impl StructureRead for LazySlice<usize> {
    fn len(&self) -> usize {
        LazySlice::len(self)
    }

    fn count(&self, index: usize) -> usize {
        self.get(index).unwrap_or(0)
    }
}

impl StructureRead for [usize] {
    fn len(&self) -> usize {
        <[usize]>::len(self)
    }

    fn count(&self, index: usize) -> usize {
        self.get(index).copied().unwrap_or(0)
    }
}

/// Size of the subtree rooted at `index`.
///
/// Walks backward with a required-nodes counter: each step consumes one
/// position and adds that position's own child count. A walk that reaches
/// position 0 with children still owed is a corrupt encoding and fails with
/// [`TreeError::IncompleteTree`].
pub fn tree_size<S: StructureRead + ?Sized>(structure: &S, index: usize) -> TreeResult<usize> {
    if index >= structure.len() {
        return Err(TreeError::IndexOutOfBounds {
            index,
            size: structure.len(),
        });
    }
    let mut remaining = structure.count(index);
    let mut size = 1;
    let mut pos = index;
    while remaining > 0 {
        if pos == 0 {
            return Err(TreeError::IncompleteTree {
                walked: size,
                missing: remaining,
            });
        }
        pos -= 1;
        size += 1;
        remaining = remaining - 1 + structure.count(pos);
    }
    Ok(size)
}

/// Lowest (leftmost) index of the subtree rooted at `index`, so that the
/// subtree occupies exactly `[bottom_index(index), index]`.
pub fn bottom_index<S: StructureRead + ?Sized>(structure: &S, index: usize) -> TreeResult<usize> {
    Ok(index + 1 - tree_size(structure, index)?)
}

/// Parent of the node at `index`; `None` for the root or an out-of-range
/// index.
///
/// Walks forward keeping a count of completed subtrees sitting between
/// `index` and the candidate. A candidate whose child count reaches past
/// those intervening subtrees must consume the subtree at `index` as well,
/// making it the parent.
pub fn parent_index<S: StructureRead + ?Sized>(structure: &S, index: usize) -> Option<usize> {
    let len = structure.len();
    if index + 1 >= len {
        return None;
    }
    let mut between = 0usize;
    for candidate in index + 1..len {
        let count = structure.count(candidate);
        if count > between {
            return Some(candidate);
        }
        between = between - count + 1;
    }
    None
}

/// Indices of the direct children of `parent`, in left-to-right sibling
/// order.
///
/// The rightmost child is always at `parent - 1`; each earlier sibling is
/// found by skipping back over the full subtree of the one after it.
pub fn children_indexes<S: StructureRead + ?Sized>(
    structure: &S,
    parent: usize,
) -> TreeResult<Vec<usize>> {
    if parent >= structure.len() {
        return Err(TreeError::IndexOutOfBounds {
            index: parent,
            size: structure.len(),
        });
    }
    let n = structure.count(parent);
    let mut children = Vec::with_capacity(n);
    let mut pos = parent;
    for _ in 0..n {
        if pos == 0 {
            return Err(TreeError::IncompleteTree {
                walked: children.len(),
                missing: n - children.len(),
            });
        }
        pos -= 1;
        children.push(pos);
        pos = pos + 1 - tree_size(structure, pos)?;
    }
    children.reverse();
    Ok(children)
}

/// Write the children of `parent` into `out` starting at `at`, left to
/// right, returning how many were written.
///
/// The allocation-free counterpart of [`children_indexes`] for callers that
/// reuse a scratch buffer across many nodes.
pub fn write_children_indexes<S: StructureRead + ?Sized>(
    structure: &S,
    parent: usize,
    out: &mut StructureBuf,
    at: usize,
) -> TreeResult<usize> {
    if parent >= structure.len() {
        return Err(TreeError::IndexOutOfBounds {
            index: parent,
            size: structure.len(),
        });
    }
    let n = structure.count(parent);
    let mut pos = parent;
    // discovery runs right-to-left, so the k-th discovered child lands at
    // the mirrored output position
    for discovered in 0..n {
        if pos == 0 {
            return Err(TreeError::IncompleteTree {
                walked: discovered,
                missing: n - discovered,
            });
        }
        pos -= 1;
        out.set(at + n - 1 - discovered, pos);
        pos = pos + 1 - tree_size(structure, pos)?;
    }
    Ok(n)
}

/// Leftmost (first in sibling order) child of `parent` matching `pred`.
pub fn leftmost_child_where<S: StructureRead + ?Sized>(
    structure: &S,
    parent: usize,
    mut pred: impl FnMut(usize) -> bool,
) -> TreeResult<Option<usize>> {
    // discovery order is right-to-left, so the leftmost match is the last
    // match discovered
    let mut found = None;
    visit_children_rightmost_first(structure, parent, |child| {
        if pred(child) {
            found = Some(child);
        }
        true
    })?;
    Ok(found)
}

/// Rightmost (last in sibling order) child of `parent` matching `pred`.
///
/// The distinct-children mutation policies use this direction deliberately:
/// when duplicates exist, the later sibling wins as the merge target.
pub fn rightmost_child_where<S: StructureRead + ?Sized>(
    structure: &S,
    parent: usize,
    mut pred: impl FnMut(usize) -> bool,
) -> TreeResult<Option<usize>> {
    let mut found = None;
    visit_children_rightmost_first(structure, parent, |child| {
        if pred(child) {
            found = Some(child);
            return false;
        }
        true
    })?;
    Ok(found)
}

/// Visit children in natural discovery order (rightmost first); the visitor
/// returns `false` to stop early.
fn visit_children_rightmost_first<S: StructureRead + ?Sized>(
    structure: &S,
    parent: usize,
    mut visit: impl FnMut(usize) -> bool,
) -> TreeResult<()> {
    if parent >= structure.len() {
        return Err(TreeError::IndexOutOfBounds {
            index: parent,
            size: structure.len(),
        });
    }
    let n = structure.count(parent);
    let mut pos = parent;
    for visited in 0..n {
        if pos == 0 {
            return Err(TreeError::IncompleteTree {
                walked: visited,
                missing: n - visited,
            });
        }
        pos -= 1;
        if !visit(pos) {
            return Ok(());
        }
        pos = pos + 1 - tree_size(structure, pos)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // root -> (a, b -> (c, d)); postfix layout: [a, c, d, b, root]
    const STRUCTURE: [usize; 5] = [0, 0, 0, 2, 2];

    #[test]
    fn tree_size_accumulates_backward() {
        let s: &[usize] = &STRUCTURE;
        assert_eq!(tree_size(s, 4), Ok(5));
        assert_eq!(tree_size(s, 3), Ok(3));
        assert_eq!(tree_size(s, 0), Ok(1));
    }

    #[test]
    fn tree_size_detects_truncated_encodings() {
        // a root declaring two children with only one present
        let s: &[usize] = &[0, 2];
        assert_eq!(
            tree_size(s, 1),
            Err(TreeError::IncompleteTree {
                walked: 2,
                missing: 1
            })
        );
    }

    #[test]
    fn subtree_ranges_are_contiguous() {
        let s: &[usize] = &STRUCTURE;
        assert_eq!(bottom_index(s, 4), Ok(0));
        assert_eq!(bottom_index(s, 3), Ok(1));
        assert_eq!(bottom_index(s, 2), Ok(2));
    }

    #[test]
    fn parent_walk_recovers_every_edge() {
        let s: &[usize] = &STRUCTURE;
        assert_eq!(parent_index(s, 0), Some(4));
        assert_eq!(parent_index(s, 1), Some(3));
        assert_eq!(parent_index(s, 2), Some(3));
        assert_eq!(parent_index(s, 3), Some(4));
        assert_eq!(parent_index(s, 4), None, "root has no parent");
        assert_eq!(parent_index(s, 9), None, "out of range has no parent");
    }

    #[test]
    fn children_come_back_left_to_right() {
        let s: &[usize] = &STRUCTURE;
        assert_eq!(children_indexes(s, 4), Ok(vec![0, 3]));
        assert_eq!(children_indexes(s, 3), Ok(vec![1, 2]));
        assert_eq!(children_indexes(s, 0), Ok(vec![]));
    }

    #[test]
    fn write_children_mirrors_children_indexes() {
        let s: &[usize] = &STRUCTURE;
        let mut out = StructureBuf::new();
        let n = write_children_indexes(s, 4, &mut out, 1).unwrap();
        assert_eq!(n, 2);
        assert_eq!(out.get(1), 0);
        assert_eq!(out.get(2), 3);
    }

    #[test]
    fn directional_child_search() {
        // parent with three children, two of which match
        // layout: [x, y, x, parent]
        let s: &[usize] = &[0, 0, 0, 3];
        let is_x = |i: usize| i == 0 || i == 2;
        assert_eq!(leftmost_child_where(s, 3, is_x), Ok(Some(0)));
        assert_eq!(rightmost_child_where(s, 3, is_x), Ok(Some(2)));
        assert_eq!(leftmost_child_where(s, 3, |_| false), Ok(None));
    }

    #[test]
    fn parent_and_children_are_inverse_on_a_deeper_tree() {
        // root -> (p -> (q -> r), s); layout: [r, q, p, s, root]
        let s: &[usize] = &[0, 1, 1, 0, 2];
        for parent in 0..s.len() {
            for child in children_indexes(s, parent).unwrap() {
                assert_eq!(parent_index(s, child), Some(parent));
            }
        }
    }
}
