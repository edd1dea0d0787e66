//! In-place mutation engine
//!
//! All mutation happens on a [`TreeBuf`]: one structure buffer and one
//! value buffer, exclusively owned for the duration of the edit and then
//! frozen into an immutable [`EncodedTree`](crate::EncodedTree). Every
//! operation validates its preconditions before the first write - a failed
//! call leaves the buffers untouched - and returns the signed change in
//! encoded length so callers can keep queued index references consistent.
//!
//! Structural edits work by shifting and moving buffer ranges, so the
//! amount of memory touched is proportional to the distance moved, not the
//! tree size. Nothing here is safe for concurrent use on one buffer pair;
//! freezing is what makes the result shareable.

mod distinct;

use tracing::debug;

use crate::algebra;
use crate::buffer::{StructureBuf, ValueBuf};
use crate::encoded::EncodedTree;
use crate::slice::LazySlice;
use crate::{TreeError, TreeResult};

/// Mutable buffer pair holding one encoded tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeBuf<T> {
    pub(crate) structure: StructureBuf,
    pub(crate) values: ValueBuf<T>,
}

impl<T> TreeBuf<T> {
    /// An empty tree.
    pub fn new() -> Self {
        Self {
            structure: StructureBuf::new(),
            values: ValueBuf::new(),
        }
    }

    /// A single-node tree - the only way to grow out of emptiness, since
    /// inserting relative to a node of an empty tree is an error.
    pub fn seed(value: T) -> Self {
        let mut buf = Self::new();
        buf.structure.push(0);
        buf.values.push(value);
        buf
    }

    /// Wrap and validate a raw sequence pair.
    pub fn from_parts(structure: Vec<usize>, values: Vec<T>) -> TreeResult<Self> {
        if structure.len() != values.len() {
            return Err(TreeError::LengthMismatch {
                structure: structure.len(),
                values: values.len(),
            });
        }
        if !structure.is_empty() {
            let size = algebra::tree_size(&structure[..], structure.len() - 1)?;
            if size != structure.len() {
                return Err(TreeError::IncompleteTree {
                    walked: size,
                    missing: structure.len() - size,
                });
            }
        }
        Ok(Self {
            structure: StructureBuf::from_vec(structure),
            values: ValueBuf::from_vec(values),
        })
    }

    /// Number of encoded nodes.
    pub fn len(&self) -> usize {
        self.structure.len()
    }

    /// Whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.structure.is_empty()
    }

    /// Index of the root, if the tree is not empty.
    pub fn root_index(&self) -> Option<usize> {
        self.len().checked_sub(1)
    }

    /// Read access to the structure buffer.
    pub fn structure(&self) -> &StructureBuf {
        &self.structure
    }

    /// Read access to the value buffer.
    pub fn values(&self) -> &ValueBuf<T> {
        &self.values
    }

    /// Tear down into the raw sequence pair.
    pub fn into_parts(self) -> (Vec<usize>, Vec<T>) {
        (self.structure.into_vec(), self.values.into_vec())
    }

    fn check_target(&self, index: usize) -> TreeResult<()> {
        if self.is_empty() {
            return Err(TreeError::EmptyTreeInsert { index });
        }
        if index >= self.len() {
            return Err(TreeError::IndexOutOfBounds {
                index,
                size: self.len(),
            });
        }
        Ok(())
    }

    /// Whether any child of `parent` carries a value equal to `value`.
    fn has_equal_child(&self, parent: usize, value: &T) -> TreeResult<bool>
    where
        T: PartialEq,
    {
        Ok(self.matching_child(parent, value)?.is_some())
    }

    /// Insert `value` as a new rightmost leaf child of the node at `index`.
    ///
    /// With `distinct`, an existing child with an equal value makes this a
    /// no-op. Returns the change in encoded length (`1` or `0`).
    pub fn insert_value(&mut self, index: usize, value: T, distinct: bool) -> TreeResult<isize>
    where
        T: PartialEq,
    {
        self.check_target(index)?;
        if distinct && self.has_equal_child(index, &value)? {
            return Ok(0);
        }
        // the slot at `index` becomes the new leaf; the parent moves up one
        self.structure.shift_right(index, 1);
        self.structure.set(index + 1, self.structure.get(index + 1) + 1);
        self.values.splice_in(index, std::iter::once(value));
        debug!(parent = index + 1, "inserted leaf value");
        Ok(1)
    }

    /// Splice a whole encoded subtree in as a new rightmost child of the
    /// node at `index`, duplicates allowed. Returns the change in encoded
    /// length.
    pub fn insert_tree(
        &mut self,
        index: usize,
        sub_structure: &LazySlice<usize>,
        sub_values: &LazySlice<T>,
    ) -> TreeResult<isize> {
        self.check_target(index)?;
        let n = check_subtree(sub_structure, sub_values)?;
        if n == 0 {
            return Ok(0);
        }
        self.structure.splice_in(index, sub_structure.iter());
        self.values.splice_in(index, sub_values.iter());
        self.structure.set(index + n, self.structure.get(index + n) + 1);
        debug!(parent = index + n, nodes = n, "spliced subtree");
        Ok(n as isize)
    }

    /// Insert a root-to-leaf chain of values below the node at `index`.
    ///
    /// Without `distinct` the whole chain is spliced as one new branch.
    /// With `distinct`, the chain is first walked against existing children
    /// level by level; only the unmatched suffix is spliced, and a fully
    /// matched chain changes nothing. Returns the change in encoded length.
    pub fn insert_branch(
        &mut self,
        index: usize,
        items: impl IntoIterator<Item = T>,
        distinct: bool,
    ) -> TreeResult<isize>
    where
        T: PartialEq,
    {
        self.check_target(index)?;
        let mut items = items.into_iter();
        let mut target = index;
        if distinct {
            loop {
                let item = match items.next() {
                    Some(item) => item,
                    None => return Ok(0),
                };
                match self.matching_child(target, &item)? {
                    Some(child) => target = child,
                    None => {
                        let chain: Vec<T> = std::iter::once(item).chain(items).collect();
                        return self.splice_chain(target, chain);
                    }
                }
            }
        }
        let chain: Vec<T> = items.collect();
        if chain.is_empty() {
            return Ok(0);
        }
        self.splice_chain(target, chain)
    }

    /// Leftmost child of `parent` whose value equals `value`.
    fn matching_child(&self, parent: usize, value: &T) -> TreeResult<Option<usize>>
    where
        T: PartialEq,
    {
        let values = &self.values;
        algebra::leftmost_child_where(&self.structure, parent, |child| {
            values.get(child).map(|v| v == value).unwrap_or(false)
        })
    }

    /// Splice `chain` (root-to-leaf order) as a new branch below `target`.
    fn splice_chain(&mut self, target: usize, chain: Vec<T>) -> TreeResult<isize> {
        let n = chain.len();
        // a chain encodes leaf-first: counts [0, 1, 1, ..], values reversed
        self.structure
            .splice_in(target, (0..n).map(|k| usize::from(k > 0)));
        self.values.splice_in(target, chain.into_iter().rev());
        self.structure.set(target + n, self.structure.get(target + n) + 1);
        debug!(parent = target + n, nodes = n, "spliced branch");
        Ok(n as isize)
    }

    /// Remove the node at `index`, handing its children to its parent.
    ///
    /// Root removal is special: a leaf root empties the tree, a root with
    /// one child promotes that child, and a root with more children fails
    /// with [`TreeError::AmbiguousRootRemoval`] - the engine does not guess
    /// which child should take over. Returns the change in encoded length
    /// (always `-1`).
    pub fn remove_value(&mut self, index: usize) -> TreeResult<isize> {
        if index >= self.len() {
            return Err(TreeError::IndexOutOfBounds {
                index,
                size: self.len(),
            });
        }
        match algebra::parent_index(&self.structure, index) {
            None => {
                // the root: its only child (if any) is the new root
                match self.structure.get(index) {
                    0 | 1 => {
                        self.structure.pop();
                        self.values.pop();
                        debug!("removed root");
                        Ok(-1)
                    }
                    children => Err(TreeError::AmbiguousRootRemoval { children }),
                }
            }
            Some(parent) => {
                let adopted = self.structure.get(index);
                // the parent loses one child and gains the removed node's
                self.structure
                    .set(parent, self.structure.get(parent) + adopted - 1);
                self.structure.shift_left(index, 1);
                self.values.remove_range(index, 1);
                debug!(index, parent = parent - 1, adopted, "removed node");
                Ok(-1)
            }
        }
    }

    /// Freeze the buffers into an immutable tree.
    ///
    /// Consumes the buffer pair, making "no mutation after sharing" a
    /// compile-time property of the result.
    pub fn freeze(self) -> EncodedTree<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        EncodedTree::from_frozen(self.structure.freeze(), self.values.freeze())
    }
}

impl<T> Default for TreeBuf<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a donor subtree pair: equal lengths and a well-formed encoding.
/// Returns its length.
fn check_subtree<T>(structure: &LazySlice<usize>, values: &LazySlice<T>) -> TreeResult<usize> {
    let n = structure.len();
    if n != values.len() {
        return Err(TreeError::LengthMismatch {
            structure: n,
            values: values.len(),
        });
    }
    if n > 0 {
        let size = algebra::tree_size(structure, n - 1)?;
        if size != n {
            return Err(TreeError::IncompleteTree {
                walked: size,
                missing: n - size,
            });
        }
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buf(structure: &[usize], values: &[&'static str]) -> TreeBuf<&'static str> {
        TreeBuf::from_parts(structure.to_vec(), values.to_vec()).unwrap()
    }

    #[test]
    fn from_parts_rejects_malformed_input() {
        assert_eq!(
            TreeBuf::from_parts(vec![0, 1], vec!["a"]).unwrap_err(),
            TreeError::LengthMismatch {
                structure: 2,
                values: 1
            }
        );
        // two roots
        assert_eq!(
            TreeBuf::from_parts(vec![0, 0], vec!["a", "b"]).unwrap_err(),
            TreeError::IncompleteTree {
                walked: 1,
                missing: 1
            }
        );
    }

    #[test]
    fn insert_value_grows_a_seed_into_a_tree() {
        let mut buf = TreeBuf::seed("root");
        assert_eq!(buf.insert_value(0, "a", false), Ok(1));
        assert_eq!(buf.structure().as_slice(), &[0, 1]);
        // insert below the root again: the new leaf is the rightmost child
        assert_eq!(buf.insert_value(1, "b", false), Ok(1));
        assert_eq!(buf.structure().as_slice(), &[0, 0, 2]);
        assert_eq!(buf.values().get(1), Ok(&"b"));
    }

    #[test]
    fn insert_into_empty_tree_is_rejected_before_any_write() {
        let mut buf: TreeBuf<&str> = TreeBuf::new();
        assert_eq!(
            buf.insert_value(0, "a", false),
            Err(TreeError::EmptyTreeInsert { index: 0 })
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn distinct_insert_of_existing_value_is_a_no_op() {
        let mut buf = buf(&[0, 1], &["a", "root"]);
        assert_eq!(buf.insert_value(1, "a", true), Ok(0));
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.insert_value(1, "b", true), Ok(1));
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn insert_tree_splices_a_whole_subtree() {
        let mut recipient = buf(&[0, 1], &["a", "root"]);
        let donor = buf(&[0, 0, 2], &["x", "y", "s"]);
        let (ds, dv) = donor.into_parts();
        let delta = recipient
            .insert_tree(
                1,
                &StructureBuf::from_vec(ds).freeze(),
                &ValueBuf::from_vec(dv).freeze(),
            )
            .unwrap();
        assert_eq!(delta, 3);
        assert_eq!(recipient.structure().as_slice(), &[0, 0, 0, 2, 2]);
        assert_eq!(
            recipient.values().clone().into_vec(),
            vec!["a", "x", "y", "s", "root"]
        );
    }

    #[test]
    fn insert_branch_splices_a_chain() {
        let mut buf = TreeBuf::seed("root");
        assert_eq!(buf.insert_branch(0, ["a", "b", "c"], false), Ok(3));
        assert_eq!(buf.structure().as_slice(), &[0, 1, 1, 1]);
        assert_eq!(buf.values().clone().into_vec(), vec!["c", "b", "a", "root"]);
    }

    #[test]
    fn distinct_branch_insert_extends_the_shared_prefix() {
        // root -> a -> b
        let mut buf = buf(&[0, 1, 1], &["b", "a", "root"]);
        // shares the prefix a/b, adds c below b
        assert_eq!(buf.insert_branch(2, ["a", "b", "c"], true), Ok(1));
        assert_eq!(buf.structure().as_slice(), &[0, 1, 1, 1]);
        assert_eq!(buf.values().clone().into_vec(), vec!["c", "b", "a", "root"]);
        // fully matched chain changes nothing
        assert_eq!(buf.insert_branch(3, ["a", "b", "c"], true), Ok(0));
    }

    #[test]
    fn remove_value_hands_children_to_the_parent() {
        // root -> (a, b -> (c, d))
        let mut buf = buf(&[0, 0, 0, 2, 2], &["a", "c", "d", "b", "root"]);
        assert_eq!(buf.remove_value(3), Ok(-1));
        // c and d are now the root's children, next to a
        assert_eq!(buf.structure().as_slice(), &[0, 0, 0, 3]);
        assert_eq!(
            buf.values().clone().into_vec(),
            vec!["a", "c", "d", "root"]
        );
    }

    #[test]
    fn root_removal_rules() {
        // single-value tree becomes empty
        let mut single = TreeBuf::seed("root");
        assert_eq!(single.remove_value(0), Ok(-1));
        assert!(single.is_empty());

        // single-child root promotes the child
        let mut chain = buf(&[0, 1], &["x", "root"]);
        assert_eq!(chain.remove_value(1), Ok(-1));
        assert_eq!(chain.structure().as_slice(), &[0]);
        assert_eq!(chain.values().get(0), Ok(&"x"));

        // multi-child root removal is ambiguous and refused
        let mut wide = buf(&[0, 0, 2], &["x", "y", "root"]);
        assert_eq!(
            wide.remove_value(2),
            Err(TreeError::AmbiguousRootRemoval { children: 2 })
        );
        assert_eq!(wide.len(), 3, "nothing was written");
    }

    #[test]
    fn freeze_produces_the_same_tree_read_only() {
        let tree = buf(&[0, 0, 2], &["x", "y", "root"]).freeze();
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.root_value(), Some("root"));
    }
}
