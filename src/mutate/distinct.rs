//! Distinct-children mutation: structural merge instead of duplication
//!
//! Two sibling subtrees with equal values can be merged into one: the donor
//! is deleted and its children are adopted by the recipient. Applied
//! repeatedly this enforces the distinct-children policy, and applied while
//! inserting it turns a graft into a merge. All of it runs on explicit
//! worklists; recursion depth never touches the call stack.

use std::collections::VecDeque;

use tracing::debug;

use crate::algebra;
use crate::slice::LazySlice;
use crate::{TreeError, TreeResult};

use super::{check_subtree, TreeBuf};

impl<T> TreeBuf<T> {
    /// Merge the `donor` subtree into the `recipient` node: the donor's
    /// children become children of the recipient and the donor's own top
    /// node is deleted.
    ///
    /// Returns the change in encoded length (always `-1`) together with the
    /// recipient's new index, since the relocation can shift it. When donor
    /// and recipient are siblings, the shared parent's child count is the
    /// caller's to fix - the donor's top node is gone from its level.
    ///
    /// A recipient nested inside the donor's range must be one of the
    /// donor's direct children (the promotion case); its subtree is moved
    /// out of the donor's range before the donor shrinks, so the two never
    /// overlap mid-edit.
    pub fn merge_two_trees(&mut self, recipient: usize, donor: usize) -> TreeResult<(isize, usize)> {
        let size = self.len();
        if recipient >= size {
            return Err(TreeError::IndexOutOfBounds {
                index: recipient,
                size,
            });
        }
        if donor >= size {
            return Err(TreeError::IndexOutOfBounds { index: donor, size });
        }
        if donor == recipient {
            return Err(TreeError::InvalidMergeTarget { recipient, donor });
        }

        let d_size = algebra::tree_size(&self.structure, donor)?;
        let d_bottom = donor + 1 - d_size;
        let d_count = self.structure.get(donor);
        let r_size = algebra::tree_size(&self.structure, recipient)?;
        let r_bottom = recipient + 1 - r_size;

        let new_recipient = if recipient >= d_bottom && recipient < donor {
            // recipient inside the donor's range: promotion
            if algebra::parent_index(&self.structure, recipient) != Some(donor) {
                return Err(TreeError::InvalidMergeTarget { recipient, donor });
            }
            // slide the recipient subtree up against the donor top, past
            // its later siblings, before anything shrinks
            let distance = donor - 1 - recipient;
            if distance > 0 {
                self.structure.move_range_right(r_bottom, r_size, distance);
                self.values.move_range_right(r_bottom, r_size, distance);
            }
            let promoted = donor - 1;
            self.structure
                .set(promoted, self.structure.get(promoted) + d_count - 1);
            self.structure.shift_left(donor, 1);
            self.values.remove_range(donor, 1);
            promoted
        } else if donor >= r_bottom && donor < recipient {
            // donor inside the recipient's range: it must be a direct
            // child, and merging it is plain adoption of its children
            if algebra::parent_index(&self.structure, donor) != Some(recipient) {
                return Err(TreeError::InvalidMergeTarget { recipient, donor });
            }
            self.structure
                .set(recipient, self.structure.get(recipient) + d_count - 1);
            self.structure.shift_left(donor, 1);
            self.values.remove_range(donor, 1);
            recipient - 1
        } else if donor < recipient {
            // disjoint, donor on the left: delete the donor top, then slide
            // its children up against the bottom of the recipient's block,
            // where they become the recipient's leftmost children
            let children_len = d_size - 1;
            self.structure.shift_left(donor, 1);
            self.values.remove_range(donor, 1);
            let distance = (r_bottom - 1) - (d_bottom + children_len);
            if children_len > 0 && distance > 0 {
                self.structure
                    .move_range_right(d_bottom, children_len, distance);
                self.values.move_range_right(d_bottom, children_len, distance);
            }
            self.structure
                .set(recipient - 1, self.structure.get(recipient - 1) + d_count);
            recipient - 1
        } else {
            // disjoint, donor on the right: slide its children down next to
            // the recipient top, where they become the rightmost children,
            // then delete the donor top
            let children_len = d_size - 1;
            let distance = d_bottom - recipient;
            if children_len > 0 && distance > 0 {
                self.structure
                    .move_range_left(d_bottom, children_len, distance);
                self.values.move_range_left(d_bottom, children_len, distance);
            }
            let settled = recipient + children_len;
            self.structure
                .set(settled, self.structure.get(settled) + d_count);
            self.structure.shift_left(donor, 1);
            self.values.remove_range(donor, 1);
            settled
        };

        debug!(donor, recipient, new_recipient, "merged subtrees");
        Ok((-1, new_recipient))
    }

    /// Enforce the distinct-children policy below `parent`: siblings with
    /// equal values are merged until none remain, recursively through every
    /// merge result.
    ///
    /// Scans right to left, so the later duplicate wins as the merge
    /// target. Terminates because every merge strictly shrinks the
    /// encoding. Returns the total change in encoded length.
    pub fn make_children_distinct(&mut self, parent: usize) -> TreeResult<isize>
    where
        T: PartialEq,
    {
        if parent >= self.len() {
            return Err(TreeError::IndexOutOfBounds {
                index: parent,
                size: self.len(),
            });
        }
        // entries remember the total delta at push time; edits only ever
        // happen below a stacked ancestor, so re-basing by the delta since
        // then recovers its current index
        let mut stack: Vec<(usize, isize)> = vec![(parent, 0)];
        let mut total: isize = 0;
        while let Some((index, delta_then)) = stack.pop() {
            let level_parent = (index as isize + (total - delta_then)) as usize;
            if let Some((donor, recipient)) = self.first_duplicate_pair(level_parent)? {
                let (delta, merged) = self.merge_two_trees(recipient, donor)?;
                let shifted = (level_parent as isize + delta) as usize;
                // the merged-away donor was one of this parent's children
                self.structure
                    .set(shifted, self.structure.get(shifted) - 1);
                total += delta;
                debug!(parent = shifted, merged, "merged duplicate siblings");
                // recheck this level later; settle the merge result first
                stack.push((shifted, total));
                stack.push((merged, total));
            }
        }
        Ok(total)
    }

    /// The first duplicate-valued sibling pair below `parent`, scanning
    /// right to left: `(donor, recipient)` where the recipient is the
    /// rightmost child with a twin and the donor its nearest earlier twin.
    fn first_duplicate_pair(&self, parent: usize) -> TreeResult<Option<(usize, usize)>>
    where
        T: PartialEq,
    {
        let children = algebra::children_indexes(&self.structure, parent)?;
        for j in (1..children.len()).rev() {
            let candidate = self.values.get(children[j])?;
            for i in (0..j).rev() {
                if self.values.get(children[i])? == candidate {
                    return Ok(Some((children[i], children[j])));
                }
            }
        }
        Ok(None)
    }

    /// Insert a whole encoded subtree below the node at `index` under the
    /// distinct-children policy.
    ///
    /// Where a donor node's value already exists among the target's
    /// children, the donor is not grafted; instead each of its child
    /// subtrees is offered one level deeper to the matched child - a
    /// structural merge. Unmatched subtrees are spliced whole, and a
    /// matched leaf donor contributes nothing (insertion is idempotent).
    /// Returns the total change in encoded length.
    pub fn insert_tree_distinct(
        &mut self,
        index: usize,
        sub_structure: &LazySlice<usize>,
        sub_values: &LazySlice<T>,
    ) -> TreeResult<isize>
    where
        T: Clone + PartialEq,
    {
        self.check_target(index)?;
        if check_subtree(sub_structure, sub_values)? == 0 {
            return Ok(0);
        }
        let mut queue: VecDeque<(usize, LazySlice<usize>, LazySlice<T>)> = VecDeque::new();
        queue.push_back((index, sub_structure.clone(), sub_values.clone()));
        let mut total: isize = 0;
        while let Some((parent, donor_structure, donor_values)) = queue.pop_front() {
            let donor_root = donor_structure.len() - 1;
            let donor_value = donor_values.get(donor_root)?;
            let matched = self.matching_child(parent, &donor_value)?;
            match matched {
                None => {
                    // graft the donor whole as a new rightmost child
                    let n = donor_structure.len();
                    self.structure.splice_in(parent, donor_structure.iter());
                    self.values.splice_in(parent, donor_values.iter());
                    self.structure
                        .set(parent + n, self.structure.get(parent + n) + 1);
                    total += n as isize;
                    debug!(parent = parent + n, nodes = n, "grafted unmatched subtree");
                    // everything queued at or above the splice point moved
                    for entry in queue.iter_mut() {
                        if entry.0 >= parent {
                            entry.0 += n;
                        }
                    }
                }
                Some(target) => {
                    let child_count = donor_structure.get(donor_root)?;
                    // skip ahead: a matched leaf has nothing left to offer
                    if child_count > 0 {
                        // discovery runs right-to-left; enqueue leftmost
                        // first so successive rightmost grafts reproduce
                        // the donor's sibling order
                        let mut ranges = Vec::with_capacity(child_count);
                        let mut top = donor_root;
                        for _ in 0..child_count {
                            top -= 1;
                            let size = algebra::tree_size(&donor_structure, top)?;
                            let bottom = top + 1 - size;
                            ranges.push((bottom, top + 1));
                            top = bottom;
                        }
                        for (bottom, end) in ranges.into_iter().rev() {
                            queue.push_back((
                                target,
                                donor_structure.slice(bottom, end),
                                donor_values.slice(bottom, end),
                            ));
                        }
                    }
                }
            }
        }
        Ok(total)
    }
}
