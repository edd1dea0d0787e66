//! Iterative traversal engine
//!
//! Depth-first node iteration, branch enumeration and path following, all
//! driven by explicit parallel stacks (`counters` holding the remaining
//! nodes per open level, a frontier holding pending indices) instead of
//! native recursion. Traversal depth is bounded by available memory, never
//! by the call stack.
//!
//! Iterators here are stateful, single-pass and not restartable; an
//! exhausted iterator simply returns `None`. None of them are safe to share
//! across threads mid-iteration.

mod branches;
mod nodes;
mod path;

pub use branches::{fold_branches, BranchIndexIter};
pub use nodes::NodeIndexIter;
pub use path::{follow_path, PathTrace};

use crate::algebra::{self, StructureRead};
use crate::buffer::StructureBuf;
use crate::TreeResult;

/// Push the children of `parent` onto `frontier` in discovery order
/// (rightmost first), leaving the leftmost child on top. Returns the child
/// count.
pub(crate) fn push_children<S: StructureRead + ?Sized>(
    structure: &S,
    parent: usize,
    frontier: &mut StructureBuf,
) -> TreeResult<usize> {
    let n = structure.count(parent);
    let mut pos = parent;
    for discovered in 0..n {
        if pos == 0 {
            return Err(crate::TreeError::IncompleteTree {
                walked: discovered,
                missing: n - discovered,
            });
        }
        pos -= 1;
        frontier.push(pos);
        pos = algebra::bottom_index(structure, pos)?;
    }
    Ok(n)
}
