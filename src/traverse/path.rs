//! Path following
//!
//! Greedily matches a sequence of externally supplied path items against
//! sibling values, level by level, starting below a given node. Matching is
//! by an extractor function from node index to a comparable key, so a tree
//! can be addressed by a derived key rather than raw value equality.
//!
//! Siblings are assumed to carry distinct keys. When they do not, the
//! first match in left-to-right sibling order is taken - not necessarily
//! the best overall match. This is a known limitation of the greedy walk,
//! kept as-is rather than papered over with a search.

use crate::algebra::{self, StructureRead};
use crate::{TreeError, TreeResult};

/// Outcome of a path walk: how far it got and what was left over.
#[derive(Debug)]
pub struct PathTrace<K, I> {
    /// Indices of the nodes travelled, in order, start node excluded.
    pub visited: Vec<usize>,
    /// The first path item that matched no child, if the walk stopped short.
    pub unmatched: Option<K>,
    /// The path items never examined.
    pub remaining: I,
    /// Whether the walk ended on a leaf.
    pub at_leaf: bool,
}

impl<K, I> PathTrace<K, I> {
    /// Whether every path item found a matching node.
    pub fn fully_matched(&self) -> bool {
        self.unmatched.is_none()
    }

    /// Whether the path is a complete branch: fully matched and ending on
    /// a leaf.
    pub fn is_branch(&self) -> bool {
        self.fully_matched() && self.at_leaf
    }
}

/// Walk `items` down the tree from `start`, matching each item against the
/// keys of the current node's children.
///
/// `key_at` extracts the comparison key of the node at an index. The walk
/// descends into the first matching child per level and stops at the first
/// item with no match, returning everything a caller needs to resume:
/// travelled indices, the unmatched item, the untouched remainder of the
/// item sequence, and whether a leaf was reached.
pub fn follow_path<S, K, I>(
    structure: &S,
    start: usize,
    items: I,
    key_at: impl Fn(usize) -> K,
) -> TreeResult<PathTrace<K, I::IntoIter>>
where
    S: StructureRead + ?Sized,
    K: PartialEq,
    I: IntoIterator<Item = K>,
{
    if start >= structure.len() {
        return Err(TreeError::IndexOutOfBounds {
            index: start,
            size: structure.len(),
        });
    }
    let mut items = items.into_iter();
    let mut visited = Vec::new();
    let mut current = start;
    loop {
        let item = match items.next() {
            Some(item) => item,
            None => {
                return Ok(PathTrace {
                    visited,
                    unmatched: None,
                    remaining: items,
                    at_leaf: structure.count(current) == 0,
                })
            }
        };
        let matched =
            algebra::leftmost_child_where(structure, current, |child| key_at(child) == item)?;
        match matched {
            Some(child) => {
                visited.push(child);
                current = child;
            }
            None => {
                return Ok(PathTrace {
                    visited,
                    unmatched: Some(item),
                    remaining: items,
                    at_leaf: false,
                })
            }
        }
    }
}
