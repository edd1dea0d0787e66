//! Depth-first node iteration
//!
//! Preorder over the encoding: a node first, then its children left to
//! right. State is two explicit stacks - pending indices and a per-level
//! count of nodes still to visit - so the iterator descends arbitrarily
//! deep trees without growing the call stack.

use crate::algebra::StructureRead;
use crate::buffer::StructureBuf;
use crate::TreeError;

use super::push_children;

/// Depth-first preorder iterator over node indices.
///
/// Created by [`NodeIndexIter::new`] or, with a depth cap, by
/// [`NodeIndexIter::with_limit`]. A node at the cap is treated as a leaf:
/// it is yielded but its children are not enumerated.
///
/// A corrupt encoding (child counts reaching past the start of the
/// sequence) ends iteration after the node where corruption was found;
/// the error is retained and queryable through [`NodeIndexIter::fault`].
#[derive(Debug)]
pub struct NodeIndexIter<'a, S: ?Sized> {
    structure: &'a S,
    /// Pending node indices; the top is the next node to yield.
    frontier: StructureBuf,
    /// Remaining nodes to visit per open level; length is the current depth.
    counters: StructureBuf,
    max_depth: Option<usize>,
    fault: Option<TreeError>,
}

impl<'a, S: StructureRead + ?Sized> NodeIndexIter<'a, S> {
    /// Iterate the subtree rooted at `start`; empty if `start` is out of
    /// range.
    pub fn new(structure: &'a S, start: usize) -> Self {
        Self::with_limit(structure, start, None)
    }

    /// Iterate the subtree rooted at `start`, descending at most
    /// `max_depth` levels (the start node is level 1). `None` means
    /// unbounded.
    pub fn with_limit(structure: &'a S, start: usize, max_depth: Option<usize>) -> Self {
        let mut frontier = StructureBuf::new();
        let mut counters = StructureBuf::new();
        if start < structure.len() && max_depth != Some(0) {
            frontier.push(start);
            counters.push(1);
        }
        Self {
            structure,
            frontier,
            counters,
            max_depth,
            fault: None,
        }
    }

    /// Current descent depth (number of open levels).
    pub fn depth(&self) -> usize {
        self.counters.len()
    }

    /// The structural corruption that ended iteration early, if any.
    pub fn fault(&self) -> Option<&TreeError> {
        self.fault.as_ref()
    }
}

impl<S: StructureRead + ?Sized> Iterator for NodeIndexIter<'_, S> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let index = self.frontier.pop()?;
        let depth = self.counters.len();
        self.counters.set(depth - 1, self.counters.get(depth - 1) - 1);

        let within_limit = self.max_depth.map_or(true, |limit| depth < limit);
        let descended = if within_limit {
            match push_children(self.structure, index, &mut self.frontier) {
                Ok(n) if n > 0 => {
                    self.counters.push(n);
                    true
                }
                Ok(_) => false,
                Err(fault) => {
                    // corrupt encoding below this node: record the fault
                    // and end iteration after yielding what was found
                    self.fault = Some(fault);
                    while self.frontier.pop().is_some() {}
                    while self.counters.pop().is_some() {}
                    return Some(index);
                }
            }
        } else {
            false
        };

        if !descended {
            // retract: drop every exhausted level
            while self.counters.peek() == Some(0) {
                self.counters.pop();
            }
        }
        Some(index)
    }
}
