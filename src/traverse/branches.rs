//! Branch enumeration and folding
//!
//! A branch is a root-to-leaf path (or root-to-cap under a depth limit).
//! Enumeration keeps the whole frontier of unvisited siblings per level in
//! one flat stack; the current path is read off the level boundaries, and
//! exhausted levels are retracted - popped from both stacks together - to
//! move to the next unvisited sibling. That retract step is what makes
//! depth-first branch enumeration iterative.

use crate::algebra::StructureRead;
use crate::buffer::StructureBuf;
use crate::TreeError;

use super::push_children;

/// Iterator over every branch of a subtree, left to right, each branch an
/// index path from the start node down.
///
/// A corrupt encoding ends enumeration before the offending branch; the
/// error is retained and queryable through [`BranchIndexIter::fault`].
#[derive(Debug)]
pub struct BranchIndexIter<'a, S: ?Sized> {
    structure: &'a S,
    /// Per-level segments of unvisited sibling indices; the current node of
    /// each level is the top of its segment.
    frontier: StructureBuf,
    /// Unvisited sibling count per level, current node included.
    counters: StructureBuf,
    max_depth: Option<usize>,
    fault: Option<TreeError>,
}

impl<'a, S: StructureRead + ?Sized> BranchIndexIter<'a, S> {
    /// Enumerate branches of the subtree rooted at `start`; `max_depth`
    /// caps the path length (`None` for unbounded).
    pub fn new(structure: &'a S, start: usize, max_depth: Option<usize>) -> Self {
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

    /// The structural corruption that ended enumeration early, if any.
    pub fn fault(&self) -> Option<&TreeError> {
        self.fault.as_ref()
    }

    /// Advance to the next complete branch, writing its path into `path`.
    /// Returns `false` once all branches are exhausted.
    fn next_into(&mut self, path: &mut Vec<usize>) -> bool {
        path.clear();
        if self.counters.is_empty() {
            return false;
        }
        loop {
            let current = match self.frontier.peek() {
                Some(index) => index,
                None => return false,
            };
            let depth = self.counters.len();
            let within_limit = self.max_depth.map_or(true, |limit| depth < limit);
            if within_limit {
                match push_children(self.structure, current, &mut self.frontier) {
                    Ok(n) if n > 0 => {
                        self.counters.push(n);
                        continue;
                    }
                    Ok(_) => {}
                    Err(fault) => {
                        // corrupt encoding: record the fault, stop enumerating
                        self.fault = Some(fault);
                        while self.frontier.pop().is_some() {}
                        while self.counters.pop().is_some() {}
                        return false;
                    }
                }
            }
            // a leaf (or capped node): the stacks spell out one branch
            self.assemble_path(path);
            self.retract();
            return true;
        }
    }

    /// Read the current path off the stacks: the current node of level `d`
    /// sits at the top of that level's frontier segment.
    fn assemble_path(&self, path: &mut Vec<usize>) {
        let mut boundary = 0;
        for level in 0..self.counters.len() {
            boundary += self.counters.get(level);
            path.push(self.frontier.get(boundary - 1));
        }
    }

    /// Pop the finished node, then every level it exhausts.
    fn retract(&mut self) {
        loop {
            self.frontier.pop();
            let depth = self.counters.len();
            let remaining = self.counters.get(depth - 1) - 1;
            if remaining > 0 {
                self.counters.set(depth - 1, remaining);
                return;
            }
            self.counters.pop();
            if self.counters.is_empty() {
                return;
            }
        }
    }
}

impl<S: StructureRead + ?Sized> Iterator for BranchIndexIter<'_, S> {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        self.next_into(&mut path).then_some(path)
    }
}

/// Fold every branch of the subtree rooted at `start`, left to right, each
/// visited exactly once.
///
/// `f` receives the accumulator and the branch as an index path; the path
/// buffer is reused across branches, so no per-branch allocation occurs.
pub fn fold_branches<S: StructureRead + ?Sized, A>(
    structure: &S,
    start: usize,
    max_depth: Option<usize>,
    init: A,
    mut f: impl FnMut(A, &[usize]) -> A,
) -> A {
    let mut iter = BranchIndexIter::new(structure, start, max_depth);
    let mut path = Vec::new();
    let mut acc = init;
    while iter.next_into(&mut path) {
        acc = f(acc, &path);
    }
    acc
}
