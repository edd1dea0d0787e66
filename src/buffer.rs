//! Growable buffers backing the two encoding arrays
//!
//! A buffer is exclusively owned by the single mutation call that created
//! it; once the call finishes it is frozen into a [`LazySlice`] and never
//! touched again. Growth is the `Vec` amortized doubling; logical length is
//! the `Vec` length.
//!
//! Two variants exist because the two arrays fail differently:
//!
//! - [`StructureBuf`] holds child counts. Out-of-range reads return `0`
//!   ("no node here"), which lets the index algebra be written as total
//!   functions without bounds checks at every call site.
//! - [`ValueBuf`] holds payloads. Reads are index-checked and fail with
//!   [`TreeError::IndexOutOfBounds`].
//!
//! Range shifts and moves are the primitives the mutation engine is built
//! from; their bounds are asserted because a violation is a caller bug, not
//! user input.

use crate::slice::LazySlice;
use crate::{TreeError, TreeResult};

/// Default capacity for freshly created buffers.
pub const INITIAL_CAPACITY: usize = 8;

/// Growable buffer over the child-count sequence.
///
/// Reads past the logical length return `0` instead of failing; writes past
/// the logical length grow the buffer with zero fill.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructureBuf {
    data: Vec<usize>,
}

impl StructureBuf {
    /// Create an empty buffer with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    /// Create an empty buffer with room for `capacity` counts.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Wrap an existing count sequence.
    pub fn from_vec(data: Vec<usize>) -> Self {
        Self { data }
    }

    /// Logical length.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer holds no counts.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read the count at `index`; `0` when out of range.
    #[inline]
    pub fn get(&self, index: usize) -> usize {
        self.data.get(index).copied().unwrap_or(0)
    }

    /// Write the count at `index`, growing with zero fill if needed.
    pub fn set(&mut self, index: usize, value: usize) {
        if index >= self.data.len() {
            self.data.resize(index + 1, 0);
        }
        self.data[index] = value;
    }

    /// Append a count.
    pub fn push(&mut self, value: usize) {
        self.data.push(value);
    }

    /// Remove and return the last count.
    pub fn pop(&mut self) -> Option<usize> {
        self.data.pop()
    }

    /// Read the last count without removing it.
    pub fn peek(&self) -> Option<usize> {
        self.data.last().copied()
    }

    /// Insert `by` zeroed slots at `at`, moving `[at, len)` right.
    pub fn shift_right(&mut self, at: usize, by: usize) {
        assert!(at <= self.data.len(), "shift_right past end of buffer");
        self.data.splice(at..at, std::iter::repeat(0).take(by));
    }

    /// Delete `by` slots starting at `at`, moving the tail left.
    pub fn shift_left(&mut self, at: usize, by: usize) {
        assert!(at + by <= self.data.len(), "shift_left past end of buffer");
        self.data.drain(at..at + by);
    }

    /// Insert a run of counts at `at` without disturbing either side.
    pub fn splice_in(&mut self, at: usize, counts: impl IntoIterator<Item = usize>) {
        assert!(at <= self.data.len(), "splice past end of buffer");
        self.data.splice(at..at, counts);
    }

    /// Relocate `[from, from + len)` left by `distance`; the `distance`
    /// slots it vacates slide right to fill the gap.
    pub fn move_range_left(&mut self, from: usize, len: usize, distance: usize) {
        assert!(from >= distance, "move_range_left below start of buffer");
        assert!(from + len <= self.data.len(), "move_range_left past end");
        self.data[from - distance..from + len].rotate_left(distance);
    }

    /// Relocate `[from, from + len)` right by `distance`; the `distance`
    /// slots it vacates slide left to fill the gap.
    pub fn move_range_right(&mut self, from: usize, len: usize, distance: usize) {
        assert!(
            from + len + distance <= self.data.len(),
            "move_range_right past end"
        );
        self.data[from..from + len + distance].rotate_left(len);
    }

    /// Borrow the counts as a plain slice.
    pub fn as_slice(&self) -> &[usize] {
        &self.data
    }

    /// Finalize into a vector trimmed to logical length.
    pub fn into_vec(self) -> Vec<usize> {
        self.data
    }

    /// Finalize into an immutable view.
    pub fn freeze(self) -> LazySlice<usize> {
        LazySlice::from_vec(self.data)
    }
}

/// Growable buffer over the value sequence.
///
/// Unlike [`StructureBuf`] there is no sensible sentinel for a missing
/// payload, so reads are checked against the logical length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueBuf<T> {
    data: Vec<T>,
}

impl<T> ValueBuf<T> {
    /// Create an empty buffer with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    /// Create an empty buffer with room for `capacity` values.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Wrap an existing value sequence.
    pub fn from_vec(data: Vec<T>) -> Self {
        Self { data }
    }

    /// Logical length.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer holds no values.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read the value at `index`.
    pub fn get(&self, index: usize) -> TreeResult<&T> {
        self.data.get(index).ok_or(TreeError::IndexOutOfBounds {
            index,
            size: self.data.len(),
        })
    }

    /// Replace the value at `index`, returning the previous one.
    pub fn replace(&mut self, index: usize, value: T) -> TreeResult<T> {
        let size = self.data.len();
        let slot = self
            .data
            .get_mut(index)
            .ok_or(TreeError::IndexOutOfBounds { index, size })?;
        Ok(std::mem::replace(slot, value))
    }

    /// Append a value.
    pub fn push(&mut self, value: T) {
        self.data.push(value);
    }

    /// Remove and return the last value.
    pub fn pop(&mut self) -> Option<T> {
        self.data.pop()
    }

    /// Borrow the last value without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.data.last()
    }

    /// Insert a run of values at `at` without disturbing either side.
    pub fn splice_in(&mut self, at: usize, values: impl IntoIterator<Item = T>) {
        assert!(at <= self.data.len(), "splice past end of buffer");
        self.data.splice(at..at, values);
    }

    /// Delete `count` values starting at `at`, moving the tail left.
    pub fn remove_range(&mut self, at: usize, count: usize) {
        assert!(at + count <= self.data.len(), "remove_range past end");
        self.data.drain(at..at + count);
    }

    /// Relocate `[from, from + len)` left by `distance`.
    pub fn move_range_left(&mut self, from: usize, len: usize, distance: usize) {
        assert!(from >= distance, "move_range_left below start of buffer");
        assert!(from + len <= self.data.len(), "move_range_left past end");
        self.data[from - distance..from + len].rotate_left(distance);
    }

    /// Relocate `[from, from + len)` right by `distance`.
    pub fn move_range_right(&mut self, from: usize, len: usize, distance: usize) {
        assert!(
            from + len + distance <= self.data.len(),
            "move_range_right past end"
        );
        self.data[from..from + len + distance].rotate_left(len);
    }

    /// Finalize into a vector trimmed to logical length.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

impl<T: Clone + Send + Sync + 'static> ValueBuf<T> {
    /// Finalize into an immutable view.
    pub fn freeze(self) -> LazySlice<T> {
        LazySlice::from_vec(self.data)
    }
}

impl<T: Default> ValueBuf<T> {
    /// Write the value at `index`, growing with default fill if needed.
    pub fn set(&mut self, index: usize, value: T) {
        if index >= self.data.len() {
            self.data.resize_with(index + 1, T::default);
        }
        self.data[index] = value;
    }

    /// Insert `by` default-valued slots at `at`, moving `[at, len)` right.
    pub fn shift_right(&mut self, at: usize, by: usize) {
        assert!(at <= self.data.len(), "shift_right past end of buffer");
        self.data
            .splice(at..at, std::iter::repeat_with(T::default).take(by));
    }
}

impl<T> Default for ValueBuf<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structure_reads_are_total() {
        let mut buf = StructureBuf::new();
        buf.push(2);
        assert_eq!(buf.get(0), 2);
        assert_eq!(buf.get(100), 0, "out-of-range read is the zero sentinel");
    }

    #[test]
    fn structure_set_grows_with_zero_fill() {
        let mut buf = StructureBuf::new();
        buf.set(3, 7);
        assert_eq!(buf.len(), 4);
        assert_eq!(buf.as_slice(), &[0, 0, 0, 7]);
    }

    #[test]
    fn push_beyond_initial_capacity_preserves_order() {
        let mut buf = StructureBuf::with_capacity(2);
        for i in 0..100 {
            buf.push(i);
        }
        assert_eq!(buf.len(), 100);
        for i in 0..100 {
            assert_eq!(buf.get(i), i);
        }
    }

    #[test]
    fn shifts_do_not_disturb_neighbours() {
        let mut buf = StructureBuf::from_vec(vec![1, 2, 3, 4, 5]);
        buf.shift_right(2, 2);
        assert_eq!(buf.as_slice(), &[1, 2, 0, 0, 3, 4, 5]);
        buf.shift_left(2, 2);
        assert_eq!(buf.as_slice(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn range_moves_relocate_without_loss() {
        let mut buf = StructureBuf::from_vec(vec![1, 2, 3, 4, 5, 6]);
        // move [3, 4] left over [1, 2]
        buf.move_range_left(2, 2, 2);
        assert_eq!(buf.as_slice(), &[3, 4, 1, 2, 5, 6]);
        buf.move_range_right(0, 2, 2);
        assert_eq!(buf.as_slice(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn value_reads_are_checked() {
        let mut buf = ValueBuf::new();
        buf.push("x");
        assert_eq!(buf.get(0), Ok(&"x"));
        assert_eq!(
            buf.get(1),
            Err(TreeError::IndexOutOfBounds { index: 1, size: 1 })
        );
    }

    #[test]
    fn value_splice_and_remove_round_trip() {
        let mut buf = ValueBuf::from_vec(vec![1, 4, 5]);
        buf.splice_in(1, [2, 3]);
        assert_eq!(buf.clone().into_vec(), vec![1, 2, 3, 4, 5]);
        buf.remove_range(1, 2);
        assert_eq!(buf.into_vec(), vec![1, 4, 5]);
    }

    #[test]
    fn replace_swaps_in_place() {
        let mut buf = ValueBuf::from_vec(vec![10, 20]);
        assert_eq!(buf.replace(1, 25), Ok(20));
        assert_eq!(buf.into_vec(), vec![10, 25]);
    }

    #[test]
    fn freeze_trims_to_logical_length() {
        let mut buf = StructureBuf::with_capacity(64);
        buf.push(1);
        buf.push(0);
        let slice = buf.freeze();
        assert_eq!(slice.len(), 2);
        assert_eq!(slice.to_vec(), vec![1, 0]);
    }
}
