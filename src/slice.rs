//! Lazy zero-copy views
//!
//! A [`LazySlice`] is an immutable window (offset + length) over a shared
//! backing array, with an element transform that is composed at `map` time
//! and applied only when an element is actually read. Narrowing operations
//! (`slice`, `take`, `skip`, `skip_last`) are O(1) pointer arithmetic and
//! clamp rather than fail; materializing copies are produced only on demand
//! by [`LazySlice::to_vec`].
//!
//! Once frozen out of a buffer, a view is never written through, so it is
//! safe to read from any number of threads.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::{TreeError, TreeResult};

/// Shared deferred reader: absolute backing index to (transformed) element.
type Reader<T> = Arc<dyn Fn(usize) -> T + Send + Sync>;

/// Immutable, zero-copy view over a backing array.
///
/// Cloning a view clones an `Arc`, not the elements.
pub struct LazySlice<T> {
    read: Reader<T>,
    offset: usize,
    len: usize,
}

impl<T> Clone for LazySlice<T> {
    fn clone(&self) -> Self {
        Self {
            read: Arc::clone(&self.read),
            offset: self.offset,
            len: self.len,
        }
    }
}

impl<T> LazySlice<T> {
    /// The empty view.
    pub fn empty() -> Self {
        Self {
            read: Arc::new(|_| unreachable!("read from an empty slice")),
            offset: 0,
            len: 0,
        }
    }

    /// A view computing each element on demand from its index.
    pub fn from_fn(len: usize, read: impl Fn(usize) -> T + Send + Sync + 'static) -> Self {
        Self {
            read: Arc::new(read),
            offset: 0,
            len,
        }
    }

    /// Number of elements visible through the view.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the view is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read the element at `index`, checked against the view's own length.
    pub fn get(&self, index: usize) -> TreeResult<T> {
        if index < self.len {
            Ok((self.read)(self.offset + index))
        } else {
            Err(TreeError::IndexOutOfBounds {
                index,
                size: self.len,
            })
        }
    }

    /// The first element, if any.
    pub fn first(&self) -> Option<T> {
        self.get(0).ok()
    }

    /// The last element, if any.
    pub fn last(&self) -> Option<T> {
        self.len.checked_sub(1).map(|i| (self.read)(self.offset + i))
    }

    /// O(1) sub-view of `[from, to)`, clamped to the valid range.
    pub fn slice(&self, from: usize, to: usize) -> Self {
        let to = to.min(self.len);
        let from = from.min(to);
        Self {
            read: Arc::clone(&self.read),
            offset: self.offset + from,
            len: to - from,
        }
    }

    /// O(1) view of the first `n` elements (fewer if the view is shorter).
    pub fn take(&self, n: usize) -> Self {
        self.slice(0, n)
    }

    /// O(1) view with the first `n` elements removed.
    pub fn skip(&self, n: usize) -> Self {
        self.slice(n, self.len)
    }

    /// O(1) view with the last `n` elements removed.
    pub fn skip_last(&self, n: usize) -> Self {
        self.slice(0, self.len.saturating_sub(n))
    }

    /// Lazy forward iterator over the view.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.len).map(move |i| (self.read)(self.offset + i))
    }

    /// Lazy reverse iterator over the view.
    pub fn rev_iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.len)
            .rev()
            .map(move |i| (self.read)(self.offset + i))
    }

    /// Lazy reverse iterator yielding only elements matching `pred`.
    pub fn rev_iter_where<'a>(
        &'a self,
        pred: impl Fn(&T) -> bool + 'a,
    ) -> impl Iterator<Item = T> + 'a {
        self.rev_iter().filter(move |item| pred(item))
    }

    /// Materialize the view into an owned vector.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }
}

impl<T: 'static> LazySlice<T> {
    /// A view sharing the same backing array with `f` composed onto the
    /// element transform; `f` runs only when elements are read.
    pub fn map<U>(&self, f: impl Fn(T) -> U + Send + Sync + 'static) -> LazySlice<U> {
        let read = Arc::clone(&self.read);
        LazySlice {
            read: Arc::new(move |i| f(read(i))),
            offset: self.offset,
            len: self.len,
        }
    }
}

impl<T: Clone + Send + Sync + 'static> LazySlice<T> {
    /// Take ownership of a backing vector and view all of it.
    pub fn from_vec(backing: Vec<T>) -> Self {
        let len = backing.len();
        Self {
            read: Arc::new(move |i| backing[i].clone()),
            offset: 0,
            len,
        }
    }
}

impl<T: PartialEq> PartialEq for LazySlice<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for LazySlice<T> {}

impl<T: Hash> Hash for LazySlice<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len.hash(state);
        for item in self.iter() {
            item.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for LazySlice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
