//! Binary search over sorted slices.
//!
//! Package lists read from the package database are kept sorted, so lookups
//! by name or origin go through [`qindex`] rather than a linear scan.

use std::cmp::Ordering;

/// Find `item` in a slice sorted in ascending order.
///
/// Returns the index of a matching element, or `None`. When the slice holds
/// several equal elements, which of them is returned is unspecified. The
/// result is meaningless if the slice is not sorted.
///
/// ```
/// use pkgtools::search::qindex;
///
/// let seq = [1, 3, 5, 7, 9];
/// assert_eq!(qindex(&seq, &5), Some(2));
/// assert_eq!(qindex(&seq, &4), None);
/// ```
pub fn qindex<T: Ord>(items: &[T], item: &T) -> Option<usize> {
    qindex_by(items, |candidate| candidate.cmp(item))
}

/// Binary search with a caller-supplied comparison.
///
/// `compare` receives an element and returns how it orders relative to the
/// target. This allows probing with a value of another type, e.g. looking up
/// a port record by origin string.
pub fn qindex_by<T, F>(items: &[T], mut compare: F) -> Option<usize>
where
    F: FnMut(&T) -> Ordering,
{
    // Invariant: items[..lower] < target < items[upper..]
    let mut lower = 0;
    let mut upper = items.len();

    while lower < upper {
        let mid = lower + (upper - lower) / 2;

        match compare(&items[mid]) {
            Ordering::Equal => return Some(mid),
            Ordering::Less => lower = mid + 1,
            Ordering::Greater => upper = mid,
        }
    }

    None
}

/// Extension trait adding [`qindex`] lookups to slices and vectors.
pub trait QIndex<T> {
    /// Index of `item` in the sorted sequence, if present.
    fn qindex(&self, item: &T) -> Option<usize>;

    /// Whether `item` is present in the sorted sequence.
    fn qcontains(&self, item: &T) -> bool {
        self.qindex(item).is_some()
    }
}

impl<T: Ord> QIndex<T> for [T] {
    fn qindex(&self, item: &T) -> Option<usize> {
        qindex(self, item)
    }
}
