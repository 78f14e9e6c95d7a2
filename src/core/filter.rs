//! Core trait definitions for Bloom filters.
//!
//! # Trait Hierarchy
//!
//! ```text
//! BloomFilter<T>            insert / may_contain / clear, FPR estimate
//!     │
//!     └── MergeableBloomFilter<T>   combine_or / combine_and
//! ```
//!
//! Both traits take `&mut self` for every mutation. No operation here is
//! synchronized: share a filter read-only across threads, or wrap it in a
//! lock when it must also be written.
//!
//! # Examples
//!
//! ```
//! use blockbloom::core::{BloomFilter, MergeableBloomFilter};
//! use blockbloom::Filter;
//!
//! fn load<F: BloomFilter<str>>(filter: &mut F, words: &[&str]) {
//!     for w in words {
//!         filter.insert(w);
//!     }
//! }
//!
//! let mut a = Filter::<str, 4>::with_capacity(4096).unwrap();
//! let mut b = Filter::<str, 4>::with_capacity(4096).unwrap();
//! load(&mut a, &["alice"]);
//! load(&mut b, &["bob"]);
//!
//! a.combine_or(&b);
//! assert!(a.may_contain("alice") && a.may_contain("bob"));
//! ```

/// Approximate membership over elements of type `T`.
///
/// # Guarantees
///
/// ## No False Negatives
/// ```text
/// filter.insert(x);
/// assert!(filter.may_contain(x)); // until the next clear/reset
/// ```
///
/// ## Determinism
/// For a given configuration and hash, the same sequence of inserts always
/// produces the same bits.
pub trait BloomFilter<T: ?Sized> {
    /// Record `item` as present.
    fn insert(&mut self, item: &T);

    /// `false` if `item` was definitely never inserted; `true` if it may have been.
    #[must_use]
    fn may_contain(&self, item: &T) -> bool;

    /// Forget every element. Capacity is unchanged.
    fn clear(&mut self);

    /// Capacity in bits.
    #[must_use]
    fn capacity(&self) -> usize;

    /// Regions addressed per element (`K`).
    #[must_use]
    fn regions_per_element(&self) -> usize;

    /// Bits set per region (`K'`).
    #[must_use]
    fn bits_per_region(&self) -> usize;

    /// Number of bits currently set.
    #[must_use]
    fn count_ones(&self) -> usize;

    /// Expected false-positive rate after `n` distinct insertions.
    ///
    /// The filter does not count insertions; callers supply `n`.
    #[must_use]
    fn estimated_fpr(&self, n: usize) -> f64;

    /// Whether no bit is set.
    #[must_use]
    fn is_empty(&self) -> bool {
        self.count_ones() == 0
    }

    /// Fraction of bits set, in `[0, 1]`. `0.0` for a zero-capacity filter.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    fn fill_ratio(&self) -> f64 {
        match self.capacity() {
            0 => 0.0,
            m => self.count_ones() as f64 / m as f64,
        }
    }

    /// Insert every item of `items`.
    fn insert_all<'a, I>(&mut self, items: I)
    where
        T: 'a,
        I: IntoIterator<Item = &'a T>,
    {
        for item in items {
            self.insert(item);
        }
    }

    /// Whether every item may be present. Stops at the first definite miss.
    #[must_use]
    fn may_contain_all<'a, I>(&self, items: I) -> bool
    where
        T: 'a,
        I: IntoIterator<Item = &'a T>,
    {
        items.into_iter().all(|item| self.may_contain(item))
    }

    /// Whether at least one item may be present. Stops at the first hit.
    #[must_use]
    fn may_contain_any<'a, I>(&self, items: I) -> bool
    where
        T: 'a,
        I: IntoIterator<Item = &'a T>,
    {
        items.into_iter().any(|item| self.may_contain(item))
    }
}

/// Bloom filters that can be combined bitwise with a compatible filter.
///
/// Filters are compatible when their configuration and capacity are equal.
/// Configuration equality is enforced by the type (`&Self`); capacity is
/// checked at runtime.
pub trait MergeableBloomFilter<T: ?Sized>: BloomFilter<T> {
    /// Bitwise OR `other` into `self`.
    ///
    /// Afterwards `self` answers `true` for every element inserted into either
    /// filter.
    ///
    /// # Panics
    ///
    /// Panics if the capacities differ.
    fn combine_or(&mut self, other: &Self);

    /// Bitwise AND `other` into `self`.
    ///
    /// # Warning
    ///
    /// The result keeps bits incidentally shared by elements that are not in
    /// both filters, so its false-positive rate is higher than that of a
    /// filter freshly filled with the common elements. Do not trust
    /// [`estimated_fpr`](BloomFilter::estimated_fpr) on it.
    ///
    /// # Panics
    ///
    /// Panics if the capacities differ.
    fn combine_and(&mut self, other: &Self);

    /// Whether `other` can be combined with `self`.
    #[must_use]
    fn is_compatible(&self, other: &Self) -> bool {
        self.capacity() == other.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    // Exact set standing in for a filter to exercise the provided methods
    struct ExactSet {
        items: HashSet<u64>,
    }

    impl BloomFilter<u64> for ExactSet {
        fn insert(&mut self, item: &u64) {
            self.items.insert(*item);
        }

        fn may_contain(&self, item: &u64) -> bool {
            self.items.contains(item)
        }

        fn clear(&mut self) {
            self.items.clear();
        }

        fn capacity(&self) -> usize {
            64
        }

        fn regions_per_element(&self) -> usize {
            1
        }

        fn bits_per_region(&self) -> usize {
            1
        }

        fn count_ones(&self) -> usize {
            self.items.len()
        }

        fn estimated_fpr(&self, _n: usize) -> f64 {
            0.0
        }
    }

    fn exact() -> ExactSet {
        ExactSet {
            items: HashSet::new(),
        }
    }

    #[test]
    fn test_is_empty() {
        let mut set = exact();
        assert!(set.is_empty());
        set.insert(&1);
        assert!(!set.is_empty());
    }

    #[test]
    fn test_insert_all() {
        let mut set = exact();
        let items = vec![1u64, 2, 3, 4, 5];
        set.insert_all(items.iter());
        assert!(items.iter().all(|i| set.may_contain(i)));
    }

    #[test]
    fn test_may_contain_all_and_any() {
        let mut set = exact();
        set.insert_all(&[1u64, 2, 3]);

        assert!(set.may_contain_all(&[1u64, 2, 3]));
        assert!(!set.may_contain_all(&[1u64, 2, 4]));
        assert!(set.may_contain_any(&[9u64, 8, 3]));
        assert!(!set.may_contain_any(&[9u64, 8, 7]));
    }

    #[test]
    fn test_fill_ratio() {
        let mut set = exact();
        set.insert_all(&[1u64, 2, 3, 4]);
        assert!((set.fill_ratio() - 4.0 / 64.0).abs() < 1e-12);
    }

    #[test]
    fn test_clear() {
        let mut set = exact();
        set.insert(&7);
        set.clear();
        assert!(!set.may_contain(&7));
    }
}
