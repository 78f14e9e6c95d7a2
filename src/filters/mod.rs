//! Filter implementations.
//!
//! A single generic [`Filter`] covers every configuration: the classic Bloom
//! filter, split block filters, and overlapping (strided) variants differ
//! only in their type parameters.
//!
//! # Choosing a Configuration
//!
//! | Configuration                          | Lookup cost           | FPR at 10 bits/element |
//! |----------------------------------------|-----------------------|------------------------|
//! | `Filter<T, 7>`                         | 7 cache misses        | ~0.82%                 |
//! | `Filter<T, 1, Block<u64, 8>>`          | 1 word                | worst                  |
//! | `Filter<T, 1, FastMultiblock32<8>>`    | 1 cache line, SIMD    | ~1.2%                  |
//! | `Filter<T, 2, Multiblock<u64, 4>, 8>`  | 2 overlapping regions | between the above      |
//!
//! Use [`Filter::fpr_for`] to compare concrete configurations before
//! committing to one.
//!
//! # Examples
//!
//! ```
//! use blockbloom::filters::Filter;
//! use blockbloom::subfilter::Multiblock;
//!
//! type Overlapping = Filter<u64, 2, Multiblock<u64, 4>, 8>;
//!
//! let mut filter = Overlapping::with_fpr(10_000, 0.01).unwrap();
//! filter.extend(&[1u64, 2, 3]);
//! assert!(filter.may_contain(&2));
//! ```

pub mod bloom;

pub use bloom::Filter;
