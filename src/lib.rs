//! blockbloom: configurable Bloom filters with block, multiblock and SIMD
//! subfilters.
//!
//! A Bloom filter answers "was this element inserted?" with either a
//! definite **no** or a **maybe**. It never forgets an inserted element
//! (no false negatives) and occasionally claims one it never saw, at a
//! rate fixed by its size and configuration.
//!
//! # Quick Start
//!
//! ```
//! use blockbloom::Filter;
//!
//! // 5 hash positions per element, 1,000,000 bits
//! let mut filter = Filter::<str, 5>::with_capacity(1_000_000).unwrap();
//!
//! filter.insert("hello");
//! filter.insert("Boost");
//!
//! assert!(filter.may_contain("hello"));
//! assert!(filter.may_contain("Boost"));
//! ```
//!
//! # Anatomy of a Filter
//!
//! Each element is hashed once. The hash is expanded into `K` **regions** of
//! the bit array; inside every region a **subfilter** sets or checks `K'`
//! bits. Regions start at multiples of a **stride**, which may be smaller
//! than the region so that regions overlap.
//!
//! ```text
//! bit array   |........|........|........|........|........|
//!                 ▲ stride ▲
//!             region r0 ─────┐        region r1 ─────┐
//!             Subfilter::mark(r0, h0)  Subfilter::mark(r1, h1)
//! ```
//!
//! | Subfilter               | Region               | Bits per region          |
//! |-------------------------|----------------------|--------------------------|
//! | `Block<W, K'>`          | one word `W`         | `K'` bits in that word   |
//! | `Multiblock<W, K'>`     | `K'` words           | one bit in each word     |
//! | `FastMultiblock32<K'>`  | `K'` × `u32`         | as Multiblock, AVX2      |
//! | `FastMultiblock64<K'>`  | `K'` × `u64`         | as Multiblock, AVX2      |
//!
//! The SIMD subfilters produce bit patterns identical to their scalar
//! counterparts, so filters built with and without SIMD are interchangeable.
//!
//! # Sizing
//!
//! ```
//! use blockbloom::Filter;
//! use blockbloom::subfilter::FastMultiblock32;
//!
//! type Fast = Filter<u64, 1, FastMultiblock32<8>>;
//!
//! let bits = Fast::capacity_for(1_000_000, 0.01).unwrap();
//! assert!(Fast::fpr_for(1_000_000, bits) <= 0.01);
//!
//! let filter = Fast::with_fpr(1_000_000, 0.01).unwrap();
//! assert_eq!(filter.capacity(), bits);
//! ```
//!
//! # Cargo Features
//!
//! - `simd` (default): AVX2 kernels for `FastMultiblock*` on x86-64, chosen
//!   at runtime unless AVX2 is enabled at compile time
//! - `serde`: `Serialize` / `Deserialize` for [`Filter`]
//!
//! # Thread Safety
//!
//! All mutation goes through `&mut self`. Read-only filters can be shared
//! freely; concurrent writers need an external lock.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::assertions_on_constants)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Bit array, position generation, traits and sizing math
pub mod core;

/// Error types and result aliases
pub mod error;

/// The configurable filter
pub mod filters;

/// Hash function boundary and provided hashes
pub mod hash;

/// Bit-setting strategies within a region
pub mod subfilter;

/// Type-state builder
pub mod builder;

/// Raw and serde serialization
pub mod serde_support;

/// Utility functions and helpers
pub mod util;

pub use error::{BloomError, Result};

pub use crate::core::filter::{BloomFilter, MergeableBloomFilter};
pub use crate::core::{ByteAllocator, Global};

pub use filters::Filter;

pub use subfilter::{Block, FastMultiblock32, FastMultiblock64, Multiblock, Subfilter};

pub use hash::{BloomHash, DefaultHash, XxHash3};

pub use builder::FilterBuilder;

/// Prelude module for convenient imports.
///
/// # Examples
///
/// ```
/// use blockbloom::prelude::*;
///
/// let mut filter: Filter<str, 2, Multiblock<u64, 4>> = Filter::with_capacity(4096).unwrap();
/// filter.insert("hello");
/// assert!(filter.may_contain("hello"));
/// ```
pub mod prelude {
    pub use crate::builder::FilterBuilder;
    pub use crate::core::filter::{BloomFilter, MergeableBloomFilter};
    pub use crate::error::{BloomError, Result};
    pub use crate::filters::Filter;
    pub use crate::hash::{BloomHash, DefaultHash};
    pub use crate::subfilter::{Block, FastMultiblock32, FastMultiblock64, Multiblock, Subfilter};
}
