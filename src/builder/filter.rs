//! Builder for [`Filter`].
//!
//! # Type-State Pattern
//!
//! The builder can only be finished once the filter is sized, either by an
//! explicit capacity or by an element count plus a target rate:
//!
//! ```text
//! Initial ──.capacity_bits(m)─────────────────────────────────► WithSize ──.build()──► Filter
//!    │                                                            ▲
//!    └──.expected_items(n)──► WithItems ──.false_positive_rate(p)─┘
//! ```
//!
//! `.hasher(h)` and `.allocator(a)` are available in every state.
//!
//! The filter's compile-time configuration (`T`, `K`, subfilter, stride) is
//! taken from the type `build` is asked to produce.
//!
//! # Examples
//!
//! ```
//! use blockbloom::builder::FilterBuilder;
//! use blockbloom::hash::XxHash3;
//! use blockbloom::subfilter::FastMultiblock64;
//! use blockbloom::Filter;
//!
//! let filter: Filter<str, 1, FastMultiblock64<8>, 0, XxHash3> = FilterBuilder::new()
//!     .expected_items(50_000)
//!     .false_positive_rate(0.001)
//!     .hasher(XxHash3::with_seed(7))
//!     .build()
//!     .unwrap();
//!
//! assert!(filter.estimated_fpr(50_000) <= 0.001);
//! assert_eq!(filter.hasher().seed(), 7);
//! ```

use crate::core::{ByteAllocator, Global};
use crate::error::{BloomError, Result};
use crate::filters::Filter;
use crate::hash::DefaultHash;
use crate::subfilter::Subfilter;

/// Type-state marker: nothing sized yet.
#[derive(Debug, Clone, Copy)]
pub struct Initial;

/// Type-state marker: element count set, rate pending.
#[derive(Debug, Clone, Copy)]
pub struct WithItems {
    items: usize,
}

/// Type-state marker: the filter size is determined.
#[derive(Debug, Clone, Copy)]
pub struct WithSize {
    sizing: Sizing,
}

#[derive(Debug, Clone, Copy)]
enum Sizing {
    Bits(usize),
    Target { items: usize, fp_rate: f64 },
}

/// Builder for [`Filter`] with type-state guarantees.
///
/// # Type Parameters
///
/// - `State`: [`Initial`], [`WithItems`] or [`WithSize`]
/// - `H`: hash function (defaults to [`DefaultHash`])
/// - `A`: allocator (defaults to [`Global`])
#[derive(Debug, Clone)]
pub struct FilterBuilder<State, H = DefaultHash, A = Global> {
    state: State,
    hasher: H,
    alloc: A,
}

impl FilterBuilder<Initial> {
    /// New builder using the default hash and the global allocator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Initial,
            hasher: DefaultHash::default(),
            alloc: Global,
        }
    }
}

impl Default for FilterBuilder<Initial> {
    fn default() -> Self {
        Self::new()
    }
}

impl<State, H, A> FilterBuilder<State, H, A> {
    /// Use `hasher` instead of the current hash function.
    #[must_use]
    pub fn hasher<H2>(self, hasher: H2) -> FilterBuilder<State, H2, A> {
        FilterBuilder {
            state: self.state,
            hasher,
            alloc: self.alloc,
        }
    }

    /// Allocate the bit array from `alloc`.
    #[must_use]
    pub fn allocator<A2: ByteAllocator>(self, alloc: A2) -> FilterBuilder<State, H, A2> {
        FilterBuilder {
            state: self.state,
            hasher: self.hasher,
            alloc,
        }
    }
}

impl<H, A> FilterBuilder<Initial, H, A> {
    /// Size the filter explicitly, in bits (rounded up at build time).
    #[must_use]
    pub fn capacity_bits(self, bits: usize) -> FilterBuilder<WithSize, H, A> {
        FilterBuilder {
            state: WithSize {
                sizing: Sizing::Bits(bits),
            },
            hasher: self.hasher,
            alloc: self.alloc,
        }
    }

    /// Number of distinct elements the filter should hold.
    #[must_use]
    pub fn expected_items(self, items: usize) -> FilterBuilder<WithItems, H, A> {
        FilterBuilder {
            state: WithItems { items },
            hasher: self.hasher,
            alloc: self.alloc,
        }
    }
}

impl<H, A> FilterBuilder<WithItems, H, A> {
    /// Target false-positive rate at the expected element count.
    #[must_use]
    pub fn false_positive_rate(self, fp_rate: f64) -> FilterBuilder<WithSize, H, A> {
        FilterBuilder {
            state: WithSize {
                sizing: Sizing::Target {
                    items: self.state.items,
                    fp_rate,
                },
            },
            hasher: self.hasher,
            alloc: self.alloc,
        }
    }
}

impl<H, A: ByteAllocator> FilterBuilder<WithSize, H, A> {
    /// Build the filter.
    ///
    /// # Errors
    ///
    /// - [`BloomError::InvalidParameters`] if the size works out to zero
    ///   (`capacity_bits(0)` or `expected_items(0)`); use [`Filter::new`]
    ///   for an empty placeholder
    /// - [`BloomError::FalsePositiveRateOutOfBounds`] if the rate is not in `(0, 1]`
    /// - allocation-class errors from construction
    pub fn build<T: ?Sized, const K: usize, S: Subfilter, const STRIDE: usize>(
        self,
    ) -> Result<Filter<T, K, S, STRIDE, H, A>> {
        self.build_with_metadata().map(|(filter, _)| filter)
    }

    /// Build the filter and report how it was sized.
    ///
    /// # Errors
    ///
    /// See [`build`](Self::build).
    pub fn build_with_metadata<T: ?Sized, const K: usize, S: Subfilter, const STRIDE: usize>(
        self,
    ) -> Result<(Filter<T, K, S, STRIDE, H, A>, FilterMetadata)> {
        let (requested, expected_items, target_fpr) = match self.state.sizing {
            Sizing::Bits(bits) => (bits, None, None),
            Sizing::Target { items, fp_rate } => {
                validate_items(items)?;
                let bits = Filter::<T, K, S, STRIDE, H, A>::capacity_for(items, fp_rate)?;
                (bits, Some(items), Some(fp_rate))
            }
        };
        if requested == 0 {
            return Err(BloomError::invalid_parameters(
                "Filter capacity must be greater than zero",
            ));
        }

        let filter = Filter::with_hasher_in(requested, self.hasher, self.alloc)?;
        let metadata = FilterMetadata {
            capacity_bits: filter.capacity(),
            regions: K,
            bits_per_region: S::BITS_PER_REGION,
            subfilter: S::NAME,
            stride_bytes: Filter::<T, K, S, STRIDE, H, A>::STRIDE_BYTES,
            expected_items,
            target_fpr,
            estimated_fpr: expected_items.map(|n| filter.estimated_fpr(n)),
        };
        Ok((filter, metadata))
    }
}

fn validate_items(items: usize) -> Result<()> {
    if items == 0 {
        return Err(BloomError::invalid_parameters("Expected item count must be greater than zero"));
    }
    Ok(())
}

/// Parameters of a built filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterMetadata {
    /// Capacity in bits after rounding
    pub capacity_bits: usize,
    /// Regions per element (`K`)
    pub regions: usize,
    /// Bits per region (`K'`)
    pub bits_per_region: usize,
    /// Subfilter strategy name
    pub subfilter: &'static str,
    /// Bytes between region starts
    pub stride_bytes: usize,
    /// Element count the filter was sized for, if any
    pub expected_items: Option<usize>,
    /// Requested false-positive rate, if any
    pub target_fpr: Option<f64>,
    /// Modelled false-positive rate at `expected_items`
    pub estimated_fpr: Option<f64>,
}

impl FilterMetadata {
    /// Bit array size in bytes.
    #[must_use]
    pub fn memory_bytes(&self) -> usize {
        self.capacity_bits / 8
    }

    /// Bits spent per expected element.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn bits_per_item(&self) -> Option<f64> {
        self.expected_items.map(|n| self.capacity_bits as f64 / n as f64)
    }
}
