//! The configurable Bloom filter.
//!
//! # Algorithm
//!
//! ```text
//! insert(x):
//!   h ← HashAdapter(x)                      user hash, mixed unless avalanching
//!   for (offset, sub) in regions(h, K):     K regions from one hash sequence
//!       S::mark(bits, offset, sub)          K' bits inside each region
//!
//! may_contain(x):
//!   same h, same regions
//!   false at the first region where S::check fails
//! ```
//!
//! Insertion and lookup walk the same deterministic sequence, so a filter
//! never reports an inserted element as absent.
//!
//! # Configuration
//!
//! Everything except the capacity is fixed by the type:
//!
//! | Parameter | Meaning                                          | Default          |
//! |-----------|--------------------------------------------------|------------------|
//! | `T`       | element type (may be unsized: `str`, `[u8]`)     | required         |
//! | `K`       | regions per element                              | required         |
//! | `S`       | [`Subfilter`] strategy (region size, `K'`)       | `Block<u8, 1>`   |
//! | `STRIDE`  | bytes between region starts, `0` = region size   | `0`              |
//! | `H`       | [`BloomHash`] function                           | [`DefaultHash`]  |
//! | `A`       | [`ByteAllocator`] for the bit array              | [`Global`]       |
//!
//! `Filter<T, K>` with the defaults is the classic Bloom filter with `K`
//! hash positions. Larger blocks trade FPR for fewer cache misses; a stride
//! smaller than the region size lets regions overlap, which recovers part of
//! the FPR lost to blocking.
//!
//! # Examples
//!
//! ```
//! use blockbloom::Filter;
//! use blockbloom::subfilter::FastMultiblock32;
//!
//! # fn main() -> blockbloom::Result<()> {
//! // Classic filter, 5 hash positions, 1M bits
//! let mut filter = Filter::<str, 5>::with_capacity(1_000_000)?;
//! filter.insert("hello");
//! assert!(filter.may_contain("hello"));
//!
//! // Cache-friendly filter sized for 100k elements at 0.1%
//! let mut fast = Filter::<u64, 1, FastMultiblock32<8>>::with_fpr(100_000, 0.001)?;
//! fast.insert(&42);
//! assert!(fast.may_contain(&42));
//! # Ok(())
//! # }
//! ```

use crate::core::params::{self, resolve_stride};
use crate::core::{BitArray, BloomFilter, ByteAllocator, Global, MergeableBloomFilter, PositionGenerator};
use crate::error::Result;
use crate::hash::{BloomHash, DefaultHash, HashAdapter};
use crate::subfilter::{Block, Subfilter};
use std::fmt;
use std::marker::PhantomData;
use std::ops::{BitAndAssign, BitOrAssign};

/// Bloom filter over `T` addressing `K` regions of subfilter `S` per element.
///
/// See the [module documentation](self) for the meaning of each parameter.
///
/// # Thread Safety
///
/// Mutating operations take `&mut self`. A filter that is no longer written
/// can be shared between threads and queried concurrently; concurrent
/// mutation needs an external lock.
pub struct Filter<
    T: ?Sized,
    const K: usize,
    S = Block<u8, 1>,
    const STRIDE: usize = 0,
    H = DefaultHash,
    A: ByteAllocator = Global,
> {
    pub(crate) bits: BitArray<A>,
    pub(crate) positions: PositionGenerator,
    pub(crate) hasher: HashAdapter<H>,
    _marker: PhantomData<(fn(&T), S)>,
}

impl<T: ?Sized, const K: usize, S: Subfilter, const STRIDE: usize, H, A: ByteAllocator>
    Filter<T, K, S, STRIDE, H, A>
{
    /// Byte distance between consecutive region starts.
    pub const STRIDE_BYTES: usize = resolve_stride(S::REGION_BYTES, STRIDE);

    const VALID: () = {
        assert!(K > 0, "a filter must address at least one region per element");
        assert!(S::REGION_BYTES > 0, "subfilter regions must be at least one byte");
        assert!(STRIDE <= S::REGION_BYTES, "stride must not exceed the subfilter region size");
    };

    /// Empty filter from an already allocated bit array.
    fn from_bits(bits: BitArray<A>, hasher: H) -> Self {
        let () = Self::VALID;
        let positions = PositionGenerator::new(bits.len_bytes(), S::REGION_BYTES, Self::STRIDE_BYTES);
        Self {
            bits,
            positions,
            hasher: HashAdapter::new(hasher),
            _marker: PhantomData,
        }
    }

    /// Filter of capacity `m` bits (rounded up) with an explicit hash and allocator.
    ///
    /// # Errors
    ///
    /// - [`BloomError::CapacityOverflow`](crate::BloomError::CapacityOverflow)
    ///   if the rounded capacity is not representable
    /// - [`BloomError::AllocationFailure`](crate::BloomError::AllocationFailure)
    ///   if the allocator cannot provide the buffer
    pub fn with_hasher_in(m: usize, hasher: H, alloc: A) -> Result<Self> {
        let capacity = params::round_capacity(m, S::REGION_BYTES, Self::STRIDE_BYTES)?;
        let bits = BitArray::new_in(capacity, alloc)?;
        tracing::debug!(
            requested = m,
            capacity,
            regions = K,
            subfilter = S::NAME,
            stride = Self::STRIDE_BYTES,
            "created filter"
        );
        Ok(Self::from_bits(bits, hasher))
    }

    /// Filter of capacity `m` bits (rounded up) using `alloc`.
    ///
    /// # Errors
    ///
    /// See [`with_hasher_in`](Self::with_hasher_in).
    pub fn new_in(m: usize, alloc: A) -> Result<Self>
    where
        H: Default,
    {
        Self::with_hasher_in(m, H::default(), alloc)
    }

    /// Filter of capacity `m` bits (rounded up) hashing with `hasher`.
    ///
    /// # Errors
    ///
    /// See [`with_hasher_in`](Self::with_hasher_in).
    pub fn with_hasher(m: usize, hasher: H) -> Result<Self>
    where
        A: Default,
    {
        Self::with_hasher_in(m, hasher, A::default())
    }

    /// Filter of capacity `m` bits, rounded up so every region fits.
    ///
    /// `m == 0` builds an empty filter that cannot hold elements.
    ///
    /// # Errors
    ///
    /// See [`with_hasher_in`](Self::with_hasher_in).
    ///
    /// # Examples
    ///
    /// ```
    /// use blockbloom::Filter;
    /// use blockbloom::subfilter::Multiblock;
    ///
    /// // Regions are 4 × 8 = 32 bytes; 1000 bits round up to 1024
    /// let filter = Filter::<u32, 2, Multiblock<u64, 4>>::with_capacity(1000).unwrap();
    /// assert_eq!(filter.capacity(), 1024);
    /// ```
    pub fn with_capacity(m: usize) -> Result<Self>
    where
        H: Default,
        A: Default,
    {
        Self::with_hasher_in(m, H::default(), A::default())
    }

    /// Filter sized for `n` elements at false-positive rate `fpr`.
    ///
    /// # Errors
    ///
    /// - [`BloomError::FalsePositiveRateOutOfBounds`](crate::BloomError::FalsePositiveRateOutOfBounds)
    ///   if `fpr` is not in `(0, 1]`
    /// - an allocation-class error if the capacity is infeasible
    pub fn with_fpr(n: usize, fpr: f64) -> Result<Self>
    where
        H: Default,
        A: Default,
    {
        Self::with_capacity(Self::capacity_for(n, fpr)?)
    }

    /// Empty zero-capacity filter. Nothing is allocated.
    ///
    /// `insert` and `may_contain` panic until the filter is [`reset`](Self::reset).
    #[must_use]
    pub fn new() -> Self
    where
        H: Default,
        A: Default,
    {
        Self::from_bits(BitArray::empty_in(A::default()), H::default())
    }

    /// Capacity (in bits) a filter of this configuration needs to hold `n`
    /// elements at false-positive rate `fpr`.
    ///
    /// Already rounded: `with_capacity(capacity_for(n, fpr)?)` has exactly
    /// this capacity.
    ///
    /// # Errors
    ///
    /// - [`BloomError::FalsePositiveRateOutOfBounds`](crate::BloomError::FalsePositiveRateOutOfBounds)
    ///   if `fpr` is not in `(0, 1]`
    /// - [`BloomError::CapacityOverflow`](crate::BloomError::CapacityOverflow)
    ///   if the capacity is not representable
    pub fn capacity_for(n: usize, fpr: f64) -> Result<usize> {
        let () = Self::VALID;
        params::capacity_for::<S>(K, Self::STRIDE_BYTES, n, fpr)
    }

    /// Expected false-positive rate of a filter of this configuration with
    /// capacity `m` bits after `n` distinct insertions.
    #[must_use]
    pub fn fpr_for(n: usize, m: usize) -> f64 {
        let () = Self::VALID;
        params::fpr_for::<S>(K, Self::STRIDE_BYTES, n, m)
    }

    /// Record `item`.
    ///
    /// # Panics
    ///
    /// Panics if the filter has zero capacity.
    #[inline]
    pub fn insert(&mut self, item: &T)
    where
        H: BloomHash<T>,
    {
        assert!(!self.bits.is_empty(), "insert on a zero-capacity filter");
        let hash = self.hasher.hash(item);
        for region in self.positions.regions(hash, K) {
            S::mark(&mut self.bits, region.offset, region.hash);
        }
    }

    /// `false` if `item` was definitely not inserted since the last
    /// clear/reset, `true` if it may have been.
    ///
    /// # Panics
    ///
    /// Panics if the filter has zero capacity.
    #[inline]
    #[must_use]
    pub fn may_contain(&self, item: &T) -> bool
    where
        H: BloomHash<T>,
    {
        assert!(!self.bits.is_empty(), "may_contain on a zero-capacity filter");
        let hash = self.hasher.hash(item);
        self.positions
            .regions(hash, K)
            .all(|region| S::check(&self.bits, region.offset, region.hash))
    }

    /// Zero every bit. Capacity is unchanged.
    pub fn clear(&mut self) {
        self.bits.clear();
    }

    /// Replace the bit array with a fresh one of capacity `m` (rounded up).
    ///
    /// All membership information is lost. On error the filter is unchanged.
    ///
    /// # Errors
    ///
    /// See [`with_hasher_in`](Self::with_hasher_in).
    pub fn reset(&mut self, m: usize) -> Result<()>
    where
        A: Clone,
    {
        let capacity = params::round_capacity(m, S::REGION_BYTES, Self::STRIDE_BYTES)?;
        let bits = BitArray::new_in(capacity, self.bits.allocator().clone())?;
        tracing::debug!(from = self.capacity(), to = capacity, "reset filter");
        self.positions = PositionGenerator::new(bits.len_bytes(), S::REGION_BYTES, Self::STRIDE_BYTES);
        self.bits = bits;
        Ok(())
    }

    /// Reset to the capacity needed for `n` elements at rate `fpr`.
    ///
    /// # Errors
    ///
    /// See [`with_fpr`](Self::with_fpr). On error the filter is unchanged.
    pub fn reset_with_fpr(&mut self, n: usize, fpr: f64) -> Result<()>
    where
        A: Clone,
    {
        self.reset(Self::capacity_for(n, fpr)?)
    }

    /// Capacity in bits.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.bits.len_bits()
    }

    /// Whether `other` has the same capacity (the type already fixes the rest).
    #[must_use]
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.capacity() == other.capacity()
    }

    /// Bitwise OR `other` into `self`: the result answers `true` for every
    /// element inserted into either filter.
    ///
    /// # Panics
    ///
    /// Panics if the capacities differ.
    pub fn combine_or(&mut self, other: &Self) {
        assert!(
            self.is_compatible(other),
            "combine_or: capacity mismatch ({} vs {} bits)",
            self.capacity(),
            other.capacity()
        );
        self.bits.union_with(&other.bits);
        tracing::debug!(capacity = self.capacity(), "combined filters (or)");
    }

    /// Bitwise AND `other` into `self`.
    ///
    /// The result still answers `true` for elements inserted into both
    /// filters, but its false-positive rate is higher than that of a filter
    /// filled with only those elements; [`estimated_fpr`](Self::estimated_fpr)
    /// does not apply to it.
    ///
    /// # Panics
    ///
    /// Panics if the capacities differ.
    pub fn combine_and(&mut self, other: &Self) {
        assert!(
            self.is_compatible(other),
            "combine_and: capacity mismatch ({} vs {} bits)",
            self.capacity(),
            other.capacity()
        );
        self.bits.intersect_with(&other.bits);
        tracing::debug!(capacity = self.capacity(), "combined filters (and)");
    }

    /// Number of set bits.
    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.bits.count_ones()
    }

    /// Fraction of set bits in `[0, 1]`; `0.0` for a zero-capacity filter.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fill_ratio(&self) -> f64 {
        match self.capacity() {
            0 => 0.0,
            m => self.count_ones() as f64 / m as f64,
        }
    }

    /// `fpr_for(n, self.capacity())`.
    #[must_use]
    pub fn estimated_fpr(&self, n: usize) -> f64 {
        Self::fpr_for(n, self.capacity())
    }

    /// The user hash function.
    #[must_use]
    pub fn hasher(&self) -> &H {
        self.hasher.get_ref()
    }

    /// The allocator backing the bit array.
    #[must_use]
    pub fn allocator(&self) -> &A {
        self.bits.allocator()
    }

    /// Raw bit array bytes (`capacity() / 8` of them, native order).
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.bits.as_bytes()
    }

    /// Mutable raw bit array bytes.
    ///
    /// Writing arbitrary bytes cannot break memory safety, but clearing bits
    /// set by `insert` introduces false negatives.
    #[must_use]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.bits.as_bytes_mut()
    }

    /// Independent copy, reporting allocation failure instead of aborting.
    ///
    /// # Errors
    ///
    /// [`BloomError::AllocationFailure`](crate::BloomError::AllocationFailure)
    /// if the copy cannot be allocated.
    pub fn try_clone(&self) -> Result<Self>
    where
        H: Clone,
        A: Clone,
    {
        Ok(Self {
            bits: self.bits.try_clone()?,
            positions: self.positions,
            hasher: self.hasher.clone(),
            _marker: PhantomData,
        })
    }
}

impl<T: ?Sized, const K: usize, S: Subfilter, const STRIDE: usize, H, A> Default
    for Filter<T, K, S, STRIDE, H, A>
where
    H: Default,
    A: ByteAllocator + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized, const K: usize, S: Subfilter, const STRIDE: usize, H, A> Clone
    for Filter<T, K, S, STRIDE, H, A>
where
    H: Clone,
    A: ByteAllocator + Clone,
{
    fn clone(&self) -> Self {
        Self {
            bits: self.bits.clone(),
            positions: self.positions,
            hasher: self.hasher.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized, const K: usize, S: Subfilter, const STRIDE: usize, H, A: ByteAllocator> fmt::Debug
    for Filter<T, K, S, STRIDE, H, A>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("capacity", &self.capacity())
            .field("regions", &K)
            .field("subfilter", &S::NAME)
            .field("bits_per_region", &S::BITS_PER_REGION)
            .field("stride", &Self::STRIDE_BYTES)
            .field("count_ones", &self.count_ones())
            .finish()
    }
}

impl<T: ?Sized, const K: usize, S: Subfilter, const STRIDE: usize, H, A: ByteAllocator> PartialEq
    for Filter<T, K, S, STRIDE, H, A>
{
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl<T: ?Sized, const K: usize, S: Subfilter, const STRIDE: usize, H, A: ByteAllocator> Eq
    for Filter<T, K, S, STRIDE, H, A>
{
}

impl<'a, T: ?Sized + 'a, const K: usize, S: Subfilter, const STRIDE: usize, H, A: ByteAllocator>
    Extend<&'a T> for Filter<T, K, S, STRIDE, H, A>
where
    H: BloomHash<T>,
{
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        for item in iter {
            self.insert(item);
        }
    }
}

impl<T: ?Sized, const K: usize, S: Subfilter, const STRIDE: usize, H, A: ByteAllocator>
    BitOrAssign<&Self> for Filter<T, K, S, STRIDE, H, A>
{
    fn bitor_assign(&mut self, rhs: &Self) {
        self.combine_or(rhs);
    }
}

impl<T: ?Sized, const K: usize, S: Subfilter, const STRIDE: usize, H, A: ByteAllocator>
    BitAndAssign<&Self> for Filter<T, K, S, STRIDE, H, A>
{
    fn bitand_assign(&mut self, rhs: &Self) {
        self.combine_and(rhs);
    }
}

impl<T: ?Sized, const K: usize, S: Subfilter, const STRIDE: usize, H, A: ByteAllocator> BloomFilter<T>
    for Filter<T, K, S, STRIDE, H, A>
where
    H: BloomHash<T>,
{
    fn insert(&mut self, item: &T) {
        Filter::insert(self, item);
    }

    fn may_contain(&self, item: &T) -> bool {
        Filter::may_contain(self, item)
    }

    fn clear(&mut self) {
        Filter::clear(self);
    }

    fn capacity(&self) -> usize {
        Filter::capacity(self)
    }

    fn regions_per_element(&self) -> usize {
        K
    }

    fn bits_per_region(&self) -> usize {
        S::BITS_PER_REGION
    }

    fn count_ones(&self) -> usize {
        Filter::count_ones(self)
    }

    fn estimated_fpr(&self, n: usize) -> f64 {
        Filter::estimated_fpr(self, n)
    }

    fn fill_ratio(&self) -> f64 {
        Filter::fill_ratio(self)
    }
}

impl<T: ?Sized, const K: usize, S: Subfilter, const STRIDE: usize, H, A: ByteAllocator>
    MergeableBloomFilter<T> for Filter<T, K, S, STRIDE, H, A>
where
    H: BloomHash<T>,
{
    fn combine_or(&mut self, other: &Self) {
        Filter::combine_or(self, other);
    }

    fn combine_and(&mut self, other: &Self) {
        Filter::combine_and(self, other);
    }

    fn is_compatible(&self, other: &Self) -> bool {
        Filter::is_compatible(self, other)
    }
}
