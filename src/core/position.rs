//! Region addressing: from one mixed hash to K region offsets.
//!
//! # Algorithm
//!
//! A [`HashSequence`] is seeded with the element's mixed hash and advanced
//! with the wyrand step:
//!
//! ```text
//! state ← state + P0
//! next  = wymix(state, state ⊕ P1)
//! ```
//!
//! For each of the K regions two values are drawn from the sequence:
//!
//! 1. the **slot** value, reduced to `[0, slots)` with multiply-shift
//!    (`(h × slots) >> 64`), then scaled by the stride to a byte offset;
//! 2. the **sub-hash**, handed to the subfilter to pick bits inside the region.
//!
//! Insertion and lookup run exactly the same sequence for the same hash, which
//! is what rules out false negatives.
//!
//! # Slots and Stride
//!
//! ```text
//! stride = region size (no overlap)      stride < region size (overlap)
//! |--r0--|--r1--|--r2--|--r3--|          |--r0--|
//!                                           |--r1--|
//!                                              |--r2--|
//! slots = bytes / region                 slots = (bytes - region) / stride + 1
//! ```
//!
//! # Examples
//!
//! ```
//! use blockbloom::core::position::PositionGenerator;
//!
//! // 1024-byte array, 8-byte regions, no overlap
//! let generator = PositionGenerator::new(1024, 8, 8);
//! assert_eq!(generator.slots(), 128);
//!
//! let regions: Vec<_> = generator.regions(0xdead_beef, 4).collect();
//! assert_eq!(regions.len(), 4);
//! assert!(regions.iter().all(|r| r.offset % 8 == 0 && r.offset + 8 <= 1024));
//!
//! // Same hash, same regions
//! let again: Vec<_> = generator.regions(0xdead_beef, 4).collect();
//! assert_eq!(regions, again);
//! ```

use crate::util::bitops::{fastrange, wymix};

/// wyrand increment.
const P0: u64 = 0xa076_1d64_78bd_642f;

/// wyrand mixing constant.
const P1: u64 = 0xe703_7ed1_a0b4_28db;

/// Deterministic stream of 64-bit values derived from one hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashSequence {
    state: u64,
}

impl HashSequence {
    /// Start a sequence at `hash`.
    #[must_use]
    #[inline]
    pub const fn new(hash: u64) -> Self {
        Self { state: hash }
    }

    /// Advance and return the next value.
    #[inline]
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> u64 {
        self.state = self.state.wrapping_add(P0);
        wymix(self.state, self.state ^ P1)
    }
}

/// One addressed region: where it starts and the sub-hash its subfilter uses.
///
/// Regions are produced on the fly and consumed immediately; they are never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Byte offset of the region inside the bit array.
    pub offset: usize,
    /// Hash the subfilter derives its bit positions from.
    pub hash: u64,
}

/// Maps hashes to region offsets for a fixed array size, region size and stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionGenerator {
    slots: usize,
    stride: usize,
}

impl PositionGenerator {
    /// Build a generator for an array of `capacity_bytes` bytes holding regions
    /// of `region_bytes` bytes spaced `stride` bytes apart.
    ///
    /// Any array smaller than one region has no slots.
    ///
    /// # Panics
    ///
    /// Panics if `stride` is zero or larger than `region_bytes`.
    #[must_use]
    pub fn new(capacity_bytes: usize, region_bytes: usize, stride: usize) -> Self {
        assert!(
            stride > 0 && stride <= region_bytes,
            "PositionGenerator: stride {} must be in [1, {}]",
            stride,
            region_bytes
        );

        let slots = if capacity_bytes < region_bytes {
            0
        } else {
            (capacity_bytes - region_bytes) / stride + 1
        };

        Self { slots, stride }
    }

    /// Number of distinct region start positions.
    #[must_use]
    #[inline]
    pub const fn slots(&self) -> usize {
        self.slots
    }

    /// Byte distance between consecutive slots.
    #[must_use]
    #[inline]
    pub const fn stride(&self) -> usize {
        self.stride
    }

    /// The `k` regions addressed by `hash`.
    ///
    /// # Panics
    ///
    /// Debug builds panic if the generator has no slots.
    #[inline]
    pub fn regions(&self, hash: u64, k: usize) -> Regions {
        debug_assert!(self.slots > 0, "no slots to address");
        Regions {
            seq: HashSequence::new(hash),
            slots: self.slots,
            stride: self.stride,
            remaining: k,
        }
    }
}

/// Iterator over the regions of one element. See [`PositionGenerator::regions`].
#[derive(Debug, Clone)]
pub struct Regions {
    seq: HashSequence,
    slots: usize,
    stride: usize,
    remaining: usize,
}

impl Iterator for Regions {
    type Item = Region;

    #[inline]
    fn next(&mut self) -> Option<Region> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let slot = fastrange(self.seq.next(), self.slots);
        let hash = self.seq.next();
        Some(Region {
            offset: slot * self.stride,
            hash,
        })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Regions {}
