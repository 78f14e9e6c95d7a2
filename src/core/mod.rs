//! Core building blocks shared by every filter configuration.
//!
//! # Module Organization
//!
//! ```text
//! core/
//! ├── alloc.rs     - ByteAllocator boundary and the Global allocator
//! ├── bitarray.rs  - Byte-backed bit array with word-level set/test
//! ├── filter.rs    - BloomFilter / MergeableBloomFilter traits
//! ├── params.rs    - Capacity rounding, FPR and capacity calculations
//! ├── position.rs  - Hash to region offsets
//! └── mod.rs       - This file (public API)
//! ```
//!
//! # Data Flow
//!
//! ```text
//! mixed hash ──► PositionGenerator ──► K × Region { offset, hash }
//!                                          │
//!                                          ▼
//!                              Subfilter::mark / check
//!                                          │
//!                                          ▼
//!                                 BitArray::set_bits / test_bits
//! ```

pub mod alloc;
pub mod bitarray;
pub mod filter;
pub mod params;
pub mod position;

pub use alloc::{ByteAllocator, Global};
pub use bitarray::{BitArray, Word};
pub use filter::{BloomFilter, MergeableBloomFilter};
pub use params::{capacity_for, fpr_for, optimal_regions, round_capacity};
pub use position::{HashSequence, PositionGenerator, Region, Regions};
