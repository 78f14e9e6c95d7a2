//! Internal utility functions and helpers.
//!
//! # Modules
//!
//! - [`bitops`] - Integer mixing, range reduction and rounding helpers

pub mod bitops;

pub use bitops::{bits_to_bytes, div_ceil, fastrange, wymix};
