//! Error types for blockbloom operations.
//!
//! Only two classes of failure are reported as values:
//!
//! - **Allocation**: the requested (or FPR-derived) capacity cannot be
//!   allocated or is not representable.
//! - **Serialization**: a saved bit array does not fit the filter it is being
//!   loaded into.
//!
//! Precondition violations (combining filters of different capacity, inserting
//! into a zero-capacity filter) are programmer errors and panic at the point of
//! detection instead.
//!
//! # Error Propagation
//!
//! ```
//! use blockbloom::{Filter, Result};
//!
//! fn build(n: usize, fpr: f64) -> Result<Filter<str, 5>> {
//!     let filter = Filter::with_fpr(n, fpr)?;
//!     Ok(filter)
//! }
//! # assert!(build(1000, 0.01).is_ok());
//! ```

#![allow(clippy::module_name_repetitions)]

/// Result type alias for blockbloom operations.
pub type Result<T> = std::result::Result<T, BloomError>;

/// Errors that can occur while building, resetting or loading a filter.
///
/// # Design Notes
/// - `Clone` + `PartialEq` enable testing and error comparison
/// - I/O errors are flattened into a message so the enum stays `Clone`
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BloomError {
    /// The allocator could not provide a buffer of the requested size.
    #[error("Failed to allocate a bit array of {bytes} bytes.")]
    AllocationFailure {
        /// Number of bytes requested.
        bytes: usize,
    },

    /// The requested capacity overflows what can be addressed.
    ///
    /// Raised by capacity rounding and by `capacity_for` when an extreme
    /// (n, fpr) pair would need more bits than a `usize` can describe.
    #[error("Capacity of {requested} bits overflows the addressable range.")]
    CapacityOverflow {
        /// Requested capacity in bits (saturated to `usize::MAX`).
        requested: usize,
    },

    /// False positive rate out of bounds `(0, 1]`.
    #[error("False positive rate {fp_rate} is out of bounds. Must be in range (0, 1].")]
    FalsePositiveRateOutOfBounds {
        /// The invalid false positive rate that was provided.
        fp_rate: f64,
    },

    /// Saved capacity does not match the filter being loaded into.
    #[error("Capacity mismatch: filter holds {expected} bits but data describes {actual} bits.")]
    SerializationMismatch {
        /// Capacity of the destination filter in bits.
        expected: usize,
        /// Capacity found in the serialized data in bits.
        actual: usize,
    },

    /// Byte buffer length does not match the expected byte count.
    #[error("Buffer length mismatch: expected {expected} bytes, got {actual}.")]
    BufferLengthMismatch {
        /// Expected number of bytes.
        expected: usize,
        /// Number of bytes provided.
        actual: usize,
    },

    /// Reading or writing the raw format failed.
    #[error("I/O error: {message}.")]
    Io {
        /// Description of the underlying I/O failure.
        message: String,
    },

    /// Parameters given to a builder are inconsistent.
    #[error("Invalid filter parameters: {message}.")]
    InvalidParameters {
        /// Human-readable description of what's invalid.
        message: String,
    },
}

impl BloomError {
    /// Create an `AllocationFailure` error.
    #[must_use]
    pub fn allocation_failure(bytes: usize) -> Self {
        Self::AllocationFailure { bytes }
    }

    /// Create a `CapacityOverflow` error.
    #[must_use]
    pub fn capacity_overflow(requested: usize) -> Self {
        Self::CapacityOverflow { requested }
    }

    /// Create a `FalsePositiveRateOutOfBounds` error.
    #[must_use]
    pub fn fp_rate_out_of_bounds(fp_rate: f64) -> Self {
        Self::FalsePositiveRateOutOfBounds { fp_rate }
    }

    /// Create a `SerializationMismatch` error.
    #[must_use]
    pub fn serialization_mismatch(expected: usize, actual: usize) -> Self {
        Self::SerializationMismatch { expected, actual }
    }

    /// Create a `BufferLengthMismatch` error.
    #[must_use]
    pub fn buffer_length_mismatch(expected: usize, actual: usize) -> Self {
        Self::BufferLengthMismatch { expected, actual }
    }

    /// Create an `InvalidParameters` error.
    #[must_use]
    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }

    /// Whether this error belongs to the allocation class.
    ///
    /// Allocation errors are raised at construction/reset time; the caller can
    /// retry with a smaller capacity or a looser false positive rate.
    #[must_use]
    pub const fn is_allocation_error(&self) -> bool {
        matches!(
            self,
            Self::AllocationFailure { .. } | Self::CapacityOverflow { .. }
        )
    }

    /// Whether this error belongs to the serialization class.
    #[must_use]
    pub const fn is_serialization_error(&self) -> bool {
        matches!(
            self,
            Self::SerializationMismatch { .. } | Self::BufferLengthMismatch { .. } | Self::Io { .. }
        )
    }
}

impl From<std::io::Error> for BloomError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}
