//! Native raw format.
//!
//! # Layout
//!
//! ```text
//! ┌──────────────────────┬──────────────────────────────────┐
//! │ capacity: u64 (8 B)  │ bit array: capacity / 8 bytes    │
//! └──────────────────────┴──────────────────────────────────┘
//! ```
//!
//! Both parts are written in native byte order, so a buffer is only valid
//! on a machine with the same endianness. Nothing describes the filter
//! configuration: the caller must load into a filter of the same type.
//!
//! # Examples
//!
//! ```
//! use blockbloom::Filter;
//!
//! let mut filter = Filter::<str, 4>::with_capacity(8192).unwrap();
//! filter.insert("persisted");
//!
//! let bytes = filter.to_bytes();
//! assert_eq!(bytes.len(), 8 + 8192 / 8);
//!
//! let restored = Filter::<str, 4>::from_bytes(&bytes).unwrap();
//! assert!(restored.may_contain("persisted"));
//! assert_eq!(restored, filter);
//! ```

use crate::core::params;
use crate::core::ByteAllocator;
use crate::error::{BloomError, Result};
use crate::filters::Filter;
use crate::subfilter::Subfilter;
use std::io::{Read, Write};

/// Size of the capacity header in bytes.
pub const HEADER_BYTES: usize = std::mem::size_of::<u64>();

fn split_header(bytes: &[u8]) -> Option<([u8; HEADER_BYTES], &[u8])> {
    if bytes.len() < HEADER_BYTES {
        return None;
    }
    let (head, body) = bytes.split_at(HEADER_BYTES);
    let mut header = [0u8; HEADER_BYTES];
    header.copy_from_slice(head);
    Some((header, body))
}

fn decode_capacity(header: [u8; HEADER_BYTES]) -> Result<usize> {
    let raw = u64::from_ne_bytes(header);
    usize::try_from(raw).map_err(|_| BloomError::capacity_overflow(usize::MAX))
}

impl<T: ?Sized, const K: usize, S: Subfilter, const STRIDE: usize, H, A: ByteAllocator>
    Filter<T, K, S, STRIDE, H, A>
{
    /// Size of [`to_bytes`](Self::to_bytes) output for this filter.
    #[must_use]
    pub fn serialized_len(&self) -> usize {
        HEADER_BYTES + self.bits.len_bytes()
    }

    /// Write the capacity header followed by the raw bit array.
    ///
    /// # Errors
    ///
    /// [`BloomError::Io`] if the writer fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&(self.capacity() as u64).to_ne_bytes())?;
        writer.write_all(self.as_bytes())?;
        Ok(())
    }

    /// Raw format as an owned buffer.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.serialized_len());
        out.extend_from_slice(&(self.capacity() as u64).to_ne_bytes());
        out.extend_from_slice(self.as_bytes());
        out
    }

    /// Replace the bit array with one read from `reader`.
    ///
    /// The stored capacity must equal `self.capacity()`. On error the filter
    /// is unchanged.
    ///
    /// # Errors
    ///
    /// - [`BloomError::SerializationMismatch`] if the stored capacity differs
    /// - [`BloomError::Io`] if the reader fails or ends early
    pub fn read_from<R: Read>(&mut self, mut reader: R) -> Result<()> {
        let mut header = [0u8; HEADER_BYTES];
        reader.read_exact(&mut header)?;
        let stored = decode_capacity(header)?;
        self.check_capacity(stored)?;

        let mut body = vec![0u8; self.bits.len_bytes()];
        reader.read_exact(&mut body)?;
        self.bits.copy_from_bytes(&body)?;
        tracing::debug!(capacity = stored, "loaded filter");
        Ok(())
    }

    /// Replace the bit array with one taken from a raw buffer.
    ///
    /// On error the filter is unchanged.
    ///
    /// # Errors
    ///
    /// - [`BloomError::SerializationMismatch`] if the stored capacity differs
    /// - [`BloomError::BufferLengthMismatch`] if the buffer is truncated or
    ///   has trailing bytes
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let expected = self.serialized_len();
        let Some((header, body)) = split_header(bytes) else {
            tracing::warn!(expected, actual = bytes.len(), "raw buffer too short");
            return Err(BloomError::buffer_length_mismatch(expected, bytes.len()));
        };

        let stored = decode_capacity(header)?;
        self.check_capacity(stored)?;
        if bytes.len() != expected {
            tracing::warn!(expected, actual = bytes.len(), "raw buffer length mismatch");
            return Err(BloomError::buffer_length_mismatch(expected, bytes.len()));
        }

        self.bits.copy_from_bytes(body)?;
        tracing::debug!(capacity = stored, "loaded filter");
        Ok(())
    }

    /// Build a filter whose capacity is taken from the raw header in `reader`.
    ///
    /// # Errors
    ///
    /// - [`BloomError::SerializationMismatch`] if the stored capacity is not
    ///   a valid capacity for this configuration
    /// - [`BloomError::Io`] if the reader fails or ends early
    /// - allocation-class errors from construction
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self>
    where
        H: Default,
        A: Default,
    {
        let mut header = [0u8; HEADER_BYTES];
        reader.read_exact(&mut header)?;
        let mut filter = Self::for_stored_capacity(decode_capacity(header)?)?;

        reader.read_exact(filter.as_bytes_mut())?;
        tracing::debug!(capacity = filter.capacity(), "loaded filter");
        Ok(filter)
    }

    /// Build a filter from a raw buffer produced by [`to_bytes`](Self::to_bytes).
    ///
    /// # Errors
    ///
    /// See [`from_reader`](Self::from_reader) and [`load_bytes`](Self::load_bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self>
    where
        H: Default,
        A: Default,
    {
        let Some((header, _)) = split_header(bytes) else {
            return Err(BloomError::buffer_length_mismatch(HEADER_BYTES, bytes.len()));
        };
        let mut filter = Self::for_stored_capacity(decode_capacity(header)?)?;
        filter.load_bytes(bytes)?;
        Ok(filter)
    }

    /// Empty filter of exactly `capacity` bits, rejecting capacities that
    /// this configuration would round to something else.
    fn for_stored_capacity(capacity: usize) -> Result<Self>
    where
        H: Default,
        A: Default,
    {
        let rounded = params::round_capacity(capacity, S::REGION_BYTES, Self::STRIDE_BYTES)?;
        if rounded != capacity {
            tracing::warn!(stored = capacity, rounded, "stored capacity does not fit this configuration");
            return Err(BloomError::serialization_mismatch(rounded, capacity));
        }
        Self::with_capacity(capacity)
    }

    fn check_capacity(&self, stored: usize) -> Result<()> {
        if stored == self.capacity() {
            return Ok(());
        }
        tracing::warn!(expected = self.capacity(), actual = stored, "stored capacity mismatch");
        Err(BloomError::serialization_mismatch(self.capacity(), stored))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subfilter::{FastMultiblock32, Multiblock};

    fn populated() -> Filter<str, 3> {
        let mut filter = Filter::<str, 3>::with_capacity(4096).unwrap();
        for word in ["alpha", "beta", "gamma", "delta"] {
            filter.insert(word);
        }
        filter
    }

    #[test]
    fn test_to_bytes_layout() {
        let filter = populated();
        let bytes = filter.to_bytes();
        assert_eq!(bytes.len(), HEADER_BYTES + 512);
        assert_eq!(&bytes[..HEADER_BYTES], &4096u64.to_ne_bytes());
        assert_eq!(&bytes[HEADER_BYTES..], filter.as_bytes());
    }

    #[test]
    fn test_write_to_matches_to_bytes() {
        let filter = populated();
        let mut out = Vec::new();
        filter.write_to(&mut out).unwrap();
        assert_eq!(out, filter.to_bytes());
    }

    #[test]
    fn test_load_bytes_roundtrip() {
        let filter = populated();
        let mut other = Filter::<str, 3>::with_capacity(4096).unwrap();
        other.load_bytes(&filter.to_bytes()).unwrap();
        assert_eq!(other, filter);
        assert!(other.may_contain("gamma"));
    }

    #[test]
    fn test_read_from_roundtrip() {
        let filter = populated();
        let bytes = filter.to_bytes();
        let mut other = Filter::<str, 3>::with_capacity(4096).unwrap();
        other.read_from(bytes.as_slice()).unwrap();
        assert_eq!(other.as_bytes(), filter.as_bytes());
    }

    #[test]
    fn test_load_capacity_mismatch() {
        let filter = populated();
        let mut other = Filter::<str, 3>::with_capacity(8192).unwrap();
        other.insert("keep");

        let err = other.load_bytes(&filter.to_bytes()).unwrap_err();
        assert_eq!(err, BloomError::serialization_mismatch(8192, 4096));
        assert!(err.is_serialization_error());
        assert!(other.may_contain("keep"));

        let err = other.read_from(filter.to_bytes().as_slice()).unwrap_err();
        assert_eq!(err, BloomError::serialization_mismatch(8192, 4096));
    }

    #[test]
    fn test_load_truncated() {
        let filter = populated();
        let bytes = filter.to_bytes();
        let mut other = Filter::<str, 3>::with_capacity(4096).unwrap();

        let err = other.load_bytes(&bytes[..bytes.len() - 1]).unwrap_err();
        assert_eq!(err, BloomError::buffer_length_mismatch(bytes.len(), bytes.len() - 1));

        let err = other.load_bytes(&bytes[..3]).unwrap_err();
        assert!(matches!(err, BloomError::BufferLengthMismatch { actual: 3, .. }));

        let err = other.read_from(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, BloomError::Io { .. }));
        assert_eq!(other.count_ones(), 0);
    }

    #[test]
    fn test_load_trailing_bytes() {
        let filter = populated();
        let mut bytes = filter.to_bytes();
        bytes.push(0);
        let mut other = Filter::<str, 3>::with_capacity(4096).unwrap();
        assert!(other.load_bytes(&bytes).is_err());
    }

    #[test]
    fn test_from_bytes_and_reader() {
        let mut filter = Filter::<u64, 1, FastMultiblock32<8>>::with_capacity(10_000).unwrap();
        filter.extend(&[3u64, 5, 8]);
        let bytes = filter.to_bytes();

        let a = Filter::<u64, 1, FastMultiblock32<8>>::from_bytes(&bytes).unwrap();
        let b = Filter::<u64, 1, FastMultiblock32<8>>::from_reader(bytes.as_slice()).unwrap();
        assert_eq!(a, filter);
        assert_eq!(b, filter);
        assert!(a.may_contain(&5));
    }

    #[test]
    fn test_from_bytes_rejects_foreign_capacity() {
        // 4096 bits is not a valid capacity for 40-byte regions
        let filter = populated();
        let err = Filter::<str, 1, Multiblock<u64, 5>>::from_bytes(&filter.to_bytes()).unwrap_err();
        assert!(matches!(err, BloomError::SerializationMismatch { actual: 4096, .. }));
    }

    #[test]
    fn test_empty_filter_roundtrip() {
        let filter = Filter::<str, 3>::new();
        let bytes = filter.to_bytes();
        assert_eq!(bytes.len(), HEADER_BYTES);
        let restored = Filter::<str, 3>::from_bytes(&bytes).unwrap();
        assert_eq!(restored.capacity(), 0);
    }
}
