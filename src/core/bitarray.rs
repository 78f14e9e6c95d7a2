//! Fixed-capacity byte-backed bit array.
//!
//! `BitArray` owns a contiguous, zero-initialized byte buffer obtained from a
//! [`ByteAllocator`]. Subfilters address it with a byte offset and a word type:
//! [`set_bits`](BitArray::set_bits) ORs a mask into the word stored at that
//! offset and [`test_bits`](BitArray::test_bits) checks that every bit of a
//! mask is present.
//!
//! # Memory Layout
//!
//! Words are read and written in native byte order at arbitrary byte offsets:
//!
//! ```text
//! byte:   0        1        2        3        4 ...
//!         [........][........][........][........][...
//!              └─── u32 word at offset 1 ───┘
//! ```
//!
//! Overlapping-stride configurations place regions at offsets that are not
//! multiples of the word size, so every access goes through byte slices
//! (`from_ne_bytes` / `to_ne_bytes`) instead of aligned word pointers.
//!
//! # Lifecycle
//!
//! - Allocated zero-filled by [`BitArray::new_in`]
//! - Cleared in place by [`BitArray::clear`]; the length never changes
//! - Released on drop
//!
//! # Examples
//!
//! ```
//! use blockbloom::core::BitArray;
//!
//! let mut bits = BitArray::new(128).unwrap();
//! assert_eq!(bits.len_bytes(), 16);
//!
//! bits.set_bits::<u32>(3, 0b1010);
//! assert!(bits.test_bits::<u32>(3, 0b1000));
//! assert!(!bits.test_bits::<u32>(3, 0b0100));
//! assert_eq!(bits.count_ones(), 2);
//! ```

use crate::core::alloc::{ByteAllocator, Global};
use crate::error::{BloomError, Result};
use crate::util::bitops::bits_to_bytes;
use std::fmt;
use std::ops::{BitAnd, BitOr};
use std::ptr::NonNull;

/// Unsigned machine word that a subfilter reads from and writes to the array.
///
/// Implemented for `u8`, `u16`, `u32` and `u64`.
pub trait Word:
    Copy + Eq + fmt::Debug + BitOr<Output = Self> + BitAnd<Output = Self> + Send + Sync + 'static
{
    /// Width in bits.
    const BITS: u32;
    /// Width in bytes.
    const BYTES: usize;
    /// All bits clear.
    const ZERO: Self;

    /// Word with only bit `pos` set (`pos < BITS`).
    fn bit(pos: u32) -> Self;

    /// Read a word from the first `BYTES` bytes of `bytes` in native order.
    fn read_ne(bytes: &[u8]) -> Self;

    /// Write the word into the first `BYTES` bytes of `bytes` in native order.
    fn write_ne(self, bytes: &mut [u8]);

    /// Number of set bits.
    fn count_ones(self) -> u32;
}

macro_rules! impl_word {
    ($($ty:ty),*) => {
        $(
            impl Word for $ty {
                const BITS: u32 = <$ty>::BITS;
                const BYTES: usize = std::mem::size_of::<$ty>();
                const ZERO: Self = 0;

                #[inline(always)]
                fn bit(pos: u32) -> Self {
                    1 << pos
                }

                #[inline(always)]
                fn read_ne(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$ty>()];
                    buf.copy_from_slice(&bytes[..Self::BYTES]);
                    <$ty>::from_ne_bytes(buf)
                }

                #[inline(always)]
                fn write_ne(self, bytes: &mut [u8]) {
                    bytes[..Self::BYTES].copy_from_slice(&self.to_ne_bytes());
                }

                #[inline(always)]
                fn count_ones(self) -> u32 {
                    <$ty>::count_ones(self)
                }
            }
        )*
    };
}

impl_word!(u8, u16, u32, u64);

/// Fixed-size bit array over an allocator-provided byte buffer.
///
/// # Type Properties
///
/// - `Send + Sync` when the allocator is: the buffer is uniquely owned, and
///   every mutation requires `&mut self`
/// - `Clone` when the allocator is `Clone` (allocates a fresh buffer)
pub struct BitArray<A: ByteAllocator = Global> {
    ptr: NonNull<u8>,
    len: usize,
    alloc: A,
}

// SAFETY: BitArray uniquely owns its buffer like a Box<[u8]>; shared access only
// reads through `&self` and writes require `&mut self`.
unsafe impl<A: ByteAllocator + Send> Send for BitArray<A> {}
// SAFETY: see above; `&BitArray` never mutates the buffer.
unsafe impl<A: ByteAllocator + Sync> Sync for BitArray<A> {}

impl BitArray<Global> {
    /// Create a zero-filled array of `capacity_bits` bits using the global allocator.
    ///
    /// # Errors
    ///
    /// [`BloomError::AllocationFailure`] if the buffer cannot be allocated.
    pub fn new(capacity_bits: usize) -> Result<Self> {
        Self::new_in(capacity_bits, Global)
    }
}

impl<A: ByteAllocator> BitArray<A> {
    /// Create a zero-filled array of `ceil(capacity_bits / 8)` bytes from `alloc`.
    ///
    /// A zero capacity allocates nothing.
    ///
    /// # Errors
    ///
    /// [`BloomError::AllocationFailure`] if the allocator cannot provide the buffer.
    pub fn new_in(capacity_bits: usize, alloc: A) -> Result<Self> {
        let len = bits_to_bytes(capacity_bits);
        if len == 0 {
            return Ok(Self::empty_in(alloc));
        }

        let ptr = alloc.allocate_zeroed(len).map_err(|err| {
            tracing::warn!(bytes = len, "bit array allocation failed");
            err
        })?;
        tracing::debug!(bytes = len, "allocated bit array");

        Ok(Self { ptr, len, alloc })
    }

    /// An array holding no bits.
    #[must_use]
    pub fn empty_in(alloc: A) -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            alloc,
        }
    }

    /// Number of bytes in the buffer.
    #[must_use]
    #[inline]
    pub const fn len_bytes(&self) -> usize {
        self.len
    }

    /// Number of bits in the buffer (`len_bytes() * 8`).
    #[must_use]
    #[inline]
    pub const fn len_bits(&self) -> usize {
        self.len * 8
    }

    /// Whether the array holds no bits at all.
    #[must_use]
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The allocator backing this array.
    #[must_use]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Raw buffer contents.
    #[must_use]
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: ptr is valid for `len` initialized bytes (dangling only when len == 0)
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Raw buffer contents, mutable.
    #[must_use]
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: as above, and `&mut self` guarantees exclusive access
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// OR `mask` into the word of type `W` stored at `byte_offset`.
    ///
    /// Idempotent: setting bits that are already set has no effect.
    ///
    /// # Panics
    ///
    /// Panics if `byte_offset + W::BYTES > len_bytes()`.
    #[inline]
    pub fn set_bits<W: Word>(&mut self, byte_offset: usize, mask: W) {
        let bytes = &mut self.as_bytes_mut()[byte_offset..byte_offset + W::BYTES];
        let word = W::read_ne(bytes);
        (word | mask).write_ne(bytes);
    }

    /// Whether every bit of `mask` is set in the word of type `W` at `byte_offset`.
    ///
    /// # Panics
    ///
    /// Panics if `byte_offset + W::BYTES > len_bytes()`.
    #[must_use]
    #[inline]
    pub fn test_bits<W: Word>(&self, byte_offset: usize, mask: W) -> bool {
        let word = W::read_ne(&self.as_bytes()[byte_offset..byte_offset + W::BYTES]);
        word & mask == mask
    }

    /// Zero every byte in place. Length is unchanged.
    pub fn clear(&mut self) {
        self.as_bytes_mut().fill(0);
    }

    /// Number of set bits in the whole array.
    #[must_use]
    pub fn count_ones(&self) -> usize {
        let bytes = self.as_bytes();
        let mut chunks = bytes.chunks_exact(8);
        let mut total: usize = 0;
        for chunk in &mut chunks {
            total += u64::read_ne(chunk).count_ones() as usize;
        }
        total
            + chunks
                .remainder()
                .iter()
                .map(|b| b.count_ones() as usize)
                .sum::<usize>()
    }

    /// In-place bitwise OR with an array of the same length.
    ///
    /// # Panics
    ///
    /// Panics if the lengths differ.
    pub fn union_with<B: ByteAllocator>(&mut self, other: &BitArray<B>) {
        assert_eq!(
            self.len, other.len,
            "BitArray::union_with: length mismatch ({} vs {} bytes)",
            self.len, other.len
        );
        for (dst, src) in self.as_bytes_mut().iter_mut().zip(other.as_bytes()) {
            *dst |= *src;
        }
    }

    /// In-place bitwise AND with an array of the same length.
    ///
    /// # Panics
    ///
    /// Panics if the lengths differ.
    pub fn intersect_with<B: ByteAllocator>(&mut self, other: &BitArray<B>) {
        assert_eq!(
            self.len, other.len,
            "BitArray::intersect_with: length mismatch ({} vs {} bytes)",
            self.len, other.len
        );
        for (dst, src) in self.as_bytes_mut().iter_mut().zip(other.as_bytes()) {
            *dst &= *src;
        }
    }

    /// Overwrite the buffer with `bytes` verbatim.
    ///
    /// # Errors
    ///
    /// [`BloomError::BufferLengthMismatch`] if `bytes.len() != len_bytes()`.
    pub fn copy_from_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() != self.len {
            return Err(BloomError::buffer_length_mismatch(self.len, bytes.len()));
        }
        self.as_bytes_mut().copy_from_slice(bytes);
        Ok(())
    }

    /// Allocate an independent copy from the same allocator.
    ///
    /// # Errors
    ///
    /// [`BloomError::AllocationFailure`] if the copy cannot be allocated.
    pub fn try_clone(&self) -> Result<Self>
    where
        A: Clone,
    {
        let mut copy = Self::new_in(self.len_bits(), self.alloc.clone())?;
        copy.as_bytes_mut().copy_from_slice(self.as_bytes());
        Ok(copy)
    }
}

impl<A: ByteAllocator> Drop for BitArray<A> {
    fn drop(&mut self) {
        if self.len > 0 {
            // SAFETY: ptr/len came from `allocate_zeroed` on this allocator
            unsafe { self.alloc.deallocate(self.ptr, self.len) };
        }
    }
}

impl<A: ByteAllocator + Clone> Clone for BitArray<A> {
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(copy) => copy,
            Err(_) => std::alloc::handle_alloc_error(
                std::alloc::Layout::from_size_align(self.len, 1)
                    .unwrap_or(std::alloc::Layout::new::<u8>()),
            ),
        }
    }
}

impl<A: ByteAllocator> fmt::Debug for BitArray<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitArray")
            .field("len_bytes", &self.len)
            .field("count_ones", &self.count_ones())
            .finish()
    }
}

impl<A: ByteAllocator, B: ByteAllocator> PartialEq<BitArray<B>> for BitArray<A> {
    fn eq(&self, other: &BitArray<B>) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<A: ByteAllocator> Eq for BitArray<A> {}
