//! Allocator boundary for bit array buffers.
//!
//! A [`BitArray`](crate::core::BitArray) never talks to the global heap
//! directly; it requests its byte buffer through a [`ByteAllocator`]. Only two
//! operations are required from an allocator: hand out `n` bytes and take them
//! back. The default [`Global`] forwards to the process allocator.
//!
//! # Examples
//!
//! ```
//! use blockbloom::core::alloc::{ByteAllocator, Global};
//!
//! let alloc = Global;
//! let ptr = alloc.allocate_zeroed(64).unwrap();
//! // SAFETY: ptr was returned by `alloc` for 64 bytes and is not used afterwards
//! unsafe { alloc.deallocate(ptr, 64) };
//! ```
//!
//! Implementing the trait is `unsafe`: bit arrays trust the returned buffer
//! size when they build slices over it.
//!
//! ```compile_fail
//! use blockbloom::core::alloc::{ByteAllocator, Global};
//! use std::ptr::NonNull;
//!
//! struct Forwarding;
//!
//! impl ByteAllocator for Forwarding {
//!     fn allocate(&self, n: usize) -> blockbloom::Result<NonNull<u8>> {
//!         Global.allocate(n)
//!     }
//!     unsafe fn deallocate(&self, ptr: NonNull<u8>, n: usize) {
//!         Global.deallocate(ptr, n)
//!     }
//! }
//! ```

use crate::error::{BloomError, Result};
use std::alloc::Layout;
use std::ptr::NonNull;

/// Source of raw byte buffers for bit arrays.
///
/// # Safety
///
/// Bit arrays build slices over the returned buffers without further checks,
/// so implementors must uphold:
///
/// - `allocate(n)` and `allocate_zeroed(n)` return a pointer valid for reads
///   and writes of `n` bytes until it is deallocated, or an error. They are
///   never called with `n == 0`.
/// - `deallocate(ptr, n)` is only called with a pointer previously returned by
///   `allocate`/`allocate_zeroed` of the same allocator and the same `n`.
pub unsafe trait ByteAllocator {
    /// Allocate `n_bytes` bytes. Contents are unspecified.
    ///
    /// # Errors
    ///
    /// [`BloomError::AllocationFailure`] if the memory cannot be provided.
    fn allocate(&self, n_bytes: usize) -> Result<NonNull<u8>>;

    /// Release a buffer obtained from this allocator.
    ///
    /// # Safety
    ///
    /// `ptr` must come from `allocate`/`allocate_zeroed` on this allocator with
    /// the same `n_bytes`, and must not be used afterwards.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, n_bytes: usize);

    /// Allocate `n_bytes` zero-filled bytes.
    ///
    /// The default implementation allocates and then zero-fills; allocators
    /// with a cheaper zeroing path should override it.
    ///
    /// # Errors
    ///
    /// [`BloomError::AllocationFailure`] if the memory cannot be provided.
    fn allocate_zeroed(&self, n_bytes: usize) -> Result<NonNull<u8>> {
        let ptr = self.allocate(n_bytes)?;
        // SAFETY: `allocate` returned a pointer valid for `n_bytes` writes
        unsafe { ptr.as_ptr().write_bytes(0, n_bytes) };
        Ok(ptr)
    }
}

/// The process-wide allocator (`std::alloc`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Global;

impl Global {
    fn layout(n_bytes: usize) -> Result<Layout> {
        Layout::array::<u8>(n_bytes).map_err(|_| BloomError::allocation_failure(n_bytes))
    }
}

// SAFETY: buffers come from `std::alloc` with a layout of exactly `n_bytes`
unsafe impl ByteAllocator for Global {
    fn allocate(&self, n_bytes: usize) -> Result<NonNull<u8>> {
        debug_assert!(n_bytes > 0, "zero-sized allocations are never requested");
        let layout = Self::layout(n_bytes)?;
        // SAFETY: layout has non-zero size
        let ptr = unsafe { std::alloc::alloc(layout) };
        NonNull::new(ptr).ok_or_else(|| BloomError::allocation_failure(n_bytes))
    }

    fn allocate_zeroed(&self, n_bytes: usize) -> Result<NonNull<u8>> {
        debug_assert!(n_bytes > 0, "zero-sized allocations are never requested");
        let layout = Self::layout(n_bytes)?;
        // SAFETY: layout has non-zero size
        let ptr = unsafe { std::alloc::alloc_zeroed(layout) };
        NonNull::new(ptr).ok_or_else(|| BloomError::allocation_failure(n_bytes))
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, n_bytes: usize) {
        // Layout was valid when the buffer was handed out
        let layout = Layout::from_size_align_unchecked(n_bytes, 1);
        std::alloc::dealloc(ptr.as_ptr(), layout);
    }
}
