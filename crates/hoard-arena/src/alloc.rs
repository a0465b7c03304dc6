//! The allocator capability an [`Arena`](crate::Arena) draws memory from.
//!
//! [`RawAllocator`] is a deliberately small seam: allocate, resize and
//! release. The arena does all bookkeeping; implementations only move
//! bytes. [`SystemAllocator`] forwards to the global allocator and is the
//! default. Test tooling substitutes tracking or fault-injecting
//! implementations without touching arena logic.

use std::alloc::Layout;
use std::ptr::NonNull;

/// Source of raw memory blocks for an arena.
///
/// Returning `None` signals exhaustion; the arena turns it into
/// [`ArenaError::OutOfMemory`](crate::ArenaError::OutOfMemory).
#[allow(unsafe_code)]
pub trait RawAllocator {
    /// Allocate a block described by `layout`.
    ///
    /// # Safety
    ///
    /// `layout.size()` must be non-zero.
    unsafe fn allocate(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Resize a block to `new_size` bytes, keeping its alignment.
    ///
    /// Contents are preserved up to the lesser of the old and new sizes.
    /// On success the old pointer must no longer be used. On failure
    /// (`None`) the old block is untouched and still valid.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this allocator with `layout` and not
    /// yet released. `new_size` must be non-zero and, rounded up to
    /// `layout.align()`, must not overflow `isize`.
    unsafe fn resize(&self, ptr: NonNull<u8>, layout: Layout, new_size: usize)
        -> Option<NonNull<u8>>;

    /// Release a block.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this allocator with `layout` and not
    /// yet released.
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout);
}

/// [`RawAllocator`] backed by the process-wide global allocator.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemAllocator;

#[allow(unsafe_code)]
impl RawAllocator for SystemAllocator {
    unsafe fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        // SAFETY: caller guarantees a non-zero size.
        NonNull::new(unsafe { std::alloc::alloc(layout) })
    }

    unsafe fn resize(
        &self,
        ptr: NonNull<u8>,
        layout: Layout,
        new_size: usize,
    ) -> Option<NonNull<u8>> {
        // SAFETY: caller guarantees ptr/layout provenance and a valid new size.
        NonNull::new(unsafe { std::alloc::realloc(ptr.as_ptr(), layout, new_size) })
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: caller guarantees ptr was allocated here with this layout.
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) }
    }
}
