use std::alloc::{alloc, dealloc, Layout};
use std::fmt;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use num::Zero;

use crate::error::{allocation_error, layout_error, Result};

/// An owned, fixed-length block of elements at an alignment-guaranteed address.
///
/// The buffer requests `len * size_of::<T>()` bytes rounded up to the next
/// multiple of `alignment`, so the first element always sits on an
/// `alignment`-byte boundary and full SIMD registers can be loaded with the
/// aligned instructions.
///
/// # Memory Safety
///
/// - Memory is obtained from `std::alloc::alloc()` and returned through
///   `std::alloc::dealloc()` with the same `Layout`, exactly once, in `Drop`
/// - Every element is initialized at construction, so the buffer can be
///   viewed as a slice at any time
/// - Zero-length buffers never allocate; their pointer is a dangling address
///   equal to `alignment`, which still satisfies the alignment contract
///
/// # Example
///
/// ```rust
/// use lazysimd::AlignedBuffer;
///
/// let buffer = AlignedBuffer::<f64>::allocate_filled(10, 32, 1.5).unwrap();
/// assert_eq!(buffer.as_ptr() as usize % 32, 0);
/// assert!(buffer.iter().all(|&x| x == 1.5));
/// ```
pub struct AlignedBuffer<T> {
    ptr: NonNull<T>,
    len: usize,
    layout: Layout,
}

// SAFETY: the buffer exclusively owns its elements, like `Box<[T]>`.
unsafe impl<T: Send> Send for AlignedBuffer<T> {}
unsafe impl<T: Sync> Sync for AlignedBuffer<T> {}

impl<T: Copy + Zero> AlignedBuffer<T> {
    /// Allocates `len` zero-initialized elements aligned to `alignment` bytes.
    ///
    /// # Errors
    ///
    /// - [`LayoutError`](crate::LazySimdError::LayoutError) if `alignment` is not
    ///   a power of two, is smaller than the natural alignment of `T`, or the
    ///   byte size overflows
    /// - [`AllocationError`](crate::LazySimdError::AllocationError) if the
    ///   allocator is out of memory
    pub fn allocate(len: usize, alignment: usize) -> Result<Self> {
        Self::allocate_filled(len, alignment, T::zero())
    }
}

impl<T: Copy> AlignedBuffer<T> {
    /// Allocates `len` elements aligned to `alignment` bytes, each set to `value`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`AlignedBuffer::allocate`].
    pub fn allocate_filled(len: usize, alignment: usize, value: T) -> Result<Self> {
        let buffer = Self::allocate_uninit(len, alignment)?;

        // SAFETY: the block holds at least `len` elements of `T`.
        unsafe {
            for i in 0..len {
                buffer.ptr.as_ptr().add(i).write(value);
            }
        }

        Ok(buffer)
    }

    /// Allocates an aligned copy of `data`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`AlignedBuffer::allocate`].
    pub fn from_slice(data: &[T], alignment: usize) -> Result<Self> {
        let buffer = Self::allocate_uninit(data.len(), alignment)?;

        // SAFETY: the fresh block cannot overlap `data` and holds `data.len()` elements.
        unsafe {
            std::ptr::copy_nonoverlapping(data.as_ptr(), buffer.ptr.as_ptr(), data.len());
        }

        Ok(buffer)
    }

    /// Allocates a new buffer with the same alignment and a copy of the contents.
    ///
    /// # Errors
    ///
    /// Same conditions as [`AlignedBuffer::allocate`].
    pub fn try_clone(&self) -> Result<Self> {
        Self::from_slice(self.as_slice(), self.alignment())
    }

    /// Reserves the aligned block without initializing it. Callers must write
    /// all `len` elements before the buffer is observed.
    fn allocate_uninit(len: usize, alignment: usize) -> Result<Self> {
        let layout = Self::layout_for(len, alignment)?;

        if layout.size() == 0 {
            log::trace!("zero-sized aligned buffer ({len} elements, {alignment} byte alignment)");

            // Dangling but aligned: nothing is read or written through it.
            let ptr = NonNull::new(alignment as *mut T)
                .ok_or_else(|| layout_error(0, alignment, "alignment must be non-zero"))?;

            return Ok(Self { ptr, len, layout });
        }

        // SAFETY: layout has a non-zero size (checked above).
        let raw = unsafe { alloc(layout) } as *mut T;

        let ptr = NonNull::new(raw).ok_or_else(|| {
            allocation_error(layout.size(), alignment, "allocator returned null")
        })?;

        log::trace!(
            "allocated {} bytes at {:p} ({} elements, {} byte alignment)",
            layout.size(),
            ptr.as_ptr(),
            len,
            alignment
        );

        Ok(Self { ptr, len, layout })
    }

    /// Computes the allocation layout for `len` elements, rounding the byte
    /// size up to a multiple of `alignment`.
    fn layout_for(len: usize, alignment: usize) -> Result<Layout> {
        if !alignment.is_power_of_two() {
            return Err(layout_error(
                len,
                alignment,
                "alignment must be a power of two",
            ));
        }

        if alignment < mem::align_of::<T>() {
            return Err(layout_error(
                len,
                alignment,
                format!(
                    "alignment must be at least the natural alignment of the element ({} bytes)",
                    mem::align_of::<T>()
                ),
            ));
        }

        let size = len
            .checked_mul(mem::size_of::<T>())
            .and_then(|bytes| bytes.checked_next_multiple_of(alignment))
            .ok_or_else(|| layout_error(len, alignment, "total byte size overflows usize"))?;

        Layout::from_size_align(size, alignment)
            .map_err(|err| layout_error(size, alignment, err.to_string()))
    }
}

impl<T> AlignedBuffer<T> {
    /// Number of elements in the buffer.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` when the buffer holds no elements.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Alignment of the first element, in bytes.
    #[inline(always)]
    pub fn alignment(&self) -> usize {
        self.layout.align()
    }

    /// Number of bytes reserved, including the rounding padding.
    #[inline(always)]
    pub fn capacity_bytes(&self) -> usize {
        self.layout.size()
    }

    #[inline(always)]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    #[inline(always)]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `len` initialized elements live at `ptr` (dangling is fine for len == 0).
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as above, and `&mut self` guarantees exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

/// Returns the memory to the allocator with the layout it was obtained with.
impl<T> Drop for AlignedBuffer<T> {
    fn drop(&mut self) {
        if self.layout.size() > 0 {
            log::trace!(
                "releasing {} bytes at {:p}",
                self.layout.size(),
                self.ptr.as_ptr()
            );

            // SAFETY: `ptr` came from `alloc(self.layout)` and is released only here.
            unsafe {
                dealloc(self.ptr.as_ptr() as *mut u8, self.layout);
            }
        }
    }
}

impl<T> Deref for AlignedBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T> DerefMut for AlignedBuffer<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug> fmt::Debug for AlignedBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("len", &self.len)
            .field("alignment", &self.alignment())
            .field("data", &self.as_slice())
            .finish()
    }
}
