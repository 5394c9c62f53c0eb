//! Typed storage and the shared handle that lets views alias one allocation.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::{NdError, Result};

/// Source of storage for a [`Buffer`].
///
/// Constructors on [`Buffer`] with an `_in` suffix take the allocator
/// explicitly; the others use [`GlobalAlloc`]. Storage is released when the
/// buffer is dropped.
pub trait Alloc {
    /// Returns an empty vector with room for `capacity` elements.
    ///
    /// # Errors
    /// `AllocationFailed` if the memory cannot be provided.
    fn alloc<T>(&self, capacity: usize) -> Result<Vec<T>>;

    /// Makes room for `additional` more elements in `data`.
    ///
    /// # Errors
    /// `AllocationFailed` if the memory cannot be provided; `data` is left
    /// unchanged.
    fn grow<T>(&self, data: &mut Vec<T>, additional: usize) -> Result<()>;
}

impl<A: Alloc> Alloc for &A {
    fn alloc<T>(&self, capacity: usize) -> Result<Vec<T>> {
        A::alloc(self, capacity)
    }

    fn grow<T>(&self, data: &mut Vec<T>, additional: usize) -> Result<()> {
        A::grow(self, data, additional)
    }
}

/// [`Alloc`] backed by the global allocator. Failures are reported instead
/// of aborting.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalAlloc;

impl Alloc for GlobalAlloc {
    fn alloc<T>(&self, capacity: usize) -> Result<Vec<T>> {
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|_| NdError::AllocationFailed { count: capacity })?;
        tracing::trace!(count = capacity, "allocated buffer");
        Ok(data)
    }

    fn grow<T>(&self, data: &mut Vec<T>, additional: usize) -> Result<()> {
        data.try_reserve_exact(additional)
            .map_err(|_| NdError::AllocationFailed {
                count: data.len().saturating_add(additional),
            })
    }
}

/// A heap-allocated block of `T`.
#[derive(Clone, PartialEq)]
pub struct Buffer<T> {
    data: Vec<T>,
}

impl<T> Buffer<T> {
    /// Wraps an existing vector without copying.
    #[inline]
    pub fn from_vec(data: Vec<T>) -> Self {
        Self { data }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.data.as_ptr()
    }
}

impl<T: Clone> Buffer<T> {
    /// Allocates `count` copies of `value`.
    ///
    /// # Errors
    /// `AllocationFailed` if the allocator cannot provide the memory.
    pub fn with_value(count: usize, value: T) -> Result<Self> {
        Self::with_value_in(count, value, GlobalAlloc)
    }

    /// Variant of [`with_value`](Self::with_value) that takes an allocator.
    pub fn with_value_in<A: Alloc>(count: usize, value: T, alloc: A) -> Result<Self> {
        let mut data = alloc.alloc(count)?;
        data.resize(count, value);
        Ok(Self { data })
    }

    /// Allocates a copy of `values`.
    ///
    /// # Errors
    /// `AllocationFailed` if the allocator cannot provide the memory.
    pub fn from_slice(values: &[T]) -> Result<Self> {
        Self::from_slice_in(values, GlobalAlloc)
    }

    /// Variant of [`from_slice`](Self::from_slice) that takes an allocator.
    pub fn from_slice_in<A: Alloc>(values: &[T], alloc: A) -> Result<Self> {
        let mut data = alloc.alloc(values.len())?;
        data.extend_from_slice(values);
        Ok(Self { data })
    }

    /// Grows or truncates the block, filling new slots with `value`.
    ///
    /// # Errors
    /// `AllocationFailed` if growing fails; the block is left unchanged.
    pub fn resize(&mut self, count: usize, value: T) -> Result<()> {
        self.resize_in(count, value, GlobalAlloc)
    }

    /// Variant of [`resize`](Self::resize) that takes an allocator.
    pub fn resize_in<A: Alloc>(&mut self, count: usize, value: T, alloc: A) -> Result<()> {
        if count > self.data.len() {
            let additional = count - self.data.len();
            alloc.grow(&mut self.data, additional)?;
        }
        self.data.resize(count, value);
        Ok(())
    }
}

impl<T> fmt::Debug for Buffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer").field("len", &self.data.len()).finish()
    }
}

// ============================================================================
// SharedBuffer
// ============================================================================

/// Reference-counted handle to a [`Buffer`].
///
/// Cloning the handle shares the allocation; it is freed when the last handle
/// is dropped. Sharing is single-threaded: the handle is neither `Send` nor
/// `Sync`.
pub struct SharedBuffer<T> {
    inner: Rc<RefCell<Buffer<T>>>,
}

impl<T> Clone for SharedBuffer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> SharedBuffer<T> {
    pub fn new(buffer: Buffer<T>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(buffer)),
        }
    }

    /// Number of handles sharing this allocation.
    #[inline]
    pub fn use_count(&self) -> usize {
        Rc::strong_count(&self.inner)
    }

    /// True if both handles refer to the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Address of the first element.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.inner.borrow().as_ptr()
    }

    /// Borrows the elements for reading.
    ///
    /// # Panics
    /// Panics if the elements are currently borrowed for writing.
    #[inline]
    pub fn read(&self) -> Ref<'_, [T]> {
        Ref::map(self.inner.borrow(), Buffer::as_slice)
    }

    /// Borrows the elements for writing.
    ///
    /// # Panics
    /// Panics if the elements are currently borrowed.
    #[inline]
    pub fn write(&self) -> RefMut<'_, [T]> {
        RefMut::map(self.inner.borrow_mut(), Buffer::as_mut_slice)
    }
}

impl<T> fmt::Debug for SharedBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedBuffer")
            .field("len", &self.inner.borrow().len())
            .field("use_count", &self.use_count())
            .finish()
    }
}
