//! The N-dimensional array container.

use std::fmt;

use num_traits::AsPrimitive;

use crate::buffer::{Buffer, SharedBuffer};
use crate::dims::{checked_count, Dims};
use crate::element::{is_equal, Element};
use crate::header::Header;
use crate::range::NdRange;
use crate::subscriptor::Subscriptor;
use crate::{NdError, Result};

/// N-dimensional array over a reference-counted buffer.
///
/// `Clone` is O(1): the clone copies the header and shares the buffer, so
/// writes through either handle are visible through the other. Slices share
/// the buffer the same way. Use [`crate::clone`] for an independent deep copy.
///
/// The default value is the canonical empty array: no axes, no buffer.
pub struct NdArray<T> {
    header: Header,
    buffer: Option<SharedBuffer<T>>,
}

impl<T> Default for NdArray<T> {
    fn default() -> Self {
        Self {
            header: Header::default(),
            buffer: None,
        }
    }
}

impl<T> Clone for NdArray<T> {
    fn clone(&self) -> Self {
        Self {
            header: self.header.clone(),
            buffer: self.buffer.clone(),
        }
    }
}

impl<T> NdArray<T> {
    #[inline]
    pub fn header(&self) -> &Header {
        &self.header
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        self.header.dims()
    }

    /// Number of axes.
    #[inline]
    pub fn rank(&self) -> usize {
        self.header.rank()
    }

    /// Number of logical elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.header.count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.header.is_empty()
    }

    #[inline]
    pub fn is_partial(&self) -> bool {
        self.header.is_partial()
    }

    /// Number of arrays and views sharing this array's buffer (0 if empty).
    pub fn use_count(&self) -> usize {
        self.buffer.as_ref().map_or(0, SharedBuffer::use_count)
    }

    /// True if both arrays alias the same buffer.
    pub fn shares_buffer(&self, other: &NdArray<T>) -> bool {
        match (&self.buffer, &other.buffer) {
            (Some(a), Some(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Address of the first buffer element, or null for the empty array.
    ///
    /// Only meaningful for identity checks; a view's first logical element
    /// sits `header().offset()` elements further.
    pub fn as_ptr(&self) -> *const T {
        self.buffer
            .as_ref()
            .map_or(std::ptr::null(), SharedBuffer::as_ptr)
    }

    fn from_parts(header: Header, buffer: Buffer<T>) -> Self {
        if header.is_empty() {
            return Self::default();
        }
        Self {
            header,
            buffer: Some(SharedBuffer::new(buffer)),
        }
    }

    fn with_header(&self, header: Header) -> Self {
        if header.is_empty() {
            return Self::default();
        }
        Self {
            header,
            buffer: self.buffer.clone(),
        }
    }
}

impl<T: Element> NdArray<T> {
    /// Creates an array of `dims` filled with `T::default()`.
    ///
    /// Empty `dims` gives the empty array.
    ///
    /// # Errors
    /// `ZeroAxis` if any axis is 0, `CountOverflow`, `AllocationFailed`.
    pub fn new(dims: &[usize]) -> Result<Self> {
        let header = Header::new(dims)?;
        let buffer = Buffer::with_value(header.count(), T::default())?;
        Ok(Self::from_parts(header, buffer))
    }

    /// Creates an array of `dims` with every element set to `value`
    /// converted to `T`.
    pub fn filled<U: AsPrimitive<T>>(dims: &[usize], value: U) -> Result<Self> {
        let header = Header::new(dims)?;
        let buffer = Buffer::with_value(header.count(), value.as_())?;
        Ok(Self::from_parts(header, buffer))
    }

    /// Creates an array of `dims` from row-major `data`, converting each
    /// element to `T`.
    ///
    /// # Errors
    /// `CountMismatch` if `data` does not hold exactly one value per element.
    pub fn from_slice<U: AsPrimitive<T>>(dims: &[usize], data: &[U]) -> Result<Self> {
        let header = Header::new(dims)?;
        if data.len() != header.count() {
            return Err(NdError::CountMismatch(header.count(), data.len()));
        }
        let mut buffer = Buffer::with_value(header.count(), T::default())?;
        for (dst, &src) in buffer.as_mut_slice().iter_mut().zip(data) {
            *dst = src.as_();
        }
        Ok(Self::from_parts(header, buffer))
    }

    /// Creates an array of `dims` that takes ownership of row-major `data`.
    pub fn from_vec(dims: &[usize], data: Vec<T>) -> Result<Self> {
        let header = Header::new(dims)?;
        if data.len() != header.count() {
            return Err(NdError::CountMismatch(header.count(), data.len()));
        }
        Ok(Self::from_parts(header, Buffer::from_vec(data)))
    }

    /// Creates an array with values produced by a function.
    ///
    /// The function is called with coordinates in row-major order.
    pub fn from_fn(dims: &[usize], mut f: impl FnMut(&[usize]) -> T) -> Result<Self> {
        let header = Header::new(dims)?;
        let mut buffer = Buffer::with_value(header.count(), T::default())?;
        for (dst, subs) in buffer.as_mut_slice().iter_mut().zip(Subscriptor::new(dims)) {
            *dst = f(subs.as_slice());
        }
        Ok(Self::from_parts(header, buffer))
    }

    /// Reads the element at `subs`. Missing trailing subscripts are 0.
    ///
    /// # Errors
    /// `TooManyIndices` or `IndexOutOfRange`.
    pub fn get(&self, subs: &[usize]) -> Result<T> {
        let index = self.header.index_of(subs)?;
        self.buffer
            .as_ref()
            .map(|buffer| buffer.read()[index])
            .ok_or(NdError::IndexOutOfRange {
                axis: 0,
                index: 0,
                extent: 0,
            })
    }

    /// Writes the element at `subs`, visible through every aliasing view.
    pub fn set(&mut self, subs: &[usize], value: T) -> Result<()> {
        let index = self.header.index_of(subs)?;
        if let Some(buffer) = &self.buffer {
            buffer.write()[index] = value;
        }
        Ok(())
    }

    /// View of the region selected by `ranges`, one per leading axis.
    ///
    /// The view shares this array's buffer. Trailing axes without a range
    /// are kept whole.
    ///
    /// # Errors
    /// `TooManyRanges`, `InvalidRange` or `RangeOutOfBounds`.
    pub fn slice(&self, ranges: &[NdRange]) -> Result<Self> {
        let header = self.header.slice(ranges)?;
        Ok(self.with_header(header))
    }

    /// Sets every element of the array or view to `value` converted to `T`.
    pub fn fill<U: AsPrimitive<T>>(&mut self, value: U) {
        let value: T = value.as_();
        let Some(buffer) = &self.buffer else {
            return;
        };
        let mut data = buffer.write();
        for subs in Subscriptor::new(self.dims()) {
            data[self.header.offset_of(&subs)] = value;
        }
    }

    /// Copies `other` into this array's elements without reseating its
    /// buffer.
    ///
    /// With equal ranks the overlapping box of both shapes is copied
    /// coordinate by coordinate. Otherwise the first `min(len)` elements are
    /// copied in traversal order. `other` may alias this array.
    pub fn assign<U>(&mut self, other: &NdArray<U>) -> Result<()>
    where
        U: Element + AsPrimitive<T>,
    {
        self.assign_with(other, AsPrimitive::<T>::as_)
    }

    fn assign_with<U: Element>(
        &mut self,
        other: &NdArray<U>,
        convert: impl Fn(U) -> T,
    ) -> Result<()> {
        if self.is_empty() || other.is_empty() {
            return Ok(());
        }
        if self.rank() == other.rank() {
            let from = Dims::zeros(self.rank());
            let to: Dims = self
                .dims()
                .iter()
                .zip(other.dims())
                .map(|(&a, &b)| a.min(b))
                .collect();
            let region = Subscriptor::with_bounds(&from, &to)?;
            let values: Vec<T> = other
                .values_in(region.clone())
                .into_iter()
                .map(convert)
                .collect();
            self.write_in(region, &values);
        } else {
            let values: Vec<T> = other.iter().map(convert).collect();
            self.write_in(Subscriptor::new(self.dims()), &values);
        }
        Ok(())
    }

    /// Moves `source` into this array.
    ///
    /// A non-partial target adopts the header and buffer of `source`, which
    /// becomes empty. A partial target cannot adopt another buffer, so the
    /// values are copied as by [`assign`](Self::assign); `source` is then
    /// emptied only if it is non-partial and has the target's shape.
    pub fn move_from(&mut self, source: &mut NdArray<T>) -> Result<()> {
        if !self.is_partial() {
            *self = std::mem::take(source);
            return Ok(());
        }
        self.assign_with(source, |value| value)?;
        if !source.is_partial() && source.dims() == self.dims() {
            *source = Self::default();
        }
        Ok(())
    }

    /// Reinterprets the buffer under `dims` with contiguous strides.
    ///
    /// The result shares the buffer.
    ///
    /// # Errors
    /// `PartialView` on a partial view, `EmptyShape` or `CountMismatch`.
    pub fn reshape(&self, dims: &[usize]) -> Result<Self> {
        let header = self.header.reshape(dims)?;
        Ok(self.with_header(header))
    }

    /// Array of shape `dims` holding this array's elements in traversal
    /// order.
    ///
    /// With the same element count on a non-partial array this is
    /// [`reshape`](Self::reshape). Otherwise new storage is allocated:
    /// surplus elements are dropped and missing ones are `T::default()`.
    /// Empty `dims` gives the empty array.
    pub fn resize(&self, dims: &[usize]) -> Result<Self> {
        if dims.is_empty() {
            return Ok(Self::default());
        }
        let count = checked_count(dims)?;
        if count == self.len() && !self.is_partial() {
            return self.reshape(dims);
        }
        tracing::debug!(from = ?self.dims(), to = ?dims, "resize allocates new storage");
        Self::resized_copy(self, dims)
    }

    /// Independent copy with contiguous row-major storage.
    pub(crate) fn deep_copy(&self) -> Result<Self> {
        let Some(buffer) = &self.buffer else {
            return Ok(Self::default());
        };
        if self.is_partial() {
            return Self::from_vec(self.dims(), self.to_vec());
        }
        // a non-partial header is row-major and contiguous from its offset
        let start = self.header.offset();
        let copy = Buffer::from_slice(&buffer.read()[start..start + self.len()])?;
        Ok(Self::from_parts(Header::new(self.dims())?, copy))
    }

    pub(crate) fn resized_copy(source: &Self, dims: &[usize]) -> Result<Self> {
        let header = Header::new(dims)?;
        let mut buffer = Buffer::from_vec(source.to_vec());
        buffer.resize(header.count(), T::default())?;
        Ok(Self::from_parts(header, buffer))
    }

    /// Converts every element into a new, independent array of `U`.
    pub fn cast<U: Element>(&self) -> Result<NdArray<U>>
    where
        T: AsPrimitive<U>,
    {
        NdArray::from_vec(self.dims(), self.iter().map(AsPrimitive::<U>::as_).collect())
    }

    /// Elements in traversal order.
    pub fn to_vec(&self) -> Vec<T> {
        self.values_in(Subscriptor::new(self.dims()))
    }

    /// Iterates over element values in traversal order.
    pub fn iter(&self) -> NdIter<'_, T> {
        NdIter {
            array: self,
            subs: Subscriptor::new(self.dims()),
        }
    }

    /// Reads the elements visited by `subs`, in visiting order.
    pub(crate) fn values_in(&self, subs: Subscriptor) -> Vec<T> {
        let Some(buffer) = &self.buffer else {
            return Vec::new();
        };
        let data = buffer.read();
        subs.map(|s| data[self.header.offset_of(&s)]).collect()
    }

    /// Writes `values` to the elements visited by `subs`, in visiting order.
    ///
    /// Stops at whichever runs out first.
    pub(crate) fn write_in(&self, subs: Subscriptor, values: &[T]) {
        let Some(buffer) = &self.buffer else {
            return;
        };
        let mut data = buffer.write();
        for (s, &value) in subs.zip(values) {
            data[self.header.offset_of(&s)] = value;
        }
    }

    #[inline]
    fn value_at(&self, subs: &[usize]) -> Option<T> {
        self.buffer
            .as_ref()
            .map(|buffer| buffer.read()[self.header.offset_of(subs)])
    }
}

/// Element values of an [`NdArray`] in traversal order.
pub struct NdIter<'a, T> {
    array: &'a NdArray<T>,
    subs: Subscriptor,
}

impl<T: Element> Iterator for NdIter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let subs = self.subs.next()?;
        self.array.value_at(&subs)
    }
}

impl<'a, T: Element> IntoIterator for &'a NdArray<T> {
    type Item = T;
    type IntoIter = NdIter<'a, T>;

    fn into_iter(self) -> NdIter<'a, T> {
        self.iter()
    }
}

/// Arrays are equal when their logical shapes match and every pair of
/// elements compares equal under [`is_equal`]. Layout and buffer identity
/// are ignored.
impl<T: Element, U: Element> PartialEq<NdArray<U>> for NdArray<T> {
    fn eq(&self, other: &NdArray<U>) -> bool {
        self.dims() == other.dims() && self.iter().zip(other.iter()).all(|(a, b)| is_equal(a, b))
    }
}

impl<T: Element> fmt::Debug for NdArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NdArray")
            .field("dims", self.header.dims())
            .field("strides", self.header.strides())
            .field("offset", &self.header.offset())
            .field("is_partial", &self.header.is_partial())
            .field("values", &self.to_vec())
            .finish()
    }
}
