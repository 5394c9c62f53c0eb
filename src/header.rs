//! Array header: shape, strides, base offset and partial-view flag.

use crate::dims::{checked_count, row_major_strides, Dims};
use crate::range::NdRange;
use crate::{NdError, Result};

/// Describes how one array view maps logical subscripts onto a shared buffer.
///
/// The empty header (no axes, count 0) is the header of the canonical empty
/// array. A partial header comes from ranged slicing: its physical extent in
/// the buffer may exceed what its dims imply, so it cannot be reinterpreted
/// in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    dims: Dims,
    strides: Dims,
    count: usize,
    offset: usize,
    is_partial: bool,
}

impl Header {
    /// Builds a contiguous row-major header for `dims`.
    ///
    /// # Errors
    /// `ZeroAxis` if a non-empty `dims` has a zero axis, `CountOverflow` if
    /// the element count does not fit `usize`.
    pub fn new(dims: &[usize]) -> Result<Self> {
        let count = checked_count(dims)?;
        let strides = row_major_strides(dims)?;
        Ok(Self {
            dims: Dims::from(dims),
            strides,
            count,
            offset: 0,
            is_partial: false,
        })
    }

    #[inline]
    pub fn dims(&self) -> &Dims {
        &self.dims
    }

    #[inline]
    pub fn strides(&self) -> &Dims {
        &self.strides
    }

    /// Total number of logical elements.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Index of the first element in the shared buffer.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn is_partial(&self) -> bool {
        self.is_partial
    }

    /// Number of axes.
    #[inline]
    pub fn rank(&self) -> usize {
        self.dims.count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Buffer index of a full coordinate that is known to be in range.
    #[inline]
    pub(crate) fn offset_of(&self, subs: &[usize]) -> usize {
        subs.iter()
            .zip(self.strides.iter())
            .fold(self.offset, |acc, (&s, &stride)| acc + s * stride)
    }

    /// Buffer index of a possibly shortened coordinate.
    ///
    /// Missing trailing subscripts are taken as 0.
    ///
    /// # Errors
    /// `TooManyIndices` if more subscripts than axes are given,
    /// `IndexOutOfRange` if a subscript is not below its axis extent.
    pub fn index_of(&self, subs: &[usize]) -> Result<usize> {
        if subs.len() > self.rank() || (self.is_empty() && !subs.is_empty()) {
            return Err(NdError::TooManyIndices {
                given: subs.len(),
                rank: self.rank(),
            });
        }
        if self.is_empty() {
            return Err(NdError::IndexOutOfRange {
                axis: 0,
                index: 0,
                extent: 0,
            });
        }
        for (axis, (&index, &extent)) in subs.iter().zip(self.dims.iter()).enumerate() {
            if index >= extent {
                return Err(NdError::IndexOutOfRange {
                    axis,
                    index,
                    extent,
                });
            }
        }
        Ok(self.offset_of(subs))
    }

    /// Header of the view selected by `ranges`, one per leading axis.
    ///
    /// Axes without a range are kept whole. Slicing the empty header yields
    /// the empty header.
    ///
    /// # Errors
    /// `TooManyRanges`, `InvalidRange` or `RangeOutOfBounds`.
    pub fn slice(&self, ranges: &[NdRange]) -> Result<Self> {
        if self.is_empty() {
            return Ok(Self::default());
        }
        if ranges.len() > self.rank() {
            return Err(NdError::TooManyRanges {
                given: ranges.len(),
                rank: self.rank(),
            });
        }
        for (axis, range) in ranges.iter().enumerate() {
            range.validate(axis, self.dims[axis])?;
        }
        if ranges.is_empty() {
            return Ok(self.clone());
        }

        let mut dims = self.dims.clone();
        let mut strides = self.strides.clone();
        let mut offset = self.offset;
        let mut is_partial = self.is_partial;
        for (axis, range) in ranges.iter().enumerate() {
            offset += range.start * self.strides[axis];
            dims.as_mut_slice()[axis] = range.len();
            strides.as_mut_slice()[axis] = self.strides[axis] * range.step;
            is_partial |= !range.covers(self.dims[axis]);
        }
        let count = dims.iter().product();

        Ok(Self {
            dims,
            strides,
            count,
            offset,
            is_partial,
        })
    }

    /// Contiguous header with new `dims` over the same element count.
    ///
    /// # Errors
    /// `PartialView` on a partial header, `EmptyShape` or `CountMismatch`
    /// when the new shape does not hold the same number of elements.
    pub fn reshape(&self, dims: &[usize]) -> Result<Self> {
        if self.is_partial {
            return Err(NdError::PartialView("reshape"));
        }
        if dims.is_empty() && !self.is_empty() {
            return Err(NdError::EmptyShape);
        }
        let reshaped = Self::new(dims)?;
        if reshaped.count != self.count {
            return Err(NdError::CountMismatch(self.count, reshaped.count));
        }
        Ok(reshaped)
    }
}
