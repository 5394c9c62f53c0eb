//! N-dimensional arrays with shared-buffer strided views.
//!
//! An [`NdArray`] is a [`Header`] (shape, strides, offset, partial flag) plus a
//! reference-counted handle to a typed buffer. Copying an array copies the
//! header and shares the buffer; slicing produces a new header over the same
//! buffer. All whole-array operations enumerate coordinates with a
//! [`Subscriptor`], an odometer over a box of subscripts that can visit axes
//! in any declared order.
//!
//! # Core Types
//!
//! - [`NdArray`]: value-semantics array with aliasing views
//! - [`Header`] / [`Dims`]: shape and row-major stride descriptor
//! - [`Subscriptor`]: ordered multi-index iteration
//! - [`NdRange`]: strided sub-interval along one axis, used to build slices
//!
//! # Operations
//!
//! - [`transform`], [`binary`]: element-wise maps into new storage
//! - [`reduce`], [`reduce_axis`]: folds over all elements or along an axis
//! - [`filter`], [`filter_mask`], [`indices`], [`indices_mask`]: selection
//! - [`transpose`]: axis permutation into contiguous storage
//! - [`copy`], [`clone`], [`reshaped`], [`resized`]: storage management
//!
//! # Example
//!
//! ```rust
//! use strided_ndarray::{NdArray, NdRange};
//!
//! let arr = NdArray::<i32>::from_slice(&[3, 1, 2], &[1, 2, 3, 4, 5, 6]).unwrap();
//! assert_eq!(arr.get(&[2, 0, 1]).unwrap(), 6);
//!
//! // Views share the buffer.
//! let mut row = arr.slice(&[NdRange::new(1, 2)]).unwrap();
//! assert_eq!(row.dims(), &[1, 1, 2]);
//! row.set(&[0, 0, 0], 30).unwrap();
//! assert_eq!(arr.get(&[1, 0, 0]).unwrap(), 30);
//! ```

mod array;
mod buffer;
mod dims;
mod element;
mod header;
mod ops;
mod range;
mod subscriptor;

pub use array::{NdArray, NdIter};
pub use buffer::{Alloc, Buffer, GlobalAlloc, SharedBuffer};
pub use dims::{checked_count, row_major_strides, Dims};
pub use element::{convert, is_equal, Element, Precision};
pub use header::Header;
pub use ops::{
    binary, clone, copy, filter, filter_mask, indices, indices_mask, reduce, reduce_axis, reshaped,
    resized, transform, transpose,
};
pub use range::NdRange;
pub use subscriptor::Subscriptor;

// ============================================================================
// Error types
// ============================================================================

/// Category of an [`NdError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input: shapes, ranges, masks, permutations.
    InvalidArgument,
    /// Index, subscript or range beyond the logical extent.
    OutOfRange,
    /// Operation not possible on this array (allocation, partial views).
    Runtime,
    /// Arithmetic overflow of a computed size.
    Overflow,
}

/// Errors that can occur during array operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NdError {
    /// A non-empty shape contains a zero-sized axis.
    #[error("zero-sized axis {axis} in dims {dims:?}")]
    ZeroAxis { axis: usize, dims: Vec<usize> },

    /// Subscript bounds disagree in axis count.
    #[error("bounds rank mismatch: from has {from} axes, to has {to}")]
    BoundsRankMismatch { from: usize, to: usize },

    /// A lower subscript bound exceeds its upper bound.
    #[error("invalid bounds on axis {axis}: from {from} > to {to}")]
    InvalidBounds { axis: usize, from: usize, to: usize },

    /// Axis order is not a permutation of the iterated axes.
    #[error("invalid axis order {order:?} for rank {rank}")]
    InvalidOrder { order: Vec<usize>, rank: usize },

    /// Fixed subscripts do not fit the iterated box.
    #[error("invalid fixed subscripts {fixed:?}")]
    InvalidFixed { fixed: Vec<usize> },

    /// Axis index is not smaller than the rank.
    #[error("invalid axis {axis} for rank {rank}")]
    InvalidAxis { axis: usize, rank: usize },

    /// Range with `start > stop` or `step == 0`.
    #[error("invalid range {start}..{stop} step {step}")]
    InvalidRange {
        start: usize,
        stop: usize,
        step: usize,
    },

    /// Shapes are incompatible for the operation.
    #[error("shape mismatch: {0:?} vs {1:?}")]
    ShapeMismatch(Vec<usize>, Vec<usize>),

    /// Element counts are incompatible for the operation.
    #[error("element count mismatch: {0} vs {1}")]
    CountMismatch(usize, usize),

    /// Non-empty array given an empty target shape.
    #[error("empty target shape for a non-empty array")]
    EmptyShape,

    /// Subscript beyond the extent of its axis.
    #[error("index {index} out of range for axis {axis} of extent {extent}")]
    IndexOutOfRange {
        axis: usize,
        index: usize,
        extent: usize,
    },

    /// More subscripts than the array has axes.
    #[error("too many subscripts: {given} for rank {rank}")]
    TooManyIndices { given: usize, rank: usize },

    /// More slice ranges than the array has axes.
    #[error("too many ranges: {given} for rank {rank}")]
    TooManyRanges { given: usize, rank: usize },

    /// Slice range beyond the extent of its axis.
    #[error("range {start}..{stop} out of range for axis {axis} of extent {extent}")]
    RangeOutOfBounds {
        axis: usize,
        start: usize,
        stop: usize,
        extent: usize,
    },

    /// Buffer allocation failed.
    #[error("failed to allocate {count} elements")]
    AllocationFailed { count: usize },

    /// Operation requires contiguous storage but the array is a partial view.
    #[error("{0} is not allowed on a partial view")]
    PartialView(&'static str),

    /// Element count of a shape overflows `usize`.
    #[error("element count overflow for dims {0:?}")]
    CountOverflow(Vec<usize>),
}

impl NdError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            NdError::ZeroAxis { .. }
            | NdError::BoundsRankMismatch { .. }
            | NdError::InvalidBounds { .. }
            | NdError::InvalidOrder { .. }
            | NdError::InvalidFixed { .. }
            | NdError::InvalidAxis { .. }
            | NdError::InvalidRange { .. }
            | NdError::ShapeMismatch(..)
            | NdError::CountMismatch(..)
            | NdError::EmptyShape => ErrorKind::InvalidArgument,
            NdError::IndexOutOfRange { .. }
            | NdError::TooManyIndices { .. }
            | NdError::TooManyRanges { .. }
            | NdError::RangeOutOfBounds { .. } => ErrorKind::OutOfRange,
            NdError::AllocationFailed { .. } | NdError::PartialView(_) => ErrorKind::Runtime,
            NdError::CountOverflow(_) => ErrorKind::Overflow,
        }
    }
}

/// Result type for array operations.
pub type Result<T> = std::result::Result<T, NdError>;
