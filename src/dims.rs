//! Shape and stride sequences.

use std::fmt;
use std::ops::Deref;

use smallvec::SmallVec;

use crate::{NdError, Result};

/// Inline capacity before a `Dims` spills to the heap.
const INLINE_AXES: usize = 6;

/// An owned sequence of axis sizes (or strides).
///
/// Used both for the shape of an array and for its row-major strides.
/// Empty iff it has no axes.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Dims(SmallVec<[usize; INLINE_AXES]>);

impl Dims {
    /// Creates the empty (zero-axis) sequence.
    #[inline]
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    /// Creates a sequence of `count` zeros.
    #[inline]
    pub fn zeros(count: usize) -> Self {
        Self(SmallVec::from_elem(0, count))
    }

    /// Number of axes.
    #[inline]
    pub fn count(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [usize] {
        &mut self.0
    }

    /// Returns a copy with `axis` removed.
    pub fn without_axis(&self, axis: usize) -> Self {
        self.0
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != axis)
            .map(|(_, &d)| d)
            .collect()
    }

    /// Returns the sequence reordered so that entry `i` is `self[order[i]]`.
    pub fn permuted(&self, order: &[usize]) -> Self {
        order.iter().map(|&axis| self.0[axis]).collect()
    }
}

impl Deref for Dims {
    type Target = [usize];

    #[inline]
    fn deref(&self) -> &[usize] {
        &self.0
    }
}

impl From<&[usize]> for Dims {
    fn from(values: &[usize]) -> Self {
        Self(SmallVec::from_slice(values))
    }
}

impl<const N: usize> From<[usize; N]> for Dims {
    fn from(values: [usize; N]) -> Self {
        Self(SmallVec::from_slice(&values))
    }
}

impl From<Vec<usize>> for Dims {
    fn from(values: Vec<usize>) -> Self {
        Self(SmallVec::from_vec(values))
    }
}

impl FromIterator<usize> for Dims {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl PartialEq<[usize]> for Dims {
    fn eq(&self, other: &[usize]) -> bool {
        self.as_slice() == other
    }
}

impl fmt::Debug for Dims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

/// Compute row-major strides (last index varies fastest).
///
/// Returns an error if the running product overflows `usize`.
pub fn row_major_strides(dims: &[usize]) -> Result<Dims> {
    let rank = dims.len();
    if rank == 0 {
        return Ok(Dims::new());
    }
    let mut strides = Dims::zeros(rank);
    let values = strides.as_mut_slice();
    values[rank - 1] = 1;
    for i in (0..rank - 1).rev() {
        values[i] = values[i + 1]
            .checked_mul(dims[i + 1])
            .ok_or_else(|| NdError::CountOverflow(dims.to_vec()))?;
    }
    Ok(strides)
}

/// Total element count of a non-empty shape with no zero axis.
///
/// An empty `dims` has count 0 (the canonical empty array). A zero axis in a
/// non-empty `dims` is rejected.
pub fn checked_count(dims: &[usize]) -> Result<usize> {
    if dims.is_empty() {
        return Ok(0);
    }
    if let Some(axis) = dims.iter().position(|&d| d == 0) {
        return Err(NdError::ZeroAxis {
            axis,
            dims: dims.to_vec(),
        });
    }
    dims.iter().try_fold(1usize, |acc, &d| {
        acc.checked_mul(d)
            .ok_or_else(|| NdError::CountOverflow(dims.to_vec()))
    })
}
