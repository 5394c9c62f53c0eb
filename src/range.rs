//! Strided sub-intervals used to build slices.

use crate::{NdError, Result};

/// A strided range `[start, stop)` with `step >= 1` along one axis.
///
/// A degenerate range (`start == stop`) selects the single position `start`,
/// so [`NdRange::at`] and the default range (`{0, 0, 1}`) pick one index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NdRange {
    pub start: usize,
    pub stop: usize,
    pub step: usize,
}

impl Default for NdRange {
    fn default() -> Self {
        Self {
            start: 0,
            stop: 0,
            step: 1,
        }
    }
}

impl NdRange {
    /// Range `[start, stop)` with step 1.
    #[inline]
    pub fn new(start: usize, stop: usize) -> Self {
        Self {
            start,
            stop,
            step: 1,
        }
    }

    /// Range `[start, stop)` taking every `step`-th position.
    #[inline]
    pub fn with_step(start: usize, stop: usize, step: usize) -> Self {
        Self { start, stop, step }
    }

    /// Single position `index`.
    #[inline]
    pub fn at(index: usize) -> Self {
        Self {
            start: index,
            stop: index,
            step: 1,
        }
    }

    /// Whole axis of the given extent.
    #[inline]
    pub fn full(extent: usize) -> Self {
        Self::new(0, extent)
    }

    /// Number of positions selected by this range.
    ///
    /// An invalid range (`step == 0` or `start > stop`) selects nothing.
    #[inline]
    pub fn len(&self) -> usize {
        if self.step == 0 || self.start > self.stop {
            0
        } else if self.start == self.stop {
            1
        } else {
            (self.stop - self.start).div_ceil(self.step)
        }
    }

    /// True only for an invalid range; a valid one selects at least one
    /// position.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks the range shape and its fit into an axis of `extent`.
    pub(crate) fn validate(&self, axis: usize, extent: usize) -> Result<()> {
        if self.step == 0 || self.start > self.stop {
            return Err(NdError::InvalidRange {
                start: self.start,
                stop: self.stop,
                step: self.step,
            });
        }
        let past_end = if self.start == self.stop {
            self.start >= extent
        } else {
            self.stop > extent
        };
        if past_end {
            return Err(NdError::RangeOutOfBounds {
                axis,
                start: self.start,
                stop: self.stop,
                extent,
            });
        }
        Ok(())
    }

    /// True if the range visits every position of an axis of `extent` in order.
    #[inline]
    pub(crate) fn covers(&self, extent: usize) -> bool {
        self.start == 0 && self.step == 1 && self.len() == extent
    }
}

impl From<std::ops::Range<usize>> for NdRange {
    fn from(range: std::ops::Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl From<usize> for NdRange {
    fn from(index: usize) -> Self {
        Self::at(index)
    }
}
