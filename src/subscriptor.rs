//! Ordered multi-index iteration over a box of subscripts.
//!
//! A [`Subscriptor`] is an odometer: each step increments the fastest axis of
//! its order, and an axis that reaches its upper bound wraps back to its lower
//! bound and carries into the next slower axis. When the slowest axis wraps,
//! the subscriptor is exhausted.
//!
//! The order lists axes from slowest to fastest, so the natural order
//! `[0, 1, ..., N-1]` is row-major traversal (last axis fastest).

use crate::dims::Dims;
use crate::{NdError, Result};

/// Lazy cursor over the subscripts of a (sub)region of an array.
///
/// The cursor can be driven by hand (`subs`, `advance`, `is_active`,
/// `reset`) or used as an [`Iterator`] of coordinates.
///
/// # Example
/// ```rust
/// use strided_ndarray::Subscriptor;
///
/// let coords: Vec<Vec<usize>> = Subscriptor::new(&[2, 2])
///     .map(|subs| subs.to_vec())
///     .collect();
/// assert_eq!(coords, vec![vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1]]);
/// ```
#[derive(Debug, Clone)]
pub struct Subscriptor {
    from: Dims,
    to: Dims,
    order: Dims,
    initial: Dims,
    subs: Dims,
    initially_active: bool,
    active: bool,
}

impl Subscriptor {
    /// Visits every coordinate in `[0, dims)` in row-major order.
    ///
    /// A shape with no axes or with a zero axis yields no coordinates.
    pub fn new(dims: &[usize]) -> Self {
        let from = Dims::zeros(dims.len());
        let order: Dims = (0..dims.len()).collect();
        Self::from_parts(from.clone(), Dims::from(dims), order, from)
    }

    /// Visits `[from_i, to_i)` on every axis in row-major order.
    ///
    /// # Errors
    /// `BoundsRankMismatch` or `InvalidBounds`.
    pub fn with_bounds(from: &[usize], to: &[usize]) -> Result<Self> {
        validate_bounds(from, to)?;
        let order: Dims = (0..from.len()).collect();
        Ok(Self::from_parts(
            Dims::from(from),
            Dims::from(to),
            order,
            Dims::from(from),
        ))
    }

    /// Visits `[from_i, to_i)` with axes ordered slowest to fastest by `order`.
    ///
    /// The last entry of `order` changes on every step.
    ///
    /// # Errors
    /// Bound errors, or `InvalidOrder` if `order` is not a permutation of
    /// `0..N`.
    pub fn with_order(from: &[usize], to: &[usize], order: &[usize]) -> Result<Self> {
        validate_bounds(from, to)?;
        if order.len() != from.len() || !is_unique_subset(order, from.len()) {
            return Err(NdError::InvalidOrder {
                order: order.to_vec(),
                rank: from.len(),
            });
        }
        Ok(Self::from_parts(
            Dims::from(from),
            Dims::from(to),
            Dims::from(order),
            Dims::from(from),
        ))
    }

    /// Visits only the axes listed in `order`; other axes stay fixed.
    ///
    /// Unlisted axes are held at `fixed[axis]`, or at `from[axis]` when
    /// `fixed` is empty. A held value must lie inside `[from, to)` of its axis,
    /// so a held axis with an empty box is rejected.
    ///
    /// # Errors
    /// Bound errors, `InvalidOrder` if `order` repeats an axis or names one
    /// out of range, `InvalidFixed` if `fixed` has the wrong length or a held
    /// value lies outside its bounds.
    pub fn with_fixed(
        from: &[usize],
        to: &[usize],
        order: &[usize],
        fixed: &[usize],
    ) -> Result<Self> {
        validate_bounds(from, to)?;
        let rank = from.len();
        if order.len() > rank || !is_unique_subset(order, rank) {
            return Err(NdError::InvalidOrder {
                order: order.to_vec(),
                rank,
            });
        }
        if !fixed.is_empty() && fixed.len() != rank {
            return Err(NdError::InvalidFixed {
                fixed: fixed.to_vec(),
            });
        }

        let held = if fixed.is_empty() { from } else { fixed };
        let mut initial = Dims::from(from);
        for axis in (0..rank).filter(|axis| !order.contains(axis)) {
            if held[axis] < from[axis] || held[axis] >= to[axis] {
                return Err(NdError::InvalidFixed {
                    fixed: held.to_vec(),
                });
            }
            initial.as_mut_slice()[axis] = held[axis];
        }
        Ok(Self::from_parts(
            Dims::from(from),
            Dims::from(to),
            Dims::from(order),
            initial,
        ))
    }

    /// Visits `[from_i, to_i)` with `axis` varying fastest.
    ///
    /// The remaining axes keep their natural order. To vary `axis` alone,
    /// bound every other axis to a single position.
    ///
    /// # Errors
    /// Bound errors, or `InvalidAxis` if `axis >= N`.
    pub fn along_axis(from: &[usize], to: &[usize], axis: usize) -> Result<Self> {
        validate_bounds(from, to)?;
        let order = axis_last_order(from.len(), axis)?;
        Ok(Self::from_parts(
            Dims::from(from),
            Dims::from(to),
            order,
            Dims::from(from),
        ))
    }

    /// Visits `[0, dims)` with `axis` varying fastest.
    ///
    /// # Errors
    /// `InvalidAxis` if `axis >= dims.len()`.
    pub fn dims_along_axis(dims: &[usize], axis: usize) -> Result<Self> {
        let order = axis_last_order(dims.len(), axis)?;
        let from = Dims::zeros(dims.len());
        Ok(Self::from_parts(from.clone(), Dims::from(dims), order, from))
    }

    fn from_parts(from: Dims, to: Dims, order: Dims, initial: Dims) -> Self {
        let active = !from.is_empty() && from.iter().zip(to.iter()).all(|(lo, hi)| lo < hi);
        Self {
            from,
            to,
            order,
            subs: initial.clone(),
            initial,
            initially_active: active,
            active,
        }
    }

    /// Current coordinate.
    #[inline]
    pub fn subs(&self) -> &[usize] {
        &self.subs
    }

    /// True while the cursor points at a valid coordinate.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Number of coordinates visited from the initial position.
    pub fn total(&self) -> usize {
        if !self.initially_active {
            return 0;
        }
        self.order
            .iter()
            .map(|&axis| self.to[axis] - self.from[axis])
            .product()
    }

    /// Moves to the next coordinate in declared order.
    ///
    /// Advancing past the last coordinate exhausts the cursor; advancing an
    /// exhausted cursor does nothing.
    pub fn advance(&mut self) {
        if !self.active {
            return;
        }
        let subs = self.subs.as_mut_slice();
        for &axis in self.order.iter().rev() {
            subs[axis] += 1;
            if subs[axis] < self.to[axis] {
                return;
            }
            subs[axis] = self.from[axis];
        }
        self.active = false;
    }

    /// Returns to the initial coordinate.
    pub fn reset(&mut self) {
        self.subs = self.initial.clone();
        self.active = self.initially_active;
    }
}

impl Iterator for Subscriptor {
    type Item = Dims;

    /// Yields the current coordinate, then advances.
    fn next(&mut self) -> Option<Dims> {
        if !self.active {
            return None;
        }
        let current = self.subs.clone();
        self.advance();
        Some(current)
    }
}

// ============================================================================
// Helper functions
// ============================================================================

fn validate_bounds(from: &[usize], to: &[usize]) -> Result<()> {
    if from.len() != to.len() {
        return Err(NdError::BoundsRankMismatch {
            from: from.len(),
            to: to.len(),
        });
    }
    for (axis, (&lo, &hi)) in from.iter().zip(to.iter()).enumerate() {
        if lo > hi {
            return Err(NdError::InvalidBounds {
                axis,
                from: lo,
                to: hi,
            });
        }
    }
    Ok(())
}

fn is_unique_subset(order: &[usize], rank: usize) -> bool {
    let mut seen = vec![false; rank];
    for &axis in order {
        if axis >= rank || seen[axis] {
            return false;
        }
        seen[axis] = true;
    }
    true
}

fn axis_last_order(rank: usize, axis: usize) -> Result<Dims> {
    if axis >= rank {
        return Err(NdError::InvalidAxis { axis, rank });
    }
    Ok((0..rank)
        .filter(|&i| i != axis)
        .chain(std::iter::once(axis))
        .collect())
}
