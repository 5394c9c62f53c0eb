//! Whole-array operations: element-wise maps, folds, selection, axis
//! permutation and storage management.
//!
//! Every operation visits elements through a [`Subscriptor`], so views are
//! handled the same way as contiguous arrays. Results that allocate always
//! get independent, contiguous, row-major storage.

use num_traits::AsPrimitive;

use crate::array::NdArray;
use crate::dims::Dims;
use crate::element::Element;
use crate::subscriptor::Subscriptor;
use crate::{NdError, Result};

// ============================================================================
// Element-wise maps
// ============================================================================

/// Applies `f` to every element, producing a new array of the same shape.
pub fn transform<T, U, F>(arr: &NdArray<T>, f: F) -> Result<NdArray<U>>
where
    T: Element,
    U: Element,
    F: FnMut(T) -> U,
{
    NdArray::from_vec(arr.dims(), arr.iter().map(f).collect())
}

/// Combines two arrays of the same shape element by element.
///
/// # Errors
/// `ShapeMismatch` if the logical shapes differ.
pub fn binary<T, U, V, F>(a: &NdArray<T>, b: &NdArray<U>, mut f: F) -> Result<NdArray<V>>
where
    T: Element,
    U: Element,
    V: Element,
    F: FnMut(T, U) -> V,
{
    if a.dims() != b.dims() {
        return Err(NdError::ShapeMismatch(a.dims().to_vec(), b.dims().to_vec()));
    }
    NdArray::from_vec(
        a.dims(),
        a.iter().zip(b.iter()).map(|(x, y)| f(x, y)).collect(),
    )
}

// ============================================================================
// Reductions
// ============================================================================

/// Folds every element in traversal order.
///
/// The accumulator starts as the first element converted to `U`; each
/// following element is combined as `f(element, accumulator)`. Returns
/// `None` for the empty array.
pub fn reduce<T, U, F>(arr: &NdArray<T>, mut f: F) -> Option<U>
where
    T: Element + AsPrimitive<U>,
    U: Copy + 'static,
    F: FnMut(T, U) -> U,
{
    let mut values = arr.iter();
    let first = AsPrimitive::<U>::as_(values.next()?);
    Some(values.fold(first, |acc, value| f(value, acc)))
}

/// Folds along `axis`, removing it from the shape.
///
/// Each output element folds the run of elements that differ only in `axis`,
/// as [`reduce`] does. Reducing the only axis of a 1-D array gives shape
/// `[1]`. The empty array reduces to the empty array.
///
/// # Errors
/// `InvalidAxis` if `axis >= arr.rank()`.
pub fn reduce_axis<T, U, F>(arr: &NdArray<T>, axis: usize, mut f: F) -> Result<NdArray<U>>
where
    T: Element + AsPrimitive<U>,
    U: Element,
    F: FnMut(T, U) -> U,
{
    if arr.is_empty() {
        return Ok(NdArray::default());
    }
    let runs = Subscriptor::dims_along_axis(arr.dims(), axis)?;
    let extent = arr.dims()[axis];
    let values = arr.values_in(runs);
    let folded: Vec<U> = values
        .chunks(extent)
        .filter_map(<[T]>::split_first)
        .map(|(&first, rest)| {
            let init = AsPrimitive::<U>::as_(first);
            rest.iter().fold(init, |acc, &value| f(value, acc))
        })
        .collect();

    let mut dims = Dims::from(arr.dims()).without_axis(axis);
    if dims.is_empty() {
        dims = Dims::from([1]);
    }
    NdArray::from_vec(&dims, folded)
}

// ============================================================================
// Selection
// ============================================================================

/// Elements for which `pred` holds, as a flat array of shape `[k]`.
///
/// Returns the empty array when nothing matches.
pub fn filter<T, F>(arr: &NdArray<T>, mut pred: F) -> Result<NdArray<T>>
where
    T: Element,
    F: FnMut(T) -> bool,
{
    flat(arr.iter().filter(|&value| pred(value)).collect())
}

/// Elements whose mask entry is non-zero, as a flat array of shape `[k]`.
///
/// An empty `arr` gives the empty array whatever the mask.
///
/// # Errors
/// `ShapeMismatch` if `mask` does not have the shape of `arr`.
pub fn filter_mask<T, M>(arr: &NdArray<T>, mask: &NdArray<M>) -> Result<NdArray<T>>
where
    T: Element,
    M: Element,
{
    if arr.is_empty() {
        return Ok(NdArray::default());
    }
    check_mask(arr, mask)?;
    flat(
        arr.iter()
            .zip(mask.iter())
            .filter(|&(_, keep)| keep.is_truthy())
            .map(|(value, _)| value)
            .collect(),
    )
}

/// Traversal positions (0-based) of the elements for which `pred` holds.
pub fn indices<T, F>(arr: &NdArray<T>, mut pred: F) -> Result<NdArray<usize>>
where
    T: Element,
    F: FnMut(T) -> bool,
{
    flat(
        arr.iter()
            .enumerate()
            .filter(|&(_, value)| pred(value))
            .map(|(pos, _)| pos)
            .collect(),
    )
}

/// Traversal positions (0-based) of the elements whose mask entry is
/// non-zero.
///
/// # Errors
/// `ShapeMismatch` if `mask` does not have the shape of `arr`.
pub fn indices_mask<T, M>(arr: &NdArray<T>, mask: &NdArray<M>) -> Result<NdArray<usize>>
where
    T: Element,
    M: Element,
{
    if arr.is_empty() {
        return Ok(NdArray::default());
    }
    check_mask(arr, mask)?;
    flat(
        mask.iter()
            .enumerate()
            .filter(|&(_, keep)| keep.is_truthy())
            .map(|(pos, _)| pos)
            .collect(),
    )
}

fn check_mask<T, M>(arr: &NdArray<T>, mask: &NdArray<M>) -> Result<()> {
    if arr.dims() != mask.dims() {
        return Err(NdError::ShapeMismatch(
            arr.dims().to_vec(),
            mask.dims().to_vec(),
        ));
    }
    Ok(())
}

fn flat<T: Element>(values: Vec<T>) -> Result<NdArray<T>> {
    if values.is_empty() {
        return Ok(NdArray::default());
    }
    NdArray::from_vec(&[values.len()], values)
}

// ============================================================================
// Axis permutation
// ============================================================================

/// Permutes the axes of `arr` into new contiguous storage.
///
/// Axis `i` of the result is axis `order[i]` of `arr`, so the result has
/// dims `dims[order[0]], dims[order[1]], ...`.
///
/// # Errors
/// `InvalidOrder` if `order` is not a permutation of `0..rank`.
pub fn transpose<T: Element>(arr: &NdArray<T>, order: &[usize]) -> Result<NdArray<T>> {
    if arr.is_empty() {
        return Ok(NdArray::default());
    }
    let from = Dims::zeros(arr.rank());
    let visit = Subscriptor::with_order(&from, arr.dims(), order)?;
    let dims = Dims::from(arr.dims()).permuted(order);
    NdArray::from_vec(&dims, arr.values_in(visit))
}

// ============================================================================
// Storage management
// ============================================================================

/// Copies the elements of `src` into `dst`, converting to `U`.
///
/// With equal element counts the values are written in traversal order and
/// `dst` keeps its shape. Otherwise a non-partial `dst` is replaced by new
/// storage of `src`'s shape. `src` may alias `dst`.
///
/// # Errors
/// `PartialView` if the counts differ and `dst` is a partial view.
pub fn copy<T, U>(src: &NdArray<T>, dst: &mut NdArray<U>) -> Result<()>
where
    T: Element + AsPrimitive<U>,
    U: Element,
{
    if src.len() == dst.len() {
        let values: Vec<U> = src.iter().map(AsPrimitive::<U>::as_).collect();
        dst.write_in(Subscriptor::new(dst.dims()), &values);
        return Ok(());
    }
    if dst.is_partial() {
        return Err(NdError::PartialView("copy"));
    }
    tracing::debug!(from = ?dst.dims(), to = ?src.dims(), "copy reallocates its target");
    *dst = src.cast()?;
    Ok(())
}

/// Deep copy of `arr` into independent contiguous storage.
pub fn clone<T: Element>(arr: &NdArray<T>) -> Result<NdArray<T>> {
    arr.deep_copy()
}

/// Reshapes `arr` to `dims`, first copying a partial view into contiguous
/// storage.
///
/// # Errors
/// `EmptyShape` or `CountMismatch`.
pub fn reshaped<T: Element>(arr: &NdArray<T>, dims: &[usize]) -> Result<NdArray<T>> {
    if arr.is_partial() {
        tracing::debug!(dims = ?arr.dims(), "reshaping a partial view through a copy");
        return clone(arr)?.reshape(dims);
    }
    arr.reshape(dims)
}

/// Copies `arr` into new storage of shape `dims`.
///
/// Elements are taken in traversal order; surplus elements are dropped and
/// missing ones are `T::default()`. Empty `dims` gives the empty array.
pub fn resized<T: Element>(arr: &NdArray<T>, dims: &[usize]) -> Result<NdArray<T>> {
    if dims.is_empty() {
        return Ok(NdArray::default());
    }
    NdArray::resized_copy(arr, dims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, NdRange};
    use approx::assert_relative_eq;

    const DATA: [i32; 6] = [1, 2, 3, 4, 5, 6];

    fn sample() -> NdArray<i32> {
        NdArray::from_slice(&[3, 1, 2], &DATA).unwrap()
    }

    fn ints(dims: &[usize], data: &[i32]) -> NdArray<i32> {
        NdArray::from_slice(dims, data).unwrap()
    }

    #[test]
    fn test_transform_changes_type() {
        let halves = transform(&sample(), |n| f64::from(n) * 0.5).unwrap();
        assert_eq!(halves.dims(), &[3, 1, 2]);
        let expected = [0.5, 1.0, 1.5, 2.0, 2.5, 3.0];
        for (got, want) in halves.iter().zip(expected) {
            assert_relative_eq!(got, want);
        }
        assert!(transform(&NdArray::<i32>::default(), |n| n + 1)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_transform_view() {
        let arr = ints(&[6], &DATA);
        let odd = arr.slice(&[NdRange::with_step(0, 6, 2)]).unwrap();
        let doubled = transform(&odd, |n| n * 2).unwrap();
        assert_eq!(doubled.to_vec(), vec![2, 6, 10]);
        assert!(!doubled.is_partial());
    }

    #[test]
    fn test_binary() {
        let a = sample();
        let b = NdArray::<f64>::from_slice(&[3, 1, 2], &[2.0, 4.0, 6.0, 8.0, 10.0, 12.0]).unwrap();
        let ratio = binary(&a, &b, |x, y| y / f64::from(x)).unwrap();
        assert!(ratio.iter().all(|v| (v - 2.0).abs() < 1e-12));

        let other = ints(&[6], &DATA);
        assert_eq!(
            binary(&a, &other, |x, y| x + y).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn test_reduce_all() {
        let quotient = reduce(&sample(), |value: i32, acc: f64| acc / f64::from(value)).unwrap();
        assert_relative_eq!(quotient, 1.0 / 2.0 / 3.0 / 4.0 / 5.0 / 6.0);

        let sum: Option<i64> = reduce(&sample(), |value: i32, acc: i64| acc + i64::from(value));
        assert_eq!(sum, Some(21));
        assert_eq!(reduce(&NdArray::<i32>::default(), |v: i32, acc: i32| acc + v), None);
    }

    #[test]
    fn test_reduce_axis() {
        let sum = |value: i32, acc: f64| acc + f64::from(value);
        let arr = sample();

        let last = reduce_axis(&arr, 2, sum).unwrap();
        assert_eq!(last, ints(&[3, 1], &[3, 7, 11]));

        let middle = reduce_axis(&arr, 1, sum).unwrap();
        assert_eq!(middle, ints(&[3, 2], &DATA));

        let first = reduce_axis(&arr, 0, sum).unwrap();
        assert_eq!(first, ints(&[1, 2], &[9, 12]));

        let line = reduce_axis(&ints(&[6], &DATA), 0, sum).unwrap();
        assert_eq!(line, ints(&[1], &[21]));

        assert_eq!(
            reduce_axis(&arr, 3, sum).unwrap_err(),
            NdError::InvalidAxis { axis: 3, rank: 3 }
        );
    }

    #[test]
    fn test_reduce_axis_chained() {
        let sum = |value: f64, acc: f64| acc + value;
        let arr: NdArray<f64> = sample().cast().unwrap();
        let reduced = reduce_axis(&arr, 2, sum)
            .and_then(|r| reduce_axis(&r, 1, sum))
            .and_then(|r| reduce_axis(&r, 0, sum))
            .unwrap();
        assert_eq!(reduced.dims(), &[1]);
        assert_relative_eq!(reduced.get(&[0]).unwrap(), 21.0);
    }

    #[test]
    fn test_reduce_axis_on_view() {
        let arr = sample();
        let tail = arr.slice(&[NdRange::new(1, 3)]).unwrap();
        let sums = reduce_axis(&tail, 0, |v: i32, acc: i32| acc + v).unwrap();
        assert_eq!(sums, ints(&[1, 2], &[8, 10]));
    }

    #[test]
    fn test_filter() {
        let arr = ints(&[3, 1, 2], &[1, 2, 3, 0, 5, 6]);
        let kept = filter(&arr, |v| v != 0).unwrap();
        assert_eq!(kept, ints(&[5], &[1, 2, 3, 5, 6]));

        let none = filter(&arr, |v| v > 100).unwrap();
        assert!(none.is_empty());
        assert!(filter(&NdArray::<i32>::default(), |_| true).unwrap().is_empty());
    }

    #[test]
    fn test_filter_mask() {
        let arr = sample();
        let mask = ints(&[3, 1, 2], &[1, 0, 0, 1, 0, 1]);
        assert_eq!(filter_mask(&arr, &mask).unwrap(), ints(&[3], &[1, 4, 6]));

        let zeros = NdArray::<u8>::new(&[3, 1, 2]).unwrap();
        assert!(filter_mask(&arr, &zeros).unwrap().is_empty());

        let empty = NdArray::<i32>::default();
        assert_eq!(
            filter_mask(&arr, &empty).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
        assert!(filter_mask(&empty, &mask).unwrap().is_empty());

        let float_mask = NdArray::<f64>::from_slice(&[3, 1, 2], &[0.0, 0.5, 0.0, 0.0, 0.0, 0.0]).unwrap();
        assert_eq!(filter_mask(&arr, &float_mask).unwrap(), ints(&[1], &[2]));
    }

    #[test]
    fn test_indices() {
        let arr = ints(&[3, 1, 2], &[1, 2, 3, 0, 5, 6]);
        let found = indices(&arr, |v| v != 0).unwrap();
        assert_eq!(found.to_vec(), vec![0, 1, 2, 4, 5]);

        let mask = ints(&[3, 1, 2], &[1, 0, 0, 1, 0, 1]);
        assert_eq!(indices_mask(&arr, &mask).unwrap().to_vec(), vec![0, 3, 5]);
        assert!(indices(&arr, |v| v < 0).unwrap().is_empty());
        assert!(indices_mask(&arr, &ints(&[6], &DATA)).is_err());
    }

    #[test]
    fn test_indices_of_view_are_positions() {
        let arr = ints(&[6], &DATA);
        let odd = arr.slice(&[NdRange::with_step(1, 6, 2)]).unwrap();
        assert_eq!(indices(&odd, |v| v > 2).unwrap().to_vec(), vec![1, 2]);
    }

    #[test]
    fn test_transpose() {
        let data: Vec<i32> = (1..=48).collect();
        let arr = ints(&[4, 2, 3, 2], &data);
        let t = transpose(&arr, &[2, 0, 1, 3]).unwrap();
        assert_eq!(t.dims(), &[3, 4, 2, 2]);
        assert_eq!(&t.to_vec()[..8], &[1, 2, 7, 8, 13, 14, 19, 20]);
        assert_eq!(t.get(&[1, 0, 0, 0]).unwrap(), arr.get(&[0, 0, 1, 0]).unwrap());
        assert!(!t.shares_buffer(&arr));

        let back = transpose(&t, &[1, 2, 0, 3]).unwrap();
        assert_eq!(back, arr);

        assert_eq!(
            transpose(&arr, &[0, 1, 1, 3]).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn test_copy_same_count() {
        let src = ints(&[3, 1, 2], &[2, 4, 6, 8, 10, 12]);
        let mut dst = sample();
        copy(&src, &mut dst).unwrap();
        assert_eq!(dst, src);

        let flat = ints(&[6], &DATA);
        let mut shaped = NdArray::<i32>::filled(&[3, 1, 2], 0).unwrap();
        copy(&flat, &mut shaped).unwrap();
        assert_eq!(shaped, sample());
    }

    #[test]
    fn test_copy_between_overlapping_views() {
        let arr = ints(&[3, 1, 2], &[2, 4, 6, 8, 10, 12]);
        let last = arr.slice(&[NdRange::at(2)]).unwrap();
        let mut first = arr.slice(&[NdRange::at(0)]).unwrap();
        copy(&last, &mut first).unwrap();
        assert_eq!(arr.to_vec(), vec![10, 12, 6, 8, 10, 12]);

        let mut view = arr.slice(&[NdRange::at(0)]).unwrap();
        assert_eq!(
            copy(&arr, &mut view).unwrap_err(),
            NdError::PartialView("copy")
        );
        assert_eq!(arr.to_vec(), vec![10, 12, 6, 8, 10, 12]);
    }

    #[test]
    fn test_copy_reallocates_whole_target() {
        let src = ints(&[3, 1, 2], &DATA);
        let row = src.slice(&[NdRange::at(0)]).unwrap();
        let mut dst = ints(&[3, 1, 2], &[0; 6]);
        let before = dst.clone();
        copy(&row, &mut dst).unwrap();
        assert_eq!(dst, ints(&[1, 1, 2], &[1, 2]));
        assert!(!dst.shares_buffer(&before));

        let mut empty = NdArray::<i32>::default();
        copy(&NdArray::<i32>::default(), &mut empty).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_copy_converts() {
        let src = NdArray::<f64>::from_slice(&[3, 1, 2], &[2.1, 4.1, 6.1, 8.1, 10.1, 12.1]).unwrap();
        let mut dst = sample();
        copy(&src, &mut dst).unwrap();
        assert_eq!(dst.to_vec(), vec![2, 4, 6, 8, 10, 12]);
        assert_ne!(dst, src);
    }

    #[test]
    fn test_clone_is_independent() {
        assert!(clone(&NdArray::<i32>::default()).unwrap().is_empty());

        let arr = sample();
        let mut deep = clone(&arr).unwrap();
        assert_eq!(deep, arr);
        assert!(!deep.shares_buffer(&arr));
        assert_eq!(deep.use_count(), 1);
        deep.set(&[0, 0, 0], 0).unwrap();
        assert_ne!(deep, arr);

        let sub = arr.slice(&[NdRange::at(1), NdRange::at(0), NdRange::at(0)]).unwrap();
        let mut sub_copy = clone(&sub).unwrap();
        assert_eq!(sub_copy, sub);
        assert!(!sub_copy.is_partial());
        sub_copy.set(&[0, 0, 0], 5).unwrap();
        assert_ne!(sub_copy, sub);
    }

    #[test]
    fn test_reshaped() {
        let arr = sample();
        assert_eq!(
            reshaped(&arr, &[]).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
        assert!(reshaped(&NdArray::<i32>::default(), &[]).unwrap().is_empty());

        let flat = reshaped(&arr, &[6]).unwrap();
        assert_eq!(flat, ints(&[6], &DATA));
        assert!(flat.shares_buffer(&arr));

        let corners = arr.slice(&[NdRange::with_step(0, 3, 2)]).unwrap();
        let packed = reshaped(&corners, &[1, 4]).unwrap();
        assert_eq!(packed, ints(&[1, 4], &[1, 2, 5, 6]));
        assert!(!packed.shares_buffer(&arr));
    }

    #[test]
    fn test_resized() {
        let arr = ints(&[6], &DATA);
        assert!(resized(&arr, &[]).unwrap().is_empty());

        let zeros = resized(&NdArray::<i32>::default(), &[6]).unwrap();
        assert_eq!(zeros.dims(), arr.dims());
        assert_ne!(zeros, arr);

        let same = resized(&arr, &[6]).unwrap();
        assert_eq!(same, arr);
        assert!(!same.shares_buffer(&arr));

        assert_eq!(resized(&arr, &[2]).unwrap(), ints(&[2], &[1, 2]));
        assert_eq!(resized(&arr, &[3, 1, 2]).unwrap(), sample());

        let grown = resized(&arr, &[10]).unwrap();
        assert_ne!(grown, arr);
        assert_eq!(grown.slice(&[NdRange::new(0, 6)]).unwrap(), arr);
        assert!(resized(&arr, &[2, 0]).is_err());
    }
}
