//! Element types and cross-type conversion and comparison.

use std::fmt::Debug;

use num_traits::AsPrimitive;

/// A primitive numeric type that can be stored in an [`NdArray`](crate::NdArray).
///
/// Every element type converts to every other with `as` semantics, so arrays
/// of different element types can be assigned, compared and cast.
pub trait Element:
    Copy
    + Default
    + Debug
    + PartialOrd
    + 'static
    + AsPrimitive<f32>
    + AsPrimitive<f64>
    + AsPrimitive<i128>
{
    /// How values of this type are compared by [`is_equal`].
    const PRECISION: Precision;

    /// True for every value except zero.
    #[inline]
    fn is_truthy(self) -> bool {
        self != Self::default()
    }
}

/// Comparison precision of an element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// Integers, compared exactly.
    Exact,
    /// `f32`, compared within `f32::EPSILON`.
    Single,
    /// `f64`, compared within `f64::EPSILON`.
    Double,
}

macro_rules! impl_element {
    ($precision:expr => $($t:ty),*) => {
        $(
            impl Element for $t {
                const PRECISION: Precision = $precision;
            }
        )*
    };
}

impl_element!(Precision::Exact => i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
impl_element!(Precision::Single => f32);
impl_element!(Precision::Double => f64);

/// Converts `value` with `as` semantics (floats truncate toward zero).
#[inline]
pub fn convert<T, U>(value: T) -> U
where
    T: AsPrimitive<U>,
    U: Copy + 'static,
{
    value.as_()
}

/// Compares two elements of possibly different types.
///
/// Floats are compared at the narrower float precision involved: as `f32`
/// within `f32::EPSILON` when either side is `f32`, otherwise as `f64`
/// within `f64::EPSILON`. Two integers are compared exactly.
pub fn is_equal<A: Element, B: Element>(a: A, b: B) -> bool {
    match (A::PRECISION, B::PRECISION) {
        (Precision::Single, _) | (_, Precision::Single) => {
            let a = AsPrimitive::<f32>::as_(a);
            let b = AsPrimitive::<f32>::as_(b);
            approx::relative_eq!(a, b, epsilon = f32::EPSILON, max_relative = f32::EPSILON)
        }
        (Precision::Double, _) | (_, Precision::Double) => {
            let a = AsPrimitive::<f64>::as_(a);
            let b = AsPrimitive::<f64>::as_(b);
            approx::relative_eq!(a, b)
        }
        (Precision::Exact, Precision::Exact) => {
            AsPrimitive::<i128>::as_(a) == AsPrimitive::<i128>::as_(b)
        }
    }
}
