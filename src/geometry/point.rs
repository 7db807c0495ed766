//! 2D point type and the scalar trait it is generic over.
//!
//! Coordinates are floating-point values behind the [`CoordinateScalar`]
//! trait, which bundles the numeric bounds the engine needs together with
//! NaN-consistent equality and hashing so points can key hash-based
//! collections.
//!
//! # Special Floating-Point Equality Semantics
//!
//! Point equality treats NaN as equal to itself (all NaN bit patterns are
//! equal) to satisfy `Eq` and allow points as hash-map keys. Compare the
//! coordinates directly if IEEE 754 semantics are needed.

#![forbid(unsafe_code)]

use core::fmt::Debug;
use core::hash::{Hash, Hasher};

use num_traits::Float;
use ordered_float::OrderedFloat;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// =============================================================================
// SCALAR TRAIT
// =============================================================================

/// Equality that treats NaN as equal to itself, so containers behave.
pub trait OrderedEq {
    /// Compare two scalars with NaN-consistent semantics.
    fn ordered_eq(&self, other: &Self) -> bool;
}

/// Hashing for floating-point coordinates, consistent with [`OrderedEq`].
pub trait HashCoordinate {
    /// Feed this scalar into `state` so equal scalars hash equally.
    fn hash_coord<H: Hasher>(&self, state: &mut H);
}

/// Trait bundle for coordinate scalar types.
///
/// Implemented for `f32` and `f64`. The bounds cover everything the engine
/// does with a coordinate: float arithmetic for the geometric predicates,
/// `Default`/`Debug`/`Display` for containers and diagnostics, serde for
/// point and replacement-log export, and the [`OrderedEq`]/[`HashCoordinate`]
/// pair for NaN-consistent container behavior.
///
/// # Examples
///
/// ```
/// use flatmesh::geometry::point::CoordinateScalar;
///
/// fn close<T: CoordinateScalar>(a: T, b: T) -> bool {
///     (a - b).abs() < T::default_tolerance()
/// }
///
/// assert!(close(0.1_f64 + 0.2, 0.3));
/// ```
pub trait CoordinateScalar:
    Float
    + OrderedEq
    + HashCoordinate
    + Default
    + Debug
    + core::fmt::Display
    + Serialize
    + DeserializeOwned
    + 'static
{
    /// Default tolerance for comparisons in this scalar type.
    ///
    /// Used for diagnostics such as the length-accumulator check in mesh
    /// validation; the geometric predicates use exact sign comparison.
    ///
    /// # Returns
    ///
    /// `1e-6` for `f32`, `1e-15` for `f64`.
    fn default_tolerance() -> Self;
}

macro_rules! impl_coordinate_scalar {
    ($t:ty, $tol:expr) => {
        impl OrderedEq for $t {
            #[inline]
            fn ordered_eq(&self, other: &Self) -> bool {
                OrderedFloat(*self) == OrderedFloat(*other)
            }
        }

        impl HashCoordinate for $t {
            #[inline]
            fn hash_coord<H: Hasher>(&self, state: &mut H) {
                OrderedFloat(*self).hash(state);
            }
        }

        impl CoordinateScalar for $t {
            #[inline]
            fn default_tolerance() -> Self {
                $tol
            }
        }
    };
}

impl_coordinate_scalar!(f32, 1e-6);
impl_coordinate_scalar!(f64, 1e-15);

// =============================================================================
// POINT
// =============================================================================

/// An immutable point in the plane.
///
/// Points are value types: once created the coordinates never change, and the
/// mesh refers to a point only through its index in the point array.
///
/// # Examples
///
/// ```
/// use flatmesh::geometry::point::Point;
///
/// let p = Point::new([3.0, 4.0]);
/// assert_eq!(p.x(), 3.0);
/// assert_eq!(p.y(), 4.0);
/// assert_eq!(p.coords(), &[3.0, 4.0]);
/// ```
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(bound(deserialize = ""))]
pub struct Point<T: CoordinateScalar> {
    /// Coordinates, private so a point cannot be mutated after creation.
    coords: [T; 2],
}

impl<T: CoordinateScalar> Point<T> {
    /// Creates a point from an `[x, y]` coordinate pair.
    #[must_use]
    pub const fn new(coords: [T; 2]) -> Self {
        Self { coords }
    }

    /// The coordinate array.
    #[must_use]
    pub const fn coords(&self) -> &[T; 2] {
        &self.coords
    }

    /// The x coordinate.
    #[must_use]
    pub fn x(&self) -> T {
        self.coords[0]
    }

    /// The y coordinate.
    #[must_use]
    pub fn y(&self) -> T {
        self.coords[1]
    }

    /// Whether both coordinates are finite (not NaN, not infinite).
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.coords.iter().all(|c| c.is_finite())
    }
}

impl<T: CoordinateScalar> PartialEq for Point<T> {
    fn eq(&self, other: &Self) -> bool {
        self.coords
            .iter()
            .zip(other.coords.iter())
            .all(|(a, b)| a.ordered_eq(b))
    }
}

impl<T: CoordinateScalar> Eq for Point<T> {}

impl<T: CoordinateScalar> Hash for Point<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for c in &self.coords {
            c.hash_coord(state);
        }
    }
}

impl<T: CoordinateScalar> From<(T, T)> for Point<T> {
    fn from((x, y): (T, T)) -> Self {
        Self::new([x, y])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::collections::FastHashSet;

    #[test]
    fn accessors_return_coordinates() {
        let p = Point::new([1.5, -2.5]);
        assert_eq!(p.x(), 1.5);
        assert_eq!(p.y(), -2.5);
        assert_eq!(p.coords(), &[1.5, -2.5]);
    }

    #[test]
    fn equality_is_nan_consistent() {
        let a = Point::new([f64::NAN, 1.0]);
        let b = Point::new([f64::NAN, 1.0]);
        let c = Point::new([0.0, 1.0]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn negative_zero_matches_ordered_float_semantics() {
        let a = Point::new([0.0_f64, 0.0]);
        let b = Point::new([-0.0_f64, 0.0]);
        assert_eq!(a == b, OrderedFloat(0.0_f64) == OrderedFloat(-0.0_f64));
    }

    #[test]
    fn points_key_hash_sets() {
        let mut set = FastHashSet::default();
        assert!(set.insert(Point::new([1.0, 2.0])));
        assert!(!set.insert(Point::new([1.0, 2.0])));
        assert!(set.insert(Point::new([2.0, 1.0])));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn finite_check_rejects_nan_and_infinity() {
        assert!(Point::new([0.0, 1.0]).is_finite());
        assert!(!Point::new([f64::NAN, 1.0]).is_finite());
        assert!(!Point::new([1.0, f64::INFINITY]).is_finite());
    }

    #[test]
    fn serde_round_trip_preserves_coordinates() {
        let p = Point::new([12.0, 34.5]);
        let json = serde_json::to_string(&p).unwrap();
        let back: Point<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }

    #[test]
    fn tuple_conversion() {
        let p: Point<f64> = (7.0, 8.0).into();
        assert_eq!(p.coords(), &[7.0, 8.0]);
    }

    #[test]
    fn default_tolerance_scales_with_precision() {
        assert!(f64::default_tolerance() < f64::from(f32::default_tolerance()));
    }
}
