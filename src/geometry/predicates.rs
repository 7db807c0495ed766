//! Planar geometric predicates.
//!
//! The five primitives every other component is built on: distance, turn
//! orientation, ray alignment, strict segment crossing, and the strict-convex
//! test for a quadrilateral. All sign tests compare the exact floating-point
//! result against zero; there is no epsilon. Exactly-collinear configurations
//! are classified deterministically and the [`aligned`] test is the tie-break
//! for them, but *near*-collinear input can land on either side of zero and
//! is a documented limitation of the engine, not a guarded condition.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::point::{CoordinateScalar, Point};

/// The turn direction of an ordered point triple.
///
/// Result of the sign of the cross product `(p2 − p1) × (p3 − p1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// Strict left turn; the triple runs counter-clockwise.
    COUNTERCLOCKWISE,
    /// The three points lie on a single line.
    COLLINEAR,
    /// Strict right turn; the triple runs clockwise.
    CLOCKWISE,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::COUNTERCLOCKWISE => write!(f, "counter-clockwise"),
            Self::COLLINEAR => write!(f, "collinear"),
            Self::CLOCKWISE => write!(f, "clockwise"),
        }
    }
}

/// Position of a point along a ray, for collinear disambiguation.
///
/// Result of the sign of the dot product `(p2 − p1) · (p3 − p1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alignment {
    /// `p3` lies in the half-plane ahead of `p1` (toward `p2`).
    AHEAD,
    /// `p3` is perpendicular to the ray at `p1`, or coincides with `p1`.
    PERPENDICULAR,
    /// `p3` lies in the half-plane behind `p1` (away from `p2`).
    BEHIND,
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AHEAD => write!(f, "ahead"),
            Self::PERPENDICULAR => write!(f, "perpendicular"),
            Self::BEHIND => write!(f, "behind"),
        }
    }
}

/// Euclidean distance between two points.
///
/// # Examples
///
/// ```
/// use flatmesh::geometry::point::Point;
/// use flatmesh::geometry::predicates::distance;
///
/// let d = distance(Point::new([0.0, 0.0]), Point::new([3.0, 4.0]));
/// assert_eq!(d, 5.0);
/// ```
#[must_use]
pub fn distance<T: CoordinateScalar>(a: Point<T>, b: Point<T>) -> T {
    (b.x() - a.x()).hypot(b.y() - a.y())
}

/// Turn direction of the triple `(p1, p2, p3)`.
///
/// # Examples
///
/// ```
/// use flatmesh::geometry::point::Point;
/// use flatmesh::geometry::predicates::{orientation, Orientation};
///
/// let o = orientation(
///     Point::new([0.0, 0.0]),
///     Point::new([1.0, 0.0]),
///     Point::new([1.0, 1.0]),
/// );
/// assert_eq!(o, Orientation::COUNTERCLOCKWISE);
/// ```
#[must_use]
pub fn orientation<T: CoordinateScalar>(p1: Point<T>, p2: Point<T>, p3: Point<T>) -> Orientation {
    let cross = (p2.x() - p1.x()) * (p3.y() - p1.y()) - (p3.x() - p1.x()) * (p2.y() - p1.y());
    if cross > T::zero() {
        Orientation::COUNTERCLOCKWISE
    } else if cross < T::zero() {
        Orientation::CLOCKWISE
    } else {
        Orientation::COLLINEAR
    }
}

/// Position of `p3` relative to the ray from `p1` through `p2`.
///
/// Disambiguates collinear triples: [`orientation`] says whether `p3` is on
/// the line, `aligned` says where along it.
#[must_use]
pub fn aligned<T: CoordinateScalar>(p1: Point<T>, p2: Point<T>, p3: Point<T>) -> Alignment {
    let dot = (p2.x() - p1.x()) * (p3.x() - p1.x()) + (p2.y() - p1.y()) * (p3.y() - p1.y());
    if dot > T::zero() {
        Alignment::AHEAD
    } else if dot < T::zero() {
        Alignment::BEHIND
    } else {
        Alignment::PERPENDICULAR
    }
}

/// Whether segments `p1p2` and `p3p4` cross transversally.
///
/// True only for a strict crossing: each segment's endpoints lie on strictly
/// opposite sides of the other's line. Shared endpoints, endpoint-on-segment
/// touches, and collinear overlap all return `false`.
#[must_use]
pub fn segments_intersect<T: CoordinateScalar>(
    p1: Point<T>,
    p2: Point<T>,
    p3: Point<T>,
    p4: Point<T>,
) -> bool {
    opposite(orientation(p1, p2, p3), orientation(p1, p2, p4))
        && opposite(orientation(p3, p4, p1), orientation(p3, p4, p2))
}

fn opposite(a: Orientation, b: Orientation) -> bool {
    matches!(
        (a, b),
        (Orientation::CLOCKWISE, Orientation::COUNTERCLOCKWISE)
            | (Orientation::COUNTERCLOCKWISE, Orientation::CLOCKWISE)
    )
}

/// Whether the four points, in the given cyclic order, form a strictly convex
/// quadrilateral (every consecutive triple a strict left turn).
#[must_use]
pub fn is_convex_quad<T: CoordinateScalar>(
    p1: Point<T>,
    p2: Point<T>,
    p3: Point<T>,
    p4: Point<T>,
) -> bool {
    orientation(p1, p2, p3) == Orientation::COUNTERCLOCKWISE
        && orientation(p2, p3, p4) == Orientation::COUNTERCLOCKWISE
        && orientation(p3, p4, p1) == Orientation::COUNTERCLOCKWISE
        && orientation(p4, p1, p2) == Orientation::COUNTERCLOCKWISE
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> Point<f64> {
        Point::new([x, y])
    }

    #[test]
    fn distance_is_euclidean() {
        assert_relative_eq!(distance(p(1.0, 1.0), p(4.0, 5.0)), 5.0);
        assert_relative_eq!(distance(p(-2.0, 0.0), p(2.0, 0.0)), 4.0);
        assert_eq!(distance(p(3.0, 7.0), p(3.0, 7.0)), 0.0);
    }

    #[test]
    fn orientation_signs() {
        assert_eq!(
            orientation(p(0.0, 0.0), p(2.0, 0.0), p(1.0, 1.0)),
            Orientation::COUNTERCLOCKWISE
        );
        assert_eq!(
            orientation(p(0.0, 0.0), p(2.0, 0.0), p(1.0, -1.0)),
            Orientation::CLOCKWISE
        );
        assert_eq!(
            orientation(p(0.0, 0.0), p(2.0, 0.0), p(5.0, 0.0)),
            Orientation::COLLINEAR
        );
    }

    #[test]
    fn aligned_classifies_along_the_ray() {
        let a = p(0.0, 0.0);
        let b = p(2.0, 0.0);
        assert_eq!(aligned(a, b, p(5.0, 0.0)), Alignment::AHEAD);
        assert_eq!(aligned(a, b, p(-1.0, 0.0)), Alignment::BEHIND);
        assert_eq!(aligned(a, b, p(0.0, 3.0)), Alignment::PERPENDICULAR);
        assert_eq!(aligned(a, b, a), Alignment::PERPENDICULAR);
    }

    #[test]
    fn aligned_resolves_points_beyond_an_endpoint() {
        // Looking back from b toward a, a point past b is behind b.
        let a = p(0.0, 0.0);
        let b = p(2.0, 0.0);
        let beyond = p(3.0, 0.0);
        let between = p(1.0, 0.0);
        assert_eq!(aligned(b, a, beyond), Alignment::BEHIND);
        assert_eq!(aligned(b, a, between), Alignment::AHEAD);
    }

    #[test]
    fn crossing_segments_intersect() {
        assert!(segments_intersect(
            p(0.0, 0.0),
            p(2.0, 2.0),
            p(0.0, 2.0),
            p(2.0, 0.0)
        ));
    }

    #[test]
    fn touching_and_collinear_segments_do_not_intersect() {
        // Shared endpoint.
        assert!(!segments_intersect(
            p(0.0, 0.0),
            p(2.0, 0.0),
            p(2.0, 0.0),
            p(3.0, 2.0)
        ));
        // Endpoint on the other segment's interior.
        assert!(!segments_intersect(
            p(0.0, 0.0),
            p(4.0, 0.0),
            p(2.0, 0.0),
            p(2.0, 3.0)
        ));
        // Collinear overlap.
        assert!(!segments_intersect(
            p(0.0, 0.0),
            p(3.0, 0.0),
            p(1.0, 0.0),
            p(4.0, 0.0)
        ));
        // Fully disjoint.
        assert!(!segments_intersect(
            p(0.0, 0.0),
            p(1.0, 0.0),
            p(3.0, 1.0),
            p(4.0, 2.0)
        ));
    }

    #[test]
    fn convex_quad_requires_strict_left_turns() {
        assert!(is_convex_quad(
            p(0.0, 0.0),
            p(2.0, 0.0),
            p(2.0, 2.0),
            p(0.0, 2.0)
        ));
        // Same square in clockwise order.
        assert!(!is_convex_quad(
            p(0.0, 2.0),
            p(2.0, 2.0),
            p(2.0, 0.0),
            p(0.0, 0.0)
        ));
        // Reflex vertex.
        assert!(!is_convex_quad(
            p(0.0, 0.0),
            p(2.0, 0.0),
            p(0.5, 0.5),
            p(0.0, 2.0)
        ));
        // A collinear triple is not strictly convex.
        assert!(!is_convex_quad(
            p(0.0, 0.0),
            p(1.0, 0.0),
            p(2.0, 0.0),
            p(1.0, 2.0)
        ));
    }
}
