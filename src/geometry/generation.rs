//! Jittered point generation for mesh construction.
//!
//! Produces integer-coordinate points strictly inside the inscribed circle of
//! a width x height canvas. A coarse 16x16 bucket grid enforces a spacing
//! heuristic (at most one point per bucket) and accepted coordinates are
//! nudged away from their bucket's edges by a fixed margin, so no two points
//! coincide and near-degenerate clusters are rare. This is a heuristic, not a
//! minimum-distance guarantee: points in adjacent buckets can still be as
//! close as twice the margin.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::core::collections::FastHashSet;
use crate::geometry::point::{CoordinateScalar, Point};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Hard cap on the number of points a single generation call may request.
pub const MAX_POINT_COUNT: usize = 1024;

/// Side length of one bucket of the spacing grid, in canvas units.
const BUCKET_SIZE: u32 = 16;

/// Minimum distance kept between an accepted coordinate and its bucket edge.
const BUCKET_MARGIN: u32 = 2;

/// Lower bound on the rejection-sampling attempt budget.
const MIN_ATTEMPT_BUDGET: u64 = 4096;

/// Attempts allowed per requested point before generation gives up.
const ATTEMPTS_PER_POINT: u64 = 500;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur during point generation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PointGenerationError {
    /// The canvas has a zero-sized dimension.
    #[error("Invalid canvas dimensions: {width}x{height} (both must be positive)")]
    InvalidDimensions {
        /// The requested canvas width.
        width: u32,
        /// The requested canvas height.
        height: u32,
    },
    /// More points were requested than the region can plausibly hold.
    #[error("Requested {requested} points but the region supports at most {capacity}")]
    CountExceedsCapacity {
        /// The number of points requested.
        requested: usize,
        /// The spacing-grid capacity of the inscribed circle.
        capacity: usize,
    },
    /// Rejection sampling exhausted its attempt budget before placing every point.
    #[error("Placed only {placed} of {requested} points after {attempts} attempts")]
    AttemptsExhausted {
        /// The number of points requested.
        requested: usize,
        /// The number of points successfully placed.
        placed: usize,
        /// The number of sampling attempts consumed.
        attempts: u64,
    },
    /// An accepted integer coordinate could not be converted to the coordinate type.
    #[error("Cannot represent coordinate value {value} in the target scalar type")]
    CoordinateConversion {
        /// The integer coordinate that failed to convert.
        value: u32,
    },
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Generates `count` jittered points inside the inscribed circle of a
/// `width` x `height` canvas, using a thread-local random source.
///
/// Each point has integer-valued coordinates, lies strictly inside the
/// circle centered at `(width / 2, height / 2)` with radius
/// `min(width, height) / 2`, and occupies a distinct 16x16 bucket of the
/// canvas grid.
///
/// # Errors
///
/// Returns [`PointGenerationError::InvalidDimensions`] if either dimension is
/// zero, [`PointGenerationError::CountExceedsCapacity`] if `count` exceeds
/// [`MAX_POINT_COUNT`] or half the bucket capacity of the inscribed circle,
/// and [`PointGenerationError::AttemptsExhausted`] if rejection sampling
/// fails to place every point within its attempt budget.
///
/// # Examples
///
/// ```
/// use flatmesh::geometry::generation::generate_points;
///
/// let points = generate_points::<f64>(640, 480, 32).unwrap();
/// assert_eq!(points.len(), 32);
/// ```
pub fn generate_points<T: CoordinateScalar>(
    width: u32,
    height: u32,
    count: usize,
) -> Result<Vec<Point<T>>, PointGenerationError> {
    generate_with_rng(width, height, count, &mut rand::rng())
}

/// Generates `count` jittered points like [`generate_points`], but drives the
/// sampling from a seeded deterministic random source.
///
/// Two calls with identical arguments produce identical point sets, which is
/// the intended entry point for reproducible tests and benchmarks.
///
/// # Errors
///
/// Same conditions as [`generate_points`].
pub fn generate_points_seeded<T: CoordinateScalar>(
    width: u32,
    height: u32,
    count: usize,
    seed: u64,
) -> Result<Vec<Point<T>>, PointGenerationError> {
    generate_with_rng(width, height, count, &mut StdRng::seed_from_u64(seed))
}

// =============================================================================
// IMPLEMENTATION
// =============================================================================

fn generate_with_rng<T: CoordinateScalar, R: Rng + ?Sized>(
    width: u32,
    height: u32,
    count: usize,
    rng: &mut R,
) -> Result<Vec<Point<T>>, PointGenerationError> {
    if width == 0 || height == 0 {
        return Err(PointGenerationError::InvalidDimensions { width, height });
    }

    let capacity = region_capacity(width, height);
    if count > capacity {
        return Err(PointGenerationError::CountExceedsCapacity {
            requested: count,
            capacity,
        });
    }

    let center_x = f64::from(width) / 2.0;
    let center_y = f64::from(height) / 2.0;
    let radius = center_x.min(center_y);

    let budget = MIN_ATTEMPT_BUDGET.max(count as u64 * ATTEMPTS_PER_POINT);
    let mut occupied: FastHashSet<(u32, u32)> = FastHashSet::default();
    let mut points = Vec::with_capacity(count);
    let mut attempts: u64 = 0;

    while points.len() < count {
        if attempts >= budget {
            return Err(PointGenerationError::AttemptsExhausted {
                requested: count,
                placed: points.len(),
                attempts,
            });
        }
        attempts += 1;

        let raw_x = rng.random_range(0..width);
        let raw_y = rng.random_range(0..height);
        let bucket = (raw_x / BUCKET_SIZE, raw_y / BUCKET_SIZE);
        if occupied.contains(&bucket) {
            continue;
        }

        let x = nudge_into_bucket(raw_x);
        let y = nudge_into_bucket(raw_y);
        if !inside_circle(x, y, center_x, center_y, radius) {
            continue;
        }

        occupied.insert(bucket);
        points.push(Point::new([
            convert_coordinate::<T>(x)?,
            convert_coordinate::<T>(y)?,
        ]));
    }

    tracing::debug!(
        width,
        height,
        count,
        attempts,
        "generated jittered point set"
    );
    Ok(points)
}

/// Remaps a raw coordinate into its bucket's interior, `BUCKET_MARGIN` units
/// away from both bucket edges.
fn nudge_into_bucket(raw: u32) -> u32 {
    let base = (raw / BUCKET_SIZE) * BUCKET_SIZE;
    let span = BUCKET_SIZE - 2 * BUCKET_MARGIN;
    base + BUCKET_MARGIN + (raw % BUCKET_SIZE) * span / BUCKET_SIZE
}

fn inside_circle(x: u32, y: u32, center_x: f64, center_y: f64, radius: f64) -> bool {
    let dx = f64::from(x) - center_x;
    let dy = f64::from(y) - center_y;
    dx * dx + dy * dy < radius * radius
}

/// Number of points the inscribed circle can plausibly hold: half the count
/// of spacing-grid buckets whose centers fall strictly inside the circle,
/// capped at [`MAX_POINT_COUNT`].
fn region_capacity(width: u32, height: u32) -> usize {
    let center_x = f64::from(width) / 2.0;
    let center_y = f64::from(height) / 2.0;
    let radius = center_x.min(center_y);

    let mut inside = 0usize;
    for bucket_x in 0..width.div_ceil(BUCKET_SIZE) {
        for bucket_y in 0..height.div_ceil(BUCKET_SIZE) {
            let cx = bucket_x * BUCKET_SIZE + BUCKET_SIZE / 2;
            let cy = bucket_y * BUCKET_SIZE + BUCKET_SIZE / 2;
            if inside_circle(cx, cy, center_x, center_y, radius) {
                inside += 1;
            }
        }
    }
    MAX_POINT_COUNT.min(inside / 2)
}

fn convert_coordinate<T: CoordinateScalar>(value: u32) -> Result<T, PointGenerationError> {
    T::from(value).ok_or(PointGenerationError::CoordinateConversion { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_the_requested_count() {
        let points = generate_points_seeded::<f64>(640, 480, 50, 42).unwrap();
        assert_eq!(points.len(), 50);
    }

    #[test]
    fn zero_count_yields_empty_set() {
        let points = generate_points_seeded::<f64>(640, 480, 0, 42).unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn points_lie_strictly_inside_the_inscribed_circle() {
        let (width, height) = (640u32, 480u32);
        let center = (f64::from(width) / 2.0, f64::from(height) / 2.0);
        let radius = center.0.min(center.1);

        let points = generate_points_seeded::<f64>(width, height, 100, 7).unwrap();
        for point in &points {
            let dx = point.x() - center.0;
            let dy = point.y() - center.1;
            assert!(dx * dx + dy * dy < radius * radius);
        }
    }

    #[test]
    fn points_have_integer_coordinates_with_bucket_margin() {
        let points = generate_points_seeded::<f64>(640, 480, 100, 11).unwrap();
        for point in &points {
            assert_eq!(point.x().fract(), 0.0);
            assert_eq!(point.y().fract(), 0.0);
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let (x, y) = (point.x() as u32, point.y() as u32);
            let margin_x = x % BUCKET_SIZE;
            let margin_y = y % BUCKET_SIZE;
            assert!((BUCKET_MARGIN..BUCKET_SIZE - BUCKET_MARGIN).contains(&margin_x));
            assert!((BUCKET_MARGIN..BUCKET_SIZE - BUCKET_MARGIN).contains(&margin_y));
        }
    }

    #[test]
    fn buckets_are_never_shared() {
        let points = generate_points_seeded::<f64>(640, 480, 120, 3).unwrap();
        let mut buckets = FastHashSet::default();
        for point in &points {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let bucket = (point.x() as u32 / BUCKET_SIZE, point.y() as u32 / BUCKET_SIZE);
            assert!(buckets.insert(bucket), "bucket {bucket:?} used twice");
        }
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let first = generate_points_seeded::<f64>(640, 480, 64, 1234).unwrap();
        let second = generate_points_seeded::<f64>(640, 480, 64, 1234).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_zero_dimensions() {
        let result = generate_points_seeded::<f64>(0, 480, 10, 42);
        assert_eq!(
            result,
            Err(PointGenerationError::InvalidDimensions {
                width: 0,
                height: 480
            })
        );
    }

    #[test]
    fn rejects_counts_beyond_region_capacity() {
        let result = generate_points_seeded::<f64>(64, 64, 500, 42);
        assert!(matches!(
            result,
            Err(PointGenerationError::CountExceedsCapacity { requested: 500, .. })
        ));
    }

    #[test]
    fn capacity_grows_with_the_canvas() {
        assert!(region_capacity(64, 64) < region_capacity(640, 480));
        assert!(region_capacity(100_000, 100_000) == MAX_POINT_COUNT);
    }

    #[test]
    fn nudged_coordinates_stay_in_their_bucket() {
        for raw in 0..64u32 {
            let nudged = nudge_into_bucket(raw);
            assert_eq!(nudged / BUCKET_SIZE, raw / BUCKET_SIZE);
        }
    }
}
