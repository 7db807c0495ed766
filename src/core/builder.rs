//! Mesh assembly by recursive convex-layer peeling.
//!
//! Construction peels the point set into nested convex layers: compute the
//! convex hull of the remaining points, set it aside, and repeat on what is
//! left. Each layer's ring edges are registered as they are peeled (boundary
//! for the outermost layer, internal below), and each consecutive pair of
//! layers is stitched into a triangulated annulus by walking the outer ring
//! and connecting every outer vertex to the run of inner-ring edges visible
//! from it. When the innermost layer is a polygon with more than three
//! vertices and nothing inside, it is triangulated by recursively splitting
//! it along interior diagonals.
//!
//! Hulls are built by incremental insertion with tangent-range replacement:
//! the same visibility walk that drives annulus stitching finds, for each
//! new point, the contiguous run of hull edges it can see, and the point
//! replaces that run. Degenerate layers are handled explicitly: a single
//! point becomes a fan target, and a fully collinear layer becomes a
//! back-and-forth chain sorted along its line.

use std::cmp::Ordering;
use std::iter;

use crate::core::collections::FastHashSet;
use crate::core::mesh::{EdgeClass, Mesh, MeshInvariantError};
use crate::geometry::point::{CoordinateScalar, Point};
use crate::geometry::predicates::{Alignment, Orientation, aligned, orientation};

/// One peeled convex layer.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Layer {
    /// A proper convex polygon, in counter-clockwise cycle order.
    Hull(Vec<usize>),
    /// Two or more collinear points, sorted along their common line.
    Chain(Vec<usize>),
    /// A single leftover point.
    Single(usize),
}

impl Layer {
    fn len(&self) -> usize {
        match self {
            Self::Hull(cycle) => cycle.len(),
            Self::Chain(chain) => chain.len(),
            Self::Single(_) => 1,
        }
    }
}

/// Builds the full edge set of `mesh` from its points.
///
/// Called once by `Mesh::new` on an edgeless mesh.
pub(crate) fn assemble<T: CoordinateScalar>(mesh: &mut Mesh<T>) -> Result<(), MeshInvariantError> {
    let points = mesh.points().to_vec();
    let mut remaining: Vec<usize> = (0..points.len()).collect();
    let mut previous_hull: Option<Vec<usize>> = None;
    let mut depth = 0usize;

    loop {
        let (layer, leftover) = peel_layer(&points, remaining);
        register_layer_edges(mesh, &layer, depth)?;
        if let Some(outer) = &previous_hull {
            connect_between(mesh, &points, outer, &layer)?;
        }
        tracing::debug!(
            depth,
            layer_size = layer.len(),
            leftover = leftover.len(),
            "peeled convex layer"
        );

        previous_hull = match layer {
            Layer::Hull(cycle) => Some(cycle),
            Layer::Chain(_) | Layer::Single(_) => None,
        };
        if leftover.is_empty() {
            break;
        }
        remaining = leftover;
        depth += 1;
    }

    // The innermost layer encloses no further points; if it is a polygon
    // beyond a triangle its interior still needs diagonals.
    if let Some(hull) = previous_hull {
        if hull.len() > 3 {
            connect_inside(mesh, &points, &hull)?;
        }
    }

    tracing::debug!(
        points = mesh.number_of_points(),
        boundary = mesh.number_of_boundary_edges(),
        internal = mesh.number_of_internal_edges(),
        "assembled mesh"
    );
    Ok(())
}

// =============================================================================
// LAYER PEELING
// =============================================================================

/// Splits `remaining` into its outermost convex layer and the leftover
/// interior points (in their original order).
fn peel_layer<T: CoordinateScalar>(
    points: &[Point<T>],
    remaining: Vec<usize>,
) -> (Layer, Vec<usize>) {
    match remaining.len() {
        1 => return (Layer::Single(remaining[0]), Vec::new()),
        2 => return (Layer::Chain(remaining), Vec::new()),
        _ => {}
    }
    if let Some(chain) = collinear_chain(points, remaining.clone()) {
        return (Layer::Chain(chain), Vec::new());
    }
    let (hull, leftover) = convex_hull(points, &remaining);
    (Layer::Hull(hull), leftover)
}

/// If every point of `remaining` lies on one line, returns them sorted along
/// that line; otherwise `None`.
fn collinear_chain<T: CoordinateScalar>(
    points: &[Point<T>],
    mut remaining: Vec<usize>,
) -> Option<Vec<usize>> {
    let base = points[remaining[0]];
    let tip = points[remaining[1]];
    if remaining[2..]
        .iter()
        .any(|&index| orientation(base, tip, points[index]) != Orientation::COLLINEAR)
    {
        return None;
    }

    let axis = (tip.x() - base.x(), tip.y() - base.y());
    let project = |index: usize| {
        let p = points[index];
        (p.x() - base.x()) * axis.0 + (p.y() - base.y()) * axis.1
    };
    remaining.sort_by(|&a, &b| {
        project(a)
            .partial_cmp(&project(b))
            .unwrap_or(Ordering::Equal)
    });
    Some(remaining)
}

/// Convex hull of `remaining` by incremental insertion with tangent-range
/// replacement. Returns the counter-clockwise hull cycle and the interior
/// leftovers in their original order.
fn convex_hull<T: CoordinateScalar>(
    points: &[Point<T>],
    remaining: &[usize],
) -> (Vec<usize>, Vec<usize>) {
    // Seed with the first two points and the first point not collinear with
    // them; the caller guarantees one exists.
    let pivot = remaining[2..]
        .iter()
        .position(|&index| {
            orientation(points[remaining[0]], points[remaining[1]], points[index])
                != Orientation::COLLINEAR
        })
        .map_or(2, |offset| offset + 2);

    let mut hull = vec![remaining[0], remaining[1], remaining[pivot]];
    if orientation(points[hull[0]], points[hull[1]], points[hull[2]])
        != Orientation::COUNTERCLOCKWISE
    {
        hull.swap(1, 2);
    }

    for (position, &point) in remaining.iter().enumerate() {
        if position < 2 || position == pivot {
            continue;
        }
        let (r0, r1) = find_range(points, &hull, point, None);
        if r0 < r1 {
            // The visible run's interior vertices are no longer extreme.
            hull.splice(r0 + 1..r1, iter::once(point));
        } else if r0 > r1 {
            // The run wraps the cycle seam; keep the middle, prepend the point.
            hull.truncate(r0 + 1);
            hull.drain(0..r1);
            hull.insert(0, point);
        }
        // An empty range means the point is inside the current hull.
    }

    let members: FastHashSet<usize> = hull.iter().copied().collect();
    let leftover = remaining
        .iter()
        .copied()
        .filter(|index| !members.contains(index))
        .collect();
    (hull, leftover)
}

fn register_layer_edges<T: CoordinateScalar>(
    mesh: &mut Mesh<T>,
    layer: &Layer,
    depth: usize,
) -> Result<(), MeshInvariantError> {
    let class = if depth == 0 {
        EdgeClass::Boundary
    } else {
        EdgeClass::Internal
    };
    match layer {
        Layer::Single(_) => {}
        Layer::Chain(chain) => {
            for pair in chain.windows(2) {
                mesh.add_edge(pair[0], pair[1], class)?;
            }
        }
        Layer::Hull(cycle) => {
            for i in 0..cycle.len() {
                mesh.add_edge(cycle[i], cycle[(i + 1) % cycle.len()], class)?;
            }
        }
    }
    Ok(())
}

// =============================================================================
// VISIBILITY
// =============================================================================

/// Whether point `source` lies on the outward (clockwise) side of the
/// directed edge from `a` to `b`.
///
/// A source exactly on the edge's line counts as seeing the edge only when
/// it lies beyond the far endpoint `b`, so a point extending a collinear
/// hull run evicts the run's interior vertices.
fn edge_visible<T: CoordinateScalar>(
    points: &[Point<T>],
    a: usize,
    b: usize,
    source: usize,
) -> bool {
    match orientation(points[a], points[b], points[source]) {
        Orientation::CLOCKWISE => true,
        Orientation::COLLINEAR => {
            aligned(points[b], points[a], points[source]) == Alignment::BEHIND
        }
        Orientation::COUNTERCLOCKWISE => false,
    }
}

/// Finds the maximal contiguous run of `cycle` edges visible from `source`.
///
/// Returns `(start, end)` vertex positions with the run covering edges
/// `start..end` (wrapping when `start > end`); `start == end` marks an empty
/// range. `restricted` limits the scan to the edge window it describes, also
/// wrapping when its start exceeds its end.
fn find_range<T: CoordinateScalar>(
    points: &[Point<T>],
    cycle: &[usize],
    source: usize,
    restricted: Option<(usize, usize)>,
) -> (usize, usize) {
    let n = cycle.len();
    let (lo, hi_raw) = restricted.unwrap_or((0, n));
    let hi = if lo > hi_raw { hi_raw + n } else { hi_raw };

    let mut range = (lo, lo);
    for i in lo..hi {
        if !edge_visible(points, cycle[i % n], cycle[(i + 1) % n], source) {
            continue;
        }
        if range.0 == range.1 {
            range = (i, i + 1);
        } else if range.1 == i {
            range.1 = i + 1;
        } else if range.0 == lo {
            // The visible run wraps the scan boundary; splice the two halves.
            range.0 = i;
            range.1 += n;
        }
    }
    (range.0 % n, range.1 % n)
}

// =============================================================================
// ANNULUS STITCHING
// =============================================================================

/// Triangulates the annulus between an outer hull cycle and the next layer
/// inward.
fn connect_between<T: CoordinateScalar>(
    mesh: &mut Mesh<T>,
    points: &[Point<T>],
    outer: &[usize],
    inner: &Layer,
) -> Result<(), MeshInvariantError> {
    match inner {
        // Tangent ranges are undefined for a single point; fan to it.
        Layer::Single(point) => {
            for &vertex in outer {
                mesh.add_edge(vertex, *point, EdgeClass::Internal)?;
            }
            Ok(())
        }
        // A chain is traversed out and back, so both of its sides present
        // visible edge runs like a flattened polygon.
        Layer::Chain(chain) => connect_cycle(mesh, points, outer, &doubled_chain(chain)),
        Layer::Hull(cycle) => connect_cycle(mesh, points, outer, cycle),
    }
}

/// Closed back-and-forth walk of a chain: the chain followed by its interior
/// reversed, so every segment appears once per direction.
fn doubled_chain(chain: &[usize]) -> Vec<usize> {
    let mut walk = chain.to_vec();
    walk.extend(chain[1..chain.len() - 1].iter().rev());
    walk
}

/// Connects every outer vertex to its tangent range on the inner cycle.
///
/// The first vertex searches the whole cycle; each later vertex resumes
/// where the previous range ended, so consecutive ranges share exactly one
/// inner vertex and the annulus closes without gaps. A vertex whose
/// restricted scan sees nothing is collinear with its predecessor's tangent
/// and connects to the shared vertex alone.
fn connect_cycle<T: CoordinateScalar>(
    mesh: &mut Mesh<T>,
    points: &[Point<T>],
    outer: &[usize],
    inner: &[usize],
) -> Result<(), MeshInvariantError> {
    let first = find_range(points, inner, outer[0], None);
    if first.0 == first.1 {
        return Err(MeshInvariantError::EmptyTangentRange { vertex: outer[0] });
    }
    connect_run(mesh, outer[0], inner, first)?;

    let mut restricted = (first.1, first.0);
    for &vertex in &outer[1..] {
        let range = find_range(points, inner, vertex, Some(restricted));
        if range.0 == range.1 {
            mesh.add_edge(vertex, inner[restricted.0], EdgeClass::Internal)?;
        } else {
            connect_run(mesh, vertex, inner, range)?;
            restricted.0 = range.1;
        }
    }
    Ok(())
}

/// Adds internal edges from `vertex` to every inner vertex of the inclusive
/// run `range`, wrapping around the cycle when the range does.
fn connect_run<T: CoordinateScalar>(
    mesh: &mut Mesh<T>,
    vertex: usize,
    inner: &[usize],
    range: (usize, usize),
) -> Result<(), MeshInvariantError> {
    let n = inner.len();
    let end = if range.0 <= range.1 {
        range.1
    } else {
        range.1 + n
    };
    for j in range.0..=end {
        mesh.add_edge(vertex, inner[j % n], EdgeClass::Internal)?;
    }
    Ok(())
}

// =============================================================================
// INTERIOR TRIANGULATION
// =============================================================================

/// Triangulates a convex polygon with no interior points by recursively
/// splitting it along its first clear diagonal.
fn connect_inside<T: CoordinateScalar>(
    mesh: &mut Mesh<T>,
    points: &[Point<T>],
    hull: &[usize],
) -> Result<(), MeshInvariantError> {
    let mut stack = vec![hull.to_vec()];
    while let Some(polygon) = stack.pop() {
        if polygon.len() <= 3 {
            continue;
        }
        let (i, k) = first_clear_diagonal(points, &polygon).ok_or(
            MeshInvariantError::NoInteriorDiagonal {
                size: polygon.len(),
            },
        )?;
        mesh.add_edge(polygon[i], polygon[k], EdgeClass::Internal)?;

        let mut closing: Vec<usize> = polygon[k..].to_vec();
        closing.extend_from_slice(&polygon[..=i]);
        stack.push(closing);
        stack.push(polygon[i..=k].to_vec());
    }
    Ok(())
}

/// First polygon diagonal, in position order, with no third vertex lying on
/// it.
///
/// In a convex polygon a diagonal is blocked only by a vertex of a flat
/// (collinear) boundary run sitting strictly between its endpoints.
fn first_clear_diagonal<T: CoordinateScalar>(
    points: &[Point<T>],
    polygon: &[usize],
) -> Option<(usize, usize)> {
    let len = polygon.len();
    for i in 0..len {
        for k in (i + 2)..len {
            if i == 0 && k == len - 1 {
                continue;
            }
            let from = points[polygon[i]];
            let to = points[polygon[k]];
            let blocked = polygon.iter().enumerate().any(|(m, &index)| {
                m != i
                    && m != k
                    && orientation(from, to, points[index]) == Orientation::COLLINEAR
                    && aligned(from, to, points[index]) == Alignment::AHEAD
                    && aligned(to, from, points[index]) == Alignment::AHEAD
            });
            if !blocked {
                return Some((i, k));
            }
        }
    }
    None
}
