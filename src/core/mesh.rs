//! Planar triangulation mesh: points, classified edges, and per-point
//! rotational neighbor order.
//!
//! A [`Mesh`] owns its point array and an edge registry keyed by canonical
//! [`EdgeKey`]s. Every edge is classified as **boundary** (part of the single
//! outermost convex hull, immutable once created) or **internal** (eligible
//! for diagonal flips). Alongside the registry, each point carries a
//! [`VertexStar`] holding its incident edges in clockwise rotational order;
//! the registry and the stars are mutated in lockstep so either can answer
//! adjacency queries.
//!
//! # Invariant
//!
//! After construction and after every single edge flip, the union of
//! boundary and internal edges forms a valid triangulation of the point set:
//! every bounded face is a triangle, no two edges cross, and each point's
//! neighbors are in clockwise angular order. [`Mesh::is_valid`] checks the
//! full invariant and is intended for tests and debugging rather than hot
//! paths.
//!
//! # Numerical limitations
//!
//! Orientation tests compare exact floating-point signs. Exactly collinear
//! triples are handled deterministically through the alignment tie-break,
//! but *near*-degenerate input (nearly coincident or nearly collinear
//! points) can classify either way and produce a broken mesh. The point
//! generator's spacing heuristic exists to keep such configurations rare;
//! callers supplying their own points inherit the risk.

use thiserror::Error;

use crate::core::builder;
use crate::core::collections::{FastHashMap, FastHashSet};
use crate::core::edge::{EdgeFlip, EdgeKey};
use crate::core::star::{StarError, StarNeighbors, VertexStar};
use crate::geometry::point::{CoordinateScalar, Point};
use crate::geometry::predicates::{distance, is_convex_quad, segments_intersect};

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while constructing a mesh from a point set.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MeshConstructionError {
    /// Fewer than three points were supplied.
    #[error("A mesh needs at least 3 points, got {actual}")]
    InsufficientPoints {
        /// The number of points supplied.
        actual: usize,
    },
    /// A point has a NaN or infinite coordinate.
    #[error("Point {index} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Index of the offending point.
        index: usize,
    },
    /// Two points have identical coordinates.
    #[error("Points {first} and {second} have identical coordinates")]
    DuplicatePoints {
        /// Index of the first occurrence.
        first: usize,
        /// Index of the duplicate.
        second: usize,
    },
    /// Construction tripped an internal invariant.
    #[error(transparent)]
    Invariant(#[from] MeshInvariantError),
}

/// Internal invariant violations.
///
/// These indicate a bug in the construction or flip logic rather than bad
/// input; the operation that raised one is aborted and the mesh should be
/// considered unusable.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MeshInvariantError {
    /// A rotational neighbor ring rejected a mutation or query.
    #[error(transparent)]
    NeighborOrder(#[from] StarError),
    /// An operation referenced an edge key absent from the registry.
    #[error("Edge {key} is not registered in the mesh")]
    UnknownEdge {
        /// The unregistered key.
        key: EdgeKey,
    },
    /// An edge was inserted twice.
    #[error("Edge {key} is already registered in the mesh")]
    DuplicateEdge {
        /// The already-registered key.
        key: EdgeKey,
    },
    /// A flip was attempted on a boundary edge.
    #[error("Edge {key} lies on the outer boundary and cannot be flipped")]
    BoundaryEdgeFlip {
        /// The boundary key.
        key: EdgeKey,
    },
    /// A tangent-range search over a hull found no visible edge.
    #[error("No hull edge is visible from point {vertex}")]
    EmptyTangentRange {
        /// The point the search originated from.
        vertex: usize,
    },
    /// A convex polygon offered no interior diagonal clear of its vertices.
    #[error("No interior diagonal found in a convex polygon of {size} vertices")]
    NoInteriorDiagonal {
        /// Number of polygon vertices.
        size: usize,
    },
}

/// Errors that can occur while replaying a recorded edge replacement.
///
/// Replay validates log entries topologically (the removed edge must be a
/// current internal edge, the added endpoints must exist) but performs no
/// geometric re-checks; a log is trusted to have been produced against the
/// same mesh lineage.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ReplayError {
    /// The entry removes an edge that is not currently an internal edge.
    #[error("Replayed entry removes {key}, which is not an internal edge of this mesh")]
    MissingInternalEdge {
        /// The absent key.
        key: EdgeKey,
    },
    /// The entry removes a boundary edge.
    #[error("Replayed entry removes boundary edge {key}")]
    BoundaryEdge {
        /// The boundary key.
        key: EdgeKey,
    },
    /// The entry adds an edge whose endpoint indices exceed the point count.
    #[error("Replayed entry adds {key} with endpoint {vertex}, but the mesh has {points} points")]
    VertexOutOfRange {
        /// The added key.
        key: EdgeKey,
        /// The out-of-range endpoint.
        vertex: usize,
        /// Number of points in the mesh.
        points: usize,
    },
    /// The entry adds a key that does not decode to a valid edge.
    ///
    /// Raised for keys whose endpoints decode to a single index (a
    /// self-loop) or in inverted order, neither of which
    /// [`EdgeKey::new`](crate::core::edge::EdgeKey::new) can produce; such
    /// keys only arise from corrupted or hand-built logs.
    #[error("Replayed entry adds {key}, which does not encode a valid edge")]
    MalformedEdgeKey {
        /// The malformed key.
        key: EdgeKey,
    },
    /// The entry adds an edge that already exists.
    #[error("Replayed entry adds {key}, which is already registered")]
    EdgeAlreadyPresent {
        /// The already-registered key.
        key: EdgeKey,
    },
    /// The replacement tripped an internal invariant mid-application.
    #[error(transparent)]
    Invariant(#[from] MeshInvariantError),
}

/// Errors reported by [`Mesh::is_valid`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MeshValidationError {
    /// An edge key is classified as both boundary and internal.
    #[error("Edge {key} is classified as both boundary and internal")]
    OverlappingEdgeSets {
        /// The doubly-classified key.
        key: EdgeKey,
    },
    /// A classified edge key is missing from the registry.
    #[error("Edge {key} is classified but missing from the edge registry")]
    UntrackedEdge {
        /// The missing key.
        key: EdgeKey,
    },
    /// A registered edge key belongs to neither classification set.
    #[error("Edge {key} is registered but neither boundary nor internal")]
    OrphanEdge {
        /// The unclassified key.
        key: EdgeKey,
    },
    /// A registry entry's endpoints do not produce its own key.
    #[error("Edge {key} is registered with endpoints ({a}, {b}) that do not match it")]
    MismatchedEndpoints {
        /// The inconsistent key.
        key: EdgeKey,
        /// Stored first endpoint.
        a: usize,
        /// Stored second endpoint.
        b: usize,
    },
    /// The edge registry and the neighbor rings disagree.
    #[error("Points {a} and {b} disagree about being neighbors")]
    AsymmetricNeighbors {
        /// One endpoint.
        a: usize,
        /// The other endpoint.
        b: usize,
    },
    /// A point's neighbors are not in clockwise angular order.
    #[error("Neighbors of point {vertex} are not in clockwise order")]
    UnorderedNeighbors {
        /// The point with the unordered ring.
        vertex: usize,
    },
    /// Two non-adjacent edges cross.
    #[error("Edges {first} and {second} cross")]
    CrossingEdges {
        /// One crossing edge.
        first: EdgeKey,
        /// The other crossing edge.
        second: EdgeKey,
    },
    /// The running internal length diverged from a fresh recomputation.
    #[error("Stored internal length {stored} drifted from recomputed {computed}")]
    LengthDrift {
        /// The accumulated value.
        stored: String,
        /// The freshly recomputed value.
        computed: String,
    },
}

// =============================================================================
// EDGE CLASSIFICATION
// =============================================================================

/// Classification a new edge is registered under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EdgeClass {
    /// Outermost convex hull edge; immutable once created.
    Boundary,
    /// Interior edge; eligible for diagonal flips.
    Internal,
}

// =============================================================================
// MESH
// =============================================================================

/// A triangulated planar point set with flip support.
///
/// Created by [`Mesh::new`], which builds the full triangulation by
/// recursive convex-hull peeling. The optimizer and the shuffle then operate
/// on the mesh in place, each returning a chronological log of the flips
/// they performed.
///
/// # Examples
///
/// ```
/// use flatmesh::core::mesh::Mesh;
/// use flatmesh::geometry::point::Point;
///
/// let points = vec![
///     Point::new([6.0, 0.0]),
///     Point::new([7.0, 4.0]),
///     Point::new([1.0, 4.0]),
///     Point::new([0.0, 0.0]),
/// ];
/// let mesh = Mesh::new(points).unwrap();
/// assert_eq!(mesh.number_of_boundary_edges(), 4);
/// assert_eq!(mesh.number_of_internal_edges(), 1);
/// assert!(mesh.is_valid().is_ok());
/// ```
#[derive(Clone, Debug)]
pub struct Mesh<T: CoordinateScalar> {
    points: Vec<Point<T>>,
    edges: FastHashMap<EdgeKey, (usize, usize)>,
    boundary: FastHashSet<EdgeKey>,
    internal: FastHashSet<EdgeKey>,
    stars: Vec<VertexStar>,
    internal_length: T,
}

impl<T: CoordinateScalar> Mesh<T> {
    /// Builds the triangulation of `points`.
    ///
    /// # Errors
    ///
    /// Returns [`MeshConstructionError::InsufficientPoints`] for fewer than
    /// three points, [`MeshConstructionError::NonFiniteCoordinate`] for NaN
    /// or infinite coordinates, [`MeshConstructionError::DuplicatePoints`]
    /// for coordinate-identical points, and wraps any internal invariant
    /// violation raised during construction.
    pub fn new(points: Vec<Point<T>>) -> Result<Self, MeshConstructionError> {
        if points.len() < 3 {
            return Err(MeshConstructionError::InsufficientPoints {
                actual: points.len(),
            });
        }
        for (index, point) in points.iter().enumerate() {
            if !point.is_finite() {
                return Err(MeshConstructionError::NonFiniteCoordinate { index });
            }
        }
        let mut seen: FastHashMap<Point<T>, usize> = FastHashMap::default();
        for (index, point) in points.iter().enumerate() {
            if let Some(&first) = seen.get(point) {
                return Err(MeshConstructionError::DuplicatePoints {
                    first,
                    second: index,
                });
            }
            seen.insert(*point, index);
        }

        let stars = (0..points.len()).map(VertexStar::new).collect();
        let mut mesh = Self {
            points,
            edges: FastHashMap::default(),
            boundary: FastHashSet::default(),
            internal: FastHashSet::default(),
            stars,
            internal_length: T::zero(),
        };
        builder::assemble(&mut mesh)?;
        Ok(mesh)
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// The mesh's points, in the order supplied to [`Mesh::new`].
    #[inline]
    #[must_use]
    pub fn points(&self) -> &[Point<T>] {
        &self.points
    }

    /// Number of points.
    #[inline]
    #[must_use]
    pub fn number_of_points(&self) -> usize {
        self.points.len()
    }

    /// Number of edges, boundary and internal together.
    #[inline]
    #[must_use]
    pub fn number_of_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of boundary edges.
    #[inline]
    #[must_use]
    pub fn number_of_boundary_edges(&self) -> usize {
        self.boundary.len()
    }

    /// Number of internal edges.
    #[inline]
    #[must_use]
    pub fn number_of_internal_edges(&self) -> usize {
        self.internal.len()
    }

    /// Iterates all edge keys in unspecified order.
    pub fn edge_keys(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.edges.keys().copied()
    }

    /// Iterates the boundary edge keys in unspecified order.
    pub fn boundary_edge_keys(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.boundary.iter().copied()
    }

    /// Iterates the internal edge keys in unspecified order.
    pub fn internal_edge_keys(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.internal.iter().copied()
    }

    /// Whether `key` is a registered edge.
    #[must_use]
    pub fn contains_edge(&self, key: EdgeKey) -> bool {
        self.edges.contains_key(&key)
    }

    /// Whether `key` is a boundary edge.
    #[must_use]
    pub fn is_boundary_edge(&self, key: EdgeKey) -> bool {
        self.boundary.contains(&key)
    }

    /// Whether `key` is an internal edge.
    #[must_use]
    pub fn is_internal_edge(&self, key: EdgeKey) -> bool {
        self.internal.contains(&key)
    }

    /// The point indices of edge `key`, smaller index first, or `None` if
    /// the edge is not registered.
    #[must_use]
    pub fn edge_vertices(&self, key: EdgeKey) -> Option<(usize, usize)> {
        self.edges.get(&key).copied()
    }

    /// The endpoint coordinates of edge `key`, or `None` if the edge is not
    /// registered.
    #[must_use]
    pub fn edge_endpoints(&self, key: EdgeKey) -> Option<(Point<T>, Point<T>)> {
        let (a, b) = self.edge_vertices(key)?;
        Some((self.points[a], self.points[b]))
    }

    /// Iterates the neighbors of `vertex` in clockwise rotational order, or
    /// `None` if the index is out of range.
    #[must_use]
    pub fn neighbors(&self, vertex: usize) -> Option<StarNeighbors<'_>> {
        self.stars.get(vertex).map(VertexStar::iter)
    }

    /// Sum of the lengths of all internal edges, maintained incrementally
    /// across flips.
    #[inline]
    #[must_use]
    pub fn total_internal_length(&self) -> T {
        self.internal_length
    }

    // =========================================================================
    // MUTATION
    // =========================================================================

    /// Registers the edge `(a, b)` under `class`, linking both neighbor
    /// rings and updating the internal length.
    pub(crate) fn add_edge(
        &mut self,
        a: usize,
        b: usize,
        class: EdgeClass,
    ) -> Result<EdgeKey, MeshInvariantError> {
        let key = EdgeKey::new(a, b);
        if self.edges.contains_key(&key) {
            return Err(MeshInvariantError::DuplicateEdge { key });
        }

        self.stars[a].insert(b, &self.points)?;
        self.stars[b].insert(a, &self.points)?;

        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        self.edges.insert(key, (lo, hi));
        match class {
            EdgeClass::Boundary => {
                self.boundary.insert(key);
            }
            EdgeClass::Internal => {
                self.internal.insert(key);
                self.internal_length =
                    self.internal_length + distance(self.points[a], self.points[b]);
            }
        }
        Ok(key)
    }

    /// Deletes internal edge `old` and registers the internal edge
    /// `(w1, w2)` in its place, returning the logged flip.
    ///
    /// The length delta is computed once and both accumulated and logged, so
    /// folding a log's deltas reproduces the mesh's running total exactly.
    pub(crate) fn replace_internal_edge(
        &mut self,
        old: EdgeKey,
        w1: usize,
        w2: usize,
    ) -> Result<EdgeFlip<T>, MeshInvariantError> {
        if self.boundary.contains(&old) {
            return Err(MeshInvariantError::BoundaryEdgeFlip { key: old });
        }
        let Some(&(u, v)) = self.edges.get(&old) else {
            return Err(MeshInvariantError::UnknownEdge { key: old });
        };
        let added = EdgeKey::new(w1, w2);
        if self.edges.contains_key(&added) {
            return Err(MeshInvariantError::DuplicateEdge { key: added });
        }

        self.stars[u].remove(v)?;
        self.stars[v].remove(u)?;
        self.stars[w1].insert(w2, &self.points)?;
        self.stars[w2].insert(w1, &self.points)?;

        self.edges.remove(&old);
        self.internal.remove(&old);
        let (lo, hi) = if w1 <= w2 { (w1, w2) } else { (w2, w1) };
        self.edges.insert(added, (lo, hi));
        self.internal.insert(added);

        let delta = distance(self.points[w1], self.points[w2])
            - distance(self.points[u], self.points[v]);
        self.internal_length = self.internal_length + delta;

        Ok(EdgeFlip {
            removed: old,
            added,
            length_delta: delta,
        })
    }

    /// The flip quadrilateral of internal edge `key`, as the cycle
    /// `[u, w1, v, w2]` where `(u, v)` are the edge's endpoints and `w1`,
    /// `w2` the apexes of its two adjacent triangles.
    ///
    /// Each apex is the neighbor immediately clockwise of the opposite
    /// endpoint in one endpoint's rotational ring, which places the returned
    /// cycle in counter-clockwise order for a valid triangulation.
    ///
    /// # Errors
    ///
    /// [`MeshInvariantError::UnknownEdge`] if `key` is not registered, or a
    /// neighbor-ring error if an endpoint lacks a clockwise successor.
    pub fn flip_quad(&self, key: EdgeKey) -> Result<[usize; 4], MeshInvariantError> {
        let Some(&(u, v)) = self.edges.get(&key) else {
            return Err(MeshInvariantError::UnknownEdge { key });
        };
        let w1 = self.stars[u].next_after(v)?;
        let w2 = self.stars[v].next_after(u)?;
        Ok([u, w1, v, w2])
    }

    /// Attempts to flip internal edge `key` to the other diagonal of its
    /// flip quadrilateral.
    ///
    /// The flip is performed only if the quadrilateral is strictly convex,
    /// and, when `require_shorter` is set, only if the candidate diagonal is
    /// strictly shorter than the current edge. Returns `Ok(None)` when the
    /// flip is skipped for either reason.
    ///
    /// # Errors
    ///
    /// Propagates invariant violations from quad computation or edge
    /// replacement; [`MeshInvariantError::BoundaryEdgeFlip`] if `key` is a
    /// boundary edge.
    pub fn try_flip(
        &mut self,
        key: EdgeKey,
        require_shorter: bool,
    ) -> Result<Option<EdgeFlip<T>>, MeshInvariantError> {
        if self.boundary.contains(&key) {
            return Err(MeshInvariantError::BoundaryEdgeFlip { key });
        }
        let [u, w1, v, w2] = self.flip_quad(key)?;
        if !is_convex_quad(
            self.points[u],
            self.points[w1],
            self.points[v],
            self.points[w2],
        ) {
            return Ok(None);
        }
        if require_shorter {
            let current = distance(self.points[u], self.points[v]);
            let candidate = distance(self.points[w1], self.points[w2]);
            if candidate >= current {
                return Ok(None);
            }
        }
        self.replace_internal_edge(key, w1, w2).map(Some)
    }

    /// Applies one recorded replacement to this mesh, re-deriving the
    /// length delta from current coordinates.
    ///
    /// Replaying a log in order transforms a mesh exactly as the original
    /// optimizer or shuffle call did; replaying inverted entries in reverse
    /// order undoes it. Only topological validity is checked, geometric
    /// checks are not repeated.
    ///
    /// # Errors
    ///
    /// See [`ReplayError`] for the rejected entry shapes.
    pub fn apply_replacement(
        &mut self,
        removed: EdgeKey,
        added: EdgeKey,
    ) -> Result<EdgeFlip<T>, ReplayError> {
        if self.boundary.contains(&removed) {
            return Err(ReplayError::BoundaryEdge { key: removed });
        }
        if !self.internal.contains(&removed) {
            return Err(ReplayError::MissingInternalEdge { key: removed });
        }
        let (w1, w2) = added.endpoints();
        if w1 >= w2 {
            return Err(ReplayError::MalformedEdgeKey { key: added });
        }
        for vertex in [w1, w2] {
            if vertex >= self.points.len() {
                return Err(ReplayError::VertexOutOfRange {
                    key: added,
                    vertex,
                    points: self.points.len(),
                });
            }
        }
        if self.edges.contains_key(&added) {
            return Err(ReplayError::EdgeAlreadyPresent { key: added });
        }
        Ok(self.replace_internal_edge(removed, w1, w2)?)
    }

    // =========================================================================
    // VALIDATION
    // =========================================================================

    /// Checks the full mesh invariant.
    ///
    /// Validates, in order: disjointness of the boundary and internal sets,
    /// agreement between the classification sets and the edge registry,
    /// endpoint consistency of every registry entry, symmetry between the
    /// registry and the neighbor rings, clockwise ordering of every ring,
    /// planarity of the whole edge set, and the accumulated internal length
    /// against a fresh recomputation.
    ///
    /// Planarity is a pairwise sweep over all edges, so this is quadratic in
    /// the edge count.
    ///
    /// # Errors
    ///
    /// The first violated property, as a [`MeshValidationError`].
    pub fn is_valid(&self) -> Result<(), MeshValidationError> {
        for key in &self.boundary {
            if self.internal.contains(key) {
                return Err(MeshValidationError::OverlappingEdgeSets { key: *key });
            }
        }
        for key in self.boundary.iter().chain(self.internal.iter()) {
            if !self.edges.contains_key(key) {
                return Err(MeshValidationError::UntrackedEdge { key: *key });
            }
        }
        for key in self.edges.keys() {
            if !self.boundary.contains(key) && !self.internal.contains(key) {
                return Err(MeshValidationError::OrphanEdge { key: *key });
            }
        }

        for (key, &(a, b)) in &self.edges {
            if a == b || a >= self.points.len() || b >= self.points.len() {
                return Err(MeshValidationError::MismatchedEndpoints { key: *key, a, b });
            }
            if EdgeKey::new(a, b) != *key {
                return Err(MeshValidationError::MismatchedEndpoints { key: *key, a, b });
            }
            if !self.stars[a].contains(b) || !self.stars[b].contains(a) {
                return Err(MeshValidationError::AsymmetricNeighbors { a, b });
            }
        }
        for star in &self.stars {
            for neighbor in star {
                if !self.edges.contains_key(&EdgeKey::new(star.origin(), neighbor)) {
                    return Err(MeshValidationError::AsymmetricNeighbors {
                        a: star.origin(),
                        b: neighbor,
                    });
                }
            }
        }

        for (vertex, star) in self.stars.iter().enumerate() {
            if !star.is_clockwise_ordered(&self.points) {
                return Err(MeshValidationError::UnorderedNeighbors { vertex });
            }
        }

        let entries: Vec<(EdgeKey, (usize, usize))> =
            self.edges.iter().map(|(k, &v)| (*k, v)).collect();
        for (i, &(first, (a1, b1))) in entries.iter().enumerate() {
            for &(second, (a2, b2)) in &entries[i + 1..] {
                if a1 == a2 || a1 == b2 || b1 == a2 || b1 == b2 {
                    continue;
                }
                if segments_intersect(
                    self.points[a1],
                    self.points[b1],
                    self.points[a2],
                    self.points[b2],
                ) {
                    return Err(MeshValidationError::CrossingEdges { first, second });
                }
            }
        }

        let computed = self
            .internal
            .iter()
            .filter_map(|key| self.edges.get(key))
            .fold(T::zero(), |acc, &(a, b)| {
                acc + distance(self.points[a], self.points[b])
            });
        let scale = T::from(self.internal.len().max(1)).unwrap_or_else(T::one);
        let tolerance = T::default_tolerance() * scale * (T::one() + computed.abs());
        if (self.internal_length - computed).abs() > tolerance {
            return Err(MeshValidationError::LengthDrift {
                stored: format!("{}", self.internal_length),
                computed: format!("{computed}"),
            });
        }

        Ok(())
    }
}
