//! # flatmesh
//!
//! This is a library for building planar triangulated meshes from 2D point
//! sets by recursive convex-layer peeling, together with edge-flip
//! transformations that reshape a mesh without ever breaking it.
//!
//! # Features
//!
//! - Planar mesh construction by peeling nested convex hulls and stitching
//!   the layers into triangulated annuli
//! - Per-vertex circular adjacency that keeps neighbors in clockwise order
//!   through every mutation
//! - Length-reducing edge-flip optimization and randomized edge-flip
//!   shuffling, both returning replayable flip logs
//! - Jittered integer point generation for well-spaced test inputs
//! - Generic floating-point coordinate types (`f32`, `f64`, and other types
//!   implementing `CoordinateScalar`)
//! - Serialization/Deserialization with [serde](https://serde.rs)
//!
//! # Basic Usage
//!
//! ```rust
//! use flatmesh::prelude::*;
//!
//! // Well-spaced points inside the circle inscribed in a 640x480 region.
//! let points = generate_points_seeded::<f64>(640, 480, 48, 7).unwrap();
//!
//! let mut mesh = Mesh::new(points).unwrap();
//! assert!(mesh.is_valid().is_ok());
//!
//! // Flip internal edges until no crossing diagonal is shorter.
//! let flips = mesh.optimize().unwrap();
//! assert!(flips.iter().all(|flip| flip.length_delta < 0.0));
//! assert!(mesh.is_valid().is_ok());
//! ```
//!
//! # Edge Flips and Replay
//!
//! Every mutation of a built mesh is an edge flip: an internal edge is
//! removed and the crossing diagonal of its quadrilateral is inserted.
//! [`Mesh::optimize`] and [`Mesh::shuffle`] return their flips as
//! [`EdgeFlip`] records, which can be replayed against an identical mesh or
//! inverted to walk backwards:
//!
//! ```rust
//! use flatmesh::prelude::*;
//!
//! let points = generate_points_seeded::<f64>(320, 320, 24, 11).unwrap();
//!
//! let mut shuffled = Mesh::new(points.clone()).unwrap();
//! let log = shuffled.shuffle_seeded(3).unwrap();
//!
//! // The log carries enough to rebuild the shuffled mesh from scratch.
//! let mut replica = Mesh::new(points).unwrap();
//! for flip in &log {
//!     replica.apply_replacement(flip.removed, flip.added).unwrap();
//! }
//! assert_eq!(
//!     replica.number_of_internal_edges(),
//!     shuffled.number_of_internal_edges()
//! );
//! assert!(replica.total_internal_length() == shuffled.total_internal_length());
//! ```
//!
//! # Mesh Invariants
//!
//! A built mesh maintains a set of structural invariants that are checked by
//! [`Mesh::is_valid`]:
//!
//! - **Edge registry consistency** – every edge key decodes to its stored
//!   endpoints, and the boundary and internal sets partition the registry.
//! - **Neighbor symmetry** – vertex `a` lists `b` exactly when `b` lists `a`.
//! - **Clockwise order** – every vertex's neighbors appear in strictly
//!   clockwise rotational order around it.
//! - **Planarity** – no two edges cross except at shared endpoints.
//! - **Length bookkeeping** – the running total of internal edge lengths
//!   matches a fresh summation to within accumulated rounding.
//!
//! Construction and both flip drivers preserve all of these; a flip is
//! rejected rather than applied when its quadrilateral is not strictly
//! convex, so the mesh is never left in a partial state.
//!
//! # Correctness Guarantees and Limitations
//!
//! 1. **Optimization is a length minimum, not Delaunay** – [`Mesh::optimize`]
//!    flips towards a local minimum of total internal edge length. The
//!    result is usually close to, but not necessarily, the Delaunay
//!    triangulation of the points.
//!
//! 2. **Degenerate input handling** – duplicate points are rejected at
//!    construction, fully collinear layers are triangulated as back-and-forth
//!    chains, and a point exactly on a hull edge's line is resolved by an
//!    exact alignment test rather than left to rounding.
//!
//! 3. **Numerical precision** – orientation and alignment predicates are
//!    exact for coordinates with exactly representable products, such as the
//!    integer grids produced by the point generator. On arbitrary
//!    floating-point input, results near predicate boundaries follow the
//!    rounded sign.

#![forbid(unsafe_code)]

/// The `core` module contains the mesh data structure, its adjacency
/// components, and the edge-flip transformations.
pub mod core {
    /// Assembly of the full edge set by recursive convex-layer peeling.
    pub(crate) mod builder;
    /// Collection types tuned for mesh workloads
    pub mod collections;
    pub mod edge;
    pub mod mesh;
    pub mod star;
    mod optimize;
    mod shuffle;
    // Re-export the `core` modules.
    pub use edge::*;
    pub use mesh::*;
    pub use star::*;
    // Note: collections module not re-exported here to avoid namespace pollution
}

/// Contains geometric types including the `Point` struct, exact sign
/// predicates, and the jittered point generator.
pub mod geometry {
    /// Jittered integer point generation inside an inscribed circle
    pub mod generation;
    pub mod point;
    pub mod predicates;
    pub use generation::*;
    pub use point::*;
    pub use predicates::*;
}

/// A prelude module that re-exports commonly used types.
/// This makes it easier to import the most commonly used items from the crate.
pub mod prelude {
    // Re-export from core
    pub use crate::core::{edge::*, mesh::*, star::*};

    // Re-export commonly used collection types from core::collections
    pub use crate::core::collections::{FastHashMap, FastHashSet, SmallBuffer};

    // Re-export from geometry
    pub use crate::geometry::{generation::*, point::*, predicates::*};
}

/// The function `is_normal` checks that structs implement `auto` traits.
/// Traits are checked at compile time, so this function is only used for
/// testing.
#[must_use]
pub const fn is_normal<T: Sized + Send + Sync + Unpin>() -> bool {
    true
}

// =============================================================================
// TESTS
// =============================================================================
