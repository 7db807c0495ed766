//! Length-reducing edge-flip optimization.

use std::collections::VecDeque;

use crate::core::collections::FastHashSet;
use crate::core::edge::{EdgeFlip, EdgeKey};
use crate::core::mesh::{Mesh, MeshInvariantError};
use crate::geometry::point::CoordinateScalar;

impl<T: CoordinateScalar> Mesh<T> {
    /// Flips internal edges whose crossing diagonal is strictly shorter
    /// until no such edge remains, greedily reducing the total internal
    /// edge length.
    ///
    /// Edges are processed through a worklist seeded with every internal
    /// edge; each flip re-enqueues the four edges bounding the flipped
    /// quadrilateral, since the flip may have made their diagonals
    /// improvable. The result is a local minimum of total length, not a
    /// Delaunay triangulation.
    ///
    /// Returns the applied flips in order. Replaying them against an
    /// identical freshly built mesh with [`Mesh::apply_replacement`]
    /// reproduces this mesh exactly.
    ///
    /// # Errors
    ///
    /// Returns [`MeshInvariantError`] if the adjacency rings are corrupt,
    /// which a mesh mutated only through this crate's operations cannot be.
    pub fn optimize(&mut self) -> Result<Vec<EdgeFlip<T>>, MeshInvariantError> {
        let mut keys: Vec<EdgeKey> = self.internal_edge_keys().collect();
        keys.sort_unstable();
        let mut pending: FastHashSet<EdgeKey> = keys.iter().copied().collect();
        let mut queue: VecDeque<EdgeKey> = keys.into();
        let mut log = Vec::new();

        while let Some(key) = queue.pop_front() {
            pending.remove(&key);
            // A queued edge may have been flipped away already.
            if !self.is_internal_edge(key) {
                continue;
            }
            let Some(flip) = self.try_flip(key, true)? else {
                continue;
            };

            let (u, v) = flip.removed.endpoints();
            let (w1, w2) = flip.added.endpoints();
            for neighbor in [
                EdgeKey::new(u, w1),
                EdgeKey::new(u, w2),
                EdgeKey::new(v, w1),
                EdgeKey::new(v, w2),
            ] {
                if self.is_internal_edge(neighbor) && pending.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
            log.push(flip);
        }

        tracing::debug!(flips = log.len(), "optimized mesh");
        Ok(log)
    }
}
