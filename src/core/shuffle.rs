//! Randomized edge-flip shuffling.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::edge::{EdgeFlip, EdgeKey};
use crate::core::mesh::{Mesh, MeshInvariantError};
use crate::geometry::point::CoordinateScalar;

impl<T: CoordinateScalar> Mesh<T> {
    /// Randomizes the triangulation by flipping internal edges picked at
    /// random, accepting every flip whose quadrilateral is convex.
    ///
    /// Flips proceed in passes; within a pass each internal edge is drawn
    /// at most once. Shuffling stops once the number of applied flips
    /// reaches the internal edge count, or earlier when a full pass
    /// applies no flip at all.
    ///
    /// Returns the applied flips in order, replayable with
    /// [`Mesh::apply_replacement`] and reversible through
    /// [`EdgeFlip::inverted`].
    ///
    /// # Errors
    ///
    /// Returns [`MeshInvariantError`] if the adjacency rings are corrupt,
    /// which a mesh mutated only through this crate's operations cannot be.
    pub fn shuffle(&mut self) -> Result<Vec<EdgeFlip<T>>, MeshInvariantError> {
        self.shuffle_with_rng(&mut rand::rng())
    }

    /// [`Mesh::shuffle`] driven by a seeded generator, so equal seeds on
    /// identical meshes produce identical flip sequences.
    ///
    /// # Errors
    ///
    /// Returns [`MeshInvariantError`] if the adjacency rings are corrupt,
    /// which a mesh mutated only through this crate's operations cannot be.
    pub fn shuffle_seeded(&mut self, seed: u64) -> Result<Vec<EdgeFlip<T>>, MeshInvariantError> {
        self.shuffle_with_rng(&mut StdRng::seed_from_u64(seed))
    }

    fn shuffle_with_rng<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<Vec<EdgeFlip<T>>, MeshInvariantError> {
        let target = self.number_of_internal_edges();
        let mut log = Vec::new();

        while log.len() < target {
            // Snapshot the internal edges in canonical order so the pass
            // depends only on the mesh state and the generator.
            let mut pool: Vec<EdgeKey> = self.internal_edge_keys().collect();
            pool.sort_unstable();

            let mut flipped = false;
            while !pool.is_empty() && log.len() < target {
                let key = pool.swap_remove(rng.random_range(0..pool.len()));
                // Earlier flips in this pass may have replaced the edge.
                if !self.is_internal_edge(key) {
                    continue;
                }
                if let Some(flip) = self.try_flip(key, false)? {
                    log.push(flip);
                    flipped = true;
                }
            }
            if !flipped {
                break;
            }
        }

        tracing::debug!(flips = log.len(), target, "shuffled mesh");
        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::edge::EdgeKey;
    use crate::core::mesh::Mesh;
    use crate::geometry::point::Point;

    fn quad() -> Mesh<f64> {
        Mesh::new(vec![
            Point::new([6.0, 0.0]),
            Point::new([7.0, 4.0]),
            Point::new([1.0, 4.0]),
            Point::new([0.0, 0.0]),
        ])
        .unwrap()
    }

    #[test]
    fn flip_count_matches_the_internal_edge_count() {
        // A quad has one internal edge, and its only flip is convex, so
        // every seed applies exactly that flip.
        let mut mesh = quad();
        let log = mesh.shuffle_seeded(99).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].removed, EdgeKey::new(1, 3));
        assert_eq!(log[0].added, EdgeKey::new(0, 2));
        assert!(mesh.is_valid().is_ok());
    }

    #[test]
    fn second_shuffle_flips_the_diagonal_back() {
        let mut mesh = quad();
        mesh.shuffle_seeded(1).unwrap();
        let log = mesh.shuffle_seeded(2).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].removed, EdgeKey::new(0, 2));
        assert_eq!(log[0].added, EdgeKey::new(1, 3));
        assert!(mesh.is_internal_edge(EdgeKey::new(1, 3)));
    }

    #[test]
    fn triangle_has_nothing_to_shuffle() {
        let mut mesh = Mesh::new(vec![
            Point::new([0.0_f64, 0.0]),
            Point::new([5.0, 0.0]),
            Point::new([2.0, 4.0]),
        ])
        .unwrap();
        assert!(mesh.shuffle_seeded(7).unwrap().is_empty());
    }
}
