//! Canonical edge identifiers and flip log entries.
//!
//! Edges are unordered pairs of point indices. The mesh stores them keyed by
//! a single integer so that `(a, b)` and `(b, a)` always refer to the same
//! edge; the key is the triangular-number pairing
//! `key(a, b) = s * (s + 1) / 2 + min(a, b)` with `s = a + b`, which:
//!
//! - is symmetric in its arguments by construction
//! - is injective over unordered pairs, so distinct edges never collide
//! - is invertible, so the endpoints can be recovered from the key alone
//!
//! Invertibility is what lets a serialized flip log be replayed against a
//! fresh mesh without carrying endpoint pairs alongside every key.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::point::CoordinateScalar;

/// Canonical identifier for an undirected edge between two point indices.
///
/// # Examples
///
/// ```
/// use flatmesh::core::edge::EdgeKey;
///
/// let e1 = EdgeKey::new(3, 7);
/// let e2 = EdgeKey::new(7, 3);
/// assert_eq!(e1, e2);
/// assert_eq!(e1.endpoints(), (3, 7));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeKey(u64);

impl EdgeKey {
    /// Creates the canonical key for the edge between points `a` and `b`.
    ///
    /// The two index orders produce the same key. The endpoints must be
    /// distinct; a self-loop is never a valid mesh edge.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatmesh::core::edge::EdgeKey;
    ///
    /// assert_eq!(EdgeKey::new(0, 1), EdgeKey::new(1, 0));
    /// assert_ne!(EdgeKey::new(0, 1), EdgeKey::new(0, 2));
    /// ```
    #[must_use]
    pub fn new(a: usize, b: usize) -> Self {
        debug_assert!(a != b, "edge endpoints must be distinct");
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let sum = lo as u64 + hi as u64;
        Self(sum * (sum + 1) / 2 + lo as u64)
    }

    /// Returns the raw pairing value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Recovers the endpoint indices, smaller index first.
    ///
    /// Inverts the triangular-number pairing: with `z` the key value,
    /// `s = (isqrt(8z + 1) - 1) / 2` recovers the index sum and `z - s(s+1)/2`
    /// the smaller index. Raw values that [`EdgeKey::new`] cannot produce
    /// (possible only through deserialization) may decode with the first
    /// index not smaller than the second; consumers replaying logs reject
    /// such keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatmesh::core::edge::EdgeKey;
    ///
    /// assert_eq!(EdgeKey::new(12, 5).endpoints(), (5, 12));
    /// ```
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn endpoints(self) -> (usize, usize) {
        let sum = ((8 * self.0 + 1).isqrt() - 1) / 2;
        let lo = self.0 - sum * (sum + 1) / 2;
        (lo as usize, (sum - lo) as usize)
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (lo, hi) = self.endpoints();
        write!(f, "{lo}-{hi}")
    }
}

impl From<(usize, usize)> for EdgeKey {
    fn from((a, b): (usize, usize)) -> Self {
        Self::new(a, b)
    }
}

/// One entry of a replacement log: an internal edge deleted by a flip, the
/// diagonal added in its place, and the resulting change in total internal
/// edge length.
///
/// Entries are produced in chronological order by the optimizer and the
/// shuffle, are immutable afterward, and can be replayed or inverted to step
/// a mesh forward or backward through a transformation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = ""))]
pub struct EdgeFlip<T: CoordinateScalar> {
    /// Key of the internal edge the flip deleted.
    pub removed: EdgeKey,
    /// Key of the diagonal the flip added.
    pub added: EdgeKey,
    /// Length of the added edge minus length of the removed edge.
    pub length_delta: T,
}

impl<T: CoordinateScalar> EdgeFlip<T> {
    /// Returns the flip that undoes this one.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatmesh::core::edge::{EdgeFlip, EdgeKey};
    ///
    /// let flip = EdgeFlip {
    ///     removed: EdgeKey::new(0, 2),
    ///     added: EdgeKey::new(1, 3),
    ///     length_delta: -2.5f64,
    /// };
    /// let undo = flip.inverted();
    /// assert_eq!(undo.removed, flip.added);
    /// assert_eq!(undo.added, flip.removed);
    /// assert_eq!(undo.length_delta, 2.5);
    /// ```
    #[must_use]
    pub fn inverted(self) -> Self {
        Self {
            removed: self.added,
            added: self.removed,
            length_delta: -self.length_delta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_symmetric() {
        assert_eq!(EdgeKey::new(4, 9), EdgeKey::new(9, 4));
        assert_eq!(EdgeKey::new(0, 1), EdgeKey::new(1, 0));
    }

    #[test]
    fn known_pairing_values() {
        // s = 1, lo = 0: 1 * 2 / 2 + 0 = 1
        assert_eq!(EdgeKey::new(0, 1).value(), 1);
        // s = 3, lo = 1: 3 * 4 / 2 + 1 = 7
        assert_eq!(EdgeKey::new(1, 2).value(), 7);
        // s = 5, lo = 2: 5 * 6 / 2 + 2 = 17
        assert_eq!(EdgeKey::new(2, 3).value(), 17);
    }

    #[test]
    fn distinct_pairs_get_distinct_keys() {
        let mut seen = std::collections::HashSet::new();
        for a in 0..40usize {
            for b in (a + 1)..40 {
                assert!(seen.insert(EdgeKey::new(a, b).value()), "collision at ({a}, {b})");
            }
        }
    }

    #[test]
    fn endpoints_invert_the_pairing() {
        for a in 0..40usize {
            for b in (a + 1)..40 {
                assert_eq!(EdgeKey::new(a, b).endpoints(), (a, b));
                assert_eq!(EdgeKey::new(b, a).endpoints(), (a, b));
            }
        }
        // Far beyond the generator's point cap.
        assert_eq!(EdgeKey::new(100_000, 3).endpoints(), (3, 100_000));
    }

    #[test]
    fn ordering_follows_the_raw_value() {
        let mut keys = vec![EdgeKey::new(5, 6), EdgeKey::new(0, 1), EdgeKey::new(2, 3)];
        keys.sort_unstable();
        let values: Vec<u64> = keys.iter().map(|k| k.value()).collect();
        assert!(values.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn display_shows_endpoints() {
        assert_eq!(EdgeKey::new(7, 3).to_string(), "3-7");
    }

    #[test]
    fn tuple_conversion() {
        assert_eq!(EdgeKey::from((8, 2)), EdgeKey::new(2, 8));
    }

    #[test]
    fn inverted_flip_round_trips() {
        let flip = EdgeFlip {
            removed: EdgeKey::new(1, 4),
            added: EdgeKey::new(2, 3),
            length_delta: -0.75f64,
        };
        assert_eq!(flip.inverted().inverted(), flip);
    }
}
