//! Per-vertex rotational neighbor order.
//!
//! Every point of a mesh carries a [`VertexStar`]: a circular doubly-linked
//! ring of its neighbor indices in clockwise angular order. Three fixed
//! sentinel anchors at 0, 120 and 240 degrees are threaded through the ring
//! so the rotational order is well-defined even with zero or one real
//! neighbor; a new neighbor is placed by selecting the anchor sector its
//! direction falls into and walking that sector until the first neighbor it
//! precedes.
//!
//! The ring answers the one query edge flipping is built on: "starting from
//! neighbor X, what are the next K real neighbors clockwise?" For an internal
//! edge `(u, v)`, the neighbor after `v` around `u` is the apex of the
//! triangle on one side of the edge, and the neighbor after `u` around `v`
//! the apex on the other side.

use thiserror::Error;

use crate::core::collections::{FastHashMap, SmallBuffer};
use crate::geometry::point::{CoordinateScalar, Point};

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised by neighbor-ring mutations and queries.
///
/// Apart from [`StarError::DuplicateNeighbor`] on redundant insertion, these
/// indicate a bug in the calling topology code rather than a user error.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StarError {
    /// The neighbor being inserted is already linked around this point.
    #[error("Neighbor {neighbor} is already linked around point {origin}")]
    DuplicateNeighbor {
        /// Index of the point that owns the ring.
        origin: usize,
        /// Index of the neighbor that was inserted twice.
        neighbor: usize,
    },
    /// The neighbor being removed or queried is not linked around this point.
    #[error("Neighbor {neighbor} is not linked around point {origin}")]
    MissingNeighbor {
        /// Index of the point that owns the ring.
        origin: usize,
        /// Index of the absent neighbor.
        neighbor: usize,
    },
    /// The neighbor coincides with the ring's own point, so its direction is undefined.
    #[error("Neighbor {neighbor} coincides with point {origin}; rotational order is undefined")]
    ZeroDirection {
        /// Index of the point that owns the ring.
        origin: usize,
        /// Index of the coincident neighbor.
        neighbor: usize,
    },
    /// The ring's internal links no longer form a single cycle.
    #[error("Rotational order around point {origin} is corrupted")]
    BrokenRing {
        /// Index of the point that owns the ring.
        origin: usize,
    },
    /// A query asked for more clockwise neighbors than the ring holds.
    #[error(
        "Requested {requested} neighbors clockwise of a ring position around point {origin}, but only {available} exist"
    )]
    ExhaustedRing {
        /// Index of the point that owns the ring.
        origin: usize,
        /// Number of neighbors the query asked for.
        requested: usize,
        /// Number of other neighbors actually present.
        available: usize,
    },
}

// =============================================================================
// RING REPRESENTATION
// =============================================================================

/// One position in the ring: a real neighbor or one of the three anchors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Slot {
    /// Sentinel anchor `k` at `k * 120` degrees.
    Anchor(u8),
    /// Real neighbor, by point index.
    Neighbor(usize),
}

/// Doubly-linked ring pointers for one slot.
#[derive(Clone, Copy, Debug)]
struct Links {
    prev: Slot,
    next: Slot,
}

/// Clockwise rotational order of one point's neighbors.
///
/// The ring does not store coordinates; each geometric operation takes the
/// mesh's point slice so the star stays a pure index structure.
#[derive(Clone, Debug)]
pub struct VertexStar {
    origin: usize,
    ring: FastHashMap<Slot, Links>,
    degree: usize,
}

impl VertexStar {
    /// Creates the empty ring for the point at `origin`: the three anchors
    /// linked in clockwise order, no real neighbors.
    #[must_use]
    pub fn new(origin: usize) -> Self {
        let mut ring = FastHashMap::default();
        // Clockwise from 0 degrees: anchor 0, anchor 2 (240), anchor 1 (120).
        ring.insert(
            Slot::Anchor(0),
            Links {
                prev: Slot::Anchor(1),
                next: Slot::Anchor(2),
            },
        );
        ring.insert(
            Slot::Anchor(2),
            Links {
                prev: Slot::Anchor(0),
                next: Slot::Anchor(1),
            },
        );
        ring.insert(
            Slot::Anchor(1),
            Links {
                prev: Slot::Anchor(2),
                next: Slot::Anchor(0),
            },
        );
        Self {
            origin,
            ring,
            degree: 0,
        }
    }

    /// Index of the point this ring belongs to.
    #[inline]
    #[must_use]
    pub const fn origin(&self) -> usize {
        self.origin
    }

    /// Number of real neighbors currently linked.
    #[inline]
    #[must_use]
    pub const fn degree(&self) -> usize {
        self.degree
    }

    /// Whether `neighbor` is currently linked around this point.
    #[must_use]
    pub fn contains(&self, neighbor: usize) -> bool {
        self.ring.contains_key(&Slot::Neighbor(neighbor))
    }

    /// Links `neighbor` into the ring at its clockwise angular position.
    ///
    /// The position is found by selecting the 120-degree anchor sector the
    /// direction from `origin` to `neighbor` falls into, then walking that
    /// sector clockwise to the first element the new direction precedes. Two
    /// neighbors in exactly the same direction keep their insertion order.
    ///
    /// # Errors
    ///
    /// [`StarError::DuplicateNeighbor`] if `neighbor` is already linked,
    /// [`StarError::ZeroDirection`] if its coordinates coincide with the
    /// origin's, [`StarError::BrokenRing`] if the ring links are corrupted.
    pub fn insert<T: CoordinateScalar>(
        &mut self,
        neighbor: usize,
        points: &[Point<T>],
    ) -> Result<(), StarError> {
        let slot = Slot::Neighbor(neighbor);
        if self.ring.contains_key(&slot) {
            return Err(StarError::DuplicateNeighbor {
                origin: self.origin,
                neighbor,
            });
        }

        let dir = self.direction_to(neighbor, points)?;
        let sector = sector_anchor(dir);

        // Walk the sector clockwise; stop at the first neighbor the new
        // direction is counter-clockwise of, or at the sector's closing anchor.
        let mut cursor = self.links_of(Slot::Anchor(sector))?.next;
        loop {
            match cursor {
                Slot::Neighbor(existing) => {
                    let existing_dir = self.direction_to(existing, points)?;
                    if cross(existing_dir, dir) > T::zero() {
                        break;
                    }
                    cursor = self.links_of(cursor)?.next;
                }
                Slot::Anchor(_) => break,
            }
        }

        self.splice_before(cursor, slot)?;
        self.degree += 1;
        Ok(())
    }

    /// Unlinks `neighbor` from the ring, re-joining its predecessor and
    /// successor.
    ///
    /// # Errors
    ///
    /// [`StarError::MissingNeighbor`] if `neighbor` is not linked,
    /// [`StarError::BrokenRing`] if the ring links are corrupted.
    pub fn remove(&mut self, neighbor: usize) -> Result<(), StarError> {
        let slot = Slot::Neighbor(neighbor);
        let Some(links) = self.ring.remove(&slot) else {
            return Err(StarError::MissingNeighbor {
                origin: self.origin,
                neighbor,
            });
        };

        let origin = self.origin;
        let broken = StarError::BrokenRing { origin };
        self.ring.get_mut(&links.prev).ok_or_else(|| broken.clone())?.next = links.next;
        self.ring.get_mut(&links.next).ok_or(broken)?.prev = links.prev;
        self.degree -= 1;
        Ok(())
    }

    /// Returns the next `count` real neighbors strictly clockwise of
    /// `neighbor`, skipping the anchors.
    ///
    /// # Errors
    ///
    /// [`StarError::MissingNeighbor`] if `neighbor` is not linked,
    /// [`StarError::ExhaustedRing`] if fewer than `count` other neighbors
    /// exist, [`StarError::BrokenRing`] if the ring links are corrupted.
    pub fn neighbors_after(
        &self,
        neighbor: usize,
        count: usize,
    ) -> Result<SmallBuffer<usize, 2>, StarError> {
        let start = Slot::Neighbor(neighbor);
        if !self.ring.contains_key(&start) {
            return Err(StarError::MissingNeighbor {
                origin: self.origin,
                neighbor,
            });
        }
        let available = self.degree - 1;
        if count > available {
            return Err(StarError::ExhaustedRing {
                origin: self.origin,
                requested: count,
                available,
            });
        }

        // The walk is bounded by the ring size so corrupted links that still
        // form a cycle surface as an error instead of spinning.
        let mut collected = SmallBuffer::new();
        let mut cursor = self.links_of(start)?.next;
        for _ in 0..self.ring.len() {
            if collected.len() == count {
                break;
            }
            if let Slot::Neighbor(index) = cursor {
                collected.push(index);
            }
            cursor = self.links_of(cursor)?.next;
        }
        if collected.len() == count {
            Ok(collected)
        } else {
            Err(StarError::BrokenRing {
                origin: self.origin,
            })
        }
    }

    /// Returns the single real neighbor immediately clockwise of `neighbor`.
    ///
    /// For an internal edge this is how the flip quadrilateral's apexes are
    /// found: `stars[u].next_after(v)` is the apex of the triangle on one
    /// side of `(u, v)`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`VertexStar::neighbors_after`] with a count of 1.
    pub fn next_after(&self, neighbor: usize) -> Result<usize, StarError> {
        let found = self.neighbors_after(neighbor, 1)?;
        found.first().copied().ok_or(StarError::BrokenRing {
            origin: self.origin,
        })
    }

    /// Iterates the real neighbors in clockwise order, starting from the
    /// 0-degree anchor.
    #[must_use]
    pub fn iter(&self) -> StarNeighbors<'_> {
        StarNeighbors {
            star: self,
            cursor: Slot::Anchor(0),
            remaining: self.degree,
        }
    }

    /// Whether the real neighbors appear in clockwise angular order around
    /// the origin.
    ///
    /// Walks the ring once from the 0-degree anchor and checks that mapped
    /// polar angles of the neighbors never increase, and that every linked
    /// neighbor is reached. Anchors are skipped: queries never observe them,
    /// and a direction lying exactly on an anchor can land on either side of
    /// it without affecting the neighbor order. Exact angular ties are
    /// allowed since same-direction neighbors are valid ring members.
    pub(crate) fn is_clockwise_ordered<T: CoordinateScalar>(&self, points: &[Point<T>]) -> bool {
        let pi = T::zero().atan2(-T::one());
        let two_pi = (T::one() + T::one()) * pi;

        // Angles are mapped into (0, 2*pi] so a neighbor exactly at 0
        // degrees sorts to the top of the clockwise sweep.
        let mut previous = two_pi;
        let mut seen = 0usize;
        let mut cursor = match self.ring.get(&Slot::Anchor(0)) {
            Some(links) => links.next,
            None => return false,
        };
        for _ in 0..self.ring.len() {
            match cursor {
                Slot::Anchor(0) => return seen == self.degree,
                Slot::Anchor(_) => {}
                Slot::Neighbor(index) => {
                    let Some(dir) = direction(self.origin, index, points) else {
                        return false;
                    };
                    let theta = dir.1.atan2(dir.0);
                    let angle = if theta <= T::zero() { theta + two_pi } else { theta };
                    if angle > previous {
                        return false;
                    }
                    previous = angle;
                    seen += 1;
                }
            }
            cursor = match self.ring.get(&cursor) {
                Some(links) => links.next,
                None => return false,
            };
        }
        // Never returned to the starting anchor: the links do not cycle.
        false
    }

    fn direction_to<T: CoordinateScalar>(
        &self,
        neighbor: usize,
        points: &[Point<T>],
    ) -> Result<(T, T), StarError> {
        direction(self.origin, neighbor, points).ok_or(StarError::ZeroDirection {
            origin: self.origin,
            neighbor,
        })
    }

    fn links_of(&self, slot: Slot) -> Result<Links, StarError> {
        self.ring.get(&slot).copied().ok_or(StarError::BrokenRing {
            origin: self.origin,
        })
    }

    /// Inserts `slot` into the ring immediately before `before`.
    fn splice_before(&mut self, before: Slot, slot: Slot) -> Result<(), StarError> {
        let previous = self.links_of(before)?.prev;
        let broken = StarError::BrokenRing {
            origin: self.origin,
        };
        self.ring
            .get_mut(&previous)
            .ok_or_else(|| broken.clone())?
            .next = slot;
        self.ring.get_mut(&before).ok_or(broken)?.prev = slot;
        self.ring.insert(
            slot,
            Links {
                prev: previous,
                next: before,
            },
        );
        Ok(())
    }
}

/// Iterator over a ring's real neighbors in clockwise order.
///
/// Yields nothing further if the ring links are corrupted mid-walk.
pub struct StarNeighbors<'a> {
    star: &'a VertexStar,
    cursor: Slot,
    remaining: usize,
}

impl Iterator for StarNeighbors<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.remaining > 0 {
            self.cursor = self.star.ring.get(&self.cursor)?.next;
            if let Slot::Neighbor(index) = self.cursor {
                self.remaining -= 1;
                return Some(index);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

impl<'a> IntoIterator for &'a VertexStar {
    type Item = usize;
    type IntoIter = StarNeighbors<'a>;

    fn into_iter(self) -> StarNeighbors<'a> {
        self.iter()
    }
}

// =============================================================================
// SECTOR GEOMETRY
// =============================================================================

/// Direction from point `from` to point `to`, or `None` when the coordinates
/// coincide or either index is out of range.
fn direction<T: CoordinateScalar>(from: usize, to: usize, points: &[Point<T>]) -> Option<(T, T)> {
    let origin = points.get(from)?;
    let target = points.get(to)?;
    let dir = (target.x() - origin.x(), target.y() - origin.y());
    if dir.0 == T::zero() && dir.1 == T::zero() {
        None
    } else {
        Some(dir)
    }
}

fn cross<T: CoordinateScalar>(a: (T, T), b: (T, T)) -> T {
    a.0 * b.1 - b.0 * a.1
}

/// Selects the anchor opening the 120-degree sector that contains `dir`.
///
/// The anchors point at 0, 120 and 240 degrees; clockwise from anchor `k` the
/// sector runs to the next anchor (0 to 240, 240 to 120, 120 to 0). A
/// direction is classified by the sign of its cross product against each
/// anchor, with directions exactly on an anchor belonging to the sector that
/// anchor opens.
fn sector_anchor<T: CoordinateScalar>(dir: (T, T)) -> u8 {
    let (dx, dy) = dir;
    let zero = T::zero();
    let two = T::one() + T::one();
    let half = T::one() / two;
    let slope = (two + T::one()).sqrt() / two;

    // Cross products of each anchor direction with dir.
    let against_0 = dy;
    let against_1 = -half * dy - slope * dx;
    let against_2 = -half * dy + slope * dx;

    if against_0 < zero && against_2 > zero {
        0
    } else if against_2 < zero && against_1 > zero {
        2
    } else if against_1 < zero && against_0 > zero {
        1
    } else if against_0 == zero && dx > zero {
        // Exactly along the 0-degree anchor.
        0
    } else if against_1 == zero && against_0 > zero {
        // Exactly along the 120-degree anchor.
        1
    } else {
        // Exactly along the 240-degree anchor.
        2
    }
}
