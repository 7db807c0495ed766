//! Optimized collection aliases used throughout the crate.
//!
//! Mesh construction and edge flipping are dominated by hash lookups keyed by
//! small integers (edge keys, point indices, bucket coordinates), so the
//! internal collections use the `FxHash` family instead of the standard
//! SipHash-based types. Neighbor queries and flip bookkeeping touch only a
//! handful of elements at a time and use stack-allocated small buffers.

use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet, FxHasher};
use smallvec::SmallVec;

/// Optimized `HashMap` for performance-critical lookups.
///
/// Uses [`rustc_hash::FxHashMap`] for fast non-cryptographic hashing. Edge
/// registry and bucket-occupancy lookups sit on the hot path of construction
/// and flipping, where hashing cost dominates.
///
/// # Examples
///
/// ```
/// use flatmesh::core::collections::FastHashMap;
///
/// let mut map: FastHashMap<u64, usize> = FastHashMap::default();
/// map.insert(123, 456);
/// ```
pub type FastHashMap<K, V> = FxHashMap<K, V>;

/// Optimized `HashSet` for performance-critical membership tests.
///
/// # Examples
///
/// ```
/// use flatmesh::core::collections::FastHashSet;
///
/// let mut set: FastHashSet<u64> = FastHashSet::default();
/// set.insert(42);
/// assert!(set.contains(&42));
/// ```
pub type FastHashSet<T> = FxHashSet<T>;

/// Fast non-cryptographic hasher alias for internal collections.
///
/// Wraps [`rustc_hash::FxHasher`] to ensure consistent hashing behavior
/// across [`FastHashMap`] and [`FastHashSet`].
pub type FastHasher = FxHasher;

/// Build hasher that instantiates [`FastHasher`].
pub type FastBuildHasher = FxBuildHasher;

/// Re-export of the `Entry` enum for [`FastHashMap`].
///
/// `FxHashMap` is a `std` `HashMap` with a custom hasher, so the standard
/// `Entry` API applies unchanged and supports check-and-insert in one lookup.
pub use std::collections::hash_map::Entry;

/// Small-optimized Vec with stack allocation for small collections.
///
/// Neighbor-ring queries and flip-quadrilateral bookkeeping return at most a
/// handful of elements; `SmallBuffer` keeps those on the stack with heap
/// fallback for larger counts.
///
/// # Examples
///
/// ```
/// use flatmesh::core::collections::SmallBuffer;
///
/// let mut buffer: SmallBuffer<usize, 4> = SmallBuffer::new();
/// buffer.push(7);
/// assert_eq!(buffer.len(), 1);
/// ```
pub type SmallBuffer<T, const N: usize> = SmallVec<[T; N]>;
