#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

/// Measured row sizes, remembered by row key so they survive appends and remounts.
#[cfg(feature = "std")]
pub(crate) type SizeCache<K> = HashMap<K, u32>;
#[cfg(not(feature = "std"))]
pub(crate) type SizeCache<K> = BTreeMap<K, u32>;

/// Bound for row keys produced by `compute_item_key`.
///
/// With `std` this is `Hash + Eq`; without it, `Ord` (the cache falls back to a `BTreeMap`).
#[cfg(feature = "std")]
#[doc(hidden)]
pub trait RowKey: core::hash::Hash + Eq {}
#[cfg(feature = "std")]
impl<K: core::hash::Hash + Eq> RowKey for K {}

#[cfg(not(feature = "std"))]
#[doc(hidden)]
pub trait RowKey: Ord {}
#[cfg(not(feature = "std"))]
impl<K: Ord> RowKey for K {}
