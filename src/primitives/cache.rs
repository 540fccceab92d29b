//! Bounded memoization of exact pairwise distances.
//!
//! ## Purpose
//!
//! Exact great-circle distances are the most expensive quantity the engine
//! computes per (unit, location) pair, and the same pair recurs once per age
//! band of the unit's category. This module provides [`DistanceCache`], a
//! bounded LRU map from pair keys to distances, so repeated bands hit memory
//! instead of recomputing trigonometry.
//!
//! ## Design notes
//!
//! * Keys are `(u32, u32)` index pairs, not positions: indices are stable
//!   within a run and hash faster than coordinates.
//! * Capacity is bounded; the engine partitions one cache per parallel task,
//!   so worst-case memory is `capacity × workers` entries.
//! * Hit, miss, and eviction counters feed the run report.
//!
//! ## Invariants
//!
//! * `hits + misses` equals the number of lookups performed.
//! * The cache never grows beyond its configured capacity.
//!
//! ## Non-goals
//!
//! * No cross-run persistence; distances are only valid for one set of
//!   indexed inputs.

// Standard library
use std::num::NonZeroUsize;

// External dependencies
use lru::LruCache;

// Internal dependencies
use crate::primitives::errors::{ReachError, Result};

/// Counters describing how a [`DistanceCache`] behaved during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that required computing the distance.
    pub misses: u64,
    /// Entries dropped to make room for newer pairs.
    pub evictions: u64,
}

impl CacheStats {
    /// Fold another set of counters into this one.
    pub fn merge(&mut self, other: &CacheStats) {
        self.hits += other.hits;
        self.misses += other.misses;
        self.evictions += other.evictions;
    }

    /// Fraction of lookups answered from the cache, or 0 when no lookups
    /// were made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Bounded LRU cache of exact distances keyed by (unit index, location
/// index).
#[derive(Debug)]
pub struct DistanceCache<T> {
    inner: LruCache<(u32, u32), T>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<T: Copy> DistanceCache<T> {
    /// Create a cache holding at most `capacity` pairs.
    ///
    /// Fails with [`ReachError::InvalidCacheCapacity`] when `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or(ReachError::InvalidCacheCapacity)?;
        Ok(Self {
            inner: LruCache::new(capacity),
            hits: 0,
            misses: 0,
            evictions: 0,
        })
    }

    /// Look up the distance for a pair, updating the hit/miss counters.
    pub fn get(&mut self, unit: u32, location: u32) -> Option<T> {
        match self.inner.get(&(unit, location)) {
            Some(distance) => {
                self.hits += 1;
                Some(*distance)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Store the distance for a pair, evicting the least recently used entry
    /// when at capacity.
    pub fn insert(&mut self, unit: u32, location: u32, distance: T) {
        let key = (unit, location);
        if let Some((evicted_key, _)) = self.inner.push(key, distance) {
            // `push` also returns the old entry when the key was already
            // present; only a different key means a real eviction.
            if evicted_key != key {
                self.evictions += 1;
            }
        }
    }

    /// Number of pairs currently held.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the cache holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Configured capacity in pairs.
    pub fn capacity(&self) -> usize {
        self.inner.cap().get()
    }

    /// Snapshot of the hit/miss/eviction counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
        }
    }
}
