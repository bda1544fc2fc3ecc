//! Free-list for one kind and one tier of scratch container.
//!
//! This module provides a thread-safe, lock-free object pool for compression
//! scratch containers. Containers are cleared on the way in, so anything popped
//! from the queue is already empty and can be handed out as is.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_queue::ArrayQueue;
use crossbeam_utils::CachePadded;

use crate::config::TierSettings;
use crate::scratch::Scratch;
use crate::tier::Tier;

/// Bounded, lock-free pool of reusable containers of type `C`.
///
/// # Thread Safety
///
/// `get` and `put` are a single pop or push on an [`ArrayQueue`], so any
/// number of threads can use the same pool without taking a lock. A container
/// popped by one thread is moved out of the queue and can never be observed by
/// another until it is put back.
///
/// # Memory Management
///
/// - Fresh containers are built with [`Tier::initial_capacity`] slots
/// - Returned containers are cleared, and shrunk if they grew past the
///   retained capacity
/// - At most `max_pooled` containers are kept; extras are dropped
///
/// The retained capacity is what `C` actually allocates when asked for
/// `settings.retained_capacity` slots. Hash tables round their bucket count
/// up to a power of two, so this is usually larger than the configured value.
///
/// # Example
///
/// ```rust, ignore
/// let pool: Pool<OffsetMap> = Pool::new(Tier::Small, TierSettings::default_for(Tier::Small));
///
/// let mut map = pool.get();
/// map.insert("example.org.".to_string(), 12);
///
/// pool.put(map); // cleared and ready for reuse
/// assert!(pool.get().is_empty());
/// ```
pub(crate) struct Pool<C: Scratch> {
    queue: ArrayQueue<C>,
    tier: Tier,
    /// Effective slot cap, as allocated by `C` for the configured value.
    retained_capacity: usize,
    hits: CachePadded<AtomicUsize>,
    misses: CachePadded<AtomicUsize>,
    returns: CachePadded<AtomicUsize>,
    drops: CachePadded<AtomicUsize>,
}

impl<C: Scratch> Pool<C> {
    /// Creates an empty pool.
    ///
    /// # Panics
    ///
    /// Panics if `settings.max_pooled` is zero. [`RegistryBuilder`] rejects
    /// such settings before they get here.
    ///
    /// [`RegistryBuilder`]: crate::RegistryBuilder
    pub(crate) fn new(tier: Tier, settings: TierSettings) -> Self {
        assert!(settings.max_pooled > 0, "pool must hold at least one container");
        Self {
            queue: ArrayQueue::new(settings.max_pooled),
            tier,
            retained_capacity: C::with_capacity(settings.retained_capacity).capacity(),
            hits: CachePadded::new(AtomicUsize::new(0)),
            misses: CachePadded::new(AtomicUsize::new(0)),
            returns: CachePadded::new(AtomicUsize::new(0)),
            drops: CachePadded::new(AtomicUsize::new(0)),
        }
    }

    /// Takes a container from the pool, or builds a new one if the pool is
    /// empty. The result is always empty.
    ///
    /// # Performance
    ///
    /// - **Pool hit**: one atomic pop
    /// - **Pool miss**: one allocation pre-sized for the tier
    #[inline]
    pub(crate) fn get(&self) -> C {
        match self.queue.pop() {
            Some(c) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug_assert!(c.is_empty(), "pooled container was not cleared");
                c
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                log::trace!("{} {} pool empty, allocating", self.tier, C::KIND);
                C::with_capacity(self.tier.initial_capacity())
            }
        }
    }

    /// Returns a container to the pool.
    ///
    /// The container is cleared before it is queued. If it holds more slots
    /// than the retained capacity it is shrunk back down first, or replaced
    /// by a fresh one if shrinking does not get it under. If the pool is full
    /// the container is dropped.
    #[inline]
    pub(crate) fn put(&self, mut c: C) {
        c.clear();
        if c.capacity() > self.retained_capacity {
            log::trace!(
                "shrinking {} {} from {} to {}",
                self.tier,
                C::KIND,
                c.capacity(),
                self.retained_capacity
            );
            c.shrink_to(self.retained_capacity);
            if c.capacity() > self.retained_capacity {
                c = C::with_capacity(self.tier.initial_capacity());
            }
        }

        if self.queue.push(c).is_ok() {
            self.returns.fetch_add(1, Ordering::Relaxed);
        } else {
            self.drops.fetch_add(1, Ordering::Relaxed);
            log::trace!("{} {} pool full, dropping container", self.tier, C::KIND);
        }
    }

    pub(crate) fn stats(&self) -> PoolStats {
        PoolStats {
            size: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            returns: self.returns.load(Ordering::Relaxed),
            drops: self.drops.load(Ordering::Relaxed),
        }
    }

    /// Number of containers currently waiting in the pool.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }

    /// Most containers the pool will hold at once.
    pub(crate) fn max_pooled(&self) -> usize {
        self.queue.capacity()
    }

    /// Most slots a pooled container keeps.
    pub(crate) fn retained_capacity(&self) -> usize {
        self.retained_capacity
    }
}

impl<C: Scratch> fmt::Debug for Pool<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("kind", &C::KIND)
            .field("tier", &self.tier)
            .field("max_pooled", &self.max_pooled())
            .field("retained_capacity", &self.retained_capacity())
            .field("stats", &self.stats())
            .finish()
    }
}

/// Point-in-time counters for one pool.
///
/// Counters are read independently with relaxed ordering, so under
/// concurrent traffic the fields may not add up exactly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Containers currently in the pool.
    pub size: usize,
    /// Acquisitions served from the pool.
    pub hits: usize,
    /// Acquisitions that had to allocate.
    pub misses: usize,
    /// Releases that went back into the pool.
    pub returns: usize,
    /// Releases dropped because the pool was full.
    pub drops: usize,
}

impl PoolStats {
    /// Fraction of acquisitions served from the pool (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
