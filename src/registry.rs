//! The six compression pools and the acquire/release surface around them.
//!
//! ```text
//!                   ┌── small ──► Pool<OffsetMap>
//!  acquire_offset ──┼── medium ─► Pool<OffsetMap>
//!                   └── large ──► Pool<OffsetMap>
//!
//!                   ┌── small ──► Pool<NameSet>
//!  acquire_names ───┼── medium ─► Pool<NameSet>
//!                   └── large ──► Pool<NameSet>
//! ```
//!
//! Every pool is created the first time it is touched and synchronized on its
//! own, so traffic on one kind or tier never waits on another.

use std::fmt;
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::sync::OnceLock;

use crate::config::{RegistryBuilder, RegistryConfig};
use crate::pool::{Pool, PoolStats};
use crate::scratch::{Kind, NameSet, OffsetMap, Scratch};
use crate::tier::{Records, Tier};

/// Lazily created pools of one kind, one per tier.
pub struct TieredPool<C: Scratch> {
    slots: [OnceLock<Pool<C>>; 3],
}

impl<C: Scratch> TieredPool<C> {
    fn new() -> Self {
        Self {
            slots: [OnceLock::new(), OnceLock::new(), OnceLock::new()],
        }
    }

    #[inline]
    fn get_or_init(&self, tier: Tier, config: &RegistryConfig) -> &Pool<C> {
        self.slots[tier.index()].get_or_init(|| {
            let settings = config.tier(tier);
            log::debug!(
                "creating {} {} pool (max_pooled={}, retained_capacity={})",
                tier,
                C::KIND,
                settings.max_pooled,
                settings.retained_capacity
            );
            Pool::new(tier, settings)
        })
    }

    #[inline]
    fn existing(&self, tier: Tier) -> Option<&Pool<C>> {
        self.slots[tier.index()].get()
    }
}

mod sealed {
    use super::{Registry, TieredPool};
    use crate::scratch::Scratch;

    pub trait Routed: Scratch + Sized {
        fn pools(registry: &Registry) -> &TieredPool<Self>;
    }
}

/// A container kind the registry can route to its pools.
///
/// Sealed: implemented for [`OffsetMap`] and [`NameSet`] only.
pub trait Route: sealed::Routed {}

impl Route for OffsetMap {}

impl Route for NameSet {}

impl sealed::Routed for OffsetMap {
    #[inline(always)]
    fn pools(registry: &Registry) -> &TieredPool<Self> {
        &registry.offset_maps
    }
}

impl sealed::Routed for NameSet {
    #[inline(always)]
    fn pools(registry: &Registry) -> &TieredPool<Self> {
        &registry.name_sets
    }
}

/// Owner of the offset-map and name-set pools for all three tiers.
///
/// A registry is normally shared by every encoder in a process (see
/// [`global`](crate::global)), but it can also be created per server or per
/// test so that pool state stays isolated.
///
/// # Contract
///
/// - Anything acquired is empty.
/// - Each acquired container must be released at most once, with the tier it
///   was acquired for. [`Pooled`] guards do this on drop.
/// - A container that is never released is simply freed; it costs an
///   allocation on a later acquire, nothing more.
///
/// # Example
///
/// ```rust
/// use rrpool::{RecordCounts, Registry, Tier};
///
/// let registry = Registry::new();
/// let counts = RecordCounts::new(1, 4, 0, 1);
///
/// let tier = Tier::of(&counts);
/// let mut map = registry.acquire_offset_map(tier);
/// map.insert("example.org.".to_string(), 12);
/// registry.release_offset_map(tier, map);
///
/// assert!(registry.acquire_offset_map(tier).is_empty());
/// ```
pub struct Registry {
    config: RegistryConfig,
    offset_maps: TieredPool<OffsetMap>,
    name_sets: TieredPool<NameSet>,
}

impl Registry {
    /// Creates a registry with default pool sizing. No pool is allocated
    /// until it is first used.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub(crate) fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            offset_maps: TieredPool::new(),
            name_sets: TieredPool::new(),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Takes an empty container of kind `C` sized for `tier`.
    #[inline]
    pub fn acquire<C: Route>(&self, tier: Tier) -> C {
        C::pools(self).get_or_init(tier, &self.config).get()
    }

    /// Clears `container` and returns it to the `tier` pool of its kind.
    #[inline]
    pub fn release<C: Route>(&self, tier: Tier, container: C) {
        C::pools(self).get_or_init(tier, &self.config).put(container)
    }

    /// Takes a container wrapped in a guard that releases it on drop.
    #[inline]
    pub fn pooled<C: Route>(&self, tier: Tier) -> Pooled<'_, C> {
        Pooled::new(self, tier, self.acquire(tier))
    }

    #[inline]
    pub fn acquire_offset_map(&self, tier: Tier) -> OffsetMap {
        self.acquire(tier)
    }

    #[inline]
    pub fn acquire_name_set(&self, tier: Tier) -> NameSet {
        self.acquire(tier)
    }

    #[inline]
    pub fn release_offset_map(&self, tier: Tier, map: OffsetMap) {
        self.release(tier, map)
    }

    #[inline]
    pub fn release_name_set(&self, tier: Tier, set: NameSet) {
        self.release(tier, set)
    }

    #[inline]
    pub fn pooled_offset_map(&self, tier: Tier) -> Pooled<'_, OffsetMap> {
        self.pooled(tier)
    }

    #[inline]
    pub fn pooled_name_set(&self, tier: Tier) -> Pooled<'_, NameSet> {
        self.pooled(tier)
    }

    /// Classifies `msg` and takes an offset map for packing it.
    #[inline]
    pub fn offset_map_for<M: Records + ?Sized>(&self, msg: &M) -> Pooled<'_, OffsetMap> {
        self.pooled(Tier::of(msg))
    }

    /// Classifies `msg` and takes a name set for measuring it.
    #[inline]
    pub fn name_set_for<M: Records + ?Sized>(&self, msg: &M) -> Pooled<'_, NameSet> {
        self.pooled(Tier::of(msg))
    }

    /// Counters for one pool. A pool that has never been used reports zeros
    /// and is not created by this call.
    pub fn stats(&self, kind: Kind, tier: Tier) -> PoolStats {
        let stats = match kind {
            Kind::OffsetMap => self.offset_maps.existing(tier).map(Pool::stats),
            Kind::NameSet => self.name_sets.existing(tier).map(Pool::stats),
        };
        stats.unwrap_or_default()
    }

    /// Whether the pool for `kind` and `tier` has been created yet.
    pub fn is_initialized(&self, kind: Kind, tier: Tier) -> bool {
        match kind {
            Kind::OffsetMap => self.offset_maps.existing(tier).is_some(),
            Kind::NameSet => self.name_sets.existing(tier).is_some(),
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("pools", &PoolsDebug(self))
            .finish()
    }
}

/// Created pools keyed by `(kind, tier)`.
struct PoolsDebug<'a>(&'a Registry);

impl fmt::Debug for PoolsDebug<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for tier in Tier::ALL {
            if let Some(pool) = self.0.offset_maps.existing(tier) {
                map.entry(&(Kind::OffsetMap, tier), pool);
            }
        }
        for tier in Tier::ALL {
            if let Some(pool) = self.0.name_sets.existing(tier) {
                map.entry(&(Kind::NameSet, tier), pool);
            }
        }
        map.finish()
    }
}

/// RAII guard around an acquired container.
///
/// Derefs to the container and releases it to the pool it came from when
/// dropped, including on early return and unwinding.
pub struct Pooled<'a, C: Route> {
    registry: &'a Registry,
    tier: Tier,
    container: ManuallyDrop<C>,
}

impl<'a, C: Route> Pooled<'a, C> {
    fn new(registry: &'a Registry, tier: Tier, container: C) -> Self {
        Self {
            registry,
            tier,
            container: ManuallyDrop::new(container),
        }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Detaches the container from the pool. It will not be released.
    pub fn into_inner(self) -> C {
        let mut this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so the container is taken once.
        unsafe { ManuallyDrop::take(&mut this.container) }
    }
}

impl<C: Route> Deref for Pooled<'_, C> {
    type Target = C;

    #[inline]
    fn deref(&self) -> &C {
        &self.container
    }
}

impl<C: Route> DerefMut for Pooled<'_, C> {
    #[inline]
    fn deref_mut(&mut self) -> &mut C {
        &mut self.container
    }
}

impl<C: Route> Drop for Pooled<'_, C> {
    fn drop(&mut self) {
        // SAFETY: drop runs at most once and nothing touches the container after.
        let container = unsafe { ManuallyDrop::take(&mut self.container) };
        self.registry.release(self.tier, container);
    }
}

impl<C: Route + fmt::Debug> fmt::Debug for Pooled<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pooled")
            .field("tier", &self.tier)
            .field("container", &*self.container)
            .finish()
    }
}
