use crate::registry::Registry;
use crate::tier::Tier;

/// Retained capacity is this many times the tier's initial capacity unless
/// configured otherwise.
const DEFAULT_RETAIN_FACTOR: usize = 4;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} pool must hold at least one container")]
    ZeroMaxPooled(Tier),
    #[error("{tier} retained capacity {retained} is below its initial capacity {initial}")]
    RetainedBelowInitial {
        tier: Tier,
        retained: usize,
        initial: usize,
    },
}

/// Sizing for the two pools (offset map and name set) of one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierSettings {
    /// Most containers a pool keeps; releases beyond this are dropped.
    pub max_pooled: usize,
    /// Released containers are shrunk to what a container built for this
    /// many entries holds. Hash tables round up to a power-of-two bucket
    /// count, so the effective cap can be larger than this value; it is never
    /// exceeded by a pooled container.
    pub retained_capacity: usize,
}

impl TierSettings {
    pub const fn default_for(tier: Tier) -> Self {
        let max_pooled = match tier {
            Tier::Small => 256,
            Tier::Medium => 64,
            Tier::Large => 16,
        };
        Self {
            max_pooled,
            retained_capacity: tier.initial_capacity() * DEFAULT_RETAIN_FACTOR,
        }
    }

    fn validate(&self, tier: Tier) -> Result<(), ConfigError> {
        if self.max_pooled == 0 {
            return Err(ConfigError::ZeroMaxPooled(tier));
        }
        if self.retained_capacity < tier.initial_capacity() {
            return Err(ConfigError::RetainedBelowInitial {
                tier,
                retained: self.retained_capacity,
                initial: tier.initial_capacity(),
            });
        }
        Ok(())
    }
}

/// Settings for every tier, indexed by [`Tier::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    tiers: [TierSettings; 3],
}

impl RegistryConfig {
    #[inline]
    pub fn tier(&self, tier: Tier) -> TierSettings {
        self.tiers[tier.index()]
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            tiers: Tier::ALL.map(TierSettings::default_for),
        }
    }
}

/// Builds a [`Registry`] with non-default pool sizing.
///
/// # Example
///
/// ```rust
/// use rrpool::{Registry, Tier};
///
/// let registry = Registry::builder()
///     .with_max_pooled(Tier::Large, 4)
///     .with_retained_capacity(Tier::Large, 2048)
///     .build()
///     .unwrap();
///
/// assert_eq!(registry.config().tier(Tier::Large).max_pooled, 4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    config: RegistryConfig,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_pooled(mut self, tier: Tier, max_pooled: usize) -> Self {
        self.config.tiers[tier.index()].max_pooled = max_pooled;
        self
    }

    /// Caps the slots a pooled container of `tier` keeps. The cap is rounded
    /// up the same way the container rounds its own allocation.
    pub fn with_retained_capacity(mut self, tier: Tier, capacity: usize) -> Self {
        self.config.tiers[tier.index()].retained_capacity = capacity;
        self
    }

    pub fn build(self) -> Result<Registry, ConfigError> {
        for tier in Tier::ALL {
            self.config.tier(tier).validate(tier)?;
        }
        log::debug!("building compression pool registry: {:?}", self.config);
        Ok(Registry::with_config(self.config))
    }
}
