//! Tiered, lock-free scratch pools for DNS name compression.
//!
//! Packing a message with name compression needs a map from every name
//! already written to its offset, and computing the packed length up front
//! needs a set of names seen so far. Both are thrown away after one message,
//! so allocating them per message is pure overhead on a busy server. This
//! crate keeps them in pools, split by message size:
//!
//! ```text
//! [Encoder] ── record count ──► [Tier] ── acquire ──► [Pool<OffsetMap>] ──► map
//!     │                                                       ▲
//!     └──────────────────────── release (cleared) ────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust
//! use rrpool::{RecordCounts, Tier};
//!
//! let counts = RecordCounts::new(1, 12, 0, 1);
//! {
//!     let mut compression = rrpool::global().offset_map_for(&counts);
//!     compression.insert("example.org.".to_string(), 12);
//!     // ... pack the message ...
//! } // map is cleared and returned to the small pool here
//!
//! assert_eq!(Tier::of(&counts), Tier::Small);
//! ```

use std::sync::OnceLock;

mod config;
mod pool;
mod registry;
mod scratch;
mod tier;

pub use config::{ConfigError, RegistryBuilder, RegistryConfig, TierSettings};
pub use pool::PoolStats;
pub use registry::{Pooled, Registry, Route};
pub use scratch::{Kind, NameSet, OffsetMap, Scratch};
pub use tier::{MEDIUM_MAX_RECORDS, RecordCounts, Records, SMALL_MAX_RECORDS, Tier};

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Process-wide registry with default sizing, created on first use.
///
/// Servers that want isolated pools, or non-default sizing, should build their
/// own [`Registry`] and hand it to their encoders instead.
pub fn global() -> &'static Registry {
    GLOBAL.get_or_init(|| {
        log::debug!("initializing global compression pool registry");
        Registry::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_is_shared() {
        let a = global() as *const Registry;
        let b = global() as *const Registry;
        assert_eq!(a, b);
    }

    #[test]
    fn test_global_round_trip() {
        let mut map = global().acquire_offset_map(Tier::Large);
        assert!(map.is_empty());
        map.insert("big.example.".to_string(), 0x0c);
        global().release_offset_map(Tier::Large, map);

        let map = global().acquire_offset_map(Tier::Large);
        assert!(map.is_empty());
        global().release_offset_map(Tier::Large, map);
    }
}
