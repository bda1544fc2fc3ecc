//! The two kinds of scratch container handed out by the pools.

use std::collections::{HashMap, HashSet};
use std::fmt;

/// Name to offset map used while packing a message.
///
/// Each key is a name already written to the wire; the value is the offset
/// later occurrences point back to.
pub type OffsetMap = HashMap<String, u16>;

/// Set of names used while estimating the packed length of a message.
pub type NameSet = HashSet<String>;

/// Which kind of container a pool holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    OffsetMap,
    NameSet,
}

impl Kind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Kind::OffsetMap => "offset-map",
            Kind::NameSet => "name-set",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::OffsetMap {}
    impl Sealed for super::NameSet {}
}

/// A container that can be pooled.
///
/// Sealed: the registry only knows how to route [`OffsetMap`] and [`NameSet`].
pub trait Scratch: sealed::Sealed + Send + 'static {
    const KIND: Kind;

    fn with_capacity(capacity: usize) -> Self;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn capacity(&self) -> usize;

    fn clear(&mut self);

    fn shrink_to(&mut self, capacity: usize);
}

impl Scratch for OffsetMap {
    const KIND: Kind = Kind::OffsetMap;

    #[inline]
    fn with_capacity(capacity: usize) -> Self {
        HashMap::with_capacity(capacity)
    }

    #[inline]
    fn len(&self) -> usize {
        HashMap::len(self)
    }

    #[inline]
    fn capacity(&self) -> usize {
        HashMap::capacity(self)
    }

    #[inline]
    fn clear(&mut self) {
        HashMap::clear(self)
    }

    #[inline]
    fn shrink_to(&mut self, capacity: usize) {
        HashMap::shrink_to(self, capacity)
    }
}

impl Scratch for NameSet {
    const KIND: Kind = Kind::NameSet;

    #[inline]
    fn with_capacity(capacity: usize) -> Self {
        HashSet::with_capacity(capacity)
    }

    #[inline]
    fn len(&self) -> usize {
        HashSet::len(self)
    }

    #[inline]
    fn capacity(&self) -> usize {
        HashSet::capacity(self)
    }

    #[inline]
    fn clear(&mut self) {
        HashSet::clear(self)
    }

    #[inline]
    fn shrink_to(&mut self, capacity: usize) {
        HashSet::shrink_to(self, capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill<C: Scratch>(c: &mut C, insert: impl Fn(&mut C, String)) {
        for i in 0..100 {
            insert(c, format!("host{i}.example.org."));
        }
    }

    #[test]
    fn test_factory_builds_empty_presized() {
        let map = <OffsetMap as Scratch>::with_capacity(64);
        assert!(Scratch::is_empty(&map));
        assert!(Scratch::capacity(&map) >= 64);

        let set = <NameSet as Scratch>::with_capacity(64);
        assert!(Scratch::is_empty(&set));
        assert!(Scratch::capacity(&set) >= 64);
    }

    #[test]
    fn test_clear_and_shrink() {
        let mut map = <OffsetMap as Scratch>::with_capacity(8);
        fill(&mut map, |m, name| {
            m.insert(name, 12);
        });
        assert_eq!(Scratch::len(&map), 100);

        Scratch::clear(&mut map);
        assert!(Scratch::is_empty(&map));
        assert!(Scratch::capacity(&map) >= 100, "clear keeps the allocation");

        Scratch::shrink_to(&mut map, 16);
        assert!(Scratch::capacity(&map) < 100);

        let mut set = <NameSet as Scratch>::with_capacity(8);
        fill(&mut set, |s, name| {
            s.insert(name);
        });
        Scratch::clear(&mut set);
        assert!(Scratch::is_empty(&set));
    }

    #[test]
    fn test_kinds_differ() {
        assert_eq!(<OffsetMap as Scratch>::KIND, Kind::OffsetMap);
        assert_eq!(<NameSet as Scratch>::KIND, Kind::NameSet);
        assert_ne!(Kind::OffsetMap.as_str(), Kind::NameSet.as_str());
    }
}
