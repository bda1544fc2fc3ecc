//! Size tiers for compression scratch containers.
//!
//! The number of names a message will put through the compressor is not
//! known until it has been packed, so the record count is used as a proxy.
//! Messages are split into three tiers so that a recycled container is close
//! in capacity to what the next message needs.

use std::fmt;

/// Largest record count that still classifies as [`Tier::Small`].
pub const SMALL_MAX_RECORDS: usize = 50;

/// Largest record count that still classifies as [`Tier::Medium`].
pub const MEDIUM_MAX_RECORDS: usize = 250;

/// Size class of a message, derived from its total record count.
///
/// | Records   | Tier     |
/// |-----------|----------|
/// | 0..=50    | `Small`  |
/// | 51..=250  | `Medium` |
/// | 251..     | `Large`  |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    Small,
    Medium,
    Large,
}

impl Tier {
    /// All tiers, smallest first.
    pub const ALL: [Tier; 3] = [Tier::Small, Tier::Medium, Tier::Large];

    /// Maps a total record count to its tier.
    ///
    /// Total over all of `usize`; arbitrarily large counts are `Large`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rrpool::Tier;
    ///
    /// assert_eq!(Tier::classify(50), Tier::Small);
    /// assert_eq!(Tier::classify(51), Tier::Medium);
    /// assert_eq!(Tier::classify(251), Tier::Large);
    /// ```
    #[inline(always)]
    pub const fn classify(records: usize) -> Tier {
        if records <= SMALL_MAX_RECORDS {
            Tier::Small
        } else if records <= MEDIUM_MAX_RECORDS {
            Tier::Medium
        } else {
            Tier::Large
        }
    }

    /// Classifies a message by the sum of its four record sections.
    #[inline]
    pub fn of<M: Records + ?Sized>(msg: &M) -> Tier {
        Tier::classify(msg.record_counts().total())
    }

    /// Entry capacity a freshly built container of this tier starts with.
    pub const fn initial_capacity(self) -> usize {
        match self {
            Tier::Small => 64,
            Tier::Medium => 256,
            Tier::Large => 1024,
        }
    }

    /// Position of this tier in [`Tier::ALL`].
    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Tier::Small => "small",
            Tier::Medium => "medium",
            Tier::Large => "large",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sizes of the four record sections of a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordCounts {
    pub question: usize,
    pub answer: usize,
    pub authority: usize,
    pub additional: usize,
}

impl RecordCounts {
    pub const fn new(question: usize, answer: usize, authority: usize, additional: usize) -> Self {
        Self {
            question,
            answer,
            authority,
            additional,
        }
    }

    /// Total number of records across all sections.
    ///
    /// Saturates rather than wrapping, so a pathological count still lands in
    /// [`Tier::Large`].
    #[inline]
    pub const fn total(&self) -> usize {
        self.question
            .saturating_add(self.answer)
            .saturating_add(self.authority)
            .saturating_add(self.additional)
    }

    #[inline]
    pub const fn tier(&self) -> Tier {
        Tier::classify(self.total())
    }
}

/// A message handle that can report its section sizes.
///
/// Encoders implement this for their message type so the registry can pick a
/// tier without knowing anything else about the message.
pub trait Records {
    fn record_counts(&self) -> RecordCounts;
}

impl Records for RecordCounts {
    #[inline]
    fn record_counts(&self) -> RecordCounts {
        *self
    }
}

impl<T: Records + ?Sized> Records for &T {
    #[inline]
    fn record_counts(&self) -> RecordCounts {
        (**self).record_counts()
    }
}
