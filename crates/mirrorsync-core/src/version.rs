//! Version identifiers and the atomic minter that issues them.
//!
//! Version ids are 32-bit signed integers. The counter wraps on overflow and
//! never hands out [`NO_VERSION`], which is reserved to mean "no baseline".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI32, Ordering};

/// A version identifier minted by a producer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(pub i32);

/// The reserved "no version" sentinel.
///
/// A consumer that has never synced uses it as its cursor, and a producer
/// places it in a delta's base field to signal a full rebase.
pub const NO_VERSION: VersionId = VersionId(0);

impl VersionId {
    /// Create from a raw integer.
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Get the raw integer.
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Check if this is the [`NO_VERSION`] sentinel.
    pub const fn is_sentinel(self) -> bool {
        self.0 == NO_VERSION.0
    }
}

impl Default for VersionId {
    fn default() -> Self {
        NO_VERSION
    }
}

impl fmt::Debug for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sentinel() {
            write!(f, "VersionId(NONE)")
        } else {
            write!(f, "VersionId({})", self.0)
        }
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for VersionId {
    fn from(raw: i32) -> Self {
        Self(raw)
    }
}

impl From<VersionId> for i32 {
    fn from(id: VersionId) -> Self {
        id.0
    }
}

/// Lock-free source of version ids.
///
/// Every call to [`mint`](Self::mint) returns a fresh id: the counter is
/// incremented atomically, wraps from `i32::MAX` to `i32::MIN`, and retries
/// whenever the increment lands on [`NO_VERSION`].
#[derive(Debug)]
pub struct VersionMinter {
    counter: AtomicI32,
}

impl VersionMinter {
    /// Create a minter whose first id is 1.
    pub const fn new() -> Self {
        Self::starting_after(NO_VERSION.0)
    }

    /// Create a minter whose first id is `last + 1` (wrapping).
    pub const fn starting_after(last: i32) -> Self {
        Self {
            counter: AtomicI32::new(last),
        }
    }

    /// Mint the next version id.
    pub fn mint(&self) -> VersionId {
        loop {
            // fetch_add wraps on overflow
            let next = self.counter.fetch_add(1, Ordering::SeqCst).wrapping_add(1);
            if next != NO_VERSION.0 {
                return VersionId(next);
            }
        }
    }

    /// The most recently minted id, or [`NO_VERSION`] if none yet.
    ///
    /// Only meaningful as an observation: a concurrent `mint` may already
    /// have moved past it.
    pub fn last(&self) -> VersionId {
        VersionId(self.counter.load(Ordering::SeqCst))
    }
}

impl Default for VersionMinter {
    fn default() -> Self {
        Self::new()
    }
}
