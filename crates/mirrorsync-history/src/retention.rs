//! Retention policy for the snapshot history.
//!
//! A snapshot is evictable once it is older than `max_age` or once the table
//! holds more than `max_versions` entries. A zero bound disables that check.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How many entries an insert may evict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionMode {
    /// Inspect only the single eldest entry per insert.
    ///
    /// O(1) per call. Bursts or a lowered bound leave the table over its
    /// nominal size until later inserts catch up.
    #[default]
    Eldest,
    /// Evict eldest entries until both bounds hold.
    Exhaustive,
}

/// What happens to a baseline snapshot once a delta has been computed from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineMode {
    /// Remove the baseline from the table when it is looked up.
    ///
    /// A second consumer presenting the same version gets a rebase.
    #[default]
    Take,
    /// Leave the baseline in place for other consumers at the same version.
    Keep,
}

/// Bounds on the snapshot history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionPolicy {
    /// Maximum snapshot age. `Duration::ZERO` means unbounded.
    pub max_age: Duration,
    /// Maximum number of snapshots. `0` means unbounded.
    pub max_versions: usize,
    /// How many entries one insert may evict.
    pub eviction: EvictionMode,
    /// Whether lookups consume their baseline.
    pub baseline: BaselineMode,
}

impl RetentionPolicy {
    /// Five minutes, one hundred versions.
    pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(5 * 60);
    pub const DEFAULT_MAX_VERSIONS: usize = 100;

    /// Both bounds disabled.
    pub const fn unbounded() -> Self {
        Self {
            max_age: Duration::ZERO,
            max_versions: 0,
            eviction: EvictionMode::Eldest,
            baseline: BaselineMode::Take,
        }
    }

    /// Build from raw integer settings where non-positive disables a bound.
    pub fn from_raw(max_age_ms: i64, max_versions: i64) -> Self {
        Self {
            max_age: u64::try_from(max_age_ms)
                .map(Duration::from_millis)
                .unwrap_or(Duration::ZERO),
            max_versions: usize::try_from(max_versions).unwrap_or(0),
            ..Self::default()
        }
    }

    /// Set the age bound.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Set the count bound.
    pub fn with_max_versions(mut self, max_versions: usize) -> Self {
        self.max_versions = max_versions;
        self
    }

    /// Set the eviction mode.
    pub fn with_eviction(mut self, eviction: EvictionMode) -> Self {
        self.eviction = eviction;
        self
    }

    /// Set the baseline mode.
    pub fn with_baseline(mut self, baseline: BaselineMode) -> Self {
        self.baseline = baseline;
        self
    }

    /// Whether the eldest entry must go, given the table size and its age.
    pub fn should_evict(&self, len: usize, eldest_age: Duration) -> bool {
        let over_count = self.max_versions > 0 && len > self.max_versions;
        let too_old = !self.max_age.is_zero() && eldest_age > self.max_age;
        over_count || too_old
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            max_age: Self::DEFAULT_MAX_AGE,
            max_versions: Self::DEFAULT_MAX_VERSIONS,
            eviction: EvictionMode::Eldest,
            baseline: BaselineMode::Take,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bounds() {
        let policy = RetentionPolicy::default();
        assert_eq!(policy.max_age, Duration::from_secs(300));
        assert_eq!(policy.max_versions, 100);
        assert_eq!(policy.eviction, EvictionMode::Eldest);
        assert_eq!(policy.baseline, BaselineMode::Take);
    }

    #[test]
    fn test_from_raw_non_positive_disables() {
        let policy = RetentionPolicy::from_raw(-1, 0);
        assert!(policy.max_age.is_zero());
        assert_eq!(policy.max_versions, 0);
        assert!(!policy.should_evict(10_000, Duration::from_secs(86_400)));

        let policy = RetentionPolicy::from_raw(1500, -3);
        assert_eq!(policy.max_age, Duration::from_millis(1500));
        assert_eq!(policy.max_versions, 0);
    }

    #[test]
    fn test_should_evict_by_count() {
        let policy = RetentionPolicy::unbounded().with_max_versions(2);
        assert!(!policy.should_evict(2, Duration::ZERO));
        assert!(policy.should_evict(3, Duration::ZERO));
    }

    #[test]
    fn test_should_evict_by_age() {
        let policy = RetentionPolicy::unbounded().with_max_age(Duration::from_secs(10));
        assert!(!policy.should_evict(1, Duration::from_secs(10)));
        assert!(policy.should_evict(1, Duration::from_secs(11)));
    }

    #[test]
    fn test_deserialize_partial_json() {
        let policy: RetentionPolicy =
            serde_json::from_str(r#"{"max_versions": 7, "eviction": "exhaustive"}"#).unwrap();
        assert_eq!(policy.max_versions, 7);
        assert_eq!(policy.eviction, EvictionMode::Exhaustive);
        assert_eq!(policy.max_age, RetentionPolicy::DEFAULT_MAX_AGE);
    }
}
