//! Producer configuration as it arrives from the embedding application.

use serde::{Deserialize, Serialize};

use mirrorsync_history::{BaselineMode, EvictionMode, RetentionPolicy};

use crate::error::{MirrorError, Result};

/// Retention settings in their raw, loadable form.
///
/// Non-positive bounds disable that bound. Missing fields take the
/// defaults: five minutes, 100 versions, soft eviction, baselines taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Oldest snapshot age to retain, in milliseconds.
    pub max_age_ms: i64,
    /// Most snapshots to retain.
    pub max_versions: i64,
    /// Evict until both bounds hold on every insert.
    pub strict_retention: bool,
    /// Leave a baseline in history after answering a request from it.
    pub keep_baselines: bool,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            max_age_ms: 5 * 60 * 1000,
            max_versions: 100,
            strict_retention: false,
            keep_baselines: false,
        }
    }
}

impl MirrorConfig {
    /// Parse from JSON and validate.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject combinations that cannot be honored.
    pub fn validate(&self) -> Result<()> {
        if self.strict_retention && self.max_age_ms <= 0 && self.max_versions <= 0 {
            return Err(MirrorError::Config(
                "strict retention needs max_age_ms or max_versions to be positive".into(),
            ));
        }
        Ok(())
    }

    /// The retention policy these settings describe.
    pub fn retention(&self) -> RetentionPolicy {
        let eviction = if self.strict_retention {
            EvictionMode::Exhaustive
        } else {
            EvictionMode::Eldest
        };
        let baseline = if self.keep_baselines {
            BaselineMode::Keep
        } else {
            BaselineMode::Take
        };
        RetentionPolicy::from_raw(self.max_age_ms, self.max_versions)
            .with_eviction(eviction)
            .with_baseline(baseline)
    }
}

impl From<MirrorConfig> for RetentionPolicy {
    fn from(config: MirrorConfig) -> Self {
        config.retention()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let retention = MirrorConfig::default().retention();
        assert_eq!(retention.max_age, Duration::from_secs(300));
        assert_eq!(retention.max_versions, 100);
        assert_eq!(retention.eviction, EvictionMode::Eldest);
        assert_eq!(retention.baseline, BaselineMode::Take);
    }

    #[test]
    fn test_from_json_partial() {
        let config = MirrorConfig::from_json(r#"{ "max_versions": 2 }"#).unwrap();
        assert_eq!(config.max_versions, 2);
        assert_eq!(config.max_age_ms, 300_000);
        assert!(!config.strict_retention);
    }

    #[test]
    fn test_non_positive_bounds_disable() {
        let config = MirrorConfig::from_json(r#"{ "max_age_ms": -1, "max_versions": 0 }"#).unwrap();
        let retention = config.retention();
        assert!(retention.max_age.is_zero());
        assert_eq!(retention.max_versions, 0);
    }

    #[test]
    fn test_strict_and_keep() {
        let config = MirrorConfig::from_json(
            r#"{ "max_versions": 3, "strict_retention": true, "keep_baselines": true }"#,
        )
        .unwrap();
        let retention: RetentionPolicy = config.into();
        assert_eq!(retention.eviction, EvictionMode::Exhaustive);
        assert_eq!(retention.baseline, BaselineMode::Keep);
    }

    #[test]
    fn test_strict_without_bounds_rejected() {
        let err = MirrorConfig::from_json(
            r#"{ "max_age_ms": 0, "max_versions": 0, "strict_retention": true }"#,
        )
        .unwrap_err();
        assert!(matches!(err, MirrorError::Config(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = MirrorConfig::from_json("{ max_versions: ").unwrap_err();
        assert!(matches!(err, MirrorError::Json(_)));
    }
}
