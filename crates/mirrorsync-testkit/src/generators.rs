//! Proptest generators for property-based testing.

use std::time::Duration;

use proptest::prelude::*;

use mirrorsync_core::{Changes, UpdateDelta, VersionId, NO_VERSION};
use mirrorsync_history::{BaselineMode, EvictionMode, RetentionPolicy};

use crate::fixtures::KeyedItem;

/// Generate any VersionId, sentinel included.
pub fn version_id() -> impl Strategy<Value = VersionId> {
    any::<i32>().prop_map(VersionId)
}

/// Generate a VersionId a minter could hand out.
pub fn minted_version() -> impl Strategy<Value = VersionId> {
    any::<i32>()
        .prop_filter("sentinel is never minted", |raw| *raw != NO_VERSION.raw())
        .prop_map(VersionId)
}

/// Generate a duplicate-free collection of small integers.
pub fn collection(max_len: usize) -> impl Strategy<Value = Vec<u32>> {
    prop::collection::hash_set(0u32..64, 0..=max_len).prop_map(|set| set.into_iter().collect())
}

/// Generate the successive states of a collection.
pub fn collection_sequence(max_steps: usize, max_len: usize) -> impl Strategy<Value = Vec<Vec<u32>>> {
    prop::collection::vec(collection(max_len), 1..=max_steps)
}

/// Generate a collection of keyed items, one revision per id.
pub fn keyed_collection(max_len: usize) -> impl Strategy<Value = Vec<KeyedItem>> {
    prop::collection::btree_map(0u32..32, 0u32..4, 0..=max_len).prop_map(|map| {
        map.into_iter()
            .map(|(id, revision)| KeyedItem::new(id, revision))
            .collect()
    })
}

/// Generate an EvictionMode.
pub fn eviction_mode() -> impl Strategy<Value = EvictionMode> {
    prop_oneof![Just(EvictionMode::Eldest), Just(EvictionMode::Exhaustive)]
}

/// Generate a BaselineMode.
pub fn baseline_mode() -> impl Strategy<Value = BaselineMode> {
    prop_oneof![Just(BaselineMode::Take), Just(BaselineMode::Keep)]
}

/// Generate a retention policy with small bounds; zero disables a bound.
pub fn retention_policy() -> impl Strategy<Value = RetentionPolicy> {
    (0u64..=600_000, 0usize..8, eviction_mode(), baseline_mode()).prop_map(
        |(age_ms, versions, eviction, baseline)| {
            RetentionPolicy::unbounded()
                .with_max_age(Duration::from_millis(age_ms))
                .with_max_versions(versions)
                .with_eviction(eviction)
                .with_baseline(baseline)
        },
    )
}

/// Generate a structurally valid delta: incremental or rebase.
pub fn update_delta() -> impl Strategy<Value = UpdateDelta<u32>> {
    prop_oneof![
        (minted_version(), collection(16))
            .prop_map(|(version, full)| UpdateDelta::rebase(version, full)),
        (minted_version(), minted_version(), collection(16), collection(16)).prop_map(
            |(base, result, added, removed)| {
                UpdateDelta::incremental(base, result, Changes { added, removed })
            }
        ),
    ]
}
