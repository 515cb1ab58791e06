//! Scenario vectors with known outcomes.
//!
//! Each vector drives a fresh producer through a scripted source, chaining
//! every request off the previous result, and records the deltas and the
//! history contents it must produce.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use mirrorsync_channel::{Producer, Result};
use mirrorsync_core::{suppress, UpdateDelta, VersionId, NO_VERSION};
use mirrorsync_history::{BaselineMode, RetentionPolicy};

use crate::fixtures::ScriptedSource;

/// A delta a scenario step must produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedDelta {
    pub base: i32,
    pub result: i32,
    pub added: Vec<u32>,
    pub removed: Vec<u32>,
}

impl ExpectedDelta {
    /// Check `delta` against this expectation.
    pub fn matches(&self, delta: &UpdateDelta<u32>) -> bool {
        delta.base_version == VersionId(self.base)
            && delta.result_version == VersionId(self.result)
            && delta.added == self.added
            && delta.removed == self.removed
    }
}

/// A chained producer scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioVector {
    /// Human-readable name for the vector.
    pub name: String,
    /// Count bound; zero disables it.
    pub max_versions: usize,
    pub baseline: BaselineMode,
    /// Source collection per request.
    pub steps: Vec<Vec<u32>>,
    /// Delta per request.
    pub expected: Vec<ExpectedDelta>,
    /// History after the last request, eldest first.
    pub retained: Vec<i32>,
}

impl ScenarioVector {
    /// The retention policy this vector runs under.
    pub fn retention(&self) -> RetentionPolicy {
        RetentionPolicy::unbounded()
            .with_max_versions(self.max_versions)
            .with_baseline(self.baseline)
    }
}

fn delta(base: i32, result: i32, added: &[u32], removed: &[u32]) -> ExpectedDelta {
    ExpectedDelta {
        base,
        result,
        added: added.to_vec(),
        removed: removed.to_vec(),
    }
}

fn growth_steps() -> Vec<Vec<u32>> {
    vec![vec![1, 2], vec![1, 2, 3], vec![2, 3], vec![2, 3, 4]]
}

fn growth_deltas() -> Vec<ExpectedDelta> {
    vec![
        delta(0, 1, &[1, 2], &[]),
        delta(1, 2, &[3], &[]),
        delta(2, 3, &[], &[1]),
        delta(3, 4, &[4], &[]),
    ]
}

/// Get all scenario vectors.
pub fn all_scenarios() -> Vec<ScenarioVector> {
    vec![
        ScenarioVector {
            name: "chained growth, two versions, baselines taken".into(),
            max_versions: 2,
            baseline: BaselineMode::Take,
            steps: growth_steps(),
            expected: growth_deltas(),
            retained: vec![4],
        },
        ScenarioVector {
            name: "chained growth, two versions, baselines kept".into(),
            max_versions: 2,
            baseline: BaselineMode::Keep,
            steps: growth_steps(),
            expected: growth_deltas(),
            retained: vec![3, 4],
        },
        ScenarioVector {
            name: "chained growth, one version, baselines kept".into(),
            max_versions: 1,
            baseline: BaselineMode::Keep,
            steps: growth_steps(),
            expected: growth_deltas(),
            retained: vec![4],
        },
        ScenarioVector {
            name: "unbounded history, baselines kept".into(),
            max_versions: 0,
            baseline: BaselineMode::Keep,
            steps: growth_steps(),
            expected: growth_deltas(),
            retained: vec![1, 2, 3, 4],
        },
        ScenarioVector {
            name: "empty collection round trip".into(),
            max_versions: 2,
            baseline: BaselineMode::Take,
            steps: vec![vec![], vec![5], vec![]],
            expected: vec![
                delta(0, 1, &[], &[]),
                delta(1, 2, &[5], &[]),
                delta(2, 3, &[], &[5]),
            ],
            retained: vec![3],
        },
    ]
}

/// Drive a fresh producer through `vector`.
///
/// Returns every delta produced and the history contents afterwards.
pub async fn replay(vector: &ScenarioVector) -> Result<(Vec<UpdateDelta<u32>>, Vec<VersionId>)> {
    let producer = Arc::new(Producer::new(
        ScriptedSource::ok(vector.steps.clone()),
        vector.retention(),
    ));

    let mut base = NO_VERSION;
    let mut deltas = Vec::with_capacity(vector.steps.len());
    for _ in &vector.steps {
        let delta = producer.request_update(base).await?;
        base = delta.result_version;
        deltas.push(delta);
    }
    Ok((deltas, producer.retained_versions()))
}

/// A suppression case for the delta filter.
#[derive(Debug, Clone)]
pub struct FilterVector {
    pub name: &'static str,
    pub added: Vec<char>,
    pub removed: Vec<char>,
    pub suppressed: Vec<char>,
    pub expected_added: Vec<char>,
    pub expected_removed: Vec<char>,
}

impl FilterVector {
    /// Apply the filter and compare.
    pub fn check(&self) -> bool {
        let input = UpdateDelta {
            base_version: VersionId(1),
            result_version: VersionId(2),
            added: self.added.clone(),
            removed: self.removed.clone(),
        };
        let filtered = suppress(&input, &self.suppressed);
        filtered.added == self.expected_added
            && filtered.removed == self.expected_removed
            && filtered.base_version == input.base_version
            && filtered.result_version == input.result_version
    }
}

/// Get all filter vectors.
pub fn filter_vectors() -> Vec<FilterVector> {
    vec![
        FilterVector {
            name: "suppress from both sides",
            added: vec!['a', 'b', 'c'],
            removed: vec!['x', 'y'],
            suppressed: vec!['b', 'x'],
            expected_added: vec!['a', 'c'],
            expected_removed: vec!['y'],
        },
        FilterVector {
            name: "nothing suppressed",
            added: vec!['a'],
            removed: vec!['x'],
            suppressed: vec![],
            expected_added: vec!['a'],
            expected_removed: vec!['x'],
        },
        FilterVector {
            name: "everything suppressed",
            added: vec!['a', 'a'],
            removed: vec!['x'],
            suppressed: vec!['a', 'x'],
            expected_added: vec![],
            expected_removed: vec![],
        },
    ]
}
