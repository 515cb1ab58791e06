//! Post-filtering of deltas.
//!
//! Strips a set of elements from an already computed delta, e.g. changes the
//! caller originated itself, without contacting the producer again. Version
//! fields are left untouched and the input delta is never mutated.

use std::hash::Hash;

use crate::delta::UpdateDelta;
use crate::differentiator::Equivalence;

/// Removes suppressed elements from deltas under a given equivalence.
#[derive(Debug, Clone)]
pub struct DeltaFilter<T> {
    equivalence: Equivalence<T>,
}

impl<T> DeltaFilter<T>
where
    T: Clone + Eq + Hash,
{
    /// Create a filter using `equivalence` to match suppressed elements.
    pub fn new(equivalence: Equivalence<T>) -> Self {
        Self { equivalence }
    }

    /// Return a copy of `delta` without any element in `suppressed`.
    pub fn apply(&self, delta: &UpdateDelta<T>, suppressed: &[T]) -> UpdateDelta<T> {
        UpdateDelta {
            base_version: delta.base_version,
            result_version: delta.result_version,
            added: self.keep(&delta.added, suppressed),
            removed: self.keep(&delta.removed, suppressed),
        }
    }

    fn keep(&self, items: &[T], suppressed: &[T]) -> Vec<T> {
        self.equivalence
            .difference(items, suppressed)
            .into_iter()
            .cloned()
            .collect()
    }
}

/// Return a copy of `delta` without any element equal to one in `suppressed`.
pub fn suppress<T>(delta: &UpdateDelta<T>, suppressed: &[T]) -> UpdateDelta<T>
where
    T: Clone + Eq + Hash,
{
    DeltaFilter::new(Equivalence::Natural).apply(delta, suppressed)
}
