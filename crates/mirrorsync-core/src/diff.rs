//! Set difference between two snapshots of a collection.
//!
//! Difference follows "remove all" semantics: an element of `left` is kept
//! iff no element of `right` is the same under the equivalence. Order and
//! duplicates of `left` are preserved. Multiplicity is not compared:
//! `[1, 1]` minus `[1]` is empty.
//!
//! Algorithm per policy:
//! - Natural equality: hash index of `right`, O(N + M).
//! - Differentiator with identity keys: bucket `right` by key, confirm
//!   candidates with `same`, O(N + M) expected.
//! - Differentiator without keys: pairwise, O(N * M).

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::differentiator::{Differentiator, Equivalence};

/// Added and removed elements between two collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Changes<T> {
    /// Elements of the new collection absent from the old one.
    pub added: Vec<T>,
    /// Elements of the old collection absent from the new one.
    pub removed: Vec<T>,
}

impl<T> Changes<T> {
    /// No changes.
    pub fn none() -> Self {
        Self {
            added: Vec::new(),
            removed: Vec::new(),
        }
    }

    /// Check if nothing was added or removed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

impl<T> Default for Changes<T> {
    fn default() -> Self {
        Self::none()
    }
}

/// Compute what changed from `old` to `new`.
///
/// `added` holds instances taken from `new`, `removed` holds instances taken
/// from `old`.
pub fn compute_changes<T>(old: &[T], new: &[T], equivalence: &Equivalence<T>) -> Changes<T>
where
    T: Clone + Eq + Hash,
{
    Changes {
        added: equivalence.difference(new, old).into_iter().cloned().collect(),
        removed: equivalence.difference(old, new).into_iter().cloned().collect(),
    }
}

/// Apply `changes` to `target`: drop every removed element, then append
/// every added one.
pub fn apply_changes<T>(target: &mut Vec<T>, changes: &Changes<T>, equivalence: &Equivalence<T>)
where
    T: Clone + Eq + Hash,
{
    if !changes.removed.is_empty() {
        let kept: Vec<T> = equivalence
            .difference(target, &changes.removed)
            .into_iter()
            .cloned()
            .collect();
        *target = kept;
    }
    target.extend(changes.added.iter().cloned());
}

impl<T: Eq + Hash> Equivalence<T> {
    /// Elements of `left` that have no counterpart in `right`.
    pub fn difference<'a>(&self, left: &'a [T], right: &[T]) -> Vec<&'a T> {
        if left.is_empty() {
            return Vec::new();
        }
        if right.is_empty() {
            return left.iter().collect();
        }

        match self {
            Equivalence::Natural => {
                let index: HashSet<&T> = right.iter().collect();
                left.iter().filter(|item| !index.contains(item)).collect()
            }
            Equivalence::Custom(d) => match keyed_index(d.as_ref(), right) {
                Some(index) => left
                    .iter()
                    .filter(|item| !contained_keyed(d.as_ref(), &index, item))
                    .collect(),
                None => left
                    .iter()
                    .filter(|item| !right.iter().any(|other| d.same(item, other)))
                    .collect(),
            },
        }
    }

    /// Whether `items` contains an element that is the same as `item`.
    pub fn contains(&self, items: &[T], item: &T) -> bool {
        items.iter().any(|other| self.same(item, other))
    }
}

/// Bucket `items` by identity key, or `None` if any element has no key.
fn keyed_index<'a, T>(
    differentiator: &dyn Differentiator<T>,
    items: &'a [T],
) -> Option<HashMap<u64, Vec<&'a T>>> {
    let mut index: HashMap<u64, Vec<&'a T>> = HashMap::with_capacity(items.len());
    for item in items {
        let key = differentiator.identity_hash(item)?;
        index.entry(key).or_default().push(item);
    }
    Some(index)
}

fn contained_keyed<T>(
    differentiator: &dyn Differentiator<T>,
    index: &HashMap<u64, Vec<&T>>,
    item: &T,
) -> bool {
    match differentiator.identity_hash(item) {
        Some(key) => index
            .get(&key)
            .is_some_and(|bucket| bucket.iter().any(|other| differentiator.same(item, other))),
        // Unkeyed element against a keyed index: scan every bucket.
        None => index
            .values()
            .flatten()
            .any(|other| differentiator.same(item, other)),
    }
}
