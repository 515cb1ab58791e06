//! Identity relations used when comparing elements across snapshots.
//!
//! By default two elements are "the same" when they are equal. A
//! [`Differentiator`] overrides that, e.g. to compare entity headers by id
//! while ignoring the rest of their fields.
//!
//! Both ends of a channel must use the same relation. A producer that diffs
//! by id and a consumer that removes by full equality will disagree about
//! which mirror entries a delta refers to.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

/// A pluggable identity relation over elements of type `T`.
///
/// Implementations must be an equivalence relation (reflexive, symmetric,
/// transitive). If [`identity_hash`](Self::identity_hash) returns keys, any
/// two elements for which `same` holds must produce the same key.
pub trait Differentiator<T>: Send + Sync {
    /// Whether `a` and `b` denote the same identity.
    fn same(&self, a: &T, b: &T) -> bool;

    /// Optional hashable key for the identity of `item`.
    ///
    /// Returning `Some` for every element lets set difference bucket by key
    /// instead of comparing pairwise.
    fn identity_hash(&self, _item: &T) -> Option<u64> {
        None
    }
}

/// Differentiator that compares elements by an extracted key.
pub struct KeyDifferentiator<T, K, F> {
    key: F,
    _marker: PhantomData<fn(&T) -> K>,
}

impl<T, K, F> KeyDifferentiator<T, K, F>
where
    K: Eq + Hash,
    F: Fn(&T) -> K + Send + Sync,
{
    /// Create a differentiator from a key extractor.
    pub fn new(key: F) -> Self {
        Self {
            key,
            _marker: PhantomData,
        }
    }
}

impl<T, K, F> Differentiator<T> for KeyDifferentiator<T, K, F>
where
    K: Eq + Hash,
    F: Fn(&T) -> K + Send + Sync,
{
    fn same(&self, a: &T, b: &T) -> bool {
        (self.key)(a) == (self.key)(b)
    }

    fn identity_hash(&self, item: &T) -> Option<u64> {
        let mut hasher = DefaultHasher::new();
        (self.key)(item).hash(&mut hasher);
        Some(hasher.finish())
    }
}

/// The equality policy a producer or consumer compares elements with.
pub enum Equivalence<T> {
    /// Natural value equality (`Eq` + `Hash`).
    Natural,
    /// A configured differentiator.
    Custom(Arc<dyn Differentiator<T>>),
}

impl<T> Equivalence<T> {
    /// Wrap a differentiator.
    pub fn custom<D>(differentiator: D) -> Self
    where
        D: Differentiator<T> + 'static,
    {
        Equivalence::Custom(Arc::new(differentiator))
    }

    /// Check if this is natural equality.
    pub fn is_natural(&self) -> bool {
        matches!(self, Equivalence::Natural)
    }
}

impl<T: Eq> Equivalence<T> {
    /// Whether `a` and `b` are the same under this policy.
    pub fn same(&self, a: &T, b: &T) -> bool {
        match self {
            Equivalence::Natural => a == b,
            Equivalence::Custom(d) => d.same(a, b),
        }
    }
}

impl<T> Clone for Equivalence<T> {
    fn clone(&self) -> Self {
        match self {
            Equivalence::Natural => Equivalence::Natural,
            Equivalence::Custom(d) => Equivalence::Custom(Arc::clone(d)),
        }
    }
}

impl<T> Default for Equivalence<T> {
    fn default() -> Self {
        Equivalence::Natural
    }
}

impl<T> fmt::Debug for Equivalence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Equivalence::Natural => write!(f, "Equivalence::Natural"),
            Equivalence::Custom(_) => write!(f, "Equivalence::Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct Header {
        id: u32,
        name: &'static str,
    }

    #[test]
    fn test_natural_equality() {
        let eq = Equivalence::<u32>::Natural;
        assert!(eq.is_natural());
        assert!(eq.same(&1, &1));
        assert!(!eq.same(&1, &2));
    }

    #[test]
    fn test_key_differentiator_ignores_other_fields() {
        let eq = Equivalence::custom(KeyDifferentiator::new(|h: &Header| h.id));
        let a = Header { id: 1, name: "a" };
        let renamed = Header { id: 1, name: "b" };
        let other = Header { id: 2, name: "a" };

        assert!(!eq.is_natural());
        assert!(eq.same(&a, &renamed));
        assert!(!eq.same(&a, &other));
    }

    #[test]
    fn test_key_differentiator_hash_matches_same() {
        let d = KeyDifferentiator::new(|h: &Header| h.id);
        let a = Header { id: 9, name: "x" };
        let b = Header { id: 9, name: "y" };
        assert_eq!(d.identity_hash(&a), d.identity_hash(&b));
    }

    #[test]
    fn test_equivalence_clone_shares_differentiator() {
        let eq = Equivalence::custom(KeyDifferentiator::new(|h: &Header| h.id));
        let cloned = eq.clone();
        match (&eq, &cloned) {
            (Equivalence::Custom(a), Equivalence::Custom(b)) => assert!(Arc::ptr_eq(a, b)),
            _ => panic!("expected custom equivalence"),
        }
    }
}
