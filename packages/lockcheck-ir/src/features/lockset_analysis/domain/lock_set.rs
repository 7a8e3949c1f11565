//! LockSet - the lattice element held at a program point
//!
//! Subsets of the (finite) identity universe ordered by inclusion.
//! `intersect` is the meet used at control-flow joins; ⊤ ("every lock") is
//! never materialized because unseen blocks simply have no state yet.

use rustc_hash::FxHashSet;

use super::lock_identity::LockIdentity;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockSet {
    locks: FxHashSet<LockIdentity>,
}

impl LockSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the lock was not already held
    pub fn insert(&mut self, lock: LockIdentity) -> bool {
        self.locks.insert(lock)
    }

    /// Returns `true` if the lock was held
    pub fn remove(&mut self, lock: &LockIdentity) -> bool {
        self.locks.remove(lock)
    }

    pub fn contains(&self, lock: &LockIdentity) -> bool {
        self.locks.contains(lock)
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    pub fn clear(&mut self) {
        self.locks.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &LockIdentity> {
        self.locks.iter()
    }

    /// Meet: locks present in both sets
    pub fn intersect(&self, other: &LockSet) -> LockSet {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small
            .locks
            .iter()
            .filter(|l| large.contains(l))
            .copied()
            .collect()
    }

    /// `self ∪= other`
    pub fn union_with(&mut self, other: &LockSet) {
        self.locks.extend(other.locks.iter().copied());
    }

    /// `self −= other`
    pub fn subtract(&mut self, other: &LockSet) {
        self.locks.retain(|l| !other.contains(l));
    }

    pub fn is_subset(&self, other: &LockSet) -> bool {
        self.locks.is_subset(&other.locks)
    }

    /// Deterministic order, for logs and reports
    pub fn sorted(&self) -> Vec<LockIdentity> {
        let mut locks: Vec<_> = self.locks.iter().copied().collect();
        locks.sort_unstable();
        locks
    }
}

impl FromIterator<LockIdentity> for LockSet {
    fn from_iter<I: IntoIterator<Item = LockIdentity>>(iter: I) -> Self {
        Self {
            locks: iter.into_iter().collect(),
        }
    }
}

impl Extend<LockIdentity> for LockSet {
    fn extend<I: IntoIterator<Item = LockIdentity>>(&mut self, iter: I) {
        self.locks.extend(iter);
    }
}

impl<'a> IntoIterator for &'a LockSet {
    type Item = &'a LockIdentity;
    type IntoIter = std::collections::hash_set::Iter<'a, LockIdentity>;

    fn into_iter(self) -> Self::IntoIter {
        self.locks.iter()
    }
}
