//! AnalysisState - per-program-point abstract state

use super::lock_set::LockSet;

/// Locks held plus the effects of `defer`red lock/unlock calls that have
/// not run yet
///
/// Deferred effects are a commutative batch, not a LIFO replay: at the
/// run-deferred point all deferred acquisitions are added, then all deferred
/// releases removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisState {
    pub held: LockSet,
    pub deferred_acquire: LockSet,
    pub deferred_release: LockSet,
}

impl AnalysisState {
    /// Entry state of a function: `initial` held, nothing deferred
    pub fn new(initial: LockSet) -> Self {
        Self {
            held: initial,
            ..Self::default()
        }
    }

    /// Join operator: per-component intersection
    pub fn intersect(&self, other: &AnalysisState) -> AnalysisState {
        AnalysisState {
            held: self.held.intersect(&other.held),
            deferred_acquire: self.deferred_acquire.intersect(&other.deferred_acquire),
            deferred_release: self.deferred_release.intersect(&other.deferred_release),
        }
    }

    /// Run-deferred point: apply and clear the batched effects
    pub fn apply_deferred(&mut self) {
        self.held.union_with(&self.deferred_acquire);
        self.held.subtract(&self.deferred_release);
        self.deferred_acquire.clear();
        self.deferred_release.clear();
    }

    /// Nothing held, nothing pending
    pub fn is_empty(&self) -> bool {
        self.held.is_empty() && self.deferred_acquire.is_empty() && self.deferred_release.is_empty()
    }
}
