//! Per-scope loading flags.
//!
//! Each in-flight call holds a [`LoadingGuard`]; a scope is loading while
//! at least one guard for it is alive. Concurrent calls therefore never
//! clear each other's flag.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracker_domain::ScopeKey;

#[derive(Debug, Default, Clone)]
pub struct LoadingTracker {
    in_flight: Arc<Mutex<HashMap<ScopeKey, usize>>>,
}

impl LoadingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, scope: ScopeKey) -> LoadingGuard {
        *self.in_flight.lock().entry(scope.clone()).or_insert(0) += 1;
        LoadingGuard {
            tracker: self.clone(),
            scope: Some(scope),
        }
    }

    pub fn is_loading(&self, scope: &ScopeKey) -> bool {
        self.in_flight(scope) > 0
    }

    pub fn in_flight(&self, scope: &ScopeKey) -> usize {
        self.in_flight.lock().get(scope).copied().unwrap_or(0)
    }

    pub fn any_loading(&self) -> bool {
        !self.in_flight.lock().is_empty()
    }

    fn end(&self, scope: &ScopeKey) {
        let mut in_flight = self.in_flight.lock();
        if let Some(count) = in_flight.get_mut(scope) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                in_flight.remove(scope);
            }
        }
    }
}

/// Clears its share of the loading flag exactly once, on `finish` or drop.
#[derive(Debug)]
pub struct LoadingGuard {
    tracker: LoadingTracker,
    scope: Option<ScopeKey>,
}

impl LoadingGuard {
    pub fn finish(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(scope) = self.scope.take() {
            self.tracker.end(&scope);
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_calls_keep_flag_until_last_finishes() {
        let tracker = LoadingTracker::new();
        let first = tracker.begin(ScopeKey::Backlog);
        let second = tracker.begin(ScopeKey::Backlog);
        assert_eq!(tracker.in_flight(&ScopeKey::Backlog), 2);

        first.finish();
        assert!(tracker.is_loading(&ScopeKey::Backlog));

        drop(second);
        assert!(!tracker.is_loading(&ScopeKey::Backlog));
        assert!(!tracker.any_loading());
    }

    #[test]
    fn test_scopes_are_independent() {
        let tracker = LoadingTracker::new();
        let _sprint = tracker.begin(ScopeKey::Sprint("s1".into()));
        assert!(!tracker.is_loading(&ScopeKey::Backlog));
        assert!(tracker.any_loading());
    }
}
