use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracker_domain::ScopeKey;

#[derive(Debug, Default, Clone, Copy)]
struct ScopeSequence {
    issued: u64,
    applied: u64,
}

/// Monotonic request numbers per scope.
///
/// A response may only be applied if no newer response for the same scope
/// has been applied already.
#[derive(Debug, Default, Clone)]
pub struct ScopeSequencer {
    scopes: Arc<Mutex<HashMap<ScopeKey, ScopeSequence>>>,
}

impl ScopeSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self, scope: &ScopeKey) -> u64 {
        let mut scopes = self.scopes.lock();
        let sequence = scopes.entry(scope.clone()).or_default();
        sequence.issued += 1;
        sequence.issued
    }

    /// Record `seq` as applied. Returns false if it is stale.
    pub fn try_apply(&self, scope: &ScopeKey, seq: u64) -> bool {
        let mut scopes = self.scopes.lock();
        let sequence = scopes.entry(scope.clone()).or_default();
        if seq <= sequence.applied {
            return false;
        }
        sequence.applied = seq;
        true
    }

    pub fn last_applied(&self, scope: &ScopeKey) -> u64 {
        self.scopes.lock().get(scope).map(|s| s.applied).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_older_response_after_newer_is_stale() {
        let sequencer = ScopeSequencer::new();
        let scope = ScopeKey::Sprint("s1".into());
        let a = sequencer.next(&scope);
        let b = sequencer.next(&scope);

        assert!(sequencer.try_apply(&scope, b));
        assert!(!sequencer.try_apply(&scope, a));
        assert_eq!(sequencer.last_applied(&scope), b);
    }

    #[test]
    fn test_in_order_responses_all_apply() {
        let sequencer = ScopeSequencer::new();
        let a = sequencer.next(&ScopeKey::Backlog);
        let b = sequencer.next(&ScopeKey::Backlog);
        assert!(sequencer.try_apply(&ScopeKey::Backlog, a));
        assert!(sequencer.try_apply(&ScopeKey::Backlog, b));
    }

    #[test]
    fn test_sequences_are_per_scope() {
        let sequencer = ScopeSequencer::new();
        let backlog = sequencer.next(&ScopeKey::Backlog);
        let sprint = sequencer.next(&ScopeKey::Sprint("s1".into()));
        assert_eq!(backlog, 1);
        assert_eq!(sprint, 1);
    }
}
