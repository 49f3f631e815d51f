use super::Command;
use crate::scope::{ScopeKey, ScopeMetadata};
use crate::EntityCache;

#[derive(Debug, Clone, PartialEq)]
pub enum ScopeCommand {
    Set(ScopeKey, ScopeMetadata),
    /// Reset to first page with zero count.
    Clear(ScopeKey),
    Remove(ScopeKey),
    RemoveAllSprints,
    RemoveAll,
}

impl Command for ScopeCommand {
    fn execute(&self, cache: &mut EntityCache) {
        match self {
            Self::Set(key, metadata) => cache.set_scope_metadata(key.clone(), metadata.clone()),
            Self::Clear(key) => cache.clear_scope_metadata(key.clone()),
            Self::Remove(key) => {
                cache.remove_scope_metadata(key);
            }
            Self::RemoveAllSprints => {
                let sprint_keys: Vec<ScopeKey> = cache
                    .scopes()
                    .map(|(key, _)| key)
                    .filter(|key| matches!(key, ScopeKey::Sprint(_)))
                    .cloned()
                    .collect();
                for key in sprint_keys {
                    cache.remove_scope_metadata(&key);
                }
            }
            Self::RemoveAll => cache.clear_all_scope_metadata(),
        }
    }

    fn description(&self) -> String {
        match self {
            Self::Set(key, metadata) => format!("Set {} metadata (count {})", key, metadata.count),
            Self::Clear(key) => format!("Clear {} metadata", key),
            Self::Remove(key) => format!("Remove {} metadata", key),
            Self::RemoveAllSprints => "Remove all sprint metadata".to_string(),
            Self::RemoveAll => "Remove all scope metadata".to_string(),
        }
    }
}
