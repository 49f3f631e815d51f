//! In-memory entity cache.
//!
//! Holds every issue and comment the UI can see, plus pagination metadata for
//! each query scope. All operations are infallible data transforms; the
//! remote API is always authoritative, so incoming records replace cached
//! ones wholesale instead of being merged field by field.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracker_core::Pagination;

use crate::catalog::{Catalogs, IssueStatus, IssueTypeEntry, PriorityType};
use crate::comment::{Comment, CommentId};
use crate::issue::Issue;
use crate::scope::{ScopeKey, ScopeMetadata};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityCache {
    #[serde(default)]
    issues: Vec<Issue>,
    #[serde(default)]
    scopes: BTreeMap<ScopeKey, ScopeMetadata>,
    #[serde(default)]
    comments: Vec<Comment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    editing_comment: Option<CommentId>,
    #[serde(default)]
    catalogs: Catalogs,
}

impl EntityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_issues(issues: Vec<Issue>) -> Self {
        let mut cache = Self::new();
        cache.upsert_many(issues);
        cache
    }

    // ------------------------------------------------------------------
    // Issues
    // ------------------------------------------------------------------

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn issue(&self, id: &str) -> Option<&Issue> {
        self.issues.iter().find(|issue| issue.id == id)
    }

    /// Replace known issues in place and append unknown ones in arrival order.
    pub fn upsert_many(&mut self, incoming: Vec<Issue>) {
        let mut positions: HashMap<String, usize> = self
            .issues
            .iter()
            .enumerate()
            .map(|(i, issue)| (issue.id.clone(), i))
            .collect();

        for issue in incoming {
            match positions.get(&issue.id) {
                Some(&pos) => self.issues[pos] = issue,
                None => {
                    positions.insert(issue.id.clone(), self.issues.len());
                    self.issues.push(issue);
                }
            }
        }
    }

    pub fn upsert_one(&mut self, issue: Issue) {
        self.upsert_many(vec![issue]);
    }

    /// Replace only issues that are already cached. Unknown ids are dropped.
    pub fn replace_existing(&mut self, issues: Vec<Issue>) -> usize {
        let mut replaced = 0;
        for issue in issues {
            if let Some(slot) = self.issues.iter_mut().find(|i| i.id == issue.id) {
                *slot = issue;
                replaced += 1;
            }
        }
        replaced
    }

    pub fn remove_where<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&Issue) -> bool,
    {
        let before = self.issues.len();
        self.issues.retain(|issue| !predicate(issue));
        before - self.issues.len()
    }

    // ------------------------------------------------------------------
    // Scope metadata
    // ------------------------------------------------------------------

    pub fn scope_metadata(&self, key: &ScopeKey) -> Option<&ScopeMetadata> {
        self.scopes.get(key)
    }

    pub fn scopes(&self) -> impl Iterator<Item = (&ScopeKey, &ScopeMetadata)> {
        self.scopes.iter()
    }

    /// Pagination to use for the next fetch of `key`.
    pub fn pagination_for(&self, key: &ScopeKey, default_page_size: u32) -> Pagination {
        self.scopes
            .get(key)
            .map(|metadata| metadata.pagination.clone())
            .unwrap_or_else(|| Pagination::new(default_page_size))
    }

    pub fn set_scope_metadata(&mut self, key: ScopeKey, metadata: ScopeMetadata) {
        self.scopes.insert(key, metadata);
    }

    /// Reset a scope to its zero value: first page, no cursor, zero count.
    pub fn clear_scope_metadata(&mut self, key: ScopeKey) {
        self.scopes.insert(key, ScopeMetadata::default());
    }

    pub fn remove_scope_metadata(&mut self, key: &ScopeKey) -> bool {
        self.scopes.remove(key).is_some()
    }

    pub fn clear_all_scope_metadata(&mut self) {
        self.scopes.clear();
    }

    // ------------------------------------------------------------------
    // Comments
    // ------------------------------------------------------------------

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn comments_for<'a>(&'a self, issue_id: &'a str) -> impl Iterator<Item = &'a Comment> {
        self.comments.iter().filter(move |c| c.issue_id == issue_id)
    }

    pub fn upsert_comments(&mut self, incoming: Vec<Comment>) {
        for comment in incoming {
            match self.comments.iter_mut().find(|c| c.id == comment.id) {
                Some(slot) => *slot = comment,
                None => self.comments.push(comment),
            }
        }
    }

    pub fn remove_comment(&mut self, id: &str) -> bool {
        let before = self.comments.len();
        self.comments.retain(|c| c.id != id);
        if self.editing_comment.as_deref() == Some(id) {
            self.editing_comment = None;
        }
        before != self.comments.len()
    }

    pub fn clear_comments(&mut self) {
        self.comments.clear();
        self.editing_comment = None;
    }

    /// Put a comment into the edit state, replacing any other comment being
    /// edited. Returns false when the comment is not cached.
    pub fn begin_comment_edit(&mut self, id: &str) -> bool {
        if self.comments.iter().any(|c| c.id == id) {
            self.editing_comment = Some(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn end_comment_edit(&mut self) {
        self.editing_comment = None;
    }

    pub fn editing_comment(&self) -> Option<&Comment> {
        let id = self.editing_comment.as_deref()?;
        self.comments.iter().find(|c| c.id == id)
    }

    // ------------------------------------------------------------------
    // Catalogs
    // ------------------------------------------------------------------

    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    pub fn set_issue_statuses(&mut self, statuses: Vec<IssueStatus>) {
        self.catalogs.issue_statuses = statuses;
    }

    pub fn set_issue_types(&mut self, types: Vec<IssueTypeEntry>) {
        self.catalogs.issue_types = types;
    }

    pub fn set_priority_types(&mut self, priorities: Vec<PriorityType>) {
        self.catalogs.priority_types = priorities;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::UserSnapshot;

    fn issue(id: &str, summary: &str) -> Issue {
        Issue::new(id, "p1", summary, "TODO", 0)
    }

    fn ids(cache: &EntityCache) -> Vec<&str> {
        cache.issues().iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_upsert_keeps_position_and_appends() {
        let mut cache = EntityCache::with_issues(vec![issue("A", "a"), issue("B", "b")]);

        cache.upsert_many(vec![issue("B", "b prime"), issue("C", "c")]);

        assert_eq!(ids(&cache), vec!["A", "B", "C"]);
        assert_eq!(cache.issue("B").unwrap().summary, "b prime");
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let mut cache = EntityCache::with_issues(vec![issue("A", "a"), issue("B", "b")]);
        let batch = vec![issue("C", "c"), issue("A", "a2"), issue("D", "d")];

        cache.upsert_many(batch.clone());
        let once = cache.clone();
        cache.upsert_many(batch);

        assert_eq!(cache, once);
        assert_eq!(ids(&cache), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_upsert_replaces_wholesale() {
        let mut original = issue("A", "a");
        original.description = Some("details".to_string());
        let mut cache = EntityCache::with_issues(vec![original]);

        cache.upsert_one(issue("A", "a"));

        assert_eq!(cache.issue("A").unwrap().description, None);
    }

    #[test]
    fn test_duplicate_ids_in_batch_last_wins() {
        let mut cache = EntityCache::new();
        cache.upsert_many(vec![issue("A", "first"), issue("A", "second")]);
        assert_eq!(cache.issues().len(), 1);
        assert_eq!(cache.issue("A").unwrap().summary, "second");
    }

    #[test]
    fn test_replace_existing_ignores_unknown() {
        let mut cache = EntityCache::with_issues(vec![issue("A", "a")]);
        let replaced = cache.replace_existing(vec![issue("A", "a2"), issue("Z", "z")]);
        assert_eq!(replaced, 1);
        assert_eq!(ids(&cache), vec!["A"]);
    }

    #[test]
    fn test_remove_where() {
        let mut cache = EntityCache::with_issues(vec![
            issue("A", "a").in_sprint("s1"),
            issue("B", "b"),
            issue("C", "c").in_sprint("s2"),
        ]);
        let removed = cache.remove_where(|i| i.belongs_to_sprint("s1"));
        assert_eq!(removed, 1);
        assert_eq!(ids(&cache), vec!["B", "C"]);
    }

    #[test]
    fn test_scope_metadata_lifecycle() {
        let mut cache = EntityCache::new();
        let key = ScopeKey::Sprint("s1".to_string());
        assert_eq!(cache.pagination_for(&key, 50).page_size, 50);

        let mut metadata = ScopeMetadata::with_count(6);
        metadata.pagination.cursor = "next".to_string();
        cache.set_scope_metadata(key.clone(), metadata);
        assert_eq!(cache.scope_metadata(&key).unwrap().count, 6);
        assert_eq!(cache.pagination_for(&key, 50).cursor, "next");

        cache.clear_scope_metadata(key.clone());
        assert_eq!(cache.scope_metadata(&key), Some(&ScopeMetadata::default()));

        assert!(cache.remove_scope_metadata(&key));
        assert!(cache.scope_metadata(&key).is_none());
    }

    #[test]
    fn test_single_comment_edit_slot() {
        let mut cache = EntityCache::new();
        cache.upsert_comments(vec![
            Comment::new("c1", "i1", "one", UserSnapshot::default()),
            Comment::new("c2", "i1", "two", UserSnapshot::default()),
        ]);

        assert!(cache.begin_comment_edit("c1"));
        assert!(cache.begin_comment_edit("c2"));
        assert_eq!(cache.editing_comment().unwrap().id, "c2");
        assert!(!cache.begin_comment_edit("missing"));

        cache.remove_comment("c2");
        assert!(cache.editing_comment().is_none());
        assert_eq!(cache.comments_for("i1").count(), 1);
    }

    #[test]
    fn test_snapshot_serializes_scope_keys_as_strings() {
        let mut cache = EntityCache::with_issues(vec![issue("A", "a")]);
        cache.set_scope_metadata(ScopeKey::Backlog, ScopeMetadata::with_count(1));

        let json = serde_json::to_value(&cache).unwrap();
        assert_eq!(json["scopes"]["backlog-for-project"]["count"], 1);

        let restored: EntityCache = serde_json::from_value(json).unwrap();
        assert_eq!(restored, cache);
    }
}
