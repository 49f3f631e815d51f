//! Partitions: the set of issues sharing one `(status, sprint)` pair.
//!
//! Ordinals are only meaningful inside a partition. Members are ordered by
//! ordinal, with their position in the cache as the tie-break.

use serde::{Deserialize, Serialize};

use crate::issue::{Issue, IssueId, SprintId, StatusId};
use crate::scope::ScopeKey;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionKey {
    pub status: StatusId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprint_id: Option<SprintId>,
}

impl PartitionKey {
    pub fn new(status: impl Into<StatusId>, sprint_id: Option<SprintId>) -> Self {
        Self {
            status: status.into(),
            sprint_id,
        }
    }

    pub fn backlog(status: impl Into<StatusId>) -> Self {
        Self::new(status, None)
    }

    pub fn of(issue: &Issue) -> Self {
        Self::new(issue.status.clone(), issue.sprint_id.clone())
    }

    pub fn contains(&self, issue: &Issue) -> bool {
        issue.status == self.status && issue.sprint_id == self.sprint_id
    }

    pub fn scope(&self) -> ScopeKey {
        ScopeKey::for_placement(self.sprint_id.as_ref())
    }
}

/// Indices into `issues` of the partition members in visual order.
pub fn sorted_indices(issues: &[Issue], key: &PartitionKey) -> Vec<usize> {
    let mut indices: Vec<usize> = issues
        .iter()
        .enumerate()
        .filter(|(_, issue)| key.contains(issue))
        .map(|(i, _)| i)
        .collect();

    // Stable sort keeps cache order for equal ordinals
    indices.sort_by_key(|&i| issues[i].ordinal);
    indices
}

pub fn sorted_members<'a>(issues: &'a [Issue], key: &PartitionKey) -> Vec<&'a Issue> {
    sorted_indices(issues, key)
        .into_iter()
        .map(|i| &issues[i])
        .collect()
}

pub fn sorted_ids(issues: &[Issue], key: &PartitionKey) -> Vec<IssueId> {
    sorted_members(issues, key)
        .into_iter()
        .map(|issue| issue.id.clone())
        .collect()
}

/// Lowest and highest ordinal among the issues `include` accepts, ignoring `excluding`.
pub fn ordinal_bounds(
    issues: &[Issue],
    include: impl Fn(&Issue) -> bool,
    excluding: Option<&str>,
) -> Option<(i32, i32)> {
    issues
        .iter()
        .filter(|&issue| include(issue))
        .filter(|issue| Some(issue.id.as_str()) != excluding)
        .fold(None, |bounds, issue| match bounds {
            None => Some((issue.ordinal, issue.ordinal)),
            Some((min, max)) => Some((min.min(issue.ordinal), max.max(issue.ordinal))),
        })
}

/// True when the partition's ordinals are exactly `0..n` in visual order.
pub fn is_dense(issues: &[Issue], key: &PartitionKey) -> bool {
    sorted_members(issues, key)
        .iter()
        .enumerate()
        .all(|(i, issue)| issue.ordinal == i as i32)
}
