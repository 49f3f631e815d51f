use super::Command;
use crate::issue::{Issue, IssueId, SprintId};
use crate::EntityCache;

/// Which cached issues a removal applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueSelector {
    All,
    Backlog,
    Sprint(SprintId),
    Ids(Vec<IssueId>),
}

impl IssueSelector {
    pub fn matches(&self, issue: &Issue) -> bool {
        match self {
            Self::All => true,
            Self::Backlog => issue.is_backlog(),
            Self::Sprint(id) => issue.belongs_to_sprint(id),
            Self::Ids(ids) => ids.iter().any(|id| *id == issue.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IssueCommand {
    /// Replace known issues in place and append the rest.
    Upsert(Vec<Issue>),
    /// Replace known issues only.
    ReplaceExisting(Vec<Issue>),
    Remove(IssueSelector),
}

impl Command for IssueCommand {
    fn execute(&self, cache: &mut EntityCache) {
        match self {
            Self::Upsert(issues) => cache.upsert_many(issues.clone()),
            Self::ReplaceExisting(issues) => {
                cache.replace_existing(issues.clone());
            }
            Self::Remove(selector) => {
                cache.remove_where(|issue| selector.matches(issue));
            }
        }
    }

    fn description(&self) -> String {
        match self {
            Self::Upsert(issues) => format!("Upsert {} issue(s)", issues.len()),
            Self::ReplaceExisting(issues) => format!("Replace {} cached issue(s)", issues.len()),
            Self::Remove(IssueSelector::All) => "Clear issues".to_string(),
            Self::Remove(IssueSelector::Backlog) => "Clear backlog issues".to_string(),
            Self::Remove(IssueSelector::Sprint(id)) => format!("Clear issues of sprint {}", id),
            Self::Remove(IssueSelector::Ids(ids)) => format!("Remove issues {}", ids.join(", ")),
        }
    }
}
