use super::Command;
use crate::catalog::{IssueStatus, IssueTypeEntry, PriorityType};
use crate::EntityCache;

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogCommand {
    SetIssueStatuses(Vec<IssueStatus>),
    SetIssueTypes(Vec<IssueTypeEntry>),
    SetPriorityTypes(Vec<PriorityType>),
}

impl Command for CatalogCommand {
    fn execute(&self, cache: &mut EntityCache) {
        match self {
            Self::SetIssueStatuses(statuses) => cache.set_issue_statuses(statuses.clone()),
            Self::SetIssueTypes(types) => cache.set_issue_types(types.clone()),
            Self::SetPriorityTypes(priorities) => cache.set_priority_types(priorities.clone()),
        }
    }

    fn description(&self) -> String {
        match self {
            Self::SetIssueStatuses(s) => format!("Set {} issue statuses", s.len()),
            Self::SetIssueTypes(t) => format!("Set {} issue types", t.len()),
            Self::SetPriorityTypes(p) => format!("Set {} priority types", p.len()),
        }
    }
}
