use serde::{Deserialize, Serialize};

use crate::issue::{PriorityId, StatusId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueStatus {
    pub id: StatusId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub ordinal: i32,
    #[serde(default)]
    pub default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueTypeEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityType {
    pub id: PriorityId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub default: bool,
}

/// Reference data fetched once per session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalogs {
    #[serde(default)]
    pub issue_statuses: Vec<IssueStatus>,
    #[serde(default)]
    pub issue_types: Vec<IssueTypeEntry>,
    #[serde(default)]
    pub priority_types: Vec<PriorityType>,
}

impl Catalogs {
    /// Statuses in their catalog order.
    pub fn sorted_statuses(&self) -> Vec<&IssueStatus> {
        let mut statuses: Vec<_> = self.issue_statuses.iter().collect();
        statuses.sort_by_key(|s| s.ordinal);
        statuses
    }

    pub fn status_name(&self, id: &str) -> Option<&str> {
        self.issue_statuses
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.name.as_str())
    }

    pub fn default_status(&self) -> Option<&IssueStatus> {
        self.issue_statuses.iter().find(|s| s.default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(id: &str, ordinal: i32, default: bool) -> IssueStatus {
        IssueStatus {
            id: id.to_string(),
            name: id.to_lowercase(),
            description: String::new(),
            category: String::new(),
            ordinal,
            default,
        }
    }

    #[test]
    fn test_sorted_statuses_and_lookup() {
        let catalogs = Catalogs {
            issue_statuses: vec![status("DONE", 2, false), status("BACKLOG", 0, true)],
            ..Default::default()
        };
        let ids: Vec<_> = catalogs.sorted_statuses().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["BACKLOG", "DONE"]);
        assert_eq!(catalogs.status_name("DONE"), Some("done"));
        assert_eq!(catalogs.default_status().map(|s| s.id.as_str()), Some("BACKLOG"));
    }
}
