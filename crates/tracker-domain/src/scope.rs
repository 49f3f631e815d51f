//! Query scopes and their pagination metadata.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracker_core::{Pagination, TrackerError};

use crate::issue::{IssueId, SprintId};

/// Named query context. Each scope owns its own cursor and count.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ScopeKey {
    ProjectIssues,
    Backlog,
    Sprint(SprintId),
    IssueComments(IssueId),
}

impl ScopeKey {
    /// Scope holding the issues of a placement (`None` is the backlog).
    pub fn for_placement(sprint_id: Option<&SprintId>) -> Self {
        match sprint_id {
            Some(id) => Self::Sprint(id.clone()),
            None => Self::Backlog,
        }
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProjectIssues => write!(f, "all-issues-for-project"),
            Self::Backlog => write!(f, "backlog-for-project"),
            Self::Sprint(id) => write!(f, "issues-for-sprint:{}", id),
            Self::IssueComments(id) => write!(f, "comments-for-issue:{}", id),
        }
    }
}

impl FromStr for ScopeKey {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all-issues-for-project" => Ok(Self::ProjectIssues),
            "backlog-for-project" => Ok(Self::Backlog),
            _ => {
                if let Some(id) = s.strip_prefix("issues-for-sprint:") {
                    Ok(Self::Sprint(id.to_string()))
                } else if let Some(id) = s.strip_prefix("comments-for-issue:") {
                    Ok(Self::IssueComments(id.to_string()))
                } else {
                    Err(TrackerError::Serialization(format!("unknown scope key: {}", s)))
                }
            }
        }
    }
}

impl TryFrom<String> for ScopeKey {
    type Error = TrackerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ScopeKey> for String {
    fn from(key: ScopeKey) -> Self {
        key.to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScopeMetadata {
    #[serde(default)]
    pub pagination: Pagination,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub filters: Vec<serde_json::Value>,
}

impl ScopeMetadata {
    pub fn with_count(count: u64) -> Self {
        Self {
            count,
            ..Default::default()
        }
    }
}
