use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracker_core::{TrackerError, TrackerResult};

pub type IssueId = String;
pub type ProjectId = String;
pub type SprintId = String;
pub type StatusId = String;
pub type PriorityId = String;
pub type UserId = String;

/// Story point scale offered by the issue forms.
pub const ISSUE_POINTS: [u32; 8] = [0, 1, 2, 3, 5, 8, 13, 21];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueType {
    Bug,
    Epic,
    Story,
    Task,
    Subtask,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: IssueId,
    pub project_id: ProjectId,
    /// `None` means the issue lives in the backlog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprint_id: Option<SprintId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_ref: Option<String>,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: StatusId,
    pub priority: PriorityId,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub ordinal: i32,
    pub reporter_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub labels: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Issue {
    pub fn new(
        id: impl Into<IssueId>,
        project_id: impl Into<ProjectId>,
        summary: impl Into<String>,
        status: impl Into<StatusId>,
        ordinal: i32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            project_id: project_id.into(),
            sprint_id: None,
            project_ref: None,
            issue_type: IssueType::Task,
            summary: summary.into(),
            description: None,
            status: status.into(),
            priority: "MEDIUM".to_string(),
            points: 0,
            ordinal,
            reporter_id: String::new(),
            assignee_id: None,
            labels: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn in_sprint(mut self, sprint_id: impl Into<SprintId>) -> Self {
        self.sprint_id = Some(sprint_id.into());
        self
    }

    pub fn is_backlog(&self) -> bool {
        self.sprint_id.is_none()
    }

    pub fn belongs_to_sprint(&self, sprint_id: &str) -> bool {
        self.sprint_id.as_deref() == Some(sprint_id)
    }
}

/// Create-issue form payload. The server assigns id, ordinal and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIssue {
    pub project_id: ProjectId,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: StatusId,
    pub priority: PriorityId,
    #[serde(default)]
    pub points: u32,
    pub reporter_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub labels: BTreeSet<String>,
}

impl NewIssue {
    pub fn validate(&self) -> TrackerResult<()> {
        if self.project_id.trim().is_empty() {
            return Err(TrackerError::Validation("project is required".to_string()));
        }
        if self.summary.trim().is_empty() {
            return Err(TrackerError::Validation("summary is required".to_string()));
        }
        if self.reporter_id.trim().is_empty() {
            return Err(TrackerError::Validation("reporter is required".to_string()));
        }
        if !ISSUE_POINTS.contains(&self.points) {
            return Err(TrackerError::Validation(format!(
                "{} is not a valid point estimate",
                self.points
            )));
        }
        Ok(())
    }
}
