use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracker_core::{TrackerError, TrackerResult};

use crate::issue::{SprintId, StatusId};

pub type BoardId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoardType {
    /// Shows backlog issues.
    Kanban,
    /// Shows issues that belong to a sprint.
    Scrum,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardColumn {
    pub name: String,
    pub issue_statuses: BTreeSet<StatusId>,
}

impl BoardColumn {
    pub fn new<I, S>(name: impl Into<String>, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<StatusId>,
    {
        Self {
            name: name.into(),
            issue_statuses: statuses.into_iter().map(Into::into).collect(),
        }
    }

    pub fn accepts(&self, status: &str) -> bool {
        self.issue_statuses.contains(status)
    }
}

/// A sprint shown as a swimlane on a scrum board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SprintSummary {
    pub id: SprintId,
    pub name: String,
}

/// Externally configured board layout: ordered columns, each owning a set of statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardDefinition {
    pub id: BoardId,
    pub name: String,
    #[serde(rename = "type")]
    pub board_type: BoardType,
    pub columns: Vec<BoardColumn>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sprints: Vec<SprintSummary>,
}

impl BoardDefinition {
    pub fn new(
        id: impl Into<BoardId>,
        name: impl Into<String>,
        board_type: BoardType,
        columns: Vec<BoardColumn>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            board_type,
            columns,
            sprints: Vec::new(),
        }
    }

    /// Every status must map to exactly one column.
    pub fn validate(&self) -> TrackerResult<()> {
        let mut owners: HashMap<&str, &str> = HashMap::new();
        for column in &self.columns {
            for status in &column.issue_statuses {
                if let Some(previous) = owners.insert(status.as_str(), column.name.as_str()) {
                    return Err(TrackerError::Validation(format!(
                        "status {} is mapped to both '{}' and '{}'",
                        status, previous, column.name
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn with_sprints(mut self, sprints: Vec<SprintSummary>) -> Self {
        self.sprints = sprints;
        self
    }

    pub fn column_index_for_status(&self, status: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.accepts(status))
    }

    pub fn has_status(&self, status: &str) -> bool {
        self.column_index_for_status(status).is_some()
    }
}
