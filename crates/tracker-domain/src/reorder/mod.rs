//! Drag-and-drop reordering.
//!
//! The engine never writes to the cache on its own. Hovering produces a
//! [`DragPreview`] overlay; dropping produces a [`ReorderPlan`] that the
//! caller applies optimistically and persists step by step.

use serde::{Deserialize, Serialize};

use crate::commands::{reduce, IssueCommand};
use crate::issue::{Issue, IssueId, SprintId, StatusId};
use crate::partition::PartitionKey;
use crate::scope::ScopeKey;
use crate::EntityCache;

pub mod engine;
pub mod gesture;

pub use engine::{plan_backlog_edge, plan_move};
pub use gesture::{DragSession, DropTarget, GestureEffect, GestureEvent, GestureState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BacklogEdge {
    Top,
    Bottom,
}

impl BacklogEdge {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

/// One entry of the ordinal update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdinalPatch {
    pub id: IssueId,
    pub ordinal: i32,
    pub status: StatusId,
}

/// A remote call needed to persist a plan, in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PersistStep {
    #[serde(rename_all = "camelCase")]
    MoveToSprint {
        issue_id: IssueId,
        sprint_id: SprintId,
        from_sprint_id: Option<SprintId>,
        status: StatusId,
    },
    #[serde(rename_all = "camelCase")]
    SendToBacklog {
        issue_id: IssueId,
        from_sprint_id: Option<SprintId>,
        edge: BacklogEdge,
    },
    #[serde(rename_all = "camelCase")]
    UpdateOrdinals {
        sprint_id: Option<SprintId>,
        patches: Vec<OrdinalPatch>,
    },
}

/// Result of a drop or a top/bottom-of-backlog request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderPlan {
    pub issue_id: IssueId,
    /// Issues with their new placement, for the optimistic cache write.
    pub updated: Vec<Issue>,
    pub patches: Vec<OrdinalPatch>,
    pub steps: Vec<PersistStep>,
    /// Scopes to refetch once the steps have been persisted.
    pub invalidated: Vec<ScopeKey>,
}

impl ReorderPlan {
    pub fn noop(issue_id: impl Into<IssueId>) -> Self {
        Self {
            issue_id: issue_id.into(),
            ..Default::default()
        }
    }

    pub fn is_noop(&self) -> bool {
        self.steps.is_empty()
    }

    /// Write the new placements into the cache. Never adds issues.
    pub fn apply_to(&self, cache: &mut EntityCache) {
        if !self.updated.is_empty() {
            reduce(cache, IssueCommand::ReplaceExisting(self.updated.clone()));
        }
    }
}

/// Hover overlay: the order of one partition while an issue is dragged over it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragPreview {
    pub issue_id: IssueId,
    pub partition: PartitionKey,
    /// Member ids in preview order, dragged issue included.
    pub order: Vec<IssueId>,
}

impl DragPreview {
    /// Members of `key` as they should render under this preview.
    pub fn arrange<'a>(&self, issues: &'a [Issue], key: &PartitionKey) -> Vec<&'a Issue> {
        if *key == self.partition {
            self.order
                .iter()
                .filter_map(|id| issues.iter().find(|issue| issue.id == *id))
                .collect()
        } else {
            crate::partition::sorted_members(issues, key)
                .into_iter()
                .filter(|issue| issue.id != self.issue_id)
                .collect()
        }
    }
}
