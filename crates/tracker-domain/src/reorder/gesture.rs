//! Drag gesture state machine.
//!
//! `Idle -> Dragging -> (Dragging)* -> Dropped | Cancelled`. The machine is
//! fed discrete events and answers with the effect the caller should carry
//! out. It reads the cache but never mutates it.

use super::engine::{insert_at, plan_move};
use super::{DragPreview, ReorderPlan};
use crate::board::BoardDefinition;
use crate::issue::{Issue, IssueId};
use crate::partition::{sorted_ids, PartitionKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// Released somewhere that is not a column.
    Outside,
    /// Released over a partition; `index` falls back to the last hover position.
    Partition {
        key: PartitionKey,
        index: Option<usize>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureEvent {
    DragStart { issue_id: IssueId },
    HoverOver { partition: PartitionKey, index: usize },
    Drop(DropTarget),
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    pub issue_id: IssueId,
    pub origin: PartitionKey,
    pub origin_index: usize,
    /// Current hover preview.
    pub preview: DragPreview,
}

impl DragSession {
    fn hover_index(&self) -> Option<usize> {
        self.preview
            .order
            .iter()
            .position(|id| *id == self.issue_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging(DragSession),
    Dropped(ReorderPlan),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureEffect {
    None,
    /// Render with this overlay.
    Preview(DragPreview),
    /// Drop the overlay. The cache was never touched, so whatever it holds
    /// now, server updates received mid-drag included, is rendered again.
    Restore,
    /// Apply the plan optimistically and persist it.
    Commit(ReorderPlan),
}

impl GestureState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging(_))
    }

    pub fn preview(&self) -> Option<&DragPreview> {
        match self {
            Self::Dragging(session) => Some(&session.preview),
            _ => None,
        }
    }

    /// Advance the machine. Events that make no sense in the current state
    /// leave it unchanged.
    pub fn handle(
        self,
        event: GestureEvent,
        issues: &[Issue],
        board: &BoardDefinition,
    ) -> (GestureState, GestureEffect) {
        match (self, event) {
            (
                Self::Idle | Self::Dropped(_) | Self::Cancelled,
                GestureEvent::DragStart { issue_id },
            ) => start(issues, board, issue_id),

            (Self::Dragging(session), GestureEvent::HoverOver { partition, index }) => {
                hover(session, issues, board, partition, index)
            }

            (Self::Dragging(session), GestureEvent::Drop(target)) => drop_on(session, issues, board, target),

            (Self::Dragging(session), GestureEvent::Cancel) => {
                tracing::debug!("Drag of {} cancelled", session.issue_id);
                (Self::Cancelled, GestureEffect::Restore)
            }

            (state, event) => {
                tracing::debug!("Ignoring {:?} in state {}", event, state.name());
                (state, GestureEffect::None)
            }
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dragging(_) => "dragging",
            Self::Dropped(_) => "dropped",
            Self::Cancelled => "cancelled",
        }
    }
}

fn start(issues: &[Issue], board: &BoardDefinition, issue_id: IssueId) -> (GestureState, GestureEffect) {
    let Some(issue) = issues.iter().find(|issue| issue.id == issue_id) else {
        tracing::debug!("Cannot drag unknown issue {}", issue_id);
        return (GestureState::Idle, GestureEffect::None);
    };
    if !board.has_status(&issue.status) {
        tracing::debug!("Issue {} has no column on board {}", issue_id, board.id);
        return (GestureState::Idle, GestureEffect::None);
    }

    let origin = PartitionKey::of(issue);
    let order = sorted_ids(issues, &origin);
    let origin_index = order.iter().position(|id| *id == issue_id).unwrap_or(0);
    let preview = DragPreview {
        issue_id: issue_id.clone(),
        partition: origin.clone(),
        order,
    };

    let session = DragSession {
        issue_id,
        origin,
        origin_index,
        preview: preview.clone(),
    };
    (GestureState::Dragging(session), GestureEffect::Preview(preview))
}

fn hover(
    mut session: DragSession,
    issues: &[Issue],
    board: &BoardDefinition,
    partition: PartitionKey,
    index: usize,
) -> (GestureState, GestureEffect) {
    if !board.has_status(&partition.status) {
        return (GestureState::Dragging(session), GestureEffect::None);
    }

    let others: Vec<IssueId> = sorted_ids(issues, &partition)
        .into_iter()
        .filter(|id| *id != session.issue_id)
        .collect();
    let order = insert_at(others, &session.issue_id, Some(index));

    if partition == session.preview.partition && order == session.preview.order {
        return (GestureState::Dragging(session), GestureEffect::None);
    }

    session.preview = DragPreview {
        issue_id: session.issue_id.clone(),
        partition,
        order,
    };
    let effect = GestureEffect::Preview(session.preview.clone());
    (GestureState::Dragging(session), effect)
}

fn drop_on(
    session: DragSession,
    issues: &[Issue],
    board: &BoardDefinition,
    target: DropTarget,
) -> (GestureState, GestureEffect) {
    let (key, index) = match target {
        DropTarget::Partition { key, index } if board.has_status(&key.status) => (key, index),
        _ => {
            tracing::debug!("Issue {} released outside a column", session.issue_id);
            return (GestureState::Cancelled, GestureEffect::Restore);
        }
    };

    let index = index.or_else(|| {
        if key == session.preview.partition {
            session.hover_index()
        } else {
            None
        }
    });

    let plan = plan_move(issues, &session.issue_id, &key, index);
    if plan.is_noop() {
        return (GestureState::Dropped(plan), GestureEffect::None);
    }
    (GestureState::Dropped(plan.clone()), GestureEffect::Commit(plan))
}
