//! Board projection: derived, never stored.
//!
//! Views borrow from the cache and are rebuilt on every render. A drag
//! preview can be laid over the cached order without touching the cache.

use serde::Serialize;

use crate::board::{BoardDefinition, BoardType};
use crate::issue::{Issue, SprintId, StatusId};
use crate::partition::{sorted_members, PartitionKey};
use crate::reorder::DragPreview;
use crate::scope::ScopeKey;
use crate::EntityCache;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "sprintId", rename_all = "camelCase")]
pub enum BoardScope {
    Backlog,
    Sprint(SprintId),
}

impl BoardScope {
    pub fn sprint_id(&self) -> Option<&SprintId> {
        match self {
            Self::Backlog => None,
            Self::Sprint(id) => Some(id),
        }
    }

    pub fn scope_key(&self) -> ScopeKey {
        ScopeKey::for_placement(self.sprint_id())
    }

    pub fn partition(&self, status: impl Into<StatusId>) -> PartitionKey {
        PartitionKey::new(status, self.sprint_id().cloned())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnView<'a> {
    pub name: &'a str,
    pub statuses: Vec<&'a str>,
    pub issues: Vec<&'a Issue>,
    /// Rendered height in cards. Never zero so empty columns stay drop targets.
    pub reserved_slots: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView<'a> {
    pub scope: BoardScope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    pub columns: Vec<ColumnView<'a>>,
    pub max_column_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count_text: Option<String>,
}

impl<'a> BoardView<'a> {
    pub fn issue_count(&self) -> usize {
        self.columns.iter().map(|c| c.issues.len()).sum()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnView<'a>> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Sort keys for the previewed partition: its members' current ordinals handed
/// out in preview order, so cards of the column's other statuses keep their place.
fn preview_ranks<'a>(issues: &'a [Issue], preview: &DragPreview) -> Vec<(i32, &'a Issue)> {
    let arranged = preview.arrange(issues, &preview.partition);
    let mut slots: Vec<i32> = arranged
        .iter()
        .filter(|issue| preview.partition.contains(issue))
        .map(|issue| issue.ordinal)
        .collect();
    slots.sort_unstable();
    // A card dragged in from another partition needs one more slot.
    while slots.len() < arranged.len() {
        let next = slots.last().map_or(0, |last| last + 1);
        slots.push(next);
    }
    slots.into_iter().zip(arranged).collect()
}

fn column_issues<'a>(
    issues: &'a [Issue],
    statuses: &[&'a str],
    scope: &BoardScope,
    preview: Option<&DragPreview>,
) -> Vec<&'a Issue> {
    let mut ranked: Vec<(i32, &Issue)> = Vec::new();
    for key in statuses.iter().map(|s| scope.partition(*s)) {
        match preview {
            Some(preview) if key == preview.partition => ranked.extend(preview_ranks(issues, preview)),
            Some(preview) => ranked.extend(
                preview
                    .arrange(issues, &key)
                    .into_iter()
                    .map(|issue| (issue.ordinal, issue)),
            ),
            None => ranked.extend(
                sorted_members(issues, &key)
                    .into_iter()
                    .map(|issue| (issue.ordinal, issue)),
            ),
        }
    }
    ranked.sort_by_key(|(ordinal, _)| *ordinal);
    ranked.into_iter().map(|(_, issue)| issue).collect()
}

/// Per-column sorted issues for one sprint or the backlog.
pub fn project_board<'a>(
    cache: &'a EntityCache,
    board: &'a BoardDefinition,
    scope: &BoardScope,
    preview: Option<&DragPreview>,
) -> BoardView<'a> {
    let issues = cache.issues();

    let grouped: Vec<(&'a str, Vec<&'a str>, Vec<&'a Issue>)> = board
        .columns
        .iter()
        .map(|column| {
            let statuses: Vec<&str> = column.issue_statuses.iter().map(String::as_str).collect();
            let issues = column_issues(issues, &statuses, scope, preview);
            (column.name.as_str(), statuses, issues)
        })
        .collect();

    let max_column_size = grouped.iter().map(|(_, _, issues)| issues.len()).max().unwrap_or(0);
    let reserved_slots = max_column_size.max(1);

    let columns: Vec<ColumnView<'a>> = grouped
        .into_iter()
        .map(|(name, statuses, issues)| ColumnView {
            name,
            statuses,
            issues,
            reserved_slots,
        })
        .collect();

    let name = match scope {
        BoardScope::Backlog => Some(board.name.as_str()),
        BoardScope::Sprint(id) => board
            .sprints
            .iter()
            .find(|sprint| sprint.id == *id)
            .map(|sprint| sprint.name.as_str()),
    };

    let total = columns.iter().map(|c| c.issues.len()).sum::<usize>();

    BoardView {
        scope: scope.clone(),
        name,
        columns,
        max_column_size,
        count_text: issues_count_text(total as u64),
    }
}

/// One view per swimlane: every sprint on a scrum board, the backlog on a kanban board.
pub fn project_swimlanes<'a>(
    cache: &'a EntityCache,
    board: &'a BoardDefinition,
    preview: Option<&DragPreview>,
) -> Vec<BoardView<'a>> {
    match board.board_type {
        BoardType::Kanban => vec![project_board(cache, board, &BoardScope::Backlog, preview)],
        BoardType::Scrum => board
            .sprints
            .iter()
            .map(|sprint| project_board(cache, board, &BoardScope::Sprint(sprint.id.clone()), preview))
            .collect(),
    }
}

pub fn backlog_issues(cache: &EntityCache) -> Vec<&Issue> {
    let mut issues: Vec<&Issue> = cache.issues().iter().filter(|i| i.is_backlog()).collect();
    issues.sort_by_key(|issue| issue.ordinal);
    issues
}

pub fn sprint_issues<'a>(cache: &'a EntityCache, sprint_id: &str) -> Vec<&'a Issue> {
    let mut issues: Vec<&Issue> = cache
        .issues()
        .iter()
        .filter(|i| i.belongs_to_sprint(sprint_id))
        .collect();
    issues.sort_by_key(|issue| issue.ordinal);
    issues
}

/// "1 issue", "N issues", or nothing for zero.
pub fn issues_count_text(count: u64) -> Option<String> {
    match count {
        0 => None,
        1 => Some("1 issue".to_string()),
        n => Some(format!("{} issues", n)),
    }
}
