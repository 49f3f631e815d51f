pub mod board;
pub mod cache;
pub mod catalog;
pub mod commands;
pub mod comment;
pub mod issue;
pub mod partition;
pub mod projection;
pub mod reorder;
pub mod scope;

pub use board::{BoardColumn, BoardDefinition, BoardId, BoardType, SprintSummary};
pub use cache::EntityCache;
pub use catalog::{Catalogs, IssueStatus, IssueTypeEntry, PriorityType};
pub use commands::{
    reduce, reduce_all, CacheCommand, CatalogCommand, Command, CommentCommand, IssueCommand,
    IssueSelector, ScopeCommand,
};
pub use comment::{Comment, CommentId, UserName, UserSnapshot};
pub use issue::{Issue, IssueId, IssueType, NewIssue, PriorityId, ProjectId, SprintId, StatusId, UserId};
pub use partition::PartitionKey;
pub use projection::{
    backlog_issues, issues_count_text, project_board, project_swimlanes, sprint_issues,
    BoardScope, BoardView, ColumnView,
};
pub use reorder::{
    plan_backlog_edge, plan_move, BacklogEdge, DragPreview, DragSession, DropTarget,
    GestureEffect, GestureEvent, GestureState, OrdinalPatch, PersistStep, ReorderPlan,
};
pub use scope::{ScopeKey, ScopeMetadata};
