//! Project change notifications pushed by the server.
//!
//! Changes only raise an advisory; the cache is never updated from them.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracker_core::{TrackerError, TrackerResult};

use crate::notify::{Notice, Notifier, PROJECT_CHANGED_MESSAGE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    IssueAdded,
    IssueUpdated,
    IssueDeleted,
    ProjectUpdated,
    ProjectDeleted,
    ProjectBoardSprintAdded,
    ProjectBoardSprintUpdated,
    ProjectBoardSprintDeleted,
    #[serde(other)]
    Other,
}

impl ChangeType {
    /// Whether this change affects what the project board shows.
    pub fn is_project_change(&self) -> bool {
        !matches!(self, Self::Other)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectChange {
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    #[serde(default)]
    pub payload: ChangePayload,
}

impl ProjectChange {
    pub fn new(change_type: ChangeType, project_id: &str, user_id: &str) -> Self {
        Self {
            change_type,
            payload: ChangePayload {
                user_id: Some(user_id.to_string()),
                project_id: Some(project_id.to_string()),
                extra: Default::default(),
            },
        }
    }

    pub fn from_json(raw: &str) -> TrackerResult<Self> {
        serde_json::from_str(raw)
            .map_err(|e| TrackerError::Serialization(format!("Invalid change message: {}", e)))
    }
}

/// In-process fan-out of incoming change messages.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ProjectChange>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Returns the number of subscribers that received the change.
    pub fn publish(&self, change: ProjectChange) -> usize {
        self.sender.send(change).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProjectChange> {
        self.sender.subscribe()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(64)
    }
}

pub struct ChangeWatcher {
    active_project_id: String,
    user_id: Option<String>,
    notifier: Arc<dyn Notifier>,
}

impl ChangeWatcher {
    pub fn new(
        active_project_id: impl Into<String>,
        user_id: Option<String>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            active_project_id: active_project_id.into(),
            user_id,
            notifier,
        }
    }

    /// A change alerts only when it concerns the active project and was made
    /// by someone else.
    pub fn should_alert(&self, change: &ProjectChange) -> bool {
        if !change.change_type.is_project_change() {
            return false;
        }
        if change.payload.project_id.as_deref() != Some(self.active_project_id.as_str()) {
            return false;
        }
        match (&change.payload.user_id, &self.user_id) {
            (Some(author), Some(me)) => author != me,
            _ => true,
        }
    }

    pub fn handle(&self, change: &ProjectChange) -> bool {
        if !self.should_alert(change) {
            tracing::trace!(change_type = ?change.change_type, "Ignoring change");
            return false;
        }
        tracing::debug!(change_type = ?change.change_type, "Project changed remotely");
        self.notifier.notify(Notice::advisory(PROJECT_CHANGED_MESSAGE));
        true
    }

    /// Consume changes until the feed closes.
    pub async fn run(self, mut receiver: broadcast::Receiver<ProjectChange>) {
        loop {
            match receiver.recv().await {
                Ok(change) => {
                    self.handle(&change);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Change feed lagged, skipped {} messages", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::debug!("Change feed closed");
                    break;
                }
            }
        }
    }
}
