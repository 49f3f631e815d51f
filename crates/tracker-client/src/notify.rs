//! Error and advisory notices for the presentation layer.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

pub const QUERY_ERROR_MESSAGE: &str =
    "We're sorry, we couldn't find something you wanted. Please reload the page.";
pub const MUTATION_ERROR_MESSAGE: &str = "We're sorry, something went wrong. Please try again.";
pub const SAVE_ISSUE_ERROR_MESSAGE: &str =
    "We're sorry, we couldn't save your issue. Please try again.";
pub const UPDATE_ISSUE_ERROR_MESSAGE: &str =
    "We're sorry, we couldn't update your issue. Please try again.";
pub const MOVE_ISSUE_ERROR_MESSAGE: &str =
    "We're sorry, we couldn't move your issue. Please try again.";
pub const SAVE_COMMENT_ERROR_MESSAGE: &str =
    "We're sorry, we couldn't save your comment. Please try again.";
pub const UPDATE_COMMENT_ERROR_MESSAGE: &str =
    "We're sorry, we couldn't update your comment. Please try again.";
pub const DELETE_COMMENT_ERROR_MESSAGE: &str =
    "We're sorry, we couldn't delete your comment. Please try again.";
pub const PROJECT_CHANGED_MESSAGE: &str = "Another user has made changes to this project.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    QueryError,
    MutationError,
    Advisory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn query_error() -> Self {
        Self {
            kind: NoticeKind::QueryError,
            message: QUERY_ERROR_MESSAGE.to_string(),
        }
    }

    pub fn mutation_error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::MutationError,
            message: message.into(),
        }
    }

    pub fn advisory(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Advisory,
            message: message.into(),
        }
    }
}

/// Receives user-facing notices. No retry affordance is offered.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::QueryError | NoticeKind::MutationError => {
                tracing::warn!(kind = ?notice.kind, "{}", notice.message)
            }
            NoticeKind::Advisory => tracing::info!("{}", notice.message),
        }
    }
}

/// Keeps every notice in memory; the CLI reports them and tests inspect them.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock())
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        tracing::debug!(kind = ?notice.kind, "Recorded notice: {}", notice.message);
        self.notices.lock().push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier_collects_in_order() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Notice::query_error());
        notifier.notify(Notice::advisory(PROJECT_CHANGED_MESSAGE));

        let notices = notifier.take();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].message, QUERY_ERROR_MESSAGE);
        assert_eq!(notices[1].kind, NoticeKind::Advisory);
        assert!(notifier.notices().is_empty());
    }
}
