use super::Command;
use crate::comment::{Comment, CommentId};
use crate::EntityCache;

#[derive(Debug, Clone, PartialEq)]
pub enum CommentCommand {
    Upsert(Vec<Comment>),
    Remove(CommentId),
    Clear,
    BeginEdit(CommentId),
    EndEdit,
}

impl Command for CommentCommand {
    fn execute(&self, cache: &mut EntityCache) {
        match self {
            Self::Upsert(comments) => cache.upsert_comments(comments.clone()),
            Self::Remove(id) => {
                cache.remove_comment(id);
            }
            Self::Clear => cache.clear_comments(),
            Self::BeginEdit(id) => {
                if !cache.begin_comment_edit(id) {
                    tracing::debug!("Comment {} is not cached, edit ignored", id);
                }
            }
            Self::EndEdit => cache.end_comment_edit(),
        }
    }

    fn description(&self) -> String {
        match self {
            Self::Upsert(comments) => format!("Upsert {} comment(s)", comments.len()),
            Self::Remove(id) => format!("Remove comment {}", id),
            Self::Clear => "Clear comments".to_string(),
            Self::BeginEdit(id) => format!("Edit comment {}", id),
            Self::EndEdit => "Stop editing comment".to_string(),
        }
    }
}
