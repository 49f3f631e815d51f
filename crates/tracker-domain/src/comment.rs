use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::issue::{IssueId, UserId};

pub type CommentId = String;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserName {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// Author snapshot embedded in a comment at the time it was written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub id: UserId,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: UserName,
}

impl UserSnapshot {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name.first_name, self.name.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    /// Not part of the comment payload; filled in from the query scope.
    #[serde(default)]
    pub issue_id: IssueId,
    pub text: String,
    pub created_by: UserSnapshot,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(
        id: impl Into<CommentId>,
        issue_id: impl Into<IssueId>,
        text: impl Into<String>,
        created_by: UserSnapshot,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            issue_id: issue_id.into(),
            text: text.into(),
            created_by,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_without_issue_id() {
        let json = r#"{
            "id": "c1",
            "text": "Looks good",
            "createdBy": {"id": "u1", "email": "a@b.c", "name": {"firstName": "Ada", "lastName": "Byron"}},
            "createdAt": "2020-05-03T14:53:55.658Z",
            "updatedAt": "2020-05-03T14:53:55.658Z"
        }"#;
        let comment: Comment = serde_json::from_str(json).unwrap();
        assert!(comment.issue_id.is_empty());
        assert_eq!(comment.created_by.full_name(), "Ada Byron");
    }
}
