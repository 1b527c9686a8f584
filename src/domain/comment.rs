use crate::domain::id::CommentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authored note attached to a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub text: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Comment {
    /// Creates a new comment with a fresh ID
    pub fn new(text: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: CommentId::generate(),
            text: text.into(),
            author: author.into(),
            created_at: Some(Utc::now()),
        }
    }

    /// Replaces the text
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}
