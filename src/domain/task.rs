use crate::domain::{
    comment::Comment,
    id::{ColumnId, CommentId, TaskId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A unit of work inside a column
///
/// `column_id` is a back-reference only. The owning [`Column`](super::column::Column)
/// holds the task in its `tasks` sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub column_id: ColumnId,
    pub author: String,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new task in the given column, attributed to `author`
    pub fn new(name: impl Into<String>, column_id: ColumnId, author: impl Into<String>) -> Self {
        Self {
            id: TaskId::generate(),
            name: name.into(),
            description: None,
            column_id,
            author: author.into(),
            comments: Vec::new(),
            created_at: Some(Utc::now()),
        }
    }

    /// Sets the name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Sets the description
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    /// Appends a comment and returns a reference to it
    pub fn add_comment(&mut self, comment: Comment) -> &Comment {
        self.comments.push(comment);
        &self.comments[self.comments.len() - 1]
    }

    /// Finds a comment on this task by ID, for in-place edits
    pub fn find_comment_mut(&mut self, id: &CommentId) -> Option<&mut Comment> {
        self.comments.iter_mut().find(|c| &c.id == id)
    }

    /// Removes the first comment with the given ID
    pub fn remove_comment(&mut self, id: &CommentId) -> Option<Comment> {
        let pos = self.comments.iter().position(|c| &c.id == id)?;
        Some(self.comments.remove(pos))
    }

    /// Case-insensitive match against name, description, or any comment text.
    /// `query_lower` must already be lowercase.
    pub fn matches(&self, query_lower: &str) -> bool {
        let name_matches = self.name.to_lowercase().contains(query_lower);

        let description_matches = self
            .description
            .as_ref()
            .map(|d| d.to_lowercase().contains(query_lower))
            .unwrap_or(false);

        let comment_matches = self
            .comments
            .iter()
            .any(|c| c.text.to_lowercase().contains(query_lower));

        name_matches || description_matches || comment_matches
    }
}
