//! Lookups and mutations over the in-memory column tree.
//!
//! The persisted board is just `Vec<Column>`. These helpers do the linear,
//! first-match-wins id scans the store needs and turn a miss into an explicit
//! not-found error instead of a silent no-op.

use crate::{
    domain::{
        column::Column,
        comment::Comment,
        id::{ColumnId, CommentId, TaskId},
        task::Task,
    },
    error::{KanbanError, Result},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const TODO_COLUMN_NAME: &str = "To Do";
pub const IN_PROGRESS_COLUMN_NAME: &str = "In Progress";
pub const TESTING_COLUMN_NAME: &str = "Testing";
pub const DONE_COLUMN_NAME: &str = "Done";

/// Column names a fresh board is seeded with
pub fn default_column_names() -> Vec<String> {
    [
        TODO_COLUMN_NAME,
        IN_PROGRESS_COLUMN_NAME,
        TESTING_COLUMN_NAME,
        DONE_COLUMN_NAME,
    ]
    .iter()
    .map(|name| name.to_string())
    .collect()
}

/// Comment thread of one task together with its length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentSummary {
    pub comments: Vec<Comment>,
    pub comments_count: usize,
}

/// Finds a column by ID
pub fn find_column_mut<'a>(columns: &'a mut [Column], id: &ColumnId) -> Result<&'a mut Column> {
    columns
        .iter_mut()
        .find(|c| &c.id == id)
        .ok_or_else(|| KanbanError::ColumnNotFound { id: id.to_string() })
}

/// Finds a task by its column and task IDs
pub fn find_task<'a>(columns: &'a [Column], column_id: &ColumnId, task_id: &TaskId) -> Result<&'a Task> {
    columns
        .iter()
        .find(|c| &c.id == column_id)
        .ok_or_else(|| KanbanError::ColumnNotFound {
            id: column_id.to_string(),
        })?
        .find_task(task_id)
        .ok_or_else(|| KanbanError::TaskNotFound {
            id: task_id.to_string(),
        })
}

/// Mutable variant of [`find_task`]
pub fn find_task_mut<'a>(
    columns: &'a mut [Column],
    column_id: &ColumnId,
    task_id: &TaskId,
) -> Result<&'a mut Task> {
    find_column_mut(columns, column_id)?
        .find_task_mut(task_id)
        .ok_or_else(|| KanbanError::TaskNotFound {
            id: task_id.to_string(),
        })
}

/// Finds a comment by its column, task and comment IDs
pub fn find_comment_mut<'a>(
    columns: &'a mut [Column],
    column_id: &ColumnId,
    task_id: &TaskId,
    comment_id: &CommentId,
) -> Result<&'a mut Comment> {
    find_task_mut(columns, column_id, task_id)?
        .find_comment_mut(comment_id)
        .ok_or_else(|| KanbanError::CommentNotFound {
            id: comment_id.to_string(),
        })
}

/// Builds a task-id keyed map of every comment thread on the board
pub fn comment_summaries(columns: &[Column]) -> HashMap<TaskId, CommentSummary> {
    columns
        .iter()
        .flat_map(|c| c.tasks.iter())
        .map(|t| {
            (
                t.id.clone(),
                CommentSummary {
                    comments: t.comments.clone(),
                    comments_count: t.comments.len(),
                },
            )
        })
        .collect()
}
