use crate::domain::{
    id::{ColumnId, TaskId},
    task::Task,
};
use serde::{Deserialize, Serialize};

/// A named, ordered bucket of tasks (a kanban stage)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Column {
    /// Creates an empty column with a fresh ID
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ColumnId::generate(),
            name: name.into(),
            tasks: Vec::new(),
        }
    }

    /// Sets the name
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Finds a task in this column by ID
    pub fn find_task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// Finds a task in this column by ID, for in-place edits
    pub fn find_task_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| &t.id == id)
    }

    /// Appends a task, pointing its back-reference at this column
    pub fn push_task(&mut self, mut task: Task) -> &Task {
        task.column_id = self.id.clone();
        self.tasks.push(task);
        &self.tasks[self.tasks.len() - 1]
    }

    /// Removes the first task with the given ID
    pub fn remove_task(&mut self, id: &TaskId) -> Option<Task> {
        let pos = self.tasks.iter().position(|t| &t.id == id)?;
        Some(self.tasks.remove(pos))
    }
}
