//! The persistent board store.
//!
//! [`KanbanStore`] is the only thing that reads or writes the board. Every
//! call deserializes the full column document from storage; every mutation
//! runs read-modify-write under one lock and writes the full document back.
//! Lookups that miss return a not-found error and leave storage untouched.

use crate::{
    config::StoreConfig,
    domain::{
        board::{self, CommentSummary},
        column::Column,
        comment::Comment,
        id::{ColumnId, CommentId, TaskId},
        task::Task,
    },
    error::{KanbanError, Result},
    storage::KeyValueStorage,
};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Board store over a [`KeyValueStorage`] medium
///
/// Holds no board state of its own. Share one instance (for example behind an
/// `Arc`) between callers so all writes go through the same lock.
pub struct KanbanStore<S: KeyValueStorage> {
    storage: S,
    config: StoreConfig,
    write_lock: Mutex<()>,
}

impl<S: KeyValueStorage> KanbanStore<S> {
    /// Wraps `storage` without reading or seeding anything
    pub fn new(storage: S, config: StoreConfig) -> Self {
        Self {
            storage,
            config,
            write_lock: Mutex::new(()),
        }
    }

    /// Opens a store with the default config, seeding default columns on first run
    pub async fn open(storage: S) -> Result<Self> {
        Self::open_with_config(storage, StoreConfig::default()).await
    }

    /// Opens a store with the given config, seeding its default columns on first run
    pub async fn open_with_config(storage: S, config: StoreConfig) -> Result<Self> {
        config.validate()?;
        let store = Self::new(storage, config);
        let columns = store.seed_defaults().await?;
        tracing::info!(columns = columns.len(), "opened kanban store");
        Ok(store)
    }

    /// Returns the underlying persistence medium
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns the config this store was opened with
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Adds the configured default columns if the stored sequence is empty,
    /// returning the resulting sequence
    ///
    /// A malformed stored document is left as is: nothing is seeded and an
    /// empty sequence is returned.
    pub async fn seed_defaults(&self) -> Result<Vec<Column>> {
        let _guard = self.write_lock.lock().await;
        let mut columns = match self.load_columns().await {
            Err(KanbanError::SerializationError(e)) => {
                tracing::warn!(
                    key = %self.config.columns_key,
                    error = %e,
                    "stored columns are malformed, skipping default columns"
                );
                return Ok(Vec::new());
            }
            other => other?,
        };

        if columns.is_empty() && !self.config.default_columns.is_empty() {
            tracing::info!(
                names = ?self.config.default_columns,
                "seeding board with default columns"
            );
            columns.extend(self.config.default_columns.iter().map(Column::new));
            self.write_columns(&columns).await?;
        }

        Ok(columns)
    }

    // Author name

    /// Stores the current author name
    pub async fn set_name(&self, name: &str) -> Result<()> {
        self.storage.set_item(&self.config.author_key, name).await
    }

    /// Returns the current author name, or `None` if it was never set
    pub async fn get_name(&self) -> Result<Option<String>> {
        self.storage.get_item(&self.config.author_key).await
    }

    /// Forgets the current author name
    pub async fn remove_name(&self) -> Result<()> {
        self.storage.remove_item(&self.config.author_key).await
    }

    async fn current_author(&self) -> Result<String> {
        self.get_name().await?.ok_or(KanbanError::AuthorNotSet)
    }

    // Column sequence

    /// Reads the stored columns, failing if the stored document is malformed
    pub async fn load_columns(&self) -> Result<Vec<Column>> {
        match self.storage.get_item(&self.config.columns_key).await? {
            Some(value) if !value.trim().is_empty() => Ok(serde_json::from_str(&value)?),
            _ => Ok(Vec::new()),
        }
    }

    /// Reads the stored columns. A malformed document is logged and read as empty.
    pub async fn get_columns(&self) -> Result<Vec<Column>> {
        match self.load_columns().await {
            Err(KanbanError::SerializationError(e)) => {
                tracing::warn!(
                    key = %self.config.columns_key,
                    error = %e,
                    "stored columns are malformed, treating board as empty"
                );
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// Overwrites the whole stored document
    pub async fn set_columns(&self, columns: &[Column]) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write_columns(columns).await
    }

    /// Deletes the stored document entirely
    pub async fn remove_columns(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        tracing::debug!(key = %self.config.columns_key, "removing stored columns");
        self.storage.remove_item(&self.config.columns_key).await
    }

    /// Appends one column per name, in order, and returns the full sequence
    pub async fn add_columns<I, N>(&self, names: I) -> Result<Vec<Column>>
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let new_columns: Vec<Column> = names.into_iter().map(Column::new).collect();
        self.update(move |columns| {
            columns.extend(new_columns);
            Ok(columns.clone())
        })
        .await
    }

    async fn write_columns(&self, columns: &[Column]) -> Result<()> {
        let json = serde_json::to_string(columns)?;
        self.storage
            .set_item(&self.config.columns_key, &json)
            .await?;
        tracing::debug!(
            columns = columns.len(),
            bytes = json.len(),
            "wrote board document"
        );
        Ok(())
    }

    /// Runs `f` against the stored tree and writes the result back.
    /// Nothing is written if `f` fails.
    async fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<Column>) -> Result<T> + Send,
        T: Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut columns = self.load_columns().await?;
        let output = f(&mut columns)?;
        self.write_columns(&columns).await?;
        Ok(output)
    }

    // Single column

    /// Appends an empty column
    pub async fn add_column(&self, name: &str) -> Result<Column> {
        let column = Column::new(name);
        self.update(move |columns| {
            columns.push(column.clone());
            Ok(column)
        })
        .await
    }

    /// Renames the column in place
    pub async fn rename_column(&self, id: &ColumnId, name: &str) -> Result<Column> {
        self.update(|columns| {
            let column = board::find_column_mut(columns, id)?;
            column.rename(name);
            Ok(column.clone())
        })
        .await
    }

    /// Removes the column together with its tasks
    pub async fn remove_column(&self, id: &ColumnId) -> Result<Column> {
        self.update(|columns| {
            let pos = columns
                .iter()
                .position(|c| &c.id == id)
                .ok_or_else(|| KanbanError::ColumnNotFound { id: id.to_string() })?;
            Ok(columns.remove(pos))
        })
        .await
    }

    // Tasks

    /// Appends a new task, attributed to `author`, to the given column
    pub async fn add_task(&self, name: &str, column_id: &ColumnId, author: &str) -> Result<Task> {
        self.update(|columns| {
            let column = board::find_column_mut(columns, column_id)?;
            let task = Task::new(name, column.id.clone(), author);
            Ok(column.push_task(task).clone())
        })
        .await
    }

    /// Like [`add_task`](Self::add_task), attributed to the stored author name
    pub async fn add_task_as_current_author(&self, name: &str, column_id: &ColumnId) -> Result<Task> {
        let author = self.current_author().await?;
        self.add_task(name, column_id, &author).await
    }

    /// Removes a task from its column
    pub async fn remove_task(&self, task_id: &TaskId, column_id: &ColumnId) -> Result<Task> {
        self.update(|columns| {
            board::find_column_mut(columns, column_id)?
                .remove_task(task_id)
                .ok_or_else(|| KanbanError::TaskNotFound {
                    id: task_id.to_string(),
                })
        })
        .await
    }

    /// Replaces the task description
    pub async fn change_task_description(
        &self,
        task_id: &TaskId,
        column_id: &ColumnId,
        description: &str,
    ) -> Result<Task> {
        self.update(|columns| {
            let task = board::find_task_mut(columns, column_id, task_id)?;
            task.set_description(description);
            Ok(task.clone())
        })
        .await
    }

    /// Renames the task in place
    pub async fn rename_task(&self, task_id: &TaskId, column_id: &ColumnId, name: &str) -> Result<Task> {
        self.update(|columns| {
            let task = board::find_task_mut(columns, column_id, task_id)?;
            task.set_name(name);
            Ok(task.clone())
        })
        .await
    }

    /// Moves a task to the end of another column
    pub async fn move_task(
        &self,
        task_id: &TaskId,
        from_column_id: &ColumnId,
        to_column_id: &ColumnId,
    ) -> Result<Task> {
        self.update(|columns| {
            // Check the target first so a miss leaves the source untouched
            if !columns.iter().any(|c| &c.id == to_column_id) {
                return Err(KanbanError::ColumnNotFound {
                    id: to_column_id.to_string(),
                });
            }

            let task = board::find_column_mut(columns, from_column_id)?
                .remove_task(task_id)
                .ok_or_else(|| KanbanError::TaskNotFound {
                    id: task_id.to_string(),
                })?;

            let target = board::find_column_mut(columns, to_column_id)?;
            Ok(target.push_task(task).clone())
        })
        .await
    }

    /// Case-insensitive search over task names, descriptions and comment text
    pub async fn search_tasks(&self, query: &str) -> Result<Vec<Task>> {
        let query_lower = query.to_lowercase();
        Ok(self
            .get_columns()
            .await?
            .into_iter()
            .flat_map(|c| c.tasks)
            .filter(|t| t.matches(&query_lower))
            .collect())
    }

    // Comments

    /// Appends a comment, attributed to `author`, to the given task
    pub async fn add_comment(
        &self,
        text: &str,
        task_id: &TaskId,
        column_id: &ColumnId,
        author: &str,
    ) -> Result<Comment> {
        self.update(|columns| {
            let task = board::find_task_mut(columns, column_id, task_id)?;
            Ok(task.add_comment(Comment::new(text, author)).clone())
        })
        .await
    }

    /// Like [`add_comment`](Self::add_comment), attributed to the stored author name
    pub async fn add_comment_as_current_author(
        &self,
        text: &str,
        task_id: &TaskId,
        column_id: &ColumnId,
    ) -> Result<Comment> {
        let author = self.current_author().await?;
        self.add_comment(text, task_id, column_id, &author).await
    }

    /// Returns the task's comments, or an empty sequence if the task is not found
    pub async fn get_comments(&self, task_id: &TaskId, column_id: &ColumnId) -> Result<Vec<Comment>> {
        let columns = self.get_columns().await?;
        Ok(board::find_task(&columns, column_id, task_id)
            .map(|t| t.comments.clone())
            .unwrap_or_default())
    }

    /// Comment threads of every task on the board, keyed by task ID
    pub async fn get_all_comments(&self) -> Result<HashMap<TaskId, CommentSummary>> {
        let columns = self.get_columns().await?;
        Ok(board::comment_summaries(&columns))
    }

    /// Replaces the text of a comment, keeping its author
    pub async fn change_comment(
        &self,
        task_id: &TaskId,
        column_id: &ColumnId,
        comment_id: &CommentId,
        text: &str,
    ) -> Result<Comment> {
        self.update(|columns| {
            let comment = board::find_comment_mut(columns, column_id, task_id, comment_id)?;
            comment.set_text(text);
            Ok(comment.clone())
        })
        .await
    }

    /// Removes a comment from its task
    pub async fn remove_comment(
        &self,
        task_id: &TaskId,
        column_id: &ColumnId,
        comment_id: &CommentId,
    ) -> Result<Comment> {
        self.update(|columns| {
            board::find_task_mut(columns, column_id, task_id)?
                .remove_comment(comment_id)
                .ok_or_else(|| KanbanError::CommentNotFound {
                    id: comment_id.to_string(),
                })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    async fn store_with_task() -> (KanbanStore<MemoryStorage>, ColumnId, TaskId) {
        let store = KanbanStore::open(MemoryStorage::new()).await.unwrap();
        let column_id = store.get_columns().await.unwrap()[0].id.clone();
        let task = store.add_task("Write docs", &column_id, "Alice").await.unwrap();
        (store, column_id, task.id)
    }

    #[tokio::test]
    async fn test_open_seeds_default_columns() {
        let store = KanbanStore::open(MemoryStorage::new()).await.unwrap();
        let columns = store.get_columns().await.unwrap();

        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["To Do", "In Progress", "Testing", "Done"]);
        assert!(columns.iter().all(|c| c.tasks.is_empty()));
    }

    #[tokio::test]
    async fn test_open_does_not_reseed_existing_board() {
        let storage = MemoryStorage::new();
        let store = KanbanStore::open(storage).await.unwrap();
        store.add_column("Blocked").await.unwrap();

        let before = store.get_columns().await.unwrap();
        let reopened = KanbanStore::open(store.storage).await.unwrap();
        assert_eq!(reopened.get_columns().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_new_does_not_touch_storage() {
        let store = KanbanStore::new(MemoryStorage::new(), StoreConfig::default());
        assert!(store.get_columns().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_with_empty_default_columns() {
        let config = StoreConfig::default().with_default_columns(Vec::<String>::new());
        let store = KanbanStore::open_with_config(MemoryStorage::new(), config)
            .await
            .unwrap();
        assert!(store.get_columns().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_rejects_invalid_keys_before_touching_storage() {
        let config = StoreConfig {
            columns_key: "board.columns".to_string(),
            ..StoreConfig::default()
        };

        let err = KanbanStore::open_with_config(MemoryStorage::new(), config)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, KanbanError::ConfigError(_)));
    }

    #[tokio::test]
    async fn test_name_crud() {
        let store = KanbanStore::open(MemoryStorage::new()).await.unwrap();

        assert_eq!(store.get_name().await.unwrap(), None);
        store.set_name("Alice").await.unwrap();
        assert_eq!(store.get_name().await.unwrap().as_deref(), Some("Alice"));
        store.remove_name().await.unwrap();
        assert_eq!(store.get_name().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_add_task_to_missing_column_writes_nothing() {
        let (store, _, _) = store_with_task().await;
        let before = store.get_columns().await.unwrap();

        let err = store
            .add_task("Orphan", &ColumnId::from("missing"), "Alice")
            .await
            .unwrap_err();
        assert!(matches!(err, KanbanError::ColumnNotFound { .. }));
        assert_eq!(store.get_columns().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_session_author_required() {
        let store = KanbanStore::open(MemoryStorage::new()).await.unwrap();
        let column_id = store.get_columns().await.unwrap()[0].id.clone();

        let err = store
            .add_task_as_current_author("Task", &column_id)
            .await
            .unwrap_err();
        assert!(matches!(err, KanbanError::AuthorNotSet));

        store.set_name("Alice").await.unwrap();
        let task = store
            .add_task_as_current_author("Task", &column_id)
            .await
            .unwrap();
        assert_eq!(task.author, "Alice");
    }

    #[tokio::test]
    async fn test_task_edits() {
        let (store, column_id, task_id) = store_with_task().await;

        store
            .rename_task(&task_id, &column_id, "Write full docs")
            .await
            .unwrap();
        store
            .change_task_description(&task_id, &column_id, "Include the ambient stack")
            .await
            .unwrap();

        let columns = store.get_columns().await.unwrap();
        let task = &columns[0].tasks[0];
        assert_eq!(task.name, "Write full docs");
        assert_eq!(task.description.as_deref(), Some("Include the ambient stack"));
    }

    #[tokio::test]
    async fn test_move_task_updates_back_reference() {
        let (store, from, task_id) = store_with_task().await;
        let to = store.get_columns().await.unwrap()[3].id.clone();

        let moved = store.move_task(&task_id, &from, &to).await.unwrap();
        assert_eq!(moved.column_id, to);

        let columns = store.get_columns().await.unwrap();
        assert!(columns[0].tasks.is_empty());
        assert_eq!(columns[3].tasks[0].id, task_id);
        assert_eq!(columns[3].tasks[0].column_id, to);
    }

    #[tokio::test]
    async fn test_move_task_to_missing_column_keeps_task() {
        let (store, from, task_id) = store_with_task().await;

        let err = store
            .move_task(&task_id, &from, &ColumnId::from("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, KanbanError::ColumnNotFound { .. }));
        assert_eq!(store.get_columns().await.unwrap()[0].tasks.len(), 1);
    }

    #[tokio::test]
    async fn test_comment_edit_and_remove() {
        let (store, column_id, task_id) = store_with_task().await;
        let comment = store
            .add_comment("first draft", &task_id, &column_id, "Bob")
            .await
            .unwrap();

        let changed = store
            .change_comment(&task_id, &column_id, &comment.id, "second draft")
            .await
            .unwrap();
        assert_eq!(changed.text, "second draft");
        assert_eq!(changed.author, "Bob");

        store
            .remove_comment(&task_id, &column_id, &comment.id)
            .await
            .unwrap();
        assert!(store
            .get_comments(&task_id, &column_id)
            .await
            .unwrap()
            .is_empty());

        let err = store
            .remove_comment(&task_id, &column_id, &comment.id)
            .await
            .unwrap_err();
        assert!(matches!(err, KanbanError::CommentNotFound { .. }));
    }

    #[tokio::test]
    async fn test_get_comments_for_missing_task_is_empty() {
        let (store, column_id, _) = store_with_task().await;
        let comments = store
            .get_comments(&TaskId::from("missing"), &column_id)
            .await
            .unwrap();
        assert!(comments.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_document() {
        let store = KanbanStore::new(MemoryStorage::new(), StoreConfig::default());
        store.storage().set_item("columns", "{not json").await.unwrap();

        // Lenient read falls back to empty
        assert!(store.get_columns().await.unwrap().is_empty());

        // Strict read and mutations surface the error and leave the data alone
        assert!(matches!(
            store.load_columns().await.unwrap_err(),
            KanbanError::SerializationError(_)
        ));
        assert!(store.add_column("New").await.is_err());
        assert_eq!(
            store.storage().get_item("columns").await.unwrap().as_deref(),
            Some("{not json")
        );
    }

    #[tokio::test]
    async fn test_open_over_malformed_document_keeps_data() {
        let storage = MemoryStorage::new();
        storage.set_item("columns", "{not json").await.unwrap();

        let store = KanbanStore::open(storage).await.unwrap();

        assert!(store.get_columns().await.unwrap().is_empty());
        assert_eq!(
            store.storage().get_item("columns").await.unwrap().as_deref(),
            Some("{not json")
        );

        // Clearing the document lets the board be seeded again
        store.remove_columns().await.unwrap();
        assert_eq!(store.seed_defaults().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_search_tasks() {
        let (store, column_id, task_id) = store_with_task().await;
        store
            .add_task("Review PR", &column_id, "Bob")
            .await
            .unwrap();
        store
            .add_comment("Mention the Lock", &task_id, &column_id, "Bob")
            .await
            .unwrap();

        let results = store.search_tasks("SPEC").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, task_id);

        let results = store.search_tasks("lock").await.unwrap();
        assert_eq!(results.len(), 1);

        assert!(store.search_tasks("nothing here").await.unwrap().is_empty());
    }
}
