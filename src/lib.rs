//! # Kanban Store
//!
//! Column, task and comment storage for kanban boards.
//!
//! The whole board is kept as a single JSON document under one key of a
//! key-value persistence medium, next to a scalar "author" entry naming the
//! current user. [`KanbanStore`] reads the document, mutates it and writes it
//! back on every call; the medium itself is any [`KeyValueStorage`] backend.

pub mod config;
pub mod domain;
pub mod error;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use config::StoreConfig;
pub use domain::{
    board::CommentSummary,
    column::Column,
    comment::Comment,
    id::{ColumnId, CommentId, TaskId},
    task::Task,
};
pub use error::{KanbanError, Result};
pub use storage::KeyValueStorage;
pub use store::KanbanStore;
