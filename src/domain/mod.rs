pub mod board;
pub mod column;
pub mod comment;
pub mod id;
pub mod task;

pub use board::CommentSummary;
pub use column::Column;
pub use comment::Comment;
pub use id::{ColumnId, CommentId, TaskId};
pub use task::Task;
