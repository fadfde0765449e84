//! Task repository trait
//!
//! Defines the interface for task storage operations.

use async_trait::async_trait;

use super::model::Task;
use crate::Result;

/// Repository interface for task CRUD operations
///
/// Mutations that target an unknown id are no-ops and report `false`.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Get all tasks in insertion order
    async fn get_tasks(&self) -> Result<Vec<Task>>;

    /// Get the tasks whose category is exactly `category_id`
    async fn get_tasks_by_category(&self, category_id: &str) -> Result<Vec<Task>>;

    /// Create and append a new task
    async fn add_task(&self, title: &str, category_id: Option<&str>) -> Result<Task>;

    /// Replace the stored task with the same id
    async fn update_task(&self, task: Task) -> Result<bool>;

    /// Mark a task as completed or not completed
    async fn set_task_completed(&self, id: &str, completed: bool) -> Result<bool>;

    /// Change a task's title
    async fn rename_task(&self, id: &str, title: &str) -> Result<bool>;

    /// Delete a task by ID
    async fn delete_task(&self, id: &str) -> Result<bool>;

    /// Delete every task
    async fn clear_all_tasks(&self) -> Result<()>;

    /// Drop `category_id` from every task referencing it, returning how many changed
    async fn detach_category(&self, category_id: &str) -> Result<usize>;

    /// Seed an empty collection if nothing is stored yet
    async fn ensure_initialized(&self) -> Result<bool>;
}
