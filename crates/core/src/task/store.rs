//! Key-value backed task storage
//!
//! Every operation reads the whole `tasks` array, applies its change in memory
//! and writes the whole array back. Overlapping writers can lose updates.

use async_trait::async_trait;
use tracing::{debug, info};

use super::model::Task;
use super::repository::TaskRepository;
use crate::id::generate_unique_id;
use crate::storage::{JsonCollection, SharedStore};
use crate::validate::required_text;
use crate::{Error, Result};

/// Storage key of the task collection
pub const TASKS_KEY: &str = "tasks";

/// Task repository persisting through a [`KeyValueStore`](crate::storage::KeyValueStore)
#[derive(Clone)]
pub struct KvTaskStore {
    tasks: JsonCollection<Task>,
}

impl KvTaskStore {
    pub fn new(store: SharedStore) -> Self {
        Self {
            tasks: JsonCollection::new(store, TASKS_KEY),
        }
    }

    /// Apply `change` to the task with `id` and persist, if it exists
    async fn modify<F>(&self, id: &str, change: F) -> Result<bool>
    where
        F: FnOnce(&mut Task) + Send,
    {
        let mut tasks = self.tasks.load().await;
        let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
            debug!("Task {} not found, nothing to change", id);
            return Ok(false);
        };

        change(task);
        self.tasks.save(&tasks).await?;
        Ok(true)
    }
}

#[async_trait]
impl TaskRepository for KvTaskStore {
    async fn get_tasks(&self) -> Result<Vec<Task>> {
        Ok(self.tasks.load().await)
    }

    async fn get_tasks_by_category(&self, category_id: &str) -> Result<Vec<Task>> {
        let mut tasks = self.tasks.load().await;
        tasks.retain(|t| t.is_in_category(category_id));
        Ok(tasks)
    }

    async fn add_task(&self, title: &str, category_id: Option<&str>) -> Result<Task> {
        let title = required_text("title", title)?;
        let mut tasks = self.tasks.load().await;

        // Ensure no task with this ID exists.
        let id = generate_unique_id(|candidate| tasks.iter().any(|t| t.id == candidate))
            .ok_or_else(|| Error::Storage("could not generate unique task id".into()))?;

        let mut task = Task::new(id, title);
        if let Some(category_id) = category_id {
            task = task.with_category(category_id);
        }

        tasks.push(task.clone());
        self.tasks.save(&tasks).await?;

        info!("Added task {}", task.id);
        Ok(task)
    }

    async fn update_task(&self, mut task: Task) -> Result<bool> {
        task.title = required_text("title", &task.title)?;
        let id = task.id.clone();
        self.modify(&id, move |stored| *stored = task).await
    }

    async fn set_task_completed(&self, id: &str, completed: bool) -> Result<bool> {
        self.modify(id, |task| task.completed = completed).await
    }

    async fn rename_task(&self, id: &str, title: &str) -> Result<bool> {
        let title = required_text("title", title)?;
        self.modify(id, move |task| task.title = title).await
    }

    async fn delete_task(&self, id: &str) -> Result<bool> {
        let mut tasks = self.tasks.load().await;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);

        if tasks.len() == before {
            return Ok(false);
        }

        self.tasks.save(&tasks).await?;
        info!("Deleted task {}", id);
        Ok(true)
    }

    async fn clear_all_tasks(&self) -> Result<()> {
        self.tasks.clear().await?;
        info!("Cleared all tasks");
        Ok(())
    }

    async fn detach_category(&self, category_id: &str) -> Result<usize> {
        let mut tasks = self.tasks.load().await;
        let mut detached = 0;
        for task in tasks.iter_mut().filter(|t| t.is_in_category(category_id)) {
            task.category_id = None;
            detached += 1;
        }

        if detached > 0 {
            self.tasks.save(&tasks).await?;
            info!("Detached {} tasks from category {}", detached, category_id);
        }
        Ok(detached)
    }

    async fn ensure_initialized(&self) -> Result<bool> {
        self.tasks.ensure_initialized().await
    }
}
