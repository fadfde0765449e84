//! Task model definitions

use serde::{Deserialize, Serialize};

use crate::category::CategoryId;

pub type TaskId = String;

/// A to-do item, as persisted in the `tasks` collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    /// `None` means uncategorized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    /// Unix epoch milliseconds, `0` when the stored record has none
    #[serde(default)]
    pub created_at: i64,
}

impl Task {
    /// Create a new, not yet completed task
    pub fn new(id: impl Into<TaskId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            completed: false,
            category_id: None,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Set the category
    pub fn with_category(mut self, category_id: impl Into<CategoryId>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn is_in_category(&self, category_id: &str) -> bool {
        self.category_id.as_deref() == Some(category_id)
    }
}
