//! In-memory task views
//!
//! Category references are only checked here, at display time: a task whose
//! `category_id` names no known category shows as uncategorized.

use crate::category::{Category, CategoryId};

use super::model::Task;

/// Which tasks a list view shows
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TaskFilter {
    #[default]
    All,
    /// Tasks with no category or a dangling one
    Uncategorized,
    Category(CategoryId),
}

impl TaskFilter {
    /// Collapse category filtering when categories are switched off
    pub fn gated(self, enable_categories: bool) -> Self {
        if enable_categories {
            self
        } else {
            Self::All
        }
    }

    pub fn matches(&self, task: &Task, categories: &[Category]) -> bool {
        match self {
            Self::All => true,
            Self::Uncategorized => category_for(task, categories).is_none(),
            Self::Category(id) => task.is_in_category(id),
        }
    }

    /// Matching tasks, in input order
    pub fn apply(&self, tasks: &[Task], categories: &[Category]) -> Vec<Task> {
        tasks
            .iter()
            .filter(|t| self.matches(t, categories))
            .cloned()
            .collect()
    }
}

/// The category a task is displayed under
pub fn category_for<'a>(task: &Task, categories: &'a [Category]) -> Option<&'a Category> {
    let id = task.category_id.as_deref()?;
    categories.iter().find(|c| c.id == id)
}
