//! Key-value backed category storage

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::model::{Category, CategoryDeletion};
use super::repository::CategoryRepository;
use crate::id::generate_unique_id;
use crate::storage::{JsonCollection, SharedStore};
use crate::task::TaskRepository;
use crate::validate::required_text;
use crate::{Error, Result};

/// Storage key of the category collection
pub const CATEGORIES_KEY: &str = "categories";

/// Category repository persisting through a key-value store
///
/// Holds the task repository so deletions can cascade into tasks.
#[derive(Clone)]
pub struct KvCategoryStore {
    categories: JsonCollection<Category>,
    tasks: Arc<dyn TaskRepository>,
}

impl KvCategoryStore {
    pub fn new(store: SharedStore, tasks: Arc<dyn TaskRepository>) -> Self {
        Self {
            categories: JsonCollection::new(store, CATEGORIES_KEY),
            tasks,
        }
    }

    async fn modify<F>(&self, id: &str, change: F) -> Result<bool>
    where
        F: FnOnce(&mut Category) + Send,
    {
        let mut categories = self.categories.load().await;
        let Some(category) = categories.iter_mut().find(|c| c.id == id) else {
            debug!("Category {} not found, nothing to change", id);
            return Ok(false);
        };

        change(category);
        self.categories.save(&categories).await?;
        Ok(true)
    }
}

#[async_trait]
impl CategoryRepository for KvCategoryStore {
    async fn get_categories(&self) -> Result<Vec<Category>> {
        Ok(self.categories.load().await)
    }

    async fn add_category(&self, name: &str, color: Option<&str>) -> Result<Category> {
        let name = required_text("name", name)?;
        let mut categories = self.categories.load().await;

        let id = generate_unique_id(|candidate| categories.iter().any(|c| c.id == candidate))
            .ok_or_else(|| Error::Storage("could not generate unique category id".into()))?;

        let mut category = Category::new(id, name);
        if let Some(color) = color {
            category = category.with_color(color);
        }

        categories.push(category.clone());
        self.categories.save(&categories).await?;

        info!("Added category {}", category.id);
        Ok(category)
    }

    async fn update_category(&self, mut category: Category) -> Result<bool> {
        category.name = required_text("name", &category.name)?;
        let id = category.id.clone();
        self.modify(&id, move |stored| *stored = category).await
    }

    async fn rename_category(&self, id: &str, name: &str) -> Result<bool> {
        let name = required_text("name", name)?;
        self.modify(id, move |category| category.name = name).await
    }

    async fn recolor_category(&self, id: &str, color: &str) -> Result<bool> {
        let color = color.to_string();
        self.modify(id, move |category| category.color = Some(color)).await
    }

    async fn delete_category(&self, id: &str, cascade: bool) -> Result<CategoryDeletion> {
        // 1) Remove the category
        let mut categories = self.categories.load().await;
        let before = categories.len();
        categories.retain(|c| c.id != id);
        let removed = categories.len() != before;

        if removed {
            self.categories.save(&categories).await?;
            info!("Deleted category {}", id);
        }

        if !cascade {
            return Ok(CategoryDeletion {
                removed,
                detached_tasks: 0,
            });
        }

        // 2) Clear the reference from tasks, as a separate write
        let detached_tasks = self.tasks.detach_category(id).await.map_err(|e| {
            warn!("Category {} deleted but tasks still reference it: {}", id, e);
            e
        })?;

        Ok(CategoryDeletion {
            removed,
            detached_tasks,
        })
    }

    async fn clear_all_categories(&self) -> Result<()> {
        self.categories.clear().await?;
        info!("Cleared all categories");
        Ok(())
    }

    async fn ensure_initialized(&self) -> Result<bool> {
        self.categories.ensure_initialized().await
    }
}
