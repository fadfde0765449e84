//! Category repository trait

use async_trait::async_trait;

use super::model::{Category, CategoryDeletion};
use crate::Result;

/// Repository interface for category CRUD operations
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Get all categories in insertion order
    async fn get_categories(&self) -> Result<Vec<Category>>;

    async fn add_category(&self, name: &str, color: Option<&str>) -> Result<Category>;

    /// Replace the stored category with the same id
    async fn update_category(&self, category: Category) -> Result<bool>;

    async fn rename_category(&self, id: &str, name: &str) -> Result<bool>;

    async fn recolor_category(&self, id: &str, color: &str) -> Result<bool>;

    /// Delete a category, optionally clearing it from the tasks that use it
    ///
    /// The category removal and the task cascade are two separate writes. If
    /// the cascade fails the category stays deleted and tasks keep a dangling
    /// reference.
    async fn delete_category(&self, id: &str, cascade: bool) -> Result<CategoryDeletion>;

    async fn clear_all_categories(&self) -> Result<()>;

    /// Seed an empty collection if nothing is stored yet
    async fn ensure_initialized(&self) -> Result<bool>;
}
