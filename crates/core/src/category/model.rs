//! Category model definitions

use serde::{Deserialize, Serialize};

pub type CategoryId = String;

/// A user-named grouping label tasks can point at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Display color such as `"#ff0000"`, not interpreted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Category {
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: None,
        }
    }

    /// Set the color
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// What a category deletion changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CategoryDeletion {
    /// Whether the category existed
    pub removed: bool,
    /// Tasks whose reference was cleared by the cascade
    pub detached_tasks: usize,
}
