//! Task module
//!
//! This module contains task-related types and logic.

mod filter;
mod model;
mod repository;
mod store;

pub use filter::{category_for, TaskFilter};
pub use model::*;
pub use repository::TaskRepository;
pub use store::{KvTaskStore, TASKS_KEY};
