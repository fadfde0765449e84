//! Category module
//!
//! Categories group tasks. Tasks reference them by id without any enforced
//! integrity.

mod model;
mod repository;
mod store;

pub use model::*;
pub use repository::CategoryRepository;
pub use store::{KvCategoryStore, CATEGORIES_KEY};
