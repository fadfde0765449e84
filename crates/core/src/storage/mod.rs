//! Storage module
//!
//! Key-value adapters the repositories persist their collections through.

mod collection;
mod file_store;
mod kv;
mod memory;
#[cfg(test)]
pub(crate) mod test_support;

pub use collection::JsonCollection;
pub use file_store::FileKeyValueStore;
pub use kv::{KeyValueStore, SharedStore};
pub use memory::MemoryKeyValueStore;
