//! Core library for Taskbox
//!
//! This crate contains the local data-access layer, including:
//! - Key-value storage adapters
//! - Task and category repositories
//! - Remote feature flags
//! - Settings

pub mod category;
pub mod config;
pub mod error;
pub mod flags;
pub mod id;
pub mod storage;
pub mod task;
mod validate;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
