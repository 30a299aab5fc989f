//! Repository implementations for data access.
//!
//! - [`Idioms`]: the append-only idiom card table
//! - [`file_storage`]: blob storage for uploaded images

pub mod file_storage;
pub mod idioms;
pub mod repository;

pub use file_storage::{FileStorage, LocalFileStorage};
pub use idioms::Idioms;
pub use repository::Repository;
