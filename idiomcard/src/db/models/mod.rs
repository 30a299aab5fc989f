//! Records and requests exchanged with the stores.

pub mod file_storage;
pub mod idioms;
