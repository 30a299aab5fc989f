//! Request and response models of the HTTP surface.

pub mod forms;
pub mod idioms;
