//! Storage abstractions for the service layer
//!
//! Uploaded images live outside the database; contacts only keep the
//! generated name of their file.

pub mod file_store;

pub use file_store::{FileStore, LocalFileStore};
