//! Contact module: three-layer architecture (domain, repository, service).
//!
//! The service validates input and coordinates the repository with the
//! file store that holds uploaded images.

pub mod domain;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::ContactService;
