//! Service layer for contacts.
//! - `contact` holds the domain types, the repository seam and the orchestrating service.
//! - `storage` holds the file store for uploaded images.
//! - Errors are classified once here so the HTTP layer only maps them to statuses.

pub mod errors;
pub mod contact;
pub mod storage;
pub mod runtime;
#[cfg(test)]
pub mod test_support;
