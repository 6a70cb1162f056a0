use async_trait::async_trait;

use super::domain::{Contact, ContactRecord};
use crate::errors::ServiceError;

/// Repository abstraction for contact persistence.
///
/// `replace` and `remove` are conditional on the row still existing when the
/// mutation runs and report `NotFound` otherwise. `replace` additionally
/// requires the stored filename to equal `expected_filename`, so a writer
/// working from a stale read cannot restore a file reference that has since
/// been replaced.
#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Contact>, ServiceError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Contact>, ServiceError>;
    async fn insert(&self, record: ContactRecord) -> Result<Contact, ServiceError>;
    async fn replace(&self, id: i32, expected_filename: Option<&str>, record: ContactRecord) -> Result<Contact, ServiceError>;
    async fn remove(&self, id: i32) -> Result<(), ServiceError>;
}

/// In-memory repository used by tests and the server test harness.
pub mod memory {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::{Mutex, MutexGuard};

    #[derive(Default)]
    struct State {
        rows: BTreeMap<i32, Contact>,
        last_id: i32,
    }

    #[derive(Default)]
    pub struct InMemoryContactRepository {
        state: Mutex<State>,
    }

    impl InMemoryContactRepository {
        fn state(&self) -> Result<MutexGuard<'_, State>, ServiceError> {
            self.state.lock().map_err(|_| ServiceError::Storage("in-memory contact store poisoned".into()))
        }
    }

    fn to_contact(id: i32, r: ContactRecord) -> Contact {
        Contact {
            id,
            first_name: r.first_name,
            last_name: r.last_name,
            title: r.title,
            email: r.email,
            phone: r.phone,
            filename: r.filename,
        }
    }

    #[async_trait]
    impl ContactRepository for InMemoryContactRepository {
        async fn find_all(&self) -> Result<Vec<Contact>, ServiceError> {
            Ok(self.state()?.rows.values().cloned().collect())
        }

        async fn find_by_id(&self, id: i32) -> Result<Option<Contact>, ServiceError> {
            Ok(self.state()?.rows.get(&id).cloned())
        }

        async fn insert(&self, record: ContactRecord) -> Result<Contact, ServiceError> {
            let mut state = self.state()?;
            // ids only move forward so a deleted id is never handed out again
            state.last_id += 1;
            let contact = to_contact(state.last_id, record);
            state.rows.insert(contact.id, contact.clone());
            Ok(contact)
        }

        async fn replace(&self, id: i32, expected_filename: Option<&str>, record: ContactRecord) -> Result<Contact, ServiceError> {
            let mut state = self.state()?;
            let slot = match state.rows.get_mut(&id) {
                Some(slot) if slot.filename.as_deref() == expected_filename => slot,
                _ => return Err(ServiceError::not_found(&format!("contact {}", id))),
            };
            *slot = to_contact(id, record);
            Ok(slot.clone())
        }

        async fn remove(&self, id: i32) -> Result<(), ServiceError> {
            let mut state = self.state()?;
            match state.rows.remove(&id) {
                Some(_) => Ok(()),
                None => Err(ServiceError::not_found(&format!("contact {}", id))),
            }
        }
    }

}
