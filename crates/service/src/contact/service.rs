use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::domain::{Contact, ContactInput, DeletedContact, Upload};
use super::repository::ContactRepository;
use crate::errors::ServiceError;
use crate::storage::FileStore;

/// Parse a raw path segment into a contact id.
pub fn parse_id(raw_id: &str) -> Result<i32, ServiceError> {
    raw_id
        .parse::<i32>()
        .map_err(|_| ServiceError::InvalidId(format!("'{}' is not a valid contact id", raw_id)))
}

fn missing(id: i32) -> ServiceError {
    ServiceError::not_found(&format!("contact {}", id))
}

/// The row matched a moment ago; losing it now means a concurrent writer won.
fn vanished(err: ServiceError, id: i32) -> ServiceError {
    match err {
        ServiceError::NotFound(_) => ServiceError::Conflict(format!("contact {} was changed or removed while being modified", id)),
        other => other,
    }
}

/// Contact business service independent of web framework.
///
/// Validates input, checks existence before mutating and keeps uploaded
/// files in step with the rows that reference them.
pub struct ContactService<R: ContactRepository + ?Sized, F: FileStore + ?Sized> {
    repo: Arc<R>,
    files: Arc<F>,
}

impl<R: ContactRepository + ?Sized, F: FileStore + ?Sized> ContactService<R, F> {
    pub fn new(repo: Arc<R>, files: Arc<F>) -> Self { Self { repo, files } }

    pub async fn list(&self) -> Result<Vec<Contact>, ServiceError> {
        let all = self.repo.find_all().await?;
        debug!(count = all.len(), "contacts_listed");
        Ok(all)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, raw_id: &str) -> Result<Contact, ServiceError> {
        let id = parse_id(raw_id)?;
        self.repo.find_by_id(id).await?.ok_or_else(|| missing(id))
    }

    /// Create a contact, storing the upload first when one is given.
    ///
    /// # Examples
    /// ```
    /// use service::contact::{ContactService, domain::ContactInput, repository::memory::InMemoryContactRepository};
    /// use service::storage::LocalFileStore;
    /// use std::sync::Arc;
    /// let dir = std::env::temp_dir().join("contact_doc_example");
    /// let files = tokio_test::block_on(LocalFileStore::new(dir)).unwrap();
    /// let svc = ContactService::new(Arc::new(InMemoryContactRepository::default()), files);
    /// let input = ContactInput {
    ///     first_name: Some("Ada".into()),
    ///     last_name: Some("Lovelace".into()),
    ///     email: Some("ada@x.io".into()),
    ///     phone: Some("555-0100".into()),
    ///     ..Default::default()
    /// };
    /// let contact = tokio_test::block_on(svc.create(input, None)).unwrap();
    /// assert_eq!(contact.filename, None);
    /// ```
    #[instrument(skip(self, input, upload), fields(has_upload = upload.is_some()))]
    pub async fn create(&self, input: ContactInput, upload: Option<Upload>) -> Result<Contact, ServiceError> {
        let mut record = input.into_record(None)?;
        if let Some(upload) = upload {
            record.filename = Some(self.files.save(&upload.bytes, &upload.original_name).await?);
        }
        let saved = record.filename.clone();

        match self.repo.insert(record).await {
            Ok(created) => {
                info!(id = created.id, filename = ?created.filename, "contact_created");
                Ok(created)
            }
            Err(e) => {
                if let Some(name) = saved {
                    self.discard_file(&name).await;
                }
                Err(e)
            }
        }
    }

    /// Replace the fields of an existing contact. Omitted fields keep their
    /// value; a new upload replaces the image and the old file is removed.
    #[instrument(skip(self, input, upload), fields(has_upload = upload.is_some()))]
    pub async fn update(&self, raw_id: &str, input: ContactInput, upload: Option<Upload>) -> Result<Contact, ServiceError> {
        let id = parse_id(raw_id)?;
        let existing = self.repo.find_by_id(id).await?.ok_or_else(|| missing(id))?;

        let mut record = input.merged_with(&existing).into_record(existing.filename.clone())?;
        let uploaded = match upload {
            Some(upload) => {
                let name = self.files.save(&upload.bytes, &upload.original_name).await?;
                record.filename = Some(name.clone());
                Some(name)
            }
            None => None,
        };

        // only applies if the image we read is still the current one
        if let Err(e) = self.repo.replace(id, existing.filename.as_deref(), record).await {
            if let Some(name) = &uploaded {
                self.discard_file(name).await;
            }
            return Err(vanished(e, id));
        }

        if let (Some(new), Some(previous)) = (&uploaded, &existing.filename) {
            if new != previous {
                self.discard_file(previous).await;
            }
        }

        // read back so the response reflects what was committed
        let updated = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| vanished(missing(id), id))?;
        info!(id, filename = ?updated.filename, "contact_updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, raw_id: &str) -> Result<DeletedContact, ServiceError> {
        let id = parse_id(raw_id)?;
        let existing = self.repo.find_by_id(id).await?.ok_or_else(|| missing(id))?;

        self.repo.remove(id).await.map_err(|e| vanished(e, id))?;
        if let Some(name) = &existing.filename {
            self.discard_file(name).await;
        }
        info!(id, "contact_deleted");
        Ok(DeletedContact::new(id))
    }

    /// Best-effort removal; the database row is the source of truth.
    async fn discard_file(&self, name: &str) {
        if let Err(e) = self.files.delete(name).await {
            warn!(filename = %name, error = %e, "file_cleanup_failed");
        }
    }
}
