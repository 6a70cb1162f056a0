use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// A stored contact as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub title: Option<String>,
    pub email: String,
    pub phone: String,
    pub filename: Option<String>,
}

/// Fields supplied by a create or update request. `None` means omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Validated column values handed to the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRecord {
    pub first_name: String,
    pub last_name: String,
    pub title: Option<String>,
    pub email: String,
    pub phone: String,
    pub filename: Option<String>,
}

/// An uploaded image as received at the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub original_name: String,
    pub bytes: Vec<u8>,
}

/// Body of a successful update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedContact {
    pub message: String,
    pub updated_contact: Contact,
}

/// Confirmation of a delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletedContact {
    #[serde(skip_serializing)]
    pub id: i32,
    pub message: String,
}

impl ContactInput {
    /// Fill every omitted field from `base`.
    pub fn merged_with(self, base: &Contact) -> ContactInput {
        ContactInput {
            first_name: self.first_name.or_else(|| Some(base.first_name.clone())),
            last_name: self.last_name.or_else(|| Some(base.last_name.clone())),
            title: self.title.or_else(|| base.title.clone()),
            email: self.email.or_else(|| Some(base.email.clone())),
            phone: self.phone.or_else(|| Some(base.phone.clone())),
        }
    }

    /// Check the required fields and produce the record to persist.
    /// A blank title is stored as no title.
    pub fn into_record(self, filename: Option<String>) -> Result<ContactRecord, ServiceError> {
        let first_name = self.first_name.unwrap_or_default();
        let last_name = self.last_name.unwrap_or_default();
        let email = self.email.unwrap_or_default();
        let phone = self.phone.unwrap_or_default();
        models::contact::validate_required(&first_name, &last_name, &email, &phone)?;
        let record = ContactRecord {
            first_name,
            last_name,
            title: self.title.filter(|t| !t.trim().is_empty()),
            email,
            phone,
            filename,
        };
        models::contact::validate_lengths(&record.columns())?;
        Ok(record)
    }
}

impl ContactRecord {
    pub fn columns(&self) -> models::contact::ContactColumns<'_> {
        models::contact::ContactColumns {
            first_name: &self.first_name,
            last_name: &self.last_name,
            title: self.title.as_deref(),
            email: &self.email,
            phone: &self.phone,
            filename: self.filename.as_deref(),
        }
    }
}

impl UpdatedContact {
    pub fn new(contact: Contact) -> Self {
        Self { message: format!("Contact {} updated", contact.id), updated_contact: contact }
    }
}

impl DeletedContact {
    pub fn new(id: i32) -> Self {
        Self { id, message: format!("Contact {} deleted", id) }
    }
}

impl From<models::contact::Model> for Contact {
    fn from(m: models::contact::Model) -> Self {
        Contact {
            id: m.id,
            first_name: m.first_name,
            last_name: m.last_name,
            title: m.title,
            email: m.email,
            phone: m.phone,
            filename: m.filename,
        }
    }
}
