use sea_orm::DatabaseConnection;

use models::contact;

use crate::contact::domain::{Contact, ContactRecord};
use crate::contact::repository::ContactRepository;
use crate::errors::ServiceError;

/// SeaORM-backed repository implementation.
pub struct SeaOrmContactRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmContactRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[async_trait::async_trait]
impl ContactRepository for SeaOrmContactRepository {
    async fn find_all(&self) -> Result<Vec<Contact>, ServiceError> {
        let rows = contact::list(&self.db).await?;
        Ok(rows.into_iter().map(Contact::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Contact>, ServiceError> {
        Ok(contact::find(&self.db, id).await?.map(Contact::from))
    }

    async fn insert(&self, record: ContactRecord) -> Result<Contact, ServiceError> {
        let created = contact::create(&self.db, &record.columns()).await?;
        Ok(created.into())
    }

    async fn replace(&self, id: i32, expected_filename: Option<&str>, record: ContactRecord) -> Result<Contact, ServiceError> {
        contact::replace(&self.db, id, expected_filename, &record.columns())
            .await?
            .map(Contact::from)
            .ok_or_else(|| ServiceError::not_found(&format!("contact {}", id)))
    }

    async fn remove(&self, id: i32) -> Result<(), ServiceError> {
        if contact::delete(&self.db, id).await? {
            Ok(())
        } else {
            Err(ServiceError::not_found(&format!("contact {}", id)))
        }
    }
}
