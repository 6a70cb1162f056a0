#![cfg(test)]
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use configs::DatabaseConfig;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tokio::sync::{oneshot, Mutex as AsyncMutex, Notify, OnceCell};

use crate::contact::domain::{Contact, ContactInput, ContactRecord, Upload};
use crate::contact::repository::{memory::InMemoryContactRepository, ContactRepository};
use crate::errors::ServiceError;
use crate::storage::file_store::{generate_name, FileStore};

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<()> = OnceCell::const_new();

pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    MIGRATED
        .get_or_init(|| async {
            let db = models::db::connect_with_config(&DatabaseConfig::default()).await.expect("connect db for migration");
            migration::Migrator::up(&db, None).await.expect("migrate up");
            drop(db);
        })
        .await;
    models::db::connect_with_config(&DatabaseConfig::default()).await
}

pub fn ada() -> ContactInput {
    ContactInput {
        first_name: Some("Ada".into()),
        last_name: Some("Lovelace".into()),
        title: None,
        email: Some("ada@x.io".into()),
        phone: Some("555-0100".into()),
    }
}

pub fn png() -> Upload {
    Upload { original_name: "portrait.png".into(), bytes: vec![0x89, b'P', b'N', b'G'] }
}

/// In-memory repository that counts every call made to it.
#[derive(Default)]
pub struct CountingRepository {
    inner: InMemoryContactRepository,
    calls: AtomicUsize,
}

impl CountingRepository {
    pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
    fn hit(&self) { self.calls.fetch_add(1, Ordering::SeqCst); }
}

#[async_trait]
impl ContactRepository for CountingRepository {
    async fn find_all(&self) -> Result<Vec<Contact>, ServiceError> { self.hit(); self.inner.find_all().await }
    async fn find_by_id(&self, id: i32) -> Result<Option<Contact>, ServiceError> { self.hit(); self.inner.find_by_id(id).await }
    async fn insert(&self, record: ContactRecord) -> Result<Contact, ServiceError> { self.hit(); self.inner.insert(record).await }
    async fn replace(&self, id: i32, expected_filename: Option<&str>, record: ContactRecord) -> Result<Contact, ServiceError> { self.hit(); self.inner.replace(id, expected_filename, record).await }
    async fn remove(&self, id: i32) -> Result<(), ServiceError> { self.hit(); self.inner.remove(id).await }
}

/// Repository whose backend is down for writes.
pub struct FailingInsertRepository;

#[async_trait]
impl ContactRepository for FailingInsertRepository {
    async fn find_all(&self) -> Result<Vec<Contact>, ServiceError> { Ok(Vec::new()) }
    async fn find_by_id(&self, _id: i32) -> Result<Option<Contact>, ServiceError> { Ok(None) }
    async fn insert(&self, _record: ContactRecord) -> Result<Contact, ServiceError> { Err(ServiceError::Storage("connection refused".into())) }
    async fn replace(&self, _id: i32, _expected_filename: Option<&str>, _record: ContactRecord) -> Result<Contact, ServiceError> { Err(ServiceError::Storage("connection refused".into())) }
    async fn remove(&self, _id: i32) -> Result<(), ServiceError> { Err(ServiceError::Storage("connection refused".into())) }
}

/// Rows can be read but disappear as soon as someone tries to mutate them,
/// as if another request deleted them in between.
#[derive(Default)]
pub struct VanishingRepository {
    inner: InMemoryContactRepository,
}

impl VanishingRepository {
    pub async fn seed(&self, input: ContactInput) -> Result<Contact, ServiceError> {
        self.inner.insert(input.into_record(None)?).await
    }
}

#[async_trait]
impl ContactRepository for VanishingRepository {
    async fn find_all(&self) -> Result<Vec<Contact>, ServiceError> { self.inner.find_all().await }
    async fn find_by_id(&self, id: i32) -> Result<Option<Contact>, ServiceError> { self.inner.find_by_id(id).await }
    async fn insert(&self, record: ContactRecord) -> Result<Contact, ServiceError> { self.inner.insert(record).await }
    async fn replace(&self, id: i32, _expected_filename: Option<&str>, _record: ContactRecord) -> Result<Contact, ServiceError> {
        Err(ServiceError::not_found(&format!("contact {}", id)))
    }
    async fn remove(&self, id: i32) -> Result<(), ServiceError> {
        Err(ServiceError::not_found(&format!("contact {}", id)))
    }
}

/// Holds the first `replace` until `release` is called, so a test can run
/// another writer in between.
pub struct GatedRepository {
    inner: InMemoryContactRepository,
    held: Notify,
    gate: AsyncMutex<Option<oneshot::Receiver<()>>>,
    opener: Mutex<Option<oneshot::Sender<()>>>,
}

impl Default for GatedRepository {
    fn default() -> Self {
        let (tx, rx) = oneshot::channel();
        Self {
            inner: InMemoryContactRepository::default(),
            held: Notify::new(),
            gate: AsyncMutex::new(Some(rx)),
            opener: Mutex::new(Some(tx)),
        }
    }
}

impl GatedRepository {
    pub async fn wait_until_held(&self) { self.held.notified().await }

    pub fn release(&self) {
        if let Some(tx) = self.opener.lock().unwrap().take() {
            let _ = tx.send(());
        }
    }
}

#[async_trait]
impl ContactRepository for GatedRepository {
    async fn find_all(&self) -> Result<Vec<Contact>, ServiceError> { self.inner.find_all().await }
    async fn find_by_id(&self, id: i32) -> Result<Option<Contact>, ServiceError> { self.inner.find_by_id(id).await }
    async fn insert(&self, record: ContactRecord) -> Result<Contact, ServiceError> { self.inner.insert(record).await }
    async fn replace(&self, id: i32, expected_filename: Option<&str>, record: ContactRecord) -> Result<Contact, ServiceError> {
        let gate = self.gate.lock().await.take();
        if let Some(rx) = gate {
            self.held.notify_one();
            let _ = rx.await;
        }
        self.inner.replace(id, expected_filename, record).await
    }
    async fn remove(&self, id: i32) -> Result<(), ServiceError> { self.inner.remove(id).await }
}

/// File store keeping names only, with switchable delete failures.
#[derive(Default)]
pub struct MemoryFileStore {
    names: Mutex<HashSet<String>>,
    saves: AtomicUsize,
    fail_deletes: AtomicBool,
}

impl MemoryFileStore {
    pub fn saves(&self) -> usize { self.saves.load(Ordering::SeqCst) }
    pub fn len(&self) -> usize { self.names.lock().unwrap().len() }
    pub fn fail_deletes(&self, on: bool) { self.fail_deletes.store(on, Ordering::SeqCst); }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn save(&self, _bytes: &[u8], original_name: &str) -> Result<String, ServiceError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        let mut names = self.names.lock().unwrap();
        loop {
            let name = generate_name(original_name);
            if names.insert(name.clone()) {
                return Ok(name);
            }
        }
    }

    async fn delete(&self, stored_name: &str) -> Result<(), ServiceError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(ServiceError::Storage("disk unavailable".into()));
        }
        self.names.lock().unwrap().remove(stored_name);
        Ok(())
    }

    async fn exists(&self, stored_name: &str) -> Result<bool, ServiceError> {
        Ok(self.names.lock().unwrap().contains(stored_name))
    }
}
