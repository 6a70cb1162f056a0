use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, warn};

use crate::errors::ServiceError;

const MAX_NAME_ATTEMPTS: usize = 8;
const MAX_EXTENSION_LEN: usize = 16;

/// Persists uploaded bytes under generated, collision-free names.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store `bytes` and return the generated name. Never overwrites an entry.
    async fn save(&self, bytes: &[u8], original_name: &str) -> Result<String, ServiceError>;
    /// Remove an entry. Removing a name that does not exist succeeds.
    async fn delete(&self, stored_name: &str) -> Result<(), ServiceError>;
    async fn exists(&self, stored_name: &str) -> Result<bool, ServiceError>;
}

/// Filesystem-backed store keeping every file directly under `root`.
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    /// Open the store, creating the root directory when missing.
    pub async fn new<P: Into<PathBuf>>(root: P) -> Result<Arc<Self>, ServiceError> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(ServiceError::storage)?;
        Ok(Arc::new(Self { root }))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, stored_name: &str) -> Result<PathBuf, ServiceError> {
        let mut parts = Path::new(stored_name).components();
        match (parts.next(), parts.next()) {
            (Some(Component::Normal(_)), None) if !stored_name.contains('\\') => Ok(self.root.join(stored_name)),
            _ => Err(ServiceError::Storage(format!("illegal stored file name: {:?}", stored_name))),
        }
    }
}

/// `<unix-millis>-<random>[.ext]`, keeping a sanitized form of the original extension.
pub fn generate_name(original_name: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    match extension_of(original_name) {
        Some(ext) => format!("{}-{}.{}", Utc::now().timestamp_millis(), suffix, ext),
        None => format!("{}-{}", Utc::now().timestamp_millis(), suffix),
    }
}

fn extension_of(original_name: &str) -> Option<String> {
    let ext = Path::new(original_name).extension()?.to_str()?;
    let clean: String = ext
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(MAX_EXTENSION_LEN)
        .collect::<String>()
        .to_ascii_lowercase();
    if clean.is_empty() { None } else { Some(clean) }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn save(&self, bytes: &[u8], original_name: &str) -> Result<String, ServiceError> {
        for _ in 0..MAX_NAME_ATTEMPTS {
            let name = generate_name(original_name);
            let path = self.root.join(&name);
            let mut file = match fs::OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(f) => f,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!(%name, "stored name collision, regenerating");
                    continue;
                }
                Err(e) => return Err(ServiceError::storage(e)),
            };
            let written = match file.write_all(bytes).await {
                Ok(()) => file.flush().await,
                Err(e) => Err(e),
            };
            if let Err(e) = written {
                drop(file);
                if let Err(rm) = fs::remove_file(&path).await {
                    warn!(%name, error = %rm, "failed to remove partial upload");
                }
                return Err(ServiceError::storage(e));
            }
            debug!(%name, size = bytes.len(), "file_saved");
            return Ok(name);
        }
        Err(ServiceError::Storage("could not allocate a unique file name".into()))
    }

    async fn delete(&self, stored_name: &str) -> Result<(), ServiceError> {
        let path = self.path_for(stored_name)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(name = %stored_name, "file_deleted");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ServiceError::storage(e)),
        }
    }

    async fn exists(&self, stored_name: &str) -> Result<bool, ServiceError> {
        let path = self.path_for(stored_name)?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ServiceError::storage(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    async fn temp_store() -> Result<Arc<LocalFileStore>, ServiceError> {
        LocalFileStore::new(std::env::temp_dir().join(format!("contact_files_{}", uuid::Uuid::new_v4()))).await
    }

    #[test]
    fn names_keep_a_clean_extension() {
        assert!(generate_name("me.PNG").ends_with(".png"));
        assert!(generate_name("archive.tar.gz").ends_with(".gz"));
        assert!(!generate_name("README").contains('.'));
        assert!(!generate_name("weird.p/n?g").contains('/'));
        assert_eq!(extension_of("x.."), None);
    }

    #[tokio::test]
    async fn save_then_delete() -> Result<(), anyhow::Error> {
        let store = temp_store().await?;
        let name = store.save(b"\x89PNG", "avatar.png").await?;
        assert!(name.ends_with(".png"));
        assert!(store.exists(&name).await?);
        assert_eq!(fs::read(store.root().join(&name)).await?, b"\x89PNG");

        store.delete(&name).await?;
        assert!(!store.exists(&name).await?);
        // second delete of the same name is fine
        store.delete(&name).await?;

        let _ = fs::remove_dir_all(store.root()).await;
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_saves_get_distinct_names() -> Result<(), anyhow::Error> {
        let store = temp_store().await?;
        let mut handles = Vec::new();
        for i in 0..16u8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move { store.save(&[i], "a.jpg").await }));
        }
        let mut names = HashSet::new();
        for h in handles {
            names.insert(h.await??);
        }
        assert_eq!(names.len(), 16);
        for name in &names {
            assert!(store.exists(name).await?);
        }
        let _ = fs::remove_dir_all(store.root()).await;
        Ok(())
    }

    #[tokio::test]
    async fn exists_reports_io_failures() -> Result<(), anyhow::Error> {
        let store = temp_store().await?;
        assert!(!store.exists("1700000000000-1.png").await?);

        // root turned into a plain file: lookups fail with something other than NotFound
        fs::remove_dir_all(store.root()).await?;
        fs::write(store.root(), b"not a directory").await?;
        let res = store.exists("1700000000000-1.png").await;
        fs::remove_file(store.root()).await?;
        assert!(matches!(res, Err(ServiceError::Storage(_))));
        Ok(())
    }

    #[tokio::test]
    async fn traversal_names_are_rejected() -> Result<(), anyhow::Error> {
        let store = temp_store().await?;
        for bad in ["../secret", "a/b.png", "..", "", "/etc/passwd", "a\\b"] {
            assert!(matches!(store.delete(bad).await, Err(ServiceError::Storage(_))), "{bad}");
        }
        let _ = fs::remove_dir_all(store.root()).await;
        Ok(())
    }
}
