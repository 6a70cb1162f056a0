#![allow(dead_code)]
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use configs::StorageConfig;
use service::contact::repository::memory::InMemoryContactRepository;
use service::storage::LocalFileStore;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::routes::{build_router, ServerState};

pub const BOUNDARY: &str = "contacts-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub public_dir: PathBuf,
    pub upload_dir: PathBuf,
}

impl TestApp {
    pub async fn cleanup(&self) {
        let _ = tokio::fs::remove_dir_all(&self.public_dir).await;
    }
}

pub async fn build_app_with_limit(max_upload_bytes: usize) -> anyhow::Result<TestApp> {
    let public_dir = std::env::temp_dir().join(format!("contacts_public_{}", Uuid::new_v4()));
    let upload_dir = public_dir.join("images");
    let files = LocalFileStore::new(&upload_dir).await?;
    let state = ServerState::new(Arc::new(InMemoryContactRepository::default()), files);
    let storage = StorageConfig {
        public_dir: public_dir.to_string_lossy().into_owned(),
        upload_dir: upload_dir.to_string_lossy().into_owned(),
        max_upload_bytes,
    };
    let router = build_router(state, CorsLayer::very_permissive(), &storage);
    Ok(TestApp { router, public_dir, upload_dir })
}

pub async fn build_app() -> anyhow::Result<TestApp> {
    build_app_with_limit(StorageConfig::default().max_upload_bytes).await
}

/// Hand-built multipart body with text fields and an optional `image` part.
pub fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes());
    }
    if let Some((filename, bytes)) = image {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

pub const ADA: [(&str, &str); 4] = [
    ("firstName", "Ada"),
    ("lastName", "Lovelace"),
    ("email", "ada@x.io"),
    ("phone", "555-0100"),
];
