//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` so the server crate can prepare the
//! public and upload directories through the service crate.

/// Ensure the upload directory exists; warn on a missing public directory.
pub async fn ensure_env(public_dir: &str, upload_dir: &str) -> anyhow::Result<()> {
    common::env::ensure_env(public_dir, upload_dir).await
}
