//! Object storage for uploaded audio.
//!
//! Handlers talk to a [`StorageProvider`] trait object held in
//! [`AppState`](crate::state::AppState); the concrete backend is picked from
//! [`StorageConfig`] at startup.

pub mod http;
pub mod local;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::StorageConfig;

pub use http::HttpObjectStorage;
pub use local::LocalStorage;

/// Errors raised by storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Storage backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),
}

/// A place to put, remove and link to stored objects.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Short name used in logs.
    fn backend_tag(&self) -> &'static str;

    /// Store `data` under `key`, replacing any existing object.
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), StorageError>;

    /// Remove the object under `key`. Removing a missing object succeeds.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Short-lived URL a client can fetch the object from.
    async fn playback_url(&self, key: &str, ttl_secs: i64) -> Result<String, StorageError>;
}

/// Build the configured storage backend.
pub fn from_config(config: &StorageConfig) -> Arc<dyn StorageProvider> {
    match config {
        StorageConfig::Local {
            root,
            public_base_url,
            signing_secret,
        } => Arc::new(LocalStorage::new(
            root.clone(),
            public_base_url.clone(),
            signing_secret.clone(),
        )),
        StorageConfig::Http {
            base_url,
            bucket,
            service_key,
        } => Arc::new(HttpObjectStorage::new(
            base_url.clone(),
            bucket.clone(),
            service_key.clone(),
        )),
    }
}

/// Reject keys that could escape the storage root or bucket.
pub(crate) fn check_key(key: &str) -> Result<(), StorageError> {
    let bad = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..");
    if bad {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}
