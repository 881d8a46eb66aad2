//! Filesystem storage backend. Objects are served by the app under `/media`,
//! only to requests carrying a valid signature from [`serene_core::media`].

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use serene_core::media;

use super::{check_key, StorageError, StorageProvider};

/// Stores objects as files below `root`.
pub struct LocalStorage {
    root: PathBuf,
    public_base_url: String,
    signing_secret: String,
}

impl LocalStorage {
    #[must_use]
    pub fn new(root: PathBuf, public_base_url: String, signing_secret: String) -> Self {
        Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            signing_secret,
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        check_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl StorageProvider for LocalStorage {
    fn backend_tag(&self) -> &'static str {
        "local"
    }

    async fn put(&self, key: &str, data: Vec<u8>, _content_type: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, data).await?;
        tracing::debug!(key, path = %path.display(), "Stored object");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn playback_url(&self, key: &str, ttl_secs: i64) -> Result<String, StorageError> {
        check_key(key)?;
        let expires = Utc::now().timestamp() + ttl_secs;
        Ok(format!(
            "{}/{key}?{}",
            self.public_base_url,
            media::signed_query(&self.signing_secret, key, expires)
        ))
    }
}
