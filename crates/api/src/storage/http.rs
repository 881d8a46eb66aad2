//! Hosted object storage reached over a REST API.
//!
//! Objects live at `{base_url}/object/{bucket}/{key}` in a private bucket.
//! Playback URLs are minted by `POST {base_url}/object/sign/{bucket}/{key}`.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;

use super::{check_key, StorageError, StorageProvider};

pub struct HttpObjectStorage {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
    service_key: String,
}

impl HttpObjectStorage {
    #[must_use]
    pub fn new(base_url: String, bucket: String, service_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket,
            service_key,
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/object/{}/{key}", self.base_url, self.bucket)
    }

    fn sign_url(&self, key: &str) -> String {
        format!("{}/object/sign/{}/{key}", self.base_url, self.bucket)
    }

    async fn check_status(resp: reqwest::Response) -> Result<(), StorageError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(StorageError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl StorageProvider for HttpObjectStorage {
    fn backend_tag(&self) -> &'static str {
        "http"
    }

    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), StorageError> {
        check_key(key)?;
        let resp = self
            .client
            .post(self.object_url(key))
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .header("x-upsert", "true")
            .header(CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await?;
        Self::check_status(resp).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        check_key(key)?;
        let resp = self
            .client
            .delete(self.object_url(key))
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .send()
            .await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::check_status(resp).await
    }

    async fn playback_url(&self, key: &str, ttl_secs: i64) -> Result<String, StorageError> {
        check_key(key)?;
        let resp = self
            .client
            .post(self.sign_url(key))
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .json(&serde_json::json!({ "expiresIn": ttl_secs }))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StorageError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let signed: SignedUrl = resp.json().await?;
        Ok(absolute_signed_url(&self.base_url, &signed.signed_url))
    }
}

#[derive(Debug, Deserialize)]
struct SignedUrl {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

/// The backend answers with a path relative to `base_url`.
fn absolute_signed_url(base_url: &str, signed: &str) -> String {
    if signed.starts_with("http://") || signed.starts_with("https://") {
        signed.to_string()
    } else {
        format!("{base_url}/{}", signed.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_built_from_base_and_bucket() {
        let store = HttpObjectStorage::new(
            "https://files.example.com/storage/v1/".into(),
            "audio".into(),
            "key".into(),
        );
        assert_eq!(
            store.object_url("audio/1-a.mp3"),
            "https://files.example.com/storage/v1/object/audio/audio/1-a.mp3"
        );
        assert_eq!(
            store.sign_url("audio/1-a.mp3"),
            "https://files.example.com/storage/v1/object/sign/audio/audio/1-a.mp3"
        );
    }

    #[test]
    fn relative_signed_paths_are_made_absolute() {
        let base = "https://files.example.com/storage/v1";
        assert_eq!(
            absolute_signed_url(base, "/object/sign/audio/a.mp3?token=t"),
            "https://files.example.com/storage/v1/object/sign/audio/a.mp3?token=t"
        );
        assert_eq!(
            absolute_signed_url(base, "https://cdn.example.com/a.mp3?token=t"),
            "https://cdn.example.com/a.mp3?token=t"
        );
    }
}
