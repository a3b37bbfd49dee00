//! Client for the hosted object-storage HTTP API.
//!
//! Uploaded logos live in a single bucket which is created lazily on the
//! first upload. All calls use the service-role key; nothing here is exposed
//! to browsers directly.

use once_cell::sync::Lazy;
use reqwest::StatusCode;
use serde_json::json;
use tracing::info;

use crate::config;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Object storage not configured")]
    NotConfigured,

    #[error("Storage request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Storage rejected request: {status} {body}")]
    Rejected { status: StatusCode, body: String },
}

static CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

pub struct StorageService;

impl StorageService {
    /// Upload logo bytes and return the object path stored on the record
    pub async fn upload_logo(
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        let storage = &config::config().storage;
        if storage.url.is_empty() || storage.service_key.is_empty() {
            return Err(StorageError::NotConfigured);
        }

        Self::ensure_bucket(&storage.logo_bucket).await?;

        let object_path = format!("{}/{}", storage.logo_bucket, sanitize_file_name(file_name));
        let url = format!("{}/object/{}", storage.url.trim_end_matches('/'), object_path);

        let res = CLIENT
            .post(&url)
            .bearer_auth(&storage.service_key)
            .header("content-type", content_type.to_string())
            .body(bytes)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(StorageError::Rejected { status, body });
        }

        Ok(object_path)
    }

    /// Create the bucket if it does not exist yet. A conflict means another
    /// request (or an earlier deploy) already created it.
    async fn ensure_bucket(bucket: &str) -> Result<(), StorageError> {
        let storage = &config::config().storage;
        let url = format!("{}/bucket", storage.url.trim_end_matches('/'));

        let res = CLIENT
            .post(&url)
            .bearer_auth(&storage.service_key)
            .json(&json!({ "name": bucket, "public": true }))
            .send()
            .await?;

        match res.status() {
            s if s.is_success() => {
                info!("Created storage bucket: {}", bucket);
                Ok(())
            }
            StatusCode::CONFLICT => Ok(()),
            status => {
                let body = res.text().await.unwrap_or_default();
                Err(StorageError::Rejected { status, body })
            }
        }
    }
}

/// Keep object keys to a safe character set
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.' || c == '_') {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_file_names() {
        assert_eq!(sanitize_file_name("logo.png"), "logo.png");
        assert_eq!(sanitize_file_name("minha logo (1).png"), "minha_logo__1_.png");
        assert_eq!(sanitize_file_name("../../etc/passwd"), ".._.._etc_passwd");
    }

    #[test]
    fn degenerate_names_get_a_default() {
        assert_eq!(sanitize_file_name(""), "upload");
        assert_eq!(sanitize_file_name("..."), "upload");
    }
}
