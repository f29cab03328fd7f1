//! Object storage for uploaded documents.
//!
//! Permit JSA files, certificate scans and incident photos are pushed to a
//! bucket and referenced afterwards by their public URL.

pub mod supabase;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use std::path::Path;
use std::sync::Arc;

use crate::api::ApiError;
use crate::config::StorageConfig;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

pub use supabase::SupabaseStore;

/// Key prefix for certificate documents.
pub const CERTIFICATE_PREFIX: &str = "certs/";
/// Key prefix for incident photos.
pub const INCIDENT_PREFIX: &str = "incidents/";

/// Upload seam. One awaited call per file; no chunking or resume.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `bucket/key` and return the public URL.
    async fn upload(&self, bucket: &str, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, ApiError>;
}

/// A file the user attached to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    pub async fn read(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::Storage(format!("cannot read {}: {e}", path.display())))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        Ok(Self::new(file_name, bytes))
    }

    pub fn extension(&self) -> &str {
        match self.file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext,
            _ => "bin",
        }
    }
}

/// Collision-resistant object key: `<prefix><unix millis>-<0..1000>.<ext>`.
pub fn object_key(prefix: &str, attachment: &Attachment) -> String {
    let suffix: u32 = rand::rng().random_range(0..1000);
    format!(
        "{prefix}{}-{suffix}.{}",
        Utc::now().timestamp_millis(),
        attachment.extension()
    )
}

/// Upload `attachment` under a fresh key and return its public URL.
pub async fn upload_attachment(
    store: &dyn ObjectStore,
    bucket: &str,
    prefix: &str,
    attachment: &Attachment,
) -> Result<String, ApiError> {
    let key = object_key(prefix, attachment);
    tracing::debug!(bucket, key = %key, size = attachment.bytes.len(), "Uploading attachment");
    store
        .upload(bucket, &key, attachment.bytes.clone(), &attachment.content_type)
        .await
}

/// Store used when no storage service is configured. Every upload fails.
#[derive(Debug, Default)]
pub struct DisabledStore;

#[async_trait]
impl ObjectStore for DisabledStore {
    async fn upload(&self, _bucket: &str, _key: &str, _bytes: Vec<u8>, _content_type: &str) -> Result<String, ApiError> {
        Err(ApiError::Storage(
            "object storage is not configured (set storage.url and storage.api_key)".into(),
        ))
    }
}

pub fn from_config(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>, ApiError> {
    match (&config.url, &config.api_key) {
        (Some(url), Some(key)) => Ok(Arc::new(SupabaseStore::new(url, key)?)),
        _ => Ok(Arc::new(DisabledStore)),
    }
}
