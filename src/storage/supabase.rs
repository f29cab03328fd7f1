use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

use super::ObjectStore;
use crate::api::ApiError;

/// Supabase storage over its REST interface.
#[derive(Debug, Clone)]
pub struct SupabaseStore {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl SupabaseStore {
    pub fn new(url: &str, api_key: &str) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            url: url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/storage/v1/object/public/{bucket}/{key}", self.url)
    }
}

#[async_trait]
impl ObjectStore for SupabaseStore {
    async fn upload(&self, bucket: &str, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, ApiError> {
        let endpoint = format!("{}/storage/v1/object/{bucket}/{key}", self.url);
        let response = self
            .http
            .post(&endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| ApiError::Storage(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(bucket, key, status = status.as_u16(), "Storage upload rejected");
            return Err(ApiError::Storage(format!("HTTP {}: {}", status.as_u16(), body.trim())));
        }

        Ok(self.public_url(bucket, key))
    }
}
