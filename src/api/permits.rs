use async_trait::async_trait;
use reqwest::Method;

use super::client::ApiClient;
use super::errors::ApiError;
use super::traits::PermitApi;
use crate::models::{NewPermit, Permit, PermitUpdate};

#[async_trait]
impl PermitApi for ApiClient {
    async fn list_permits(&self) -> Result<Vec<Permit>, ApiError> {
        self.get_json("/permits").await
    }

    async fn create_permit(&self, permit: &NewPermit) -> Result<(), ApiError> {
        self.send_discard(Method::POST, "/permits", Some(permit)).await
    }

    async fn update_permit(&self, permit_id: &str, update: &PermitUpdate) -> Result<(), ApiError> {
        self.send_discard(Method::PUT, &format!("/permits/{permit_id}"), Some(update))
            .await
    }
}
