use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;

use super::client::ApiClient;
use super::errors::ApiError;
use super::traits::DirectoryApi;
use crate::models::{Credentials, Dashboard, User};

#[derive(Deserialize)]
struct LoginResponse {
    user: User,
}

#[async_trait]
impl DirectoryApi for ApiClient {
    async fn login(&self, credentials: &Credentials) -> Result<User, ApiError> {
        let response: LoginResponse = self.send_json(Method::POST, "/login", credentials).await?;
        Ok(response.user)
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.get_json("/users").await
    }

    async fn dashboard(&self) -> Result<Dashboard, ApiError> {
        self.get_json("/dashboard").await
    }
}
