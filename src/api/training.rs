use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;

use super::client::ApiClient;
use super::errors::ApiError;
use super::traits::TrainingApi;
use crate::models::{Course, TrainingRecord, TrainingSubmission};

#[derive(Deserialize)]
struct TrainingResponse {
    record: TrainingRecord,
}

#[async_trait]
impl TrainingApi for ApiClient {
    async fn list_courses(&self) -> Result<Vec<Course>, ApiError> {
        self.get_json("/courses").await
    }

    async fn submit_training(&self, submission: &TrainingSubmission) -> Result<TrainingRecord, ApiError> {
        let response: TrainingResponse = self
            .send_json(Method::POST, "/training-records", submission)
            .await?;
        Ok(response.record)
    }
}
