use async_trait::async_trait;
use reqwest::Method;

use super::client::ApiClient;
use super::errors::ApiError;
use super::traits::ObservationApi;
use crate::models::{BbsObservation, NewBbsObservation};

#[async_trait]
impl ObservationApi for ApiClient {
    async fn list_observations(&self) -> Result<Vec<BbsObservation>, ApiError> {
        self.get_json("/bbs").await
    }

    async fn record_observation(&self, observation: &NewBbsObservation) -> Result<(), ApiError> {
        self.send_discard(Method::POST, "/bbs", Some(observation)).await
    }
}
