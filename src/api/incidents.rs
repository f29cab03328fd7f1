use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;

use super::client::ApiClient;
use super::errors::ApiError;
use super::traits::IncidentApi;
use crate::models::{Incident, IncidentStatus, NewIncident};

#[async_trait]
impl IncidentApi for ApiClient {
    async fn list_incidents(&self) -> Result<Vec<Incident>, ApiError> {
        self.get_json("/incidents").await
    }

    async fn report_incident(&self, incident: &NewIncident) -> Result<(), ApiError> {
        self.send_discard(Method::POST, "/incidents", Some(incident)).await
    }

    async fn update_incident_status(&self, incident_id: &str, status: IncidentStatus) -> Result<(), ApiError> {
        self.send_discard(
            Method::PUT,
            &format!("/incidents/{incident_id}/status"),
            Some(&json!({ "status": status })),
        )
        .await
    }
}
