use async_trait::async_trait;
use reqwest::Method;

use super::client::ApiClient;
use super::errors::ApiError;
use super::traits::EquipmentApi;
use crate::models::{Equipment, InspectionReport};

#[async_trait]
impl EquipmentApi for ApiClient {
    /// Look up equipment by the code printed on its QR tag.
    async fn find_equipment(&self, code: &str) -> Result<Equipment, ApiError> {
        self.get_json(&format!("/equipment/{code}")).await
    }

    async fn record_inspection(&self, equipment_id: &str, report: &InspectionReport) -> Result<(), ApiError> {
        self.send_discard(Method::PUT, &format!("/equipment/{equipment_id}/inspect"), Some(report))
            .await
    }
}
