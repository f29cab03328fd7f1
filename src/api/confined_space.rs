use async_trait::async_trait;
use reqwest::Method;

use super::client::ApiClient;
use super::errors::ApiError;
use super::traits::RosterApi;
use crate::models::{CheckIn, ConfinedSpaceEntry, ConfinedSpacePermit, Evacuate};

#[async_trait]
impl RosterApi for ApiClient {
    async fn active_permits(&self) -> Result<Vec<ConfinedSpacePermit>, ApiError> {
        self.get_json("/confined-space/active-permits").await
    }

    async fn entries(&self, permit_id: &str) -> Result<Vec<ConfinedSpaceEntry>, ApiError> {
        self.get_json(&format!("/confined-space/{permit_id}/entries")).await
    }

    async fn check_in(&self, check_in: &CheckIn) -> Result<(), ApiError> {
        self.send_discard(Method::POST, "/confined-space/in", Some(check_in))
            .await
    }

    async fn check_out(&self, entry_id: &str) -> Result<(), ApiError> {
        self.send_discard::<()>(Method::PUT, &format!("/confined-space/out/{entry_id}"), None)
            .await
    }

    // The backend fans this out to every INSIDE entry of the permit and
    // raises the emergency alert.
    async fn evacuate(&self, evacuate: &Evacuate) -> Result<(), ApiError> {
        self.send_discard(Method::POST, "/confined-space/evacuate", Some(evacuate))
            .await
    }
}
