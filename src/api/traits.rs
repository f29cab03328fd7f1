// Seams between the workflow services and the backend, so services can run
// against an in-memory backend in tests.

use async_trait::async_trait;

use super::errors::ApiError;
use crate::models::*;

#[async_trait]
pub trait PermitApi: Send + Sync {
    async fn list_permits(&self) -> Result<Vec<Permit>, ApiError>;
    async fn create_permit(&self, permit: &NewPermit) -> Result<(), ApiError>;
    async fn update_permit(&self, permit_id: &str, update: &PermitUpdate) -> Result<(), ApiError>;
}

#[async_trait]
pub trait RosterApi: Send + Sync {
    async fn active_permits(&self) -> Result<Vec<ConfinedSpacePermit>, ApiError>;
    async fn entries(&self, permit_id: &str) -> Result<Vec<ConfinedSpaceEntry>, ApiError>;
    async fn check_in(&self, check_in: &CheckIn) -> Result<(), ApiError>;
    async fn check_out(&self, entry_id: &str) -> Result<(), ApiError>;
    async fn evacuate(&self, evacuate: &Evacuate) -> Result<(), ApiError>;
}

#[async_trait]
pub trait ObservationApi: Send + Sync {
    async fn list_observations(&self) -> Result<Vec<BbsObservation>, ApiError>;
    async fn record_observation(&self, observation: &NewBbsObservation) -> Result<(), ApiError>;
}

#[async_trait]
pub trait CertificateApi: Send + Sync {
    async fn list_certificates(&self) -> Result<Vec<Certificate>, ApiError>;
    async fn create_certificate(&self, certificate: &NewCertificate) -> Result<(), ApiError>;
    async fn verify_certificate(&self, certificate_id: &str, status: CertificateStatus) -> Result<(), ApiError>;
}

#[async_trait]
pub trait IncidentApi: Send + Sync {
    async fn list_incidents(&self) -> Result<Vec<Incident>, ApiError>;
    async fn report_incident(&self, incident: &NewIncident) -> Result<(), ApiError>;
    async fn update_incident_status(&self, incident_id: &str, status: IncidentStatus) -> Result<(), ApiError>;
}

#[async_trait]
pub trait EquipmentApi: Send + Sync {
    async fn find_equipment(&self, code: &str) -> Result<Equipment, ApiError>;
    async fn record_inspection(&self, equipment_id: &str, report: &InspectionReport) -> Result<(), ApiError>;
}

#[async_trait]
pub trait TrainingApi: Send + Sync {
    async fn list_courses(&self) -> Result<Vec<Course>, ApiError>;
    async fn submit_training(&self, submission: &TrainingSubmission) -> Result<TrainingRecord, ApiError>;
}

#[async_trait]
pub trait DirectoryApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<User, ApiError>;
    async fn list_users(&self) -> Result<Vec<User>, ApiError>;
    async fn dashboard(&self) -> Result<Dashboard, ApiError>;
}
