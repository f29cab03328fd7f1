use std::sync::Arc;
use tracing::info;

use super::permissions::can_update_incident;
use super::state_machine::next_incident_status;
use crate::api::{ApiError, IncidentApi};
use crate::models::{Incident, IncidentStatus, IncidentType, NewIncident, User};
use crate::notify::Notifier;
use crate::storage::{upload_attachment, Attachment, ObjectStore, INCIDENT_PREFIX};

#[derive(Debug, Clone)]
pub struct IncidentDraft {
    pub title: String,
    pub description: String,
    pub incident_type: IncidentType,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub photo: Option<Attachment>,
}

pub struct IncidentService {
    api: Arc<dyn IncidentApi>,
    store: Arc<dyn ObjectStore>,
    notifier: Arc<dyn Notifier>,
    bucket: String,
}

impl IncidentService {
    pub fn new(
        api: Arc<dyn IncidentApi>,
        store: Arc<dyn ObjectStore>,
        notifier: Arc<dyn Notifier>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            api,
            store,
            notifier,
            bucket: bucket.into(),
        }
    }

    pub async fn list(&self) -> Result<Vec<Incident>, ApiError> {
        self.api.list_incidents().await.inspect_err(|e| {
            self.notifier.error(&format!("Could not load incidents: {e}"));
        })
    }

    /// Anyone logged in may report. The photo is optional.
    pub async fn report(&self, reporter: Option<&User>, draft: IncidentDraft) -> Result<(), ApiError> {
        let result = self.try_report(reporter, draft).await;
        match &result {
            Ok(()) => self.notifier.success("Incident reported"),
            Err(e) => self.notifier.error(&format!("Incident report failed: {e}")),
        }
        result
    }

    async fn try_report(&self, reporter: Option<&User>, draft: IncidentDraft) -> Result<(), ApiError> {
        let reporter = reporter.ok_or(ApiError::NotLoggedIn)?;
        if draft.title.trim().is_empty() {
            return Err(ApiError::validation("an incident needs a title"));
        }

        let image_url = match &draft.photo {
            Some(photo) => {
                Some(upload_attachment(self.store.as_ref(), &self.bucket, INCIDENT_PREFIX, photo).await?)
            }
            None => None,
        };

        self.api
            .report_incident(&NewIncident {
                reporter_id: reporter.id.clone(),
                title: draft.title.trim().to_string(),
                description: draft.description,
                incident_type: draft.incident_type,
                lat: draft.lat,
                lng: draft.lng,
                image_url,
            })
            .await?;
        info!(reporter_id = %reporter.id, incident_type = ?draft.incident_type, "Incident reported");
        Ok(())
    }

    /// Move an incident one step along OPEN, IN_PROGRESS, RESOLVED.
    pub async fn advance(&self, actor: &User, incident: &Incident) -> Result<IncidentStatus, ApiError> {
        let result = self.try_advance(actor, incident).await;
        match &result {
            Ok(status) => self
                .notifier
                .success(&format!("Incident \"{}\" is now {status:?}", incident.title)),
            Err(e) => self.notifier.error(&format!("Could not update incident: {e}")),
        }
        result
    }

    async fn try_advance(&self, actor: &User, incident: &Incident) -> Result<IncidentStatus, ApiError> {
        let next = next_incident_status(incident.status)?;
        if !can_update_incident(actor.role, incident.status) {
            return Err(ApiError::not_permitted(actor.role, "change incident status"));
        }
        self.api.update_incident_status(&incident.id, next).await?;
        info!(incident_id = %incident.id, from = ?incident.status, to = ?next, "Incident status changed");
        Ok(next)
    }
}
