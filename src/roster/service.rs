use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::board::RosterBoard;
use crate::api::{ApiError, RosterApi};
use crate::models::{CheckIn, ConfinedSpacePermit, EntryRole, Evacuate, User};
use crate::notify::Notifier;

/// Check-in, check-out and evacuation for confined-space permits.
pub struct RosterService {
    api: Arc<dyn RosterApi>,
    notifier: Arc<dyn Notifier>,
    overdue_after_minutes: i64,
    selected: RwLock<Option<String>>,
}

impl RosterService {
    pub fn new(api: Arc<dyn RosterApi>, notifier: Arc<dyn Notifier>, overdue_after_minutes: i64) -> Self {
        Self {
            api,
            notifier,
            overdue_after_minutes,
            selected: RwLock::new(None),
        }
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// Active confined-space permits. Selects the first one when nothing is
    /// selected yet.
    pub async fn active_permits(&self) -> Result<Vec<ConfinedSpacePermit>, ApiError> {
        let permits = self.api.active_permits().await.inspect_err(|e| {
            self.notifier.error(&format!("Could not load confined-space permits: {e}"));
        })?;

        let mut selected = self.selected.write().await;
        if selected.is_none() {
            *selected = permits.first().map(|p| p.id.clone());
        }
        Ok(permits)
    }

    pub async fn select(&self, permit_id: impl Into<String>) {
        *self.selected.write().await = Some(permit_id.into());
    }

    pub async fn selected(&self) -> Option<String> {
        self.selected.read().await.clone()
    }

    pub async fn board(&self, permit_id: &str, now: DateTime<Utc>) -> Result<RosterBoard, ApiError> {
        let entries = self.api.entries(permit_id).await?;
        Ok(RosterBoard::from_entries(entries, now, self.overdue_after_minutes))
    }

    pub async fn check_in(&self, permit_id: &str, worker_name: &str, role: EntryRole) -> Result<(), ApiError> {
        let result = async {
            if permit_id.trim().is_empty() {
                return Err(ApiError::validation("select a confined-space permit first"));
            }
            if worker_name.trim().is_empty() {
                return Err(ApiError::validation("worker name is required"));
            }
            self.api
                .check_in(&CheckIn {
                    permit_id: permit_id.to_string(),
                    worker_name: worker_name.trim().to_string(),
                    role,
                })
                .await
        }
        .await;

        match &result {
            Ok(()) => {
                info!(permit_id, worker_name, role = ?role, "Worker checked in");
                self.notifier.success(&format!("{} checked in", worker_name.trim()));
            }
            Err(e) => self.notifier.error(&format!("Check-in failed: {e}")),
        }
        result
    }

    pub async fn check_out(&self, entry_id: &str) -> Result<(), ApiError> {
        let result = self.api.check_out(entry_id).await;
        match &result {
            Ok(()) => {
                info!(entry_id, "Worker checked out");
                self.notifier.success("Worker checked out");
            }
            Err(e) => self.notifier.error(&format!("Check-out failed: {e}")),
        }
        result
    }

    /// One request; the backend moves every INSIDE entry of the permit to
    /// OUTSIDE and raises the emergency alert.
    pub async fn evacuate_all(&self, actor: &User, permit_id: &str) -> Result<(), ApiError> {
        let result = self
            .api
            .evacuate(&Evacuate {
                permit_id: permit_id.to_string(),
                triggered_by: actor.full_name.clone(),
            })
            .await;
        match &result {
            Ok(()) => {
                warn!(permit_id, triggered_by = %actor.full_name, "Evacuation triggered");
                self.notifier.warning("Evacuation ordered: every worker has been signed out");
            }
            Err(e) => self.notifier.error(&format!("Evacuation request failed: {e}")),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mocks::InMemoryBackend;
    use crate::models::{EntryStatus, Role};
    use crate::notify::RecordingNotifier;

    fn service(backend: Arc<InMemoryBackend>) -> RosterService {
        RosterService::new(backend, Arc::new(RecordingNotifier::new()), 60)
    }

    #[tokio::test]
    async fn first_active_permit_is_selected() {
        let backend = Arc::new(InMemoryBackend::new());
        for id in ["cs-1", "cs-2"] {
            backend.add_active_confined(ConfinedSpacePermit {
                id: id.into(),
                permit_number: None,
                location_detail: None,
            });
        }
        let service = service(backend);

        service.active_permits().await.unwrap();
        assert_eq!(service.selected().await.as_deref(), Some("cs-1"));

        service.select("cs-2").await;
        service.active_permits().await.unwrap();
        assert_eq!(service.selected().await.as_deref(), Some("cs-2"));
    }

    #[tokio::test]
    async fn check_in_validates_before_dispatch() {
        let backend = Arc::new(InMemoryBackend::new());
        let service = service(backend.clone());

        let err = service.check_in("cs-1", "   ", EntryRole::Entrant).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        let err = service.check_in("", "Anan", EntryRole::Entrant).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn check_in_then_out() {
        let backend = Arc::new(InMemoryBackend::new());
        let service = service(backend.clone());

        service.check_in("cs-1", "Anan", EntryRole::Entrant).await.unwrap();
        let entry = backend.entries_for("cs-1").remove(0);
        assert_eq!(entry.status, EntryStatus::Inside);

        service.check_out(&entry.id).await.unwrap();
        let entry = backend.entries_for("cs-1").remove(0);
        assert_eq!(entry.status, EntryStatus::Outside);
        assert!(entry.time_out.is_some());
    }

    #[tokio::test]
    async fn evacuation_is_one_request_naming_the_actor() {
        let backend = Arc::new(InMemoryBackend::new());
        let service = service(backend.clone());
        service.check_in("cs-1", "A", EntryRole::Entrant).await.unwrap();
        service.check_in("cs-1", "B", EntryRole::Standby).await.unwrap();

        let actor = User {
            id: "u-1".into(),
            full_name: "Site Supervisor".into(),
            department: None,
            role: Role::AreaOwner,
        };
        service.evacuate_all(&actor, "cs-1").await.unwrap();

        assert_eq!(backend.call_count("evacuate"), 1);
        assert_eq!(backend.evacuations()[0].triggered_by, "Site Supervisor");
        let board = service.board("cs-1", Utc::now()).await.unwrap();
        assert_eq!(board.inside_count(), 0);
        assert_eq!(board.logged_out.len(), 2);
    }
}
