use std::sync::Arc;
use tracing::info;

use super::permissions::can_record_observation;
use crate::api::{ApiError, ObservationApi};
use crate::models::{BbsObservation, NewBbsObservation, User};
use crate::notify::Notifier;

/// Behavior-based safety observations.
pub struct ObservationService {
    api: Arc<dyn ObservationApi>,
    notifier: Arc<dyn Notifier>,
}

impl ObservationService {
    pub fn new(api: Arc<dyn ObservationApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self { api, notifier }
    }

    pub async fn list(&self) -> Result<Vec<BbsObservation>, ApiError> {
        self.api.list_observations().await.inspect_err(|e| {
            self.notifier.error(&format!("Could not load observations: {e}"));
        })
    }

    /// Record an observation. `observer_id` is overwritten with the actor's id.
    pub async fn record(&self, actor: Option<&User>, mut observation: NewBbsObservation) -> Result<(), ApiError> {
        let result = async {
            let actor = actor.ok_or(ApiError::NotLoggedIn)?;
            if !can_record_observation(actor.role) {
                return Err(ApiError::not_permitted(actor.role, "record BBS observations"));
            }
            if observation.location.trim().is_empty() || observation.description.trim().is_empty() {
                return Err(ApiError::validation("location and description are required"));
            }
            observation.observer_id = actor.id.clone();
            self.api.record_observation(&observation).await?;
            info!(
                observer_id = %actor.id,
                behavior = ?observation.behavior_type,
                category = ?observation.category,
                "BBS observation recorded"
            );
            Ok::<(), ApiError>(())
        }
        .await;

        match &result {
            Ok(()) => self.notifier.success("Observation recorded"),
            Err(e) => self.notifier.error(&format!("Could not record observation: {e}")),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mocks::InMemoryBackend;
    use crate::models::{ActionTaken, BehaviorType, Role, SafetyCategory};
    use crate::notify::RecordingNotifier;

    fn observation() -> NewBbsObservation {
        NewBbsObservation {
            location: "Loading bay".into(),
            behavior_type: BehaviorType::Unsafe,
            category: SafetyCategory::Ppe,
            description: "No gloves while handling sheet metal".into(),
            action_taken: ActionTaken::VerbalWarning,
            observer_id: String::new(),
        }
    }

    fn user(role: Role) -> User {
        User {
            id: "obs-1".into(),
            full_name: "Observer".into(),
            department: None,
            role,
        }
    }

    #[tokio::test]
    async fn area_owner_records_with_own_id() {
        let backend = Arc::new(InMemoryBackend::new());
        let service = ObservationService::new(backend.clone(), Arc::new(RecordingNotifier::new()));

        service.record(Some(&user(Role::AreaOwner)), observation()).await.unwrap();
        let stored = backend.observations();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].observer_id.as_deref(), Some("obs-1"));
    }

    #[tokio::test]
    async fn contractors_cannot_record() {
        let backend = Arc::new(InMemoryBackend::new());
        let service = ObservationService::new(backend.clone(), Arc::new(RecordingNotifier::new()));

        let err = service
            .record(Some(&user(Role::Contractor)), observation())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotPermitted { .. }));
        assert!(backend.calls().is_empty());
    }
}
