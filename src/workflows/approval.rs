use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::permissions::{allowed_permit_actions, can_submit_permit};
use super::state_machine::{next_status, PermitAction};
use crate::api::{ApiError, PermitApi};
use crate::models::{NewPermit, Permit, PermitDescription, PermitStatus, PermitType, PermitUpdate, User};
use crate::notify::Notifier;
use crate::storage::{upload_attachment, Attachment, ObjectStore};

/// Everything a contractor fills in before submitting a permit.
#[derive(Debug, Clone)]
pub struct PermitDraft {
    pub title: String,
    pub description: PermitDescription,
    pub permit_type: PermitType,
    pub location_detail: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub attachments: Vec<Attachment>,
}

impl PermitDraft {
    /// Check every required field and return the work window.
    fn validate(&self) -> Result<(DateTime<Utc>, DateTime<Utc>), ApiError> {
        if self.title.trim().is_empty() {
            return Err(ApiError::validation("a permit needs a title"));
        }
        if self.description.details.trim().is_empty() {
            return Err(ApiError::validation("describe the work to be done"));
        }
        if !matches!(self.description.workers, Some(n) if n > 0) {
            return Err(ApiError::validation("give the number of workers"));
        }
        if self.description.ppe.is_empty() {
            return Err(ApiError::validation("list at least one PPE item"));
        }
        if self.description.safety_measures.is_empty() {
            return Err(ApiError::validation("list at least one safety measure"));
        }
        if self.location_detail.trim().is_empty() {
            return Err(ApiError::validation("a permit needs a location"));
        }
        let (Some(start), Some(end)) = (self.start_time, self.end_time) else {
            return Err(ApiError::validation("a permit needs a start and end time"));
        };
        if end <= start {
            return Err(ApiError::validation("the end time must be after the start time"));
        }
        if self.attachments.is_empty() {
            return Err(ApiError::validation("attach at least one JSA document"));
        }
        Ok((start, end))
    }
}

/// Runs permit submissions and approvals against the backend and keeps the
/// last server-confirmed permit list.
///
/// The list is only ever replaced wholesale by a fresh fetch after a
/// mutation. A failed mutation therefore leaves it at its last-known-good
/// state. Concurrent approvals of the same permit are not guarded here; the
/// backend decides which write wins.
pub struct ApprovalService {
    api: Arc<dyn PermitApi>,
    store: Arc<dyn ObjectStore>,
    notifier: Arc<dyn Notifier>,
    bucket: String,
    permits: RwLock<Vec<Permit>>,
}

impl ApprovalService {
    pub fn new(
        api: Arc<dyn PermitApi>,
        store: Arc<dyn ObjectStore>,
        notifier: Arc<dyn Notifier>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            api,
            store,
            notifier,
            bucket: bucket.into(),
            permits: RwLock::new(Vec::new()),
        }
    }

    /// Re-read the full permit list from the backend.
    pub async fn refresh(&self) -> Result<Vec<Permit>, ApiError> {
        match self.api.list_permits().await {
            Ok(permits) => {
                *self.permits.write().await = permits.clone();
                Ok(permits)
            }
            Err(e) => {
                warn!(error = %e, "Failed to load permits");
                self.notifier.error(&format!("Could not load permits: {e}"));
                Err(e)
            }
        }
    }

    /// Snapshot of the last fetched list.
    pub async fn permits(&self) -> Vec<Permit> {
        self.permits.read().await.clone()
    }

    pub async fn find(&self, permit_id: &str) -> Option<Permit> {
        self.permits
            .read()
            .await
            .iter()
            .find(|p| p.id == permit_id || p.permit_number.as_deref() == Some(permit_id))
            .cloned()
    }

    /// Permits `actor` can act on right now.
    pub async fn actionable_for(&self, actor: &User) -> Vec<Permit> {
        self.permits
            .read()
            .await
            .iter()
            .filter(|p| !allowed_permit_actions(actor.role, p.status).is_empty())
            .cloned()
            .collect()
    }

    /// Apply `action` to a permit currently in `current`, then re-fetch.
    pub async fn transition(
        &self,
        actor: &User,
        permit_id: &str,
        current: PermitStatus,
        action: PermitAction,
    ) -> Result<PermitStatus, ApiError> {
        let result = self.try_transition(actor, permit_id, current, action).await;
        match &result {
            Ok(next) => {
                self.notifier.success(&format!(
                    "Permit {} {}",
                    permit_id,
                    match action {
                        PermitAction::Approve if *next == PermitStatus::Approved => "approved",
                        PermitAction::Approve => "forwarded to the safety engineer",
                        PermitAction::Reject => "rejected",
                    }
                ));
                // The mutation already landed; a failed re-fetch only leaves the view stale.
                let _ = self.refresh().await;
            }
            Err(e) => self.notifier.error(&format!("Could not {action} permit {permit_id}: {e}")),
        }
        result
    }

    async fn try_transition(
        &self,
        actor: &User,
        permit_id: &str,
        current: PermitStatus,
        action: PermitAction,
    ) -> Result<PermitStatus, ApiError> {
        let next = next_status(current, action)?;
        if !allowed_permit_actions(actor.role, current).contains(&action) {
            return Err(ApiError::not_permitted(
                actor.role,
                format!("{action} a permit that is {current}"),
            ));
        }

        let update = PermitUpdate {
            status: next,
            approver_id: actor.id.clone(),
            comment: action.comment().to_string(),
        };
        if let Err(e) = self.api.update_permit(permit_id, &update).await {
            warn!(permit_id, from = %current, to = %next, error = %e, "Permit update failed");
            return Err(e);
        }

        info!(
            permit_id,
            from = %current,
            to = %next,
            approver_id = %actor.id,
            "Permit transitioned"
        );
        Ok(next)
    }

    /// Submit a new permit on behalf of a contractor.
    ///
    /// The first attachment is uploaded before anything is posted; an upload
    /// failure aborts the submission.
    pub async fn submit(&self, actor: Option<&User>, draft: PermitDraft) -> Result<(), ApiError> {
        let result = self.try_submit(actor, draft).await;
        match &result {
            Ok(()) => {
                self.notifier.success("Permit submitted for area owner review");
                let _ = self.refresh().await;
            }
            Err(e) => self.notifier.error(&format!("Permit submission failed: {e}")),
        }
        result
    }

    async fn try_submit(&self, actor: Option<&User>, draft: PermitDraft) -> Result<(), ApiError> {
        let actor = actor.ok_or(ApiError::NotLoggedIn)?;
        if !can_submit_permit(actor.role) {
            return Err(ApiError::not_permitted(actor.role, "submit permits"));
        }
        let (start_time, end_time) = draft.validate()?;

        let attachment = &draft.attachments[0];
        let attachment_url = upload_attachment(self.store.as_ref(), &self.bucket, "", attachment).await?;

        let permit = NewPermit {
            title: draft.title.trim().to_string(),
            description: draft.description.compose(),
            permit_type: draft.permit_type,
            location_detail: draft.location_detail.trim().to_string(),
            start_time,
            end_time,
            applicant_id: actor.id.clone(),
            attachment_url: Some(attachment_url),
            attachment_name: Some(attachment.file_name.clone()),
        };
        self.api.create_permit(&permit).await?;

        info!(applicant_id = %actor.id, title = %permit.title, permit_type = ?permit.permit_type, "Permit submitted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mocks::InMemoryBackend;
    use crate::models::Role;
    use crate::notify::{Level, RecordingNotifier};
    use crate::storage::MockObjectStore;

    fn user(id: &str, role: Role) -> User {
        User {
            id: id.into(),
            full_name: format!("{id} name"),
            department: None,
            role,
        }
    }

    fn permit(id: &str, status: PermitStatus) -> Permit {
        Permit {
            id: id.into(),
            permit_number: Some(format!("PTW-{id}")),
            title: "Weld pipe rack".into(),
            description: None,
            permit_type: PermitType::HotWork,
            location_detail: Some("Unit 3".into()),
            start_time: Utc::now(),
            end_time: Utc::now(),
            status,
            applicant: None,
            attachment_url: None,
            attachment_name: None,
            created_at: None,
        }
    }

    fn draft(attachments: Vec<Attachment>) -> PermitDraft {
        let start = Utc::now();
        PermitDraft {
            title: "Tank entry".into(),
            description: PermitDescription::new("Inspect baffles")
                .with_workers(2)
                .with_ppe(vec!["Harness".into()])
                .with_safety_measures(vec!["Gas test".into()]),
            permit_type: PermitType::ConfinedSpace,
            location_detail: "Tank T-101".into(),
            start_time: Some(start),
            end_time: Some(start + chrono::Duration::hours(4)),
            attachments,
        }
    }

    fn service(
        backend: Arc<InMemoryBackend>,
        store: MockObjectStore,
    ) -> (ApprovalService, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let service = ApprovalService::new(backend, Arc::new(store), notifier.clone(), "permits");
        (service, notifier)
    }

    #[tokio::test]
    async fn approve_sends_fixed_comment_and_refetches() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.add_permit(permit("p-1", PermitStatus::PendingAreaOwner));
        let (service, notifier) = service(backend.clone(), MockObjectStore::new());

        let next = service
            .transition(&user("owner", Role::AreaOwner), "p-1", PermitStatus::PendingAreaOwner, PermitAction::Approve)
            .await
            .unwrap();

        assert_eq!(next, PermitStatus::PendingSafety);
        assert_eq!(backend.calls(), vec!["update_permit", "list_permits"]);
        assert_eq!(service.find("p-1").await.unwrap().status, PermitStatus::PendingSafety);
        assert_eq!(notifier.count(Level::Success), 1);
    }

    #[tokio::test]
    async fn wrong_role_is_stopped_before_any_request() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.add_permit(permit("p-1", PermitStatus::PendingAreaOwner));
        let (service, notifier) = service(backend.clone(), MockObjectStore::new());

        let err = service
            .transition(
                &user("eng", Role::SafetyEngineer),
                "p-1",
                PermitStatus::PendingAreaOwner,
                PermitAction::Approve,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::NotPermitted { role: Role::SafetyEngineer, .. }));
        assert!(backend.calls().is_empty());
        assert_eq!(notifier.count(Level::Error), 1);
    }

    #[tokio::test]
    async fn terminal_permit_fails_loudly() {
        let backend = Arc::new(InMemoryBackend::new());
        let (service, _) = service(backend.clone(), MockObjectStore::new());

        let err = service
            .transition(&user("eng", Role::SafetyEngineer), "p-1", PermitStatus::Approved, PermitAction::Reject)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Transition(_)));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn failed_update_keeps_last_known_good_list() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.add_permit(permit("p-1", PermitStatus::PendingSafety));
        let (service, notifier) = service(backend.clone(), MockObjectStore::new());
        service.refresh().await.unwrap();

        backend.fail_next(500, "database unavailable");
        let err = service
            .transition(&user("eng", Role::SafetyEngineer), "p-1", PermitStatus::PendingSafety, PermitAction::Approve)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Server { status: 500, .. }));
        assert_eq!(service.find("p-1").await.unwrap().status, PermitStatus::PendingSafety);
        assert_eq!(backend.call_count("list_permits"), 1);
        let (level, message) = notifier.last().unwrap();
        assert_eq!(level, Level::Error);
        assert!(message.contains("database unavailable"));
    }

    #[tokio::test]
    async fn submit_uploads_then_posts_then_refetches() {
        let backend = Arc::new(InMemoryBackend::new());
        let mut store = MockObjectStore::new();
        store
            .expect_upload()
            .times(1)
            .returning(|bucket, key, _, _| Ok(format!("https://files.example.com/{bucket}/{key}")));
        let (service, _) = service(backend.clone(), store);

        let contractor = user("con", Role::Contractor);
        service
            .submit(Some(&contractor), draft(vec![Attachment::new("jsa.pdf", b"%PDF".to_vec())]))
            .await
            .unwrap();

        let permits = service.permits().await;
        assert_eq!(permits.len(), 1);
        assert_eq!(permits[0].status, PermitStatus::PendingAreaOwner);
        assert_eq!(permits[0].attachment_name.as_deref(), Some("jsa.pdf"));
        assert!(permits[0]
            .attachment_url
            .as_deref()
            .unwrap()
            .starts_with("https://files.example.com/permits/"));
        assert!(permits[0].description.as_deref().unwrap().contains("👷 จำนวนผู้ปฏิบัติงาน: 2 คน"));
        assert_eq!(backend.calls(), vec!["create_permit", "list_permits"]);
    }

    #[tokio::test]
    async fn submit_without_attachment_does_no_io() {
        let backend = Arc::new(InMemoryBackend::new());
        let (service, _) = service(backend.clone(), MockObjectStore::new());

        let err = service
            .submit(Some(&user("con", Role::Contractor)), draft(vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(backend.calls().is_empty());
    }

    async fn assert_rejected_before_upload(edit: impl FnOnce(&mut PermitDraft)) {
        let backend = Arc::new(InMemoryBackend::new());
        let mut store = MockObjectStore::new();
        store.expect_upload().never();
        let (service, notifier) = service(backend.clone(), store);

        let mut incomplete = draft(vec![Attachment::new("jsa.pdf", b"%PDF".to_vec())]);
        edit(&mut incomplete);
        let err = service
            .submit(Some(&user("con", Role::Contractor)), incomplete)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Validation(_)), "got {err:?}");
        assert!(backend.calls().is_empty());
        assert_eq!(notifier.count(Level::Error), 1);
    }

    #[tokio::test]
    async fn submit_requires_details() {
        assert_rejected_before_upload(|d| d.description.details = "  ".into()).await;
    }

    #[tokio::test]
    async fn submit_requires_worker_count() {
        assert_rejected_before_upload(|d| d.description.workers = None).await;
        assert_rejected_before_upload(|d| d.description.workers = Some(0)).await;
    }

    #[tokio::test]
    async fn submit_requires_ppe() {
        assert_rejected_before_upload(|d| d.description.ppe.clear()).await;
    }

    #[tokio::test]
    async fn submit_requires_safety_measures() {
        assert_rejected_before_upload(|d| d.description.safety_measures.clear()).await;
    }

    #[tokio::test]
    async fn submit_requires_start_and_end() {
        assert_rejected_before_upload(|d| d.start_time = None).await;
        assert_rejected_before_upload(|d| d.end_time = None).await;
    }

    #[tokio::test]
    async fn submit_requires_end_after_start() {
        assert_rejected_before_upload(|d| d.end_time = d.start_time).await;
        assert_rejected_before_upload(|d| {
            d.end_time = d.start_time.map(|s| s - chrono::Duration::hours(1));
        })
        .await;
    }

    #[tokio::test]
    async fn only_contractors_submit() {
        let backend = Arc::new(InMemoryBackend::new());
        let (service, _) = service(backend.clone(), MockObjectStore::new());
        let files = vec![Attachment::new("jsa.pdf", vec![])];

        let err = service.submit(None, draft(files.clone())).await.unwrap_err();
        assert!(matches!(err, ApiError::NotLoggedIn));

        let err = service
            .submit(Some(&user("owner", Role::AreaOwner)), draft(files))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotPermitted { .. }));
    }

    #[tokio::test]
    async fn upload_failure_aborts_submission() {
        let backend = Arc::new(InMemoryBackend::new());
        let mut store = MockObjectStore::new();
        store
            .expect_upload()
            .returning(|_, _, _, _| Err(ApiError::Storage("bucket full".into())));
        let (service, _) = service(backend.clone(), store);

        let err = service
            .submit(
                Some(&user("con", Role::Contractor)),
                draft(vec![Attachment::new("jsa.pdf", vec![])]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Storage(_)));
        assert_eq!(backend.call_count("create_permit"), 0);
    }
}
