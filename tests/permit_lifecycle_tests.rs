//! End-to-end flows through the services against the in-memory backend.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::{Arc, Mutex};

use safetyos::api::mocks::InMemoryBackend;
use safetyos::api::ApiError;
use safetyos::models::{
    ConfinedSpacePermit, EntryRole, EntryStatus, PermitDescription, PermitStatus, PermitType, Role, User,
};
use safetyos::notify::{Level, RecordingNotifier};
use safetyos::storage::{Attachment, ObjectStore};
use safetyos::workflows::permissions::allowed_permit_actions;
use safetyos::workflows::{ApprovalService, PermitAction, PermitDraft};
use safetyos::RosterService;

/// Store that accepts every upload and remembers the keys.
#[derive(Default)]
struct AcceptingStore {
    keys: Mutex<Vec<String>>,
}

#[async_trait]
impl ObjectStore for AcceptingStore {
    async fn upload(&self, bucket: &str, key: &str, _bytes: Vec<u8>, _content_type: &str) -> Result<String, ApiError> {
        self.keys.lock().unwrap().push(key.to_string());
        Ok(format!("https://files.example.com/{bucket}/{key}"))
    }
}

fn user(id: &str, name: &str, role: Role) -> User {
    User {
        id: id.into(),
        full_name: name.into(),
        department: Some("Maintenance".into()),
        role,
    }
}

struct Site {
    backend: Arc<InMemoryBackend>,
    store: Arc<AcceptingStore>,
    notifier: Arc<RecordingNotifier>,
    approvals: ApprovalService,
    contractor: User,
    owner: User,
    engineer: User,
}

fn site() -> Site {
    let backend = Arc::new(InMemoryBackend::new());
    let store = Arc::new(AcceptingStore::default());
    let notifier = Arc::new(RecordingNotifier::new());
    let contractor = user("u-1", "Contractor One", Role::Contractor);
    let owner = user("u-2", "Area Owner", Role::AreaOwner);
    let engineer = user("u-3", "Safety Engineer", Role::SafetyEngineer);
    for u in [&contractor, &owner, &engineer] {
        backend.add_user(u.clone());
    }
    let approvals = ApprovalService::new(backend.clone(), store.clone(), notifier.clone(), "permits");
    Site {
        backend,
        store,
        notifier,
        approvals,
        contractor,
        owner,
        engineer,
    }
}

fn hot_work_draft() -> PermitDraft {
    let start = Utc::now();
    PermitDraft {
        title: "Weld pipe rack".into(),
        description: PermitDescription::new("Replace flange")
            .with_workers(3)
            .with_ppe(vec!["Helmet".into(), "Welding mask".into()])
            .with_safety_measures(vec!["Fire extinguisher".into()]),
        permit_type: PermitType::HotWork,
        location_detail: "Unit 3".into(),
        start_time: Some(start),
        end_time: Some(start + Duration::hours(8)),
        attachments: vec![Attachment::new("jsa.pdf", b"%PDF-1.4".to_vec())],
    }
}

#[tokio::test]
async fn submitted_permit_waits_for_the_area_owner() {
    let site = site();

    site.approvals.submit(Some(&site.contractor), hot_work_draft()).await.unwrap();

    let permits = site.backend.permits();
    assert_eq!(permits.len(), 1);
    assert_eq!(permits[0].status, PermitStatus::PendingAreaOwner);
    assert_eq!(permits[0].attachment_name.as_deref(), Some("jsa.pdf"));
    assert!(permits[0].attachment_url.as_deref().unwrap().starts_with("https://files.example.com/permits/"));
    assert_eq!(site.store.keys.lock().unwrap().len(), 1);

    let parsed = PermitDescription::parse(permits[0].description.as_deref().unwrap());
    assert_eq!(parsed.workers, Some(3));

    // The local view was refreshed after the post.
    assert_eq!(site.approvals.permits().await.len(), 1);
    assert_eq!(site.notifier.count(Level::Success), 1);
}

#[tokio::test]
async fn full_approval_chain_moves_buttons_between_roles() {
    let site = site();
    site.approvals.submit(Some(&site.contractor), hot_work_draft()).await.unwrap();
    let permit = site.approvals.permits().await.remove(0);

    assert!(allowed_permit_actions(Role::Contractor, permit.status).is_empty());
    assert_eq!(
        allowed_permit_actions(Role::AreaOwner, permit.status),
        vec![PermitAction::Approve, PermitAction::Reject]
    );

    let next = site
        .approvals
        .transition(&site.owner, &permit.id, permit.status, PermitAction::Approve)
        .await
        .unwrap();
    assert_eq!(next, PermitStatus::PendingSafety);
    assert_eq!(site.backend.permit(&permit.id).unwrap().status, PermitStatus::PendingSafety);

    assert!(allowed_permit_actions(Role::AreaOwner, next).is_empty());
    assert!(site.approvals.actionable_for(&site.owner).await.is_empty());
    assert_eq!(site.approvals.actionable_for(&site.engineer).await.len(), 1);

    let last = site
        .approvals
        .transition(&site.engineer, &permit.id, next, PermitAction::Reject)
        .await
        .unwrap();
    assert_eq!(last, PermitStatus::Rejected);
    for role in [Role::Contractor, Role::AreaOwner, Role::SafetyEngineer, Role::Viewer] {
        assert!(allowed_permit_actions(role, last).is_empty());
    }
    assert!(site.approvals.actionable_for(&site.engineer).await.is_empty());
}

#[tokio::test]
async fn engineer_cannot_skip_the_area_owner() {
    let site = site();
    site.approvals.submit(Some(&site.contractor), hot_work_draft()).await.unwrap();
    let permit = site.approvals.permits().await.remove(0);

    let err = site
        .approvals
        .transition(&site.engineer, &permit.id, permit.status, PermitAction::Approve)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotPermitted { .. }));
    assert_eq!(site.backend.call_count("update_permit"), 0);
    assert_eq!(site.notifier.last().unwrap().0, Level::Error);
}

#[tokio::test]
async fn failed_update_leaves_the_permit_where_it_was() {
    let site = site();
    site.approvals.submit(Some(&site.contractor), hot_work_draft()).await.unwrap();
    let permit = site.approvals.permits().await.remove(0);

    site.backend.fail_next(500, "database offline");
    let err = site
        .approvals
        .transition(&site.owner, &permit.id, permit.status, PermitAction::Approve)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Server { status: 500, .. }));
    assert_eq!(site.backend.permit(&permit.id).unwrap().status, PermitStatus::PendingAreaOwner);
}

#[tokio::test]
async fn overdue_entrant_is_flagged_then_logged_out() {
    let backend = Arc::new(InMemoryBackend::new());
    backend.add_active_confined(ConfinedSpacePermit {
        id: "cs-1".into(),
        permit_number: Some("PTW-0042".into()),
        location_detail: Some("Tank T-101".into()),
    });
    let notifier = Arc::new(RecordingNotifier::new());
    let roster = RosterService::new(backend.clone(), notifier.clone(), 60);

    roster.active_permits().await.unwrap();
    assert_eq!(roster.selected().await.as_deref(), Some("cs-1"));

    roster.check_in("cs-1", "Somchai", EntryRole::Entrant).await.unwrap();

    let later = Utc::now() + Duration::minutes(61);
    let board = roster.board("cs-1", later).await.unwrap();
    assert_eq!(board.entrants.len(), 1);
    assert!(board.entrants[0].overdue);
    assert!(board.entrants[0].minutes_inside >= 61);
    assert!(board.missing_standby());

    let entry_id = board.entrants[0].entry.id.clone();
    roster.check_out(&entry_id).await.unwrap();

    let board = roster.board("cs-1", later).await.unwrap();
    assert!(board.entrants.is_empty());
    assert_eq!(board.logged_out.len(), 1);
    assert_eq!(board.logged_out[0].status, EntryStatus::Outside);
    assert!(board.logged_out[0].time_out.is_some());
}

#[tokio::test]
async fn evacuation_clears_everyone_inside() {
    let backend = Arc::new(InMemoryBackend::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let roster = RosterService::new(backend.clone(), notifier.clone(), 60);
    let owner = user("u-2", "Area Owner", Role::AreaOwner);

    roster.check_in("cs-1", "Somchai", EntryRole::Entrant).await.unwrap();
    roster.check_in("cs-1", "Niran", EntryRole::Entrant).await.unwrap();
    roster.check_in("cs-1", "Lek", EntryRole::Standby).await.unwrap();
    roster.check_in("cs-2", "Elsewhere", EntryRole::Entrant).await.unwrap();

    roster.evacuate_all(&owner, "cs-1").await.unwrap();

    let board = roster.board("cs-1", Utc::now()).await.unwrap();
    assert_eq!(board.inside_count(), 0);
    assert_eq!(board.logged_out.len(), 3);
    assert_eq!(backend.call_count("evacuate"), 1);
    assert_eq!(backend.evacuations()[0].triggered_by, "Area Owner");

    // Other permits are untouched.
    assert!(backend.entries_for("cs-2")[0].is_inside());
    assert_eq!(notifier.last().unwrap().0, Level::Warning);
}
