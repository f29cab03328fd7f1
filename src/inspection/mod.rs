//! QR equipment inspection: look up by tag code, walk the checklist, record
//! the verdict.

pub mod checklist;

use std::sync::Arc;
use tracing::info;

use crate::api::{ApiError, EquipmentApi};
use crate::models::{Equipment, EquipmentStatus, InspectionReport, User};
use crate::notify::Notifier;

pub use checklist::{checklist_for, Checklist};

pub const UNIDENTIFIED_INSPECTOR: &str = "Unidentified inspector";

pub struct InspectionService {
    api: Arc<dyn EquipmentApi>,
    notifier: Arc<dyn Notifier>,
}

impl InspectionService {
    pub fn new(api: Arc<dyn EquipmentApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self { api, notifier }
    }

    /// Find equipment by its QR code and prepare a fresh checklist for it.
    pub async fn scan(&self, code: &str) -> Result<(Equipment, Checklist), ApiError> {
        let code = code.trim();
        if code.is_empty() {
            let err = ApiError::validation("enter the QR code printed on the equipment tag");
            self.notifier.warning(&err.to_string());
            return Err(err);
        }

        match self.api.find_equipment(code).await {
            Ok(equipment) => {
                let checklist = Checklist::new(&equipment.equipment_type);
                Ok((equipment, checklist))
            }
            Err(e) => {
                if e.is_not_found() {
                    self.notifier.error(&format!("Equipment {code} not found, or the QR code is invalid"));
                } else {
                    self.notifier.error(&format!("Equipment lookup failed: {e}"));
                }
                Err(e)
            }
        }
    }

    /// Record the inspection. Works without a logged-in user.
    pub async fn submit(
        &self,
        inspector: Option<&User>,
        equipment: &Equipment,
        checklist: &Checklist,
    ) -> Result<EquipmentStatus, ApiError> {
        let status = checklist.verdict();
        let report = InspectionReport {
            status,
            inspector_id: inspector.map(|u| u.id.clone()),
            inspector_name: inspector
                .map(|u| u.full_name.clone())
                .unwrap_or_else(|| UNIDENTIFIED_INSPECTOR.to_string()),
            details: checklist.details_json(),
        };

        match self.api.record_inspection(&equipment.id, &report).await {
            Ok(()) => {
                info!(equipment_id = %equipment.id, status = ?status, inspector = %report.inspector_name, "Inspection recorded");
                self.notifier
                    .success(&format!("Inspection of {} saved: {status:?}", equipment.name));
                Ok(status)
            }
            Err(e) => {
                self.notifier.error(&format!("Could not save inspection: {e}"));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mocks::InMemoryBackend;
    use crate::models::EquipmentType;
    use crate::notify::{Level, RecordingNotifier};

    fn extinguisher() -> Equipment {
        Equipment {
            id: "eq-1".into(),
            code: Some("FE-001".into()),
            name: "Extinguisher, warehouse door".into(),
            equipment_type: EquipmentType::FireExtinguisher,
            status: EquipmentStatus::Normal,
            location: Some("Warehouse A".into()),
            history: vec![],
        }
    }

    #[tokio::test]
    async fn anonymous_defective_inspection() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.add_equipment(extinguisher());
        let service = InspectionService::new(backend.clone(), Arc::new(RecordingNotifier::new()));

        let (equipment, mut checklist) = service.scan(" FE-001 ").await.unwrap();
        assert_eq!(checklist.len(), 5);
        checklist.fail(0);

        let status = service.submit(None, &equipment, &checklist).await.unwrap();
        assert_eq!(status, EquipmentStatus::Defective);

        let (id, report) = backend.inspections().remove(0);
        assert_eq!(id, "eq-1");
        assert_eq!(report.inspector_name, UNIDENTIFIED_INSPECTOR);
        assert_eq!(report.inspector_id, None);
        assert!(report.details.contains(r#""0":false"#));
    }

    #[tokio::test]
    async fn unknown_code_is_reported() {
        let backend = Arc::new(InMemoryBackend::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let service = InspectionService::new(backend, notifier.clone());

        let err = service.scan("NOPE").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(notifier.count(Level::Error), 1);
    }
}
