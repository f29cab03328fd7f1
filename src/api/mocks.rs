// In-memory backend - no network, same contract as the REST service

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;

use super::errors::ApiError;
use super::traits::*;
use crate::models::*;

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    permits: Vec<Permit>,
    active_confined: Vec<ConfinedSpacePermit>,
    entries: Vec<ConfinedSpaceEntry>,
    observations: Vec<BbsObservation>,
    certificates: Vec<Certificate>,
    incidents: Vec<Incident>,
    equipment: Vec<Equipment>,
    courses: Vec<Course>,
    inspections: Vec<(String, InspectionReport)>,
    evacuations: Vec<Evacuate>,
    training_submissions: Vec<TrainingSubmission>,
    pass_mark: u32,
    next_id: u32,
}

/// Backend double that keeps every table in memory and applies mutations the
/// way the real service does. Failures can be injected per call.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    tables: Mutex<Tables>,
    calls: Mutex<Vec<String>>,
    fail_next: Mutex<Option<(u16, String)>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        let backend = Self::default();
        backend.with_tables(|t| t.pass_mark = 60);
        backend
    }

    fn with_tables<R>(&self, f: impl FnOnce(&mut Tables) -> R) -> R {
        let mut tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut tables)
    }

    fn next_id(tables: &mut Tables, prefix: &str) -> String {
        tables.next_id += 1;
        format!("{prefix}-{}", tables.next_id)
    }

    /// Record the call and fail it if a failure was injected.
    fn call(&self, name: &str) -> Result<(), ApiError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(name.to_string());
        match self.fail_next.lock().unwrap_or_else(|e| e.into_inner()).take() {
            Some((status, message)) => Err(ApiError::Server { status, message }),
            None => Ok(()),
        }
    }

    /// Make the next call fail with an HTTP error.
    pub fn fail_next(&self, status: u16, message: &str) {
        *self.fail_next.lock().unwrap_or_else(|e| e.into_inner()) = Some((status, message.to_string()));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == name).count()
    }

    pub fn add_user(&self, user: User) {
        self.with_tables(|t| t.users.push(user));
    }

    pub fn add_permit(&self, permit: Permit) {
        self.with_tables(|t| t.permits.push(permit));
    }

    pub fn permit(&self, id: &str) -> Option<Permit> {
        self.with_tables(|t| t.permits.iter().find(|p| p.id == id).cloned())
    }

    pub fn permits(&self) -> Vec<Permit> {
        self.with_tables(|t| t.permits.clone())
    }

    pub fn add_active_confined(&self, permit: ConfinedSpacePermit) {
        self.with_tables(|t| t.active_confined.push(permit));
    }

    pub fn add_entry(&self, entry: ConfinedSpaceEntry) {
        self.with_tables(|t| t.entries.push(entry));
    }

    pub fn entries_for(&self, permit_id: &str) -> Vec<ConfinedSpaceEntry> {
        self.with_tables(|t| t.entries.iter().filter(|e| e.permit_id == permit_id).cloned().collect())
    }

    pub fn evacuations(&self) -> Vec<Evacuate> {
        self.with_tables(|t| t.evacuations.clone())
    }

    pub fn add_certificate(&self, certificate: Certificate) {
        self.with_tables(|t| t.certificates.push(certificate));
    }

    pub fn certificates(&self) -> Vec<Certificate> {
        self.with_tables(|t| t.certificates.clone())
    }

    pub fn add_incident(&self, incident: Incident) {
        self.with_tables(|t| t.incidents.push(incident));
    }

    pub fn incidents(&self) -> Vec<Incident> {
        self.with_tables(|t| t.incidents.clone())
    }

    pub fn observations(&self) -> Vec<BbsObservation> {
        self.with_tables(|t| t.observations.clone())
    }

    pub fn add_equipment(&self, equipment: Equipment) {
        self.with_tables(|t| t.equipment.push(equipment));
    }

    pub fn inspections(&self) -> Vec<(String, InspectionReport)> {
        self.with_tables(|t| t.inspections.clone())
    }

    pub fn add_course(&self, course: Course) {
        self.with_tables(|t| t.courses.push(course));
    }

    pub fn training_submissions(&self) -> Vec<TrainingSubmission> {
        self.with_tables(|t| t.training_submissions.clone())
    }

    pub fn set_pass_mark(&self, pass_mark: u32) {
        self.with_tables(|t| t.pass_mark = pass_mark);
    }
}

fn not_found(what: &str) -> ApiError {
    ApiError::Server {
        status: 404,
        message: format!("{what} not found"),
    }
}

#[async_trait]
impl PermitApi for InMemoryBackend {
    async fn list_permits(&self) -> Result<Vec<Permit>, ApiError> {
        self.call("list_permits")?;
        Ok(self.permits())
    }

    async fn create_permit(&self, new: &NewPermit) -> Result<(), ApiError> {
        self.call("create_permit")?;
        self.with_tables(|t| {
            let id = Self::next_id(t, "p");
            let applicant = t.users.iter().find(|u| u.id == new.applicant_id).map(|u| UserSummary {
                full_name: Some(u.full_name.clone()),
                department: u.department.clone(),
            });
            let permit_number = format!("PTW-{:04}", t.permits.len() + 1);
            t.permits.push(Permit {
                id,
                permit_number: Some(permit_number),
                title: new.title.clone(),
                description: Some(new.description.clone()),
                permit_type: new.permit_type,
                location_detail: Some(new.location_detail.clone()),
                start_time: new.start_time,
                end_time: new.end_time,
                status: PermitStatus::PendingAreaOwner,
                applicant,
                attachment_url: new.attachment_url.clone(),
                attachment_name: new.attachment_name.clone(),
                created_at: Some(Utc::now()),
            });
        });
        Ok(())
    }

    async fn update_permit(&self, permit_id: &str, update: &PermitUpdate) -> Result<(), ApiError> {
        self.call("update_permit")?;
        self.with_tables(|t| -> Result<(), ApiError> {
            let permit = t
                .permits
                .iter_mut()
                .find(|p| p.id == permit_id)
                .ok_or_else(|| not_found("permit"))?;
            permit.status = update.status;
            Ok(())
        })
    }
}

#[async_trait]
impl RosterApi for InMemoryBackend {
    async fn active_permits(&self) -> Result<Vec<ConfinedSpacePermit>, ApiError> {
        self.call("active_permits")?;
        Ok(self.with_tables(|t| t.active_confined.clone()))
    }

    async fn entries(&self, permit_id: &str) -> Result<Vec<ConfinedSpaceEntry>, ApiError> {
        self.call("entries")?;
        Ok(self.entries_for(permit_id))
    }

    async fn check_in(&self, check_in: &CheckIn) -> Result<(), ApiError> {
        self.call("check_in")?;
        self.with_tables(|t| {
            let id = Self::next_id(t, "e");
            t.entries.push(ConfinedSpaceEntry {
                id,
                permit_id: check_in.permit_id.clone(),
                worker_name: check_in.worker_name.clone(),
                role: check_in.role,
                status: EntryStatus::Inside,
                time_in: Utc::now(),
                time_out: None,
            });
        });
        Ok(())
    }

    async fn check_out(&self, entry_id: &str) -> Result<(), ApiError> {
        self.call("check_out")?;
        self.with_tables(|t| -> Result<(), ApiError> {
            let entry = t
                .entries
                .iter_mut()
                .find(|e| e.id == entry_id)
                .ok_or_else(|| not_found("entry"))?;
            entry.status = EntryStatus::Outside;
            entry.time_out = Some(Utc::now());
            Ok(())
        })
    }

    async fn evacuate(&self, evacuate: &Evacuate) -> Result<(), ApiError> {
        self.call("evacuate")?;
        let now = Utc::now();
        self.with_tables(|t| {
            for entry in t
                .entries
                .iter_mut()
                .filter(|e| e.permit_id == evacuate.permit_id && e.is_inside())
            {
                entry.status = EntryStatus::Outside;
                entry.time_out = Some(now);
            }
            t.evacuations.push(evacuate.clone());
        });
        Ok(())
    }
}

#[async_trait]
impl ObservationApi for InMemoryBackend {
    async fn list_observations(&self) -> Result<Vec<BbsObservation>, ApiError> {
        self.call("list_observations")?;
        Ok(self.observations())
    }

    async fn record_observation(&self, new: &NewBbsObservation) -> Result<(), ApiError> {
        self.call("record_observation")?;
        self.with_tables(|t| {
            let id = Self::next_id(t, "b");
            t.observations.push(BbsObservation {
                id,
                location: new.location.clone(),
                behavior_type: new.behavior_type,
                category: new.category,
                description: new.description.clone(),
                action_taken: new.action_taken,
                observer_id: Some(new.observer_id.clone()),
                created_at: Some(Utc::now()),
            });
        });
        Ok(())
    }
}

#[async_trait]
impl CertificateApi for InMemoryBackend {
    async fn list_certificates(&self) -> Result<Vec<Certificate>, ApiError> {
        self.call("list_certificates")?;
        Ok(self.certificates())
    }

    async fn create_certificate(&self, new: &NewCertificate) -> Result<(), ApiError> {
        self.call("create_certificate")?;
        self.with_tables(|t| {
            let id = Self::next_id(t, "c");
            let user = t.users.iter().find(|u| u.id == new.user_id).map(|u| UserSummary {
                full_name: Some(u.full_name.clone()),
                department: u.department.clone(),
            });
            t.certificates.push(Certificate {
                id,
                user,
                cert_name: new.cert_name.clone(),
                file_url: Some(new.file_url.clone()),
                issued_date: new.issued_date,
                expiry_date: new.expiry_date,
                status: CertificateStatus::Pending,
            });
        });
        Ok(())
    }

    async fn verify_certificate(&self, certificate_id: &str, status: CertificateStatus) -> Result<(), ApiError> {
        self.call("verify_certificate")?;
        self.with_tables(|t| -> Result<(), ApiError> {
            let cert = t
                .certificates
                .iter_mut()
                .find(|c| c.id == certificate_id)
                .ok_or_else(|| not_found("certificate"))?;
            cert.status = status;
            Ok(())
        })
    }
}

#[async_trait]
impl IncidentApi for InMemoryBackend {
    async fn list_incidents(&self) -> Result<Vec<Incident>, ApiError> {
        self.call("list_incidents")?;
        Ok(self.incidents())
    }

    async fn report_incident(&self, new: &NewIncident) -> Result<(), ApiError> {
        self.call("report_incident")?;
        self.with_tables(|t| {
            let id = Self::next_id(t, "i");
            t.incidents.push(Incident {
                id,
                title: new.title.clone(),
                description: Some(new.description.clone()),
                incident_type: new.incident_type,
                status: IncidentStatus::Open,
                lat: new.lat,
                lng: new.lng,
                image_url: new.image_url.clone(),
                reporter_id: Some(new.reporter_id.clone()),
                created_at: Some(Utc::now()),
            });
        });
        Ok(())
    }

    async fn update_incident_status(&self, incident_id: &str, status: IncidentStatus) -> Result<(), ApiError> {
        self.call("update_incident_status")?;
        self.with_tables(|t| -> Result<(), ApiError> {
            let incident = t
                .incidents
                .iter_mut()
                .find(|i| i.id == incident_id)
                .ok_or_else(|| not_found("incident"))?;
            incident.status = status;
            Ok(())
        })
    }
}

#[async_trait]
impl EquipmentApi for InMemoryBackend {
    async fn find_equipment(&self, code: &str) -> Result<Equipment, ApiError> {
        self.call("find_equipment")?;
        self.with_tables(|t| {
            t.equipment
                .iter()
                .find(|e| e.code.as_deref() == Some(code) || e.id == code)
                .cloned()
                .ok_or_else(|| not_found("equipment"))
        })
    }

    async fn record_inspection(&self, equipment_id: &str, report: &InspectionReport) -> Result<(), ApiError> {
        self.call("record_inspection")?;
        self.with_tables(|t| -> Result<(), ApiError> {
            let equipment = t
                .equipment
                .iter_mut()
                .find(|e| e.id == equipment_id)
                .ok_or_else(|| not_found("equipment"))?;
            equipment.status = report.status;
            equipment.history.insert(
                0,
                InspectionLog {
                    status: report.status,
                    inspector_name: Some(report.inspector_name.clone()),
                    details: Some(report.details.clone()),
                    inspected_at: Some(Utc::now()),
                },
            );
            t.inspections.push((equipment_id.to_string(), report.clone()));
            Ok(())
        })
    }
}

#[async_trait]
impl TrainingApi for InMemoryBackend {
    async fn list_courses(&self) -> Result<Vec<Course>, ApiError> {
        self.call("list_courses")?;
        Ok(self.with_tables(|t| t.courses.clone()))
    }

    async fn submit_training(&self, submission: &TrainingSubmission) -> Result<TrainingRecord, ApiError> {
        self.call("submit_training")?;
        Ok(self.with_tables(|t| {
            let id = Self::next_id(t, "t");
            t.training_submissions.push(submission.clone());
            TrainingRecord {
                id: Some(id),
                score: Some(submission.score),
                passed: submission.score >= t.pass_mark,
            }
        }))
    }
}

#[async_trait]
impl DirectoryApi for InMemoryBackend {
    async fn login(&self, credentials: &Credentials) -> Result<User, ApiError> {
        self.call("login")?;
        self.with_tables(|t| {
            t.users
                .iter()
                .find(|u| u.id == credentials.username || u.full_name == credentials.username)
                .cloned()
                .ok_or_else(|| ApiError::Server {
                    status: 401,
                    message: "Invalid username or password".into(),
                })
        })
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.call("list_users")?;
        Ok(self.with_tables(|t| t.users.clone()))
    }

    async fn dashboard(&self) -> Result<Dashboard, ApiError> {
        self.call("dashboard")?;
        Ok(self.with_tables(|t| Dashboard {
            stats: DashboardStats {
                total_permits: t.permits.len() as u64,
                pending_permits: t.permits.iter().filter(|p| !p.status.is_terminal()).count() as u64,
                open_incidents: t
                    .incidents
                    .iter()
                    .filter(|i| i.status != IncidentStatus::Resolved)
                    .count() as u64,
                defective_equip: t
                    .equipment
                    .iter()
                    .filter(|e| e.status == EquipmentStatus::Defective)
                    .count() as u64,
                total_users: t.users.len() as u64,
            },
            recent_incidents: t.incidents.iter().rev().take(5).cloned().collect(),
        }))
    }
}
