// Wire types for the SafetyOS REST backend.
// Every enum travels as a SCREAMING_SNAKE_CASE string.

pub mod bbs;
pub mod certificate;
pub mod confined_space;
pub mod dashboard;
pub mod equipment;
pub mod incident;
pub mod permit;
pub mod training;
pub mod user;

pub use bbs::{ActionTaken, BbsObservation, BehaviorType, NewBbsObservation, SafetyCategory};
pub use certificate::{Certificate, CertificateStatus, ExpiryStatus, NewCertificate};
pub use confined_space::{CheckIn, ConfinedSpaceEntry, ConfinedSpacePermit, EntryRole, EntryStatus, Evacuate};
pub use dashboard::{Dashboard, DashboardStats};
pub use equipment::{Equipment, EquipmentStatus, EquipmentType, InspectionLog, InspectionReport};
pub use incident::{Incident, IncidentStatus, IncidentType, NewIncident};
pub use permit::{NewPermit, Permit, PermitDescription, PermitStatus, PermitType, PermitUpdate};
pub use training::{Course, TrainingRecord, TrainingSubmission};
pub use user::{Credentials, Role, User, UserSummary};
