// Permit approval workflow and the smaller role-gated workflows around it

pub mod approval;
pub mod certificates;
pub mod incidents;
pub mod observations;
pub mod permissions;
pub mod state_machine;

pub use approval::{ApprovalService, PermitDraft};
pub use certificates::{CertificateDraft, CertificateService};
pub use incidents::{IncidentDraft, IncidentService};
pub use observations::ObservationService;
pub use state_machine::{next_incident_status, next_status, verify_certificate, PermitAction, TransitionError};
