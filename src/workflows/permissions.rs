// Who may do what. Every role check in the crate goes through here.
//
// These gates only decide what a client offers; the backend is expected to
// enforce the same rules authoritatively.

use crate::models::{CertificateStatus, IncidentStatus, PermitStatus, Role};

use super::state_machine::PermitAction;

/// Actions `role` may take on a permit in `status`. Empty means read-only.
pub fn allowed_permit_actions(role: Role, status: PermitStatus) -> Vec<PermitAction> {
    match (role, status) {
        (Role::AreaOwner, PermitStatus::PendingAreaOwner)
        | (Role::SafetyEngineer, PermitStatus::PendingSafety) => {
            vec![PermitAction::Approve, PermitAction::Reject]
        }
        _ => Vec::new(),
    }
}

pub fn can_act_on_permit(role: Role, status: PermitStatus) -> bool {
    !allowed_permit_actions(role, status).is_empty()
}

/// A permit is closed once it can no longer move.
pub fn is_closed(status: PermitStatus) -> bool {
    status.is_terminal()
}

pub fn can_submit_permit(role: Role) -> bool {
    role == Role::Contractor
}

pub fn can_upload_certificate(role: Role) -> bool {
    role == Role::Contractor
}

pub fn can_verify_certificate(role: Role, status: CertificateStatus) -> bool {
    role == Role::SafetyEngineer && status == CertificateStatus::Pending
}

pub fn can_update_incident(role: Role, status: IncidentStatus) -> bool {
    role == Role::SafetyEngineer && status != IncidentStatus::Resolved
}

pub fn can_record_observation(role: Role) -> bool {
    matches!(role, Role::SafetyEngineer | Role::AreaOwner)
}

pub fn can_take_course(role: Role) -> bool {
    role == Role::Contractor
}
