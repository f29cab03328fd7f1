use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::models::{CertificateStatus, IncidentStatus, PermitStatus};

/// What an approver can do to a pending permit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermitAction {
    Approve,
    Reject,
}

impl PermitAction {
    /// Comment recorded with the update. Fixed per action, not user-editable.
    pub fn comment(&self) -> &'static str {
        match self {
            PermitAction::Approve => "Approved via E-Permit system",
            PermitAction::Reject => "Rejected under safety measures",
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            PermitAction::Approve => "approve",
            PermitAction::Reject => "reject",
        }
    }
}

impl fmt::Display for PermitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("permit is already {status}; no further transitions exist")]
    Terminal { status: PermitStatus },
    #[error("incident is already resolved")]
    IncidentResolved,
    #[error("certificate has already been verified ({status:?})")]
    CertificateVerified { status: CertificateStatus },
    #[error("a certificate can only be verified as APPROVED or REJECTED")]
    InvalidVerdict,
}

/// Next permit status for `action`.
///
/// PENDING_AREA_OWNER advances to PENDING_SAFETY, PENDING_SAFETY to APPROVED,
/// and REJECT diverts either pending state to REJECTED. Terminal states fail.
pub fn next_status(current: PermitStatus, action: PermitAction) -> Result<PermitStatus, TransitionError> {
    match (current, action) {
        (PermitStatus::PendingAreaOwner, PermitAction::Approve) => Ok(PermitStatus::PendingSafety),
        (PermitStatus::PendingSafety, PermitAction::Approve) => Ok(PermitStatus::Approved),
        (PermitStatus::PendingAreaOwner | PermitStatus::PendingSafety, PermitAction::Reject) => {
            Ok(PermitStatus::Rejected)
        }
        (status @ (PermitStatus::Approved | PermitStatus::Rejected), _) => {
            Err(TransitionError::Terminal { status })
        }
    }
}

/// Incidents move forward one step at a time: OPEN, IN_PROGRESS, RESOLVED.
pub fn next_incident_status(current: IncidentStatus) -> Result<IncidentStatus, TransitionError> {
    match current {
        IncidentStatus::Open => Ok(IncidentStatus::InProgress),
        IncidentStatus::InProgress => Ok(IncidentStatus::Resolved),
        IncidentStatus::Resolved => Err(TransitionError::IncidentResolved),
    }
}

/// Check a certificate verdict. Only PENDING certificates can be decided, and
/// only to APPROVED or REJECTED.
pub fn verify_certificate(
    current: CertificateStatus,
    verdict: CertificateStatus,
) -> Result<CertificateStatus, TransitionError> {
    if current != CertificateStatus::Pending {
        return Err(TransitionError::CertificateVerified { status: current });
    }
    match verdict {
        CertificateStatus::Approved | CertificateStatus::Rejected => Ok(verdict),
        CertificateStatus::Pending => Err(TransitionError::InvalidVerdict),
    }
}
