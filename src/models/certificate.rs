use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificateStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: String,
    #[serde(default)]
    pub user: Option<UserSummary>,
    pub cert_name: String,
    #[serde(default)]
    pub file_url: Option<String>,
    pub issued_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    pub status: CertificateStatus,
}

/// How close a certificate is to expiring, for the expiry column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryStatus {
    Expired,
    ExpiringSoon { days_left: i64 },
    Valid { days_left: i64 },
}

impl Certificate {
    /// Whole days until expiry, truncated toward zero. Thirty days or fewer
    /// counts as expiring soon.
    pub fn expiry_status(&self, now: DateTime<Utc>) -> ExpiryStatus {
        let days_left = (self.expiry_date - now).num_days();
        if days_left < 0 {
            ExpiryStatus::Expired
        } else if days_left <= 30 {
            ExpiryStatus::ExpiringSoon { days_left }
        } else {
            ExpiryStatus::Valid { days_left }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCertificate {
    pub user_id: String,
    pub cert_name: String,
    pub file_url: String,
    pub issued_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
}
