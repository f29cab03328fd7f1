use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Active confined-space permit as listed on the entry board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfinedSpacePermit {
    pub id: String,
    #[serde(default)]
    pub permit_number: Option<String>,
    #[serde(default)]
    pub location_detail: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryRole {
    /// Works inside the space.
    Entrant,
    /// Watches the opening from outside.
    Standby,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryStatus {
    Inside,
    Outside,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfinedSpaceEntry {
    pub id: String,
    pub permit_id: String,
    pub worker_name: String,
    pub role: EntryRole,
    pub status: EntryStatus,
    pub time_in: DateTime<Utc>,
    #[serde(default)]
    pub time_out: Option<DateTime<Utc>>,
}

impl ConfinedSpaceEntry {
    pub fn is_inside(&self) -> bool {
        self.status == EntryStatus::Inside
    }
}

/// POST /confined-space/in body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckIn {
    pub permit_id: String,
    pub worker_name: String,
    pub role: EntryRole,
}

/// POST /confined-space/evacuate body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evacuate {
    pub permit_id: String,
    pub triggered_by: String,
}
