use serde::{Deserialize, Serialize};

use super::incident::Incident;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_permits: u64,
    pub pending_permits: u64,
    pub open_incidents: u64,
    pub defective_equip: u64,
    pub total_users: u64,
}

impl DashboardStats {
    /// Share of permits still awaiting a decision, rounded to a whole percent.
    pub fn pending_percent(&self) -> u64 {
        if self.total_permits == 0 {
            return 0;
        }
        ((self.pending_permits as f64 / self.total_permits as f64) * 100.0).round() as u64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub stats: DashboardStats,
    #[serde(default)]
    pub recent_incidents: Vec<Incident>,
}
