use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EquipmentType {
    FireExtinguisher,
    Scaffolding,
    HeavyMachinery,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EquipmentStatus {
    Normal,
    Defective,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionLog {
    pub status: EquipmentStatus,
    #[serde(default)]
    pub inspector_name: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub inspected_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: String,
    #[serde(default)]
    pub code: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub equipment_type: EquipmentType,
    pub status: EquipmentStatus,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub history: Vec<InspectionLog>,
}

/// PUT /equipment/{id}/inspect body. `details` is the checklist result map,
/// JSON-encoded into a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectionReport {
    pub status: EquipmentStatus,
    pub inspector_id: Option<String>,
    pub inspector_name: String,
    pub details: String,
}
