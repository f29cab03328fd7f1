use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BehaviorType {
    Safe,
    Unsafe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SafetyCategory {
    Ppe,
    Tools,
    Posture,
    Housekeeping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionTaken {
    Praised,
    VerbalWarning,
    StopWork,
}

/// Behavior-based safety observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BbsObservation {
    pub id: String,
    pub location: String,
    pub behavior_type: BehaviorType,
    pub category: SafetyCategory,
    pub description: String,
    pub action_taken: ActionTaken,
    #[serde(default)]
    pub observer_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewBbsObservation {
    pub location: String,
    pub behavior_type: BehaviorType,
    pub category: SafetyCategory,
    pub description: String,
    pub action_taken: ActionTaken,
    pub observer_id: String,
}
