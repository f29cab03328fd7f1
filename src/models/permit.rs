use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use super::user::UserSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermitType {
    HotWork,
    ConfinedSpace,
    Electrical,
    ColdWork,
}

impl PermitType {
    pub fn label(&self) -> &'static str {
        match self {
            PermitType::HotWork => "Hot Work",
            PermitType::ConfinedSpace => "Confined Space",
            PermitType::Electrical => "Electrical",
            PermitType::ColdWork => "Cold Work",
        }
    }
}

/// Workflow status of a permit. `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermitStatus {
    PendingAreaOwner,
    PendingSafety,
    Approved,
    Rejected,
}

impl PermitStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PermitStatus::Approved | PermitStatus::Rejected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PermitStatus::PendingAreaOwner => "PENDING_AREA_OWNER",
            PermitStatus::PendingSafety => "PENDING_SAFETY",
            PermitStatus::Approved => "APPROVED",
            PermitStatus::Rejected => "REJECTED",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PermitStatus::PendingAreaOwner => "Awaiting area owner",
            PermitStatus::PendingSafety => "Awaiting safety engineer",
            PermitStatus::Approved => "Approved",
            PermitStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for PermitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permit {
    pub id: String,
    #[serde(default)]
    pub permit_number: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub permit_type: PermitType,
    #[serde(default)]
    pub location_detail: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: PermitStatus,
    #[serde(default)]
    pub applicant: Option<UserSummary>,
    #[serde(default)]
    pub attachment_url: Option<String>,
    #[serde(default)]
    pub attachment_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Permit {
    /// Permit number for display; the backend assigns it, so fresh rows may lack one.
    pub fn display_number(&self) -> &str {
        self.permit_number.as_deref().unwrap_or("PTW-XX")
    }

    pub fn applicant_name(&self) -> &str {
        self.applicant
            .as_ref()
            .and_then(|a| a.full_name.as_deref())
            .unwrap_or("Unknown applicant")
    }
}

/// POST /permits body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPermit {
    pub title: String,
    pub description: String,
    pub permit_type: PermitType,
    pub location_detail: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub applicant_id: String,
    pub attachment_url: Option<String>,
    pub attachment_name: Option<String>,
}

/// PUT /permits/{id} body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitUpdate {
    pub status: PermitStatus,
    pub approver_id: String,
    pub comment: String,
}

// Shared with the web client, which writes and reads the same Thai labels.
const NO_DETAILS: &str = "ไม่มีรายละเอียดเพิ่มเติม";
const WORKERS_PREFIX: &str = "👷 จำนวนผู้ปฏิบัติงาน:";
const WORKERS_UNIT: &str = "คน";
const PPE_PREFIX: &str = "🛡️ อุปกรณ์ PPE:";
const MEASURES_PREFIX: &str = "⚠️ มาตรการ:";

/// Structured view of a permit description. The backend stores one free-text
/// field, so worker count, PPE and safety measures ride along as suffix lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermitDescription {
    pub details: String,
    pub workers: Option<u32>,
    pub ppe: Vec<String>,
    pub safety_measures: Vec<String>,
}

impl PermitDescription {
    pub fn new(details: impl Into<String>) -> Self {
        Self {
            details: details.into(),
            ..Default::default()
        }
    }

    pub fn with_workers(mut self, workers: u32) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_ppe(mut self, ppe: Vec<String>) -> Self {
        self.ppe = ppe;
        self
    }

    pub fn with_safety_measures(mut self, measures: Vec<String>) -> Self {
        self.safety_measures = measures;
        self
    }

    /// Flatten into the single text field the backend stores.
    pub fn compose(&self) -> String {
        let mut text = if self.details.trim().is_empty() {
            NO_DETAILS.to_string()
        } else {
            self.details.clone()
        };
        if let Some(workers) = self.workers {
            text.push_str(&format!("\n{WORKERS_PREFIX} {workers} {WORKERS_UNIT}"));
        }
        if !self.ppe.is_empty() {
            text.push_str(&format!("\n{PPE_PREFIX} {}", self.ppe.join(", ")));
        }
        if !self.safety_measures.is_empty() {
            text.push_str(&format!("\n{MEASURES_PREFIX} {}", self.safety_measures.join(", ")));
        }
        text
    }

    /// Recover the structured fields from a composed description. Text without
    /// any suffix lines comes back as plain details.
    pub fn parse(text: &str) -> Self {
        static WORKERS: OnceLock<Option<Regex>> = OnceLock::new();
        let workers_re = WORKERS.get_or_init(|| Regex::new(r"^👷 จำนวนผู้ปฏิบัติงาน:\s*(\d+)").ok()).as_ref();

        let mut parsed = PermitDescription::default();
        let mut details = Vec::new();

        for line in text.lines() {
            if let Some(caps) = workers_re.and_then(|re| re.captures(line)) {
                parsed.workers = caps[1].parse().ok();
            } else if let Some(rest) = line.strip_prefix(PPE_PREFIX) {
                parsed.ppe = split_list(rest);
            } else if let Some(rest) = line.strip_prefix(MEASURES_PREFIX) {
                parsed.safety_measures = split_list(rest);
            } else {
                details.push(line);
            }
        }

        parsed.details = details.join("\n");
        parsed
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn terminal_statuses() {
        assert!(PermitStatus::Approved.is_terminal());
        assert!(PermitStatus::Rejected.is_terminal());
        assert!(!PermitStatus::PendingAreaOwner.is_terminal());
        assert!(!PermitStatus::PendingSafety.is_terminal());
    }

    #[test]
    fn permit_decodes_from_backend_row() {
        let permit: Permit = serde_json::from_value(json!({
            "id": "p-1",
            "permit_number": "PTW-0001",
            "title": "Weld flange on line 4",
            "description": "Replace gasket",
            "permit_type": "HOT_WORK",
            "location_detail": "Tank Farm Zone B",
            "start_time": "2026-10-19T01:00:00Z",
            "end_time": "2026-10-19T09:00:00Z",
            "status": "PENDING_AREA_OWNER",
            "applicant": { "full_name": "Somchai K.", "department": "Maintenance" },
            "attachment_url": null
        }))
        .unwrap();

        assert_eq!(permit.status, PermitStatus::PendingAreaOwner);
        assert_eq!(permit.permit_type, PermitType::HotWork);
        assert_eq!(permit.display_number(), "PTW-0001");
        assert_eq!(permit.applicant_name(), "Somchai K.");
        assert!(permit.attachment_url.is_none());
    }

    #[test]
    fn description_compose_appends_sub_fields() {
        let text = PermitDescription::new("Replace gasket")
            .with_workers(3)
            .with_ppe(vec!["Helmet".into(), "Harness".into()])
            .with_safety_measures(vec!["Gas test".into()])
            .compose();

        assert_eq!(
            text,
            "Replace gasket\n👷 จำนวนผู้ปฏิบัติงาน: 3 คน\n🛡️ อุปกรณ์ PPE: Helmet, Harness\n⚠️ มาตรการ: Gas test"
        );
    }

    #[test]
    fn parses_descriptions_written_by_the_web_client() {
        let parsed = PermitDescription::parse(
            "เชื่อมท่อ\n👷 จำนวนผู้ปฏิบัติงาน: 3 คน\n🛡️ อุปกรณ์ PPE: Helmet, Shoes\n⚠️ มาตรการ: ถังดับเพลิง",
        );
        assert_eq!(parsed.details, "เชื่อมท่อ");
        assert_eq!(parsed.workers, Some(3));
        assert_eq!(parsed.ppe, vec!["Helmet", "Shoes"]);
        assert_eq!(parsed.safety_measures, vec!["ถังดับเพลิง"]);
    }

    #[test]
    fn empty_details_fall_back_to_placeholder() {
        assert_eq!(PermitDescription::new("  ").compose(), NO_DETAILS);
    }

    #[test]
    fn description_parse_recovers_sub_fields() {
        let original = PermitDescription::new("Line one\nLine two")
            .with_workers(12)
            .with_ppe(vec!["Shoes".into(), "Glasses".into()]);

        let parsed = PermitDescription::parse(&original.compose());
        assert_eq!(parsed, original);
    }

    #[test]
    fn plain_text_parses_as_details_only() {
        let parsed = PermitDescription::parse("Just some notes");
        assert_eq!(parsed.details, "Just some notes");
        assert_eq!(parsed.workers, None);
        assert!(parsed.ppe.is_empty());
    }
}
