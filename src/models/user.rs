use serde::{Deserialize, Serialize};
use std::fmt;

/// Role carried on the user record. Anything the backend sends that we do not
/// recognise is treated as the read-only viewer role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Contractor,
    AreaOwner,
    SafetyEngineer,
    #[serde(other)]
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Contractor => "CONTRACTOR",
            Role::AreaOwner => "AREA_OWNER",
            Role::SafetyEngineer => "SAFETY_ENGINEER",
            Role::Viewer => "VIEWER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub full_name: String,
    #[serde(default)]
    pub department: Option<String>,
    pub role: Role,
}

/// Embedded user reference as returned inside permits and certificates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}
