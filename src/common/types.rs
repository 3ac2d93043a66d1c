use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

pub const TEAM_LABEL: &str = "NDRF Team";
pub const CIVILIAN_LABEL: &str = "Civilian";

/// Role of whoever wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Team,
    Civilian,
    /// Only produced for legacy plain-text payloads.
    Unknown,
}

impl UserType {
    /// Maps a free-form role hint. Anything other than `team` is a civilian.
    pub fn from_role(role: &str) -> Self {
        if role == "team" {
            UserType::Team
        } else {
            UserType::Civilian
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UserType::Team => "team",
            UserType::Civilian => "civilian",
            UserType::Unknown => "unknown",
        }
    }

    /// Human-readable sender label for role-tagged messages.
    pub fn sender_label(self) -> &'static str {
        match self {
            UserType::Team => TEAM_LABEL,
            _ => CIVILIAN_LABEL,
        }
    }
}

/// One chat event as shown to local consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayMessage {
    pub content: String,
    pub sender: String,
    #[serde(rename = "userType")]
    pub user_type: UserType,
    /// Local receipt time, not origin time.
    pub timestamp: DateTime<Local>,
}

/// Body of `POST /send`.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingPost {
    pub message: String,
    #[serde(rename = "userType", default)]
    pub user_type: String,
}

/// Structured overlay payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WirePayload {
    pub content: String,
    #[serde(rename = "userType", default)]
    pub user_type: String,
    /// Origin time, epoch seconds.
    #[serde(default)]
    pub timestamp: i64,
}
