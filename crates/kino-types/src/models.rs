use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fraction of a title past which it drops off "continue watching".
pub const FINISHED_THRESHOLD: f64 = 0.95;

// -- Catalogue --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleKind {
    Movie,
    Series,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Title {
    pub id: String,
    pub name: String,
    pub kind: TitleKind,
    #[serde(default)]
    pub total_episodes: Option<u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// -- Account --

/// A trusted device or an active login session. The server is authoritative;
/// the client only ever holds the fetched list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRow {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_used_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_current: bool,
}

/// Sessions share the device row shape.
pub type SessionRow = DeviceRow;

impl DeviceRow {
    /// Best human label: explicit label, then user agent, then id.
    pub fn display_name(&self) -> &str {
        self.label
            .as_deref()
            .or(self.user_agent.as_deref())
            .unwrap_or(&self.id)
    }
}

// -- Playback progress --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchProgress {
    pub title_id: String,
    #[serde(default)]
    pub episode_id: Option<String>,
    pub position_seconds: f64,
    pub duration_seconds: f64,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl WatchProgress {
    pub fn fraction(&self) -> f64 {
        if self.duration_seconds <= 0.0 {
            return 0.0;
        }
        (self.position_seconds / self.duration_seconds).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self) -> bool {
        self.fraction() >= FINISHED_THRESHOLD
    }
}
