use serde::{Deserialize, Serialize};

use crate::markers::SceneMarkers;
use crate::models::TitleKind;

// -- Errors --

/// Error body returned by the platform API. Field names vary between services,
/// so the human-readable text is accepted under several keys.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, alias = "error", alias = "detail")]
    pub message: Option<String>,
}

// -- Listing --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u64,
}

// -- Titles --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTitleRequest {
    pub name: String,
    pub kind: TitleKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_episodes: Option<u32>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTitleRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_episodes: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BulkDeleteResponse {
    pub deleted: u64,
}

// -- Scene markers --

/// Copies one full marker set onto many episodes. Replaces, never merges.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchMarkersRequest {
    pub episode_ids: Vec<String>,
    pub markers: SceneMarkers,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchMarkersResponse {
    pub updated: u64,
}

// -- Progress --

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub title_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_id: Option<String>,
    pub position_seconds: f64,
    pub duration_seconds: f64,
}

// -- Account --

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterDeviceRequest {
    pub label: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReauthRequest {
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReauthResponse {
    pub reauth_token: String,
}
