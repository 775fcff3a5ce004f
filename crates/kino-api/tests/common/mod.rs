//! In-process stand-in for the platform API. Every request is recorded so
//! tests can assert on exactly what the client sent.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

use kino_api::{ApiClient, ClientConfig};
use kino_types::DeviceRow;

pub const PASSWORD: &str = "hunter2";
pub const STEP_UP_TOKEN: &str = "step-up-ok";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub body: Option<Value>,
    pub step_up: bool,
}

#[derive(Default)]
pub struct BackendState {
    pub requests: Vec<Recorded>,
    pub devices: Vec<DeviceRow>,
    pub sessions: Vec<DeviceRow>,
    /// Refuse gated mutations even with a step-up token.
    pub always_demand_reauth: bool,
    /// Stored markers keyed by "path?query".
    pub markers: HashMap<String, Value>,
    pub locked_titles: Vec<String>,
    /// Watch progress rows, camelCase JSON as the API returns them.
    pub progress: Vec<Value>,
}

#[derive(Clone, Default)]
pub struct Backend {
    state: Arc<Mutex<BackendState>>,
}

impl Backend {
    pub fn state(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state().requests.clone()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// Serve on a loopback port and return a signed-in client for it.
    pub async fn start(&self) -> ApiClient {
        let app = Router::new().fallback(handle).with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = ClientConfig::default()
            .with_base_url(format!("http://{addr}"))
            .with_token("session-token");
        ApiClient::new(config).unwrap()
    }
}

pub fn progress(title: &str, position: f64, duration: f64, updated_at: Option<&str>) -> Value {
    json!({
        "titleId": title,
        "positionSeconds": position,
        "durationSeconds": duration,
        "updatedAt": updated_at,
    })
}

pub fn row(id: &str, is_current: bool) -> DeviceRow {
    DeviceRow {
        id: id.to_string(),
        label: Some(format!("device {id}")),
        ip: Some("10.0.0.2".into()),
        user_agent: None,
        created_at: None,
        last_used_at: None,
        is_current,
    }
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn demand_reauth() -> Response {
    reply(
        StatusCode::FORBIDDEN,
        json!({ "code": "REAUTH_REQUIRED", "message": "Confirm your password to continue" }),
    )
}

async fn handle(
    State(backend): State<Backend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let mut state = backend.state();
    let step_up = headers
        .get("x-reauth-token")
        .and_then(|v| v.to_str().ok())
        == Some(STEP_UP_TOKEN);
    let body: Option<Value> = serde_json::from_str(&body).ok();
    let path = uri.path().to_string();
    state.requests.push(Recorded {
        method: method.to_string(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        body: body.clone(),
        step_up,
    });

    let gated_ok = step_up && !state.always_demand_reauth;
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    match (method.as_str(), segments.as_slice()) {
        ("POST", ["api", "v1", "auth", "reauth"]) => {
            let password = body.as_ref().and_then(|b| b["password"].as_str());
            if password == Some(PASSWORD) {
                reply(StatusCode::OK, json!({ "reauthToken": STEP_UP_TOKEN }))
            } else {
                reply(
                    StatusCode::UNAUTHORIZED,
                    json!({ "code": "INVALID_PASSWORD", "message": "Wrong password" }),
                )
            }
        }

        // -- Progress --
        ("GET", ["api", "v1", "users", "me", "progress"]) => {
            reply(StatusCode::OK, Value::Array(state.progress.clone()))
        }
        ("POST", ["api", "v1", "users", "me", "progress"]) => {
            let Some(mut update) = body else {
                return reply(StatusCode::BAD_REQUEST, json!({ "message": "Missing body" }));
            };
            let title = update["titleId"].clone();
            update["updatedAt"] = json!("2026-10-16T12:00:00Z");
            state.progress.retain(|p| p["titleId"] != title);
            state.progress.push(update);
            StatusCode::NO_CONTENT.into_response()
        }
        ("DELETE", ["api", "v1", "users", "me", "progress", title]) => {
            state.progress.retain(|p| p["titleId"] != *title);
            StatusCode::NO_CONTENT.into_response()
        }

        // -- Account rows --
        ("GET", ["api", "v1", "users", "me", collection]) => {
            let rows = match *collection {
                "trusted-devices" => &state.devices,
                "sessions" => &state.sessions,
                _ => return reply(StatusCode::NOT_FOUND, json!({ "message": "Not found" })),
            };
            reply(StatusCode::OK, serde_json::to_value(rows).unwrap())
        }
        ("POST", ["api", "v1", "users", "me", "trusted-devices"]) => {
            if !gated_ok {
                return demand_reauth();
            }
            let label = body
                .as_ref()
                .and_then(|b| b["label"].as_str())
                .unwrap_or_default()
                .to_string();
            let mut device = row(&format!("d{}", state.devices.len() + 1), true);
            device.label = Some(label);
            state.devices.push(device.clone());
            reply(StatusCode::CREATED, serde_json::to_value(device).unwrap())
        }
        ("DELETE", ["api", "v1", "users", "me", collection]) => {
            if !gated_ok {
                return demand_reauth();
            }
            rows_mut(&mut state, collection).clear();
            StatusCode::NO_CONTENT.into_response()
        }
        ("POST", ["api", "v1", "users", "me", collection, "revoke-others"]) => {
            if !gated_ok {
                return demand_reauth();
            }
            rows_mut(&mut state, collection).retain(|r| r.is_current);
            StatusCode::NO_CONTENT.into_response()
        }
        ("DELETE", ["api", "v1", "users", "me", collection, id]) => {
            if !gated_ok {
                return demand_reauth();
            }
            let id = id.to_string();
            rows_mut(&mut state, collection).retain(|r| r.id != id);
            StatusCode::NO_CONTENT.into_response()
        }

        // -- Titles --
        ("GET", ["api", "v1", "admin", "titles"]) => reply(
            StatusCode::OK,
            json!({
                "items": [
                    { "id": "show-1", "name": "Night Shift", "kind": "series", "totalEpisodes": 12 },
                    { "id": "film-1", "name": "Long Walk", "kind": "movie" }
                ],
                "total": 2
            }),
        ),
        ("POST", ["api", "v1", "admin", "titles", "bulk-delete"]) => {
            let ids = body
                .as_ref()
                .and_then(|b| b["ids"].as_array())
                .map_or(0, Vec::len);
            reply(StatusCode::OK, json!({ "deleted": ids }))
        }

        // -- Scene markers --
        ("POST", ["api", "v1", "admin", "titles", _, "scene-markers", "batch"]) => {
            let updated = body
                .as_ref()
                .and_then(|b| b["episodeIds"].as_array())
                .map_or(0, Vec::len);
            reply(StatusCode::OK, json!({ "updated": updated }))
        }
        ("POST", ["api", "v1", "admin", "titles", _, "scene-markers", "detect"]) => reply(
            StatusCode::OK,
            json!({ "intro": { "start": 0.0, "end": 42.0 }, "credits": { "start": 1250.0, "end": 1320.0 } }),
        ),
        ("GET", ["api", "v1", "admin", "titles", _, "scene-markers"]) => {
            let key = format!("{}?{}", path, uri.query().unwrap_or_default());
            let stored = state.markers.get(&key).cloned().unwrap_or_else(|| json!({}));
            reply(StatusCode::OK, stored)
        }
        ("PUT", ["api", "v1", "admin", "titles", title, "scene-markers"]) => {
            if state.locked_titles.iter().any(|t| t.as_str() == *title) {
                return reply(
                    StatusCode::CONFLICT,
                    json!({ "code": "TITLE_LOCKED", "message": "Title is locked for editing" }),
                );
            }
            let key = format!("{}?{}", path, uri.query().unwrap_or_default());
            let stored = body.unwrap_or_else(|| json!({}));
            state.markers.insert(key, stored.clone());
            reply(StatusCode::OK, stored)
        }

        _ => reply(StatusCode::NOT_FOUND, json!({ "message": "Not found" })),
    }
}

fn rows_mut<'a>(state: &'a mut BackendState, collection: &str) -> &'a mut Vec<DeviceRow> {
    match collection {
        "sessions" => &mut state.sessions,
        _ => &mut state.devices,
    }
}
