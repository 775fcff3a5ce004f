use reqwest::{Method, RequestBuilder};
use tracing::info;

use kino_types::SceneMarkers;
use kino_types::api::{BatchMarkersRequest, BatchMarkersResponse};

use crate::client::{ApiClient, route};
use crate::error::ApiError;

const TITLES: &[&str] = &["api", "v1", "admin", "titles"];

/// The asset a marker set belongs to: a movie, or one episode of a series.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarkerTarget {
    pub title_id: String,
    pub episode_id: Option<String>,
}

impl MarkerTarget {
    pub fn title(title_id: impl Into<String>) -> Self {
        Self {
            title_id: title_id.into(),
            episode_id: None,
        }
    }

    pub fn episode(title_id: impl Into<String>, episode_id: impl Into<String>) -> Self {
        Self {
            title_id: title_id.into(),
            episode_id: Some(episode_id.into()),
        }
    }

    /// Route segments; the episode, when set, travels as the `episodeId` query.
    fn route<'a>(&'a self, suffix: &[&'a str]) -> Vec<&'a str> {
        let mut segments = route(TITLES, &[self.title_id.as_str(), "scene-markers"]);
        segments.extend_from_slice(suffix);
        segments
    }
}

pub struct MarkersApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn markers(&self) -> MarkersApi<'_> {
        MarkersApi { client: self }
    }
}

impl MarkersApi<'_> {
    fn request(&self, method: Method, target: &MarkerTarget, suffix: &[&str]) -> RequestBuilder {
        let builder = self.client.request(method, target.route(suffix));
        match &target.episode_id {
            Some(episode) => builder.query(&[("episodeId", episode)]),
            None => builder,
        }
    }

    pub async fn load(&self, target: &MarkerTarget) -> Result<SceneMarkers, ApiError> {
        self.client
            .inner()
            .caches
            .markers
            .get_or_fetch(target.clone(), || {
                self.client.send(self.request(Method::GET, target, &[]))
            })
            .await
    }

    /// Replace the target's markers. Returns what the server stored.
    pub async fn save(
        &self,
        target: &MarkerTarget,
        markers: &SceneMarkers,
    ) -> Result<SceneMarkers, ApiError> {
        let stored: SceneMarkers = self
            .client
            .send(self.request(Method::PUT, target, &[]).json(markers))
            .await?;
        self.client.inner().caches.markers.invalidate(target);
        info!(title = %target.title_id, episode = ?target.episode_id, "scene markers saved");
        Ok(stored)
    }

    /// Ask the server to detect markers from the media. Nothing is persisted.
    pub async fn detect(&self, target: &MarkerTarget) -> Result<SceneMarkers, ApiError> {
        self.client
            .send(self.request(Method::POST, target, &["detect"]))
            .await
    }

    /// Copy one marker set onto many episodes in a single request. Existing
    /// markers on the targets are replaced, not merged.
    pub async fn batch_apply(
        &self,
        title_id: &str,
        request: &BatchMarkersRequest,
    ) -> Result<BatchMarkersResponse, ApiError> {
        if request.episode_ids.is_empty() {
            return Ok(BatchMarkersResponse { updated: 0 });
        }
        let path = route(TITLES, &[title_id, "scene-markers", "batch"]);
        let resp: BatchMarkersResponse = self
            .client
            .send_json(Method::POST, path, request)
            .await?;
        self.client.inner().caches.markers.invalidate_all();
        info!(
            title = %title_id,
            episodes = request.episode_ids.len(),
            updated = resp.updated,
            "scene markers batch applied"
        );
        Ok(resp)
    }
}
