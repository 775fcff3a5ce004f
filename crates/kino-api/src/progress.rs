use reqwest::Method;
use tracing::debug;

use kino_types::WatchProgress;
use kino_types::api::ProgressUpdate;

use crate::client::{ApiClient, route};
use crate::error::ApiError;

const PROGRESS: &[&str] = &["api", "v1", "users", "me", "progress"];

pub struct ProgressApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn progress(&self) -> ProgressApi<'_> {
        ProgressApi { client: self }
    }
}

impl ProgressApi<'_> {
    pub async fn list(&self) -> Result<Vec<WatchProgress>, ApiError> {
        self.client
            .inner()
            .caches
            .progress
            .get_or_fetch((), || self.client.get(PROGRESS))
            .await
    }

    /// Unfinished titles, most recently watched first.
    pub async fn continue_watching(&self) -> Result<Vec<WatchProgress>, ApiError> {
        let mut rows: Vec<_> = self
            .list()
            .await?
            .into_iter()
            .filter(|p| !p.is_finished())
            .collect();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(rows)
    }

    pub async fn record(&self, update: &ProgressUpdate) -> Result<(), ApiError> {
        self.client
            .send_empty(self.client.request(Method::POST, PROGRESS).json(update))
            .await?;
        self.client.inner().caches.progress.invalidate(&());
        debug!(title = %update.title_id, position = update.position_seconds, "progress recorded");
        Ok(())
    }

    /// Drop a title from "continue watching".
    pub async fn clear(&self, title_id: &str) -> Result<(), ApiError> {
        self.client
            .send_empty(self.client.request(Method::DELETE, route(PROGRESS, &[title_id])))
            .await?;
        self.client.inner().caches.progress.invalidate(&());
        Ok(())
    }
}
