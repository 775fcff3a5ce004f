use reqwest::Method;
use tracing::info;

use kino_types::Title;
use kino_types::api::{
    BulkDeleteRequest, BulkDeleteResponse, CreateTitleRequest, Page, UpdateTitleRequest,
};

use crate::client::{ApiClient, route};
use crate::error::ApiError;

const TITLES: &[&str] = &["api", "v1", "admin", "titles"];

pub struct TitlesApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn titles(&self) -> TitlesApi<'_> {
        TitlesApi { client: self }
    }
}

impl TitlesApi<'_> {
    pub async fn list(&self) -> Result<Page<Title>, ApiError> {
        self.client
            .inner()
            .caches
            .titles
            .get_or_fetch((), || self.client.get(TITLES))
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Title, ApiError> {
        self.client.get(route(TITLES, &[id])).await
    }

    pub async fn create(&self, request: &CreateTitleRequest) -> Result<Title, ApiError> {
        let title: Title = self.client.send_json(Method::POST, TITLES, request).await?;
        self.invalidate();
        info!(id = %title.id, name = %title.name, "title created");
        Ok(title)
    }

    pub async fn update(&self, id: &str, request: &UpdateTitleRequest) -> Result<Title, ApiError> {
        let title: Title = self
            .client
            .send_json(Method::PATCH, route(TITLES, &[id]), request)
            .await?;
        self.invalidate();
        Ok(title)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .send_empty(self.client.request(Method::DELETE, route(TITLES, &[id])))
            .await?;
        self.invalidate();
        info!(%id, "title deleted");
        Ok(())
    }

    /// Delete several titles in one request; the server applies it all or
    /// nothing. An empty selection sends nothing.
    pub async fn bulk_delete(&self, ids: &[String]) -> Result<BulkDeleteResponse, ApiError> {
        if ids.is_empty() {
            return Ok(BulkDeleteResponse { deleted: 0 });
        }
        let body = BulkDeleteRequest { ids: ids.to_vec() };
        let resp: BulkDeleteResponse = self
            .client
            .send_json(Method::POST, route(TITLES, &["bulk-delete"]), &body)
            .await?;
        self.invalidate();
        info!(requested = ids.len(), deleted = resp.deleted, "titles bulk deleted");
        Ok(resp)
    }

    fn invalidate(&self) {
        let caches = &self.client.inner().caches;
        caches.titles.invalidate(&());
        caches.markers.invalidate_all();
    }
}
