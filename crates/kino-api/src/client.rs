use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use reqwest::{Method, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use uuid::Uuid;

use kino_types::api::{Page, ReauthRequest, ReauthResponse};
use kino_types::{DeviceRow, SceneMarkers, Title, WatchProgress};

use crate::cache::QueryCache;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::guard::InFlight;
use crate::markers::MarkerTarget;

/// Header carrying the short-lived token issued by a completed step-up.
pub const REAUTH_HEADER: &str = "X-Reauth-Token";
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

const REAUTH_ROUTE: &[&str] = &["api", "v1", "auth", "reauth"];

/// Handle to the platform API. Clones share credentials, caches and
/// in-flight flags.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    http: reqwest::Client,
    base_url: Url,
    credentials: RwLock<Credentials>,
    pub(crate) caches: Caches,
    pub(crate) devices_busy: InFlight,
    pub(crate) sessions_busy: InFlight,
}

#[derive(Default)]
struct Credentials {
    token: Option<String>,
    reauth_token: Option<String>,
}

pub(crate) struct Caches {
    pub(crate) titles: QueryCache<(), Page<Title>>,
    pub(crate) markers: QueryCache<MarkerTarget, SceneMarkers>,
    pub(crate) progress: QueryCache<(), Vec<WatchProgress>>,
    pub(crate) devices: QueryCache<(), Vec<DeviceRow>>,
    pub(crate) sessions: QueryCache<(), Vec<DeviceRow>>,
}

impl Caches {
    fn new() -> Self {
        Self {
            titles: QueryCache::new("titles"),
            markers: QueryCache::new("markers"),
            progress: QueryCache::new("progress"),
            devices: QueryCache::new("devices"),
            sessions: QueryCache::new("sessions"),
        }
    }

    fn clear(&self) {
        self.titles.invalidate_all();
        self.markers.invalidate_all();
        self.progress.invalidate_all();
        self.devices.invalidate_all();
        self.sessions.invalidate_all();
    }
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase.into());
        }
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .build()?;
        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                credentials: RwLock::new(Credentials {
                    token: config.token,
                    reauth_token: None,
                }),
                caches: Caches::new(),
                devices_busy: InFlight::new(),
                sessions_busy: InFlight::new(),
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        self.inner.base_url.as_str().trim_end_matches('/')
    }

    pub fn is_signed_in(&self) -> bool {
        self.credentials().token.is_some()
    }

    pub fn set_token(&self, token: impl Into<String>) {
        self.credentials_mut().token = Some(token.into());
    }

    /// Forget local credentials and everything fetched with them.
    pub fn clear_session(&self) {
        *self.credentials_mut() = Credentials::default();
        self.inner.caches.clear();
        info!("local session cleared");
    }

    /// Complete a step-up challenge with the account password. Subsequent
    /// requests carry the issued token.
    pub async fn confirm_reauth(&self, password: &str) -> Result<(), ApiError> {
        let body = ReauthRequest {
            password: password.to_string(),
        };
        let resp: ReauthResponse = self
            .send(self.request(Method::POST, REAUTH_ROUTE).json(&body))
            .await?;
        self.credentials_mut().reauth_token = Some(resp.reauth_token);
        info!("step-up reauthentication confirmed");
        Ok(())
    }

    /// Drop the step-up token once the gated call it was issued for is done.
    pub(crate) fn clear_step_up(&self) {
        if self.credentials_mut().reauth_token.take().is_some() {
            debug!("step-up token released");
        }
    }

    pub(crate) fn inner(&self) -> &ClientInner {
        &self.inner
    }

    // -- Request plumbing --

    /// Absolute URL for route segments. Each segment is percent-encoded.
    pub(crate) fn url<I>(&self, segments: I) -> Url
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.inner.base_url.clone();
        // Checked in `new`: the base URL always has a path.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub(crate) fn request<I>(&self, method: Method, segments: I) -> RequestBuilder
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let url = self.url(segments);
        let request_id = Uuid::new_v4();
        debug!(%method, %url, %request_id, "request");

        let mut builder = self
            .inner
            .http
            .request(method, url)
            .header(REQUEST_ID_HEADER, request_id.to_string());

        let credentials = self.credentials();
        if let Some(token) = &credentials.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(step_up) = &credentials.reauth_token {
            builder = builder.header(REAUTH_HEADER, step_up);
        }
        builder
    }

    pub(crate) async fn get<T, I>(&self, segments: I) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.send(self.request(Method::GET, segments)).await
    }

    pub(crate) async fn send_json<B, T, I>(
        &self,
        method: Method,
        segments: I,
        body: &B,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.send(self.request(method, segments).json(body)).await
    }

    pub(crate) async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send_raw(builder).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// For endpoints that answer with no (or an ignored) body.
    pub(crate) async fn send_empty(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        self.send_raw(builder).await.map(|_| ())
    }

    async fn send_raw(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let resp = builder.send().await.map_err(|e| {
            warn!("request failed: {}", e);
            ApiError::Transport(e)
        })?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let err = ApiError::from_response(status, &body);
            warn!(%status, code = ?err.code(), "request rejected: {}", err);
            return Err(err);
        }
        Ok(body)
    }

    fn credentials(&self) -> RwLockReadGuard<'_, Credentials> {
        self.inner
            .credentials
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn credentials_mut(&self) -> RwLockWriteGuard<'_, Credentials> {
        self.inner
            .credentials
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Route segments below a fixed prefix.
pub(crate) fn route<'a>(prefix: &'a [&'a str], rest: &[&'a str]) -> Vec<&'a str> {
    prefix.iter().chain(rest).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_segments_are_escaped() {
        let client = ApiClient::new(ClientConfig::default().with_base_url("http://api.local")).unwrap();
        let url = client.url(route(&["api", "v1", "admin", "titles"], &["a/b c", "é"]));
        assert_eq!(url.as_str(), "http://api.local/api/v1/admin/titles/a%2Fb%20c/%C3%A9");
    }

    #[test]
    fn base_path_prefix_is_kept() {
        let client = ApiClient::new(ClientConfig::default().with_base_url("https://host/kino/")).unwrap();
        let url = client.url(["api", "v1"]);
        assert_eq!(url.as_str(), "https://host/kino/api/v1");
    }

    #[test]
    fn unusable_base_url_is_rejected() {
        assert!(matches!(
            ApiClient::new(ClientConfig::default().with_base_url("not a url")),
            Err(ApiError::BaseUrl(_))
        ));
        assert!(matches!(
            ApiClient::new(ClientConfig::default().with_base_url("mailto:ops@kino.test")),
            Err(ApiError::BaseUrl(_))
        ));
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let client = ApiClient::new(ClientConfig::default().with_base_url("http://api.local/")).unwrap();
        assert_eq!(client.base_url(), "http://api.local");
        assert!(!client.is_signed_in());
        client.set_token("t");
        assert!(client.is_signed_in());
        client.clear_session();
        assert!(!client.is_signed_in());
    }
}
