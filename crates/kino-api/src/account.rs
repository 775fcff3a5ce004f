//! Trusted devices and active sessions.
//!
//! Both lists have the same shape and the same revoke operations; every
//! mutation is step-up gated and runs through [`with_reauth`].

use std::future::Future;
use std::marker::PhantomData;

use reqwest::Method;
use tracing::{debug, info};

use kino_types::DeviceRow;
use kino_types::api::RegisterDeviceRequest;

use crate::cache::QueryCache;
use crate::client::{ApiClient, route};
use crate::error::ApiError;
use crate::guard::{InFlight, InFlightGuard};
use crate::reauth::{ReauthPrompt, with_reauth};

/// A server-side list of account rows.
pub trait RowCollection {
    const PATH: &'static [&'static str];
    const NAME: &'static str;

    fn cache(client: &ApiClient) -> &QueryCache<(), Vec<DeviceRow>>;
    fn busy(client: &ApiClient) -> &InFlight;
}

pub struct TrustedDevices;

impl RowCollection for TrustedDevices {
    const PATH: &'static [&'static str] = &["api", "v1", "users", "me", "trusted-devices"];
    const NAME: &'static str = "trusted devices";

    fn cache(client: &ApiClient) -> &QueryCache<(), Vec<DeviceRow>> {
        &client.inner().caches.devices
    }

    fn busy(client: &ApiClient) -> &InFlight {
        &client.inner().devices_busy
    }
}

pub struct Sessions;

impl RowCollection for Sessions {
    const PATH: &'static [&'static str] = &["api", "v1", "users", "me", "sessions"];
    const NAME: &'static str = "sessions";

    fn cache(client: &ApiClient) -> &QueryCache<(), Vec<DeviceRow>> {
        &client.inner().caches.sessions
    }

    fn busy(client: &ApiClient) -> &InFlight {
        &client.inner().sessions_busy
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevokeOutcome {
    /// Nothing to revoke; no request was sent.
    Nothing,
    Revoked(usize),
    /// The current row was among those revoked; local credentials are gone.
    SignedOut,
}

pub struct AccountRows<'a, K> {
    client: &'a ApiClient,
    _kind: PhantomData<K>,
}

impl ApiClient {
    pub fn devices(&self) -> AccountRows<'_, TrustedDevices> {
        AccountRows {
            client: self,
            _kind: PhantomData,
        }
    }

    pub fn sessions(&self) -> AccountRows<'_, Sessions> {
        AccountRows {
            client: self,
            _kind: PhantomData,
        }
    }
}

impl<K: RowCollection> AccountRows<'_, K> {
    pub async fn list(&self) -> Result<Vec<DeviceRow>, ApiError> {
        K::cache(self.client)
            .get_or_fetch((), || self.client.get(K::PATH))
            .await
    }

    /// Drop the cached list and fetch it again.
    pub async fn refresh(&self) -> Result<Vec<DeviceRow>, ApiError> {
        K::cache(self.client).invalidate(&());
        self.list().await
    }

    /// True while a revoke or register is in flight.
    pub fn is_busy(&self) -> bool {
        K::busy(self.client).is_busy()
    }

    pub async fn revoke<P>(&self, row: &DeviceRow, prompt: &P) -> Result<RevokeOutcome, ApiError>
    where
        P: ReauthPrompt<ApiError>,
    {
        let _busy = self.begin()?;
        self.gated(
            || {
                let path = route(K::PATH, &[row.id.as_str()]);
                self.client.send_empty(self.client.request(Method::DELETE, path))
            },
            prompt,
        )
        .await?;
        Ok(self.finish(row.is_current, 1))
    }

    /// Revoke every row except the current one.
    pub async fn revoke_others<P>(
        &self,
        rows: &[DeviceRow],
        prompt: &P,
    ) -> Result<RevokeOutcome, ApiError>
    where
        P: ReauthPrompt<ApiError>,
    {
        let others = rows.iter().filter(|row| !row.is_current).count();
        if others == 0 {
            debug!(collection = K::NAME, "no other rows to revoke");
            return Ok(RevokeOutcome::Nothing);
        }
        let _busy = self.begin()?;
        self.gated(
            || {
                let path = route(K::PATH, &["revoke-others"]);
                self.client.send_empty(self.client.request(Method::POST, path))
            },
            prompt,
        )
        .await?;
        Ok(self.finish(false, others))
    }

    /// Revoke every row, including the current one when present.
    pub async fn revoke_all<P>(
        &self,
        rows: &[DeviceRow],
        prompt: &P,
    ) -> Result<RevokeOutcome, ApiError>
    where
        P: ReauthPrompt<ApiError>,
    {
        if rows.is_empty() {
            debug!(collection = K::NAME, "nothing to revoke");
            return Ok(RevokeOutcome::Nothing);
        }
        let _busy = self.begin()?;
        self.gated(
            || self.client.send_empty(self.client.request(Method::DELETE, K::PATH)),
            prompt,
        )
        .await?;
        let includes_current = rows.iter().any(|row| row.is_current);
        Ok(self.finish(includes_current, rows.len()))
    }

    /// Run a step-up gated call. A step-up token issued along the way covers
    /// this call only.
    async fn gated<T, F, Fut, P>(&self, attempt: F, prompt: &P) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
        P: ReauthPrompt<ApiError>,
    {
        let result = with_reauth(attempt, prompt).await;
        self.client.clear_step_up();
        result
    }

    fn begin(&self) -> Result<InFlightGuard, ApiError> {
        K::busy(self.client).try_begin().ok_or(ApiError::Busy)
    }

    fn finish(&self, revoked_current: bool, count: usize) -> RevokeOutcome {
        K::cache(self.client).invalidate(&());
        if revoked_current {
            info!(collection = K::NAME, count, "current row revoked, signing out");
            self.client.clear_session();
            RevokeOutcome::SignedOut
        } else {
            info!(collection = K::NAME, count, "revoked");
            RevokeOutcome::Revoked(count)
        }
    }
}

impl AccountRows<'_, TrustedDevices> {
    /// Trust the device this client runs on.
    pub async fn register<P>(&self, label: &str, prompt: &P) -> Result<DeviceRow, ApiError>
    where
        P: ReauthPrompt<ApiError>,
    {
        let _busy = self.begin()?;
        let body = RegisterDeviceRequest {
            label: label.to_string(),
        };
        let row: DeviceRow = self
            .gated(
                || self.client.send_json(Method::POST, TrustedDevices::PATH, &body),
                prompt,
            )
            .await?;
        TrustedDevices::cache(self.client).invalidate(&());
        info!(id = %row.id, label = %label, "device registered");
        Ok(row)
    }
}
