//! Async client for the platform REST API.

pub mod account;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod guard;
pub mod markers;
pub mod progress;
pub mod reauth;
pub mod titles;

pub use account::{RevokeOutcome, Sessions, TrustedDevices};
pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use reauth::{ReauthPrompt, ReauthSignal, with_reauth};
