use reqwest::StatusCode;
use thiserror::Error;

use kino_types::api::ErrorBody;

use crate::reauth::ReauthSignal;

/// Codes the auth service uses to demand a fresh step-up confirmation.
const REAUTH_CODES: &[&str] = &["REAUTH_REQUIRED", "STEP_UP_REQUIRED"];

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success response. `message` is what a user should see.
    #[error("{message}")]
    Status {
        status: StatusCode,
        code: Option<String>,
        message: String,
    },

    #[error("invalid API base URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The user dismissed the reauthentication prompt.
    #[error("reauthentication cancelled")]
    ReauthCancelled,

    #[error("another change is still being applied")]
    Busy,
}

impl ApiError {
    /// Build the error for a failed response from its status and raw body.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let message = parsed
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
            });
        Self::Status {
            status,
            code: parsed.code,
            message,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Status { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// User-initiated aborts are not failures worth reporting.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::ReauthCancelled)
    }
}

impl ReauthSignal for ApiError {
    fn is_reauth_required(&self) -> bool {
        self.code()
            .is_some_and(|code| REAUTH_CODES.iter().any(|c| c.eq_ignore_ascii_case(code)))
    }
}
