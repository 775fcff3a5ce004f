//! Step-up reauthentication around sensitive mutations.
//!
//! Some endpoints refuse a request until the user re-confirms their identity.
//! [`with_reauth`] runs the request, and when the refusal is a step-up demand it
//! shows the prompt and then repeats the request one final time:
//!
//! ```text
//! Attempting -> Success | Failed | ReauthRequired
//! ReauthRequired -> Prompting -> Cancelled | Retrying
//! Retrying -> Success | Failed
//! ```
//!
//! The retry is the last step of the function, not a loop, so a second step-up
//! demand is returned to the caller as an ordinary error.

use std::future::Future;

use tracing::debug;

/// Classifies errors that ask for step-up reauthentication.
pub trait ReauthSignal {
    fn is_reauth_required(&self) -> bool;
}

/// Shows a reauthentication UI. Resolves once the user has confirmed, fails if
/// they cancel or confirmation is refused.
pub trait ReauthPrompt<E> {
    fn reauthenticate(&self) -> impl Future<Output = Result<(), E>> + Send;
}

impl<E, F, Fut> ReauthPrompt<E> for F
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<(), E>> + Send,
{
    fn reauthenticate(&self) -> impl Future<Output = Result<(), E>> + Send {
        self()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReauthPhase {
    Attempting,
    ReauthRequired,
    Prompting,
    Retrying,
}

/// Run `attempt`, reauthenticating and retrying once if the server demands it.
///
/// Errors that are not step-up demands are returned without prompting. A
/// failed or cancelled prompt is returned unchanged and `attempt` is not
/// repeated. The retried attempt's result is returned as-is.
pub async fn with_reauth<T, E, F, Fut, P>(mut attempt: F, prompt: &P) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: ReauthSignal,
    P: ReauthPrompt<E>,
{
    enter(ReauthPhase::Attempting);
    match attempt().await {
        Err(err) if err.is_reauth_required() => enter(ReauthPhase::ReauthRequired),
        outcome => return outcome,
    }

    enter(ReauthPhase::Prompting);
    prompt.reauthenticate().await?;

    enter(ReauthPhase::Retrying);
    attempt().await
}

fn enter(phase: ReauthPhase) {
    debug!(?phase, "reauth flow");
}
