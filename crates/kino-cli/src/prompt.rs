use std::io::{self, BufRead, Write};

use kino_api::{ApiClient, ApiError};

/// Ask for the account password on stdin and complete the step-up with it.
/// An empty line cancels.
pub async fn confirm_password(client: &ApiClient) -> Result<(), ApiError> {
    let password = tokio::task::spawn_blocking(read_password)
        .await
        .ok()
        .flatten();

    match password {
        Some(password) => client.confirm_reauth(&password).await,
        None => Err(ApiError::ReauthCancelled),
    }
}

fn read_password() -> Option<String> {
    let mut stderr = io::stderr();
    let _ = write!(stderr, "This action needs your password (empty to cancel): ");
    let _ = stderr.flush();

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).ok()?;
    let password = line.trim_end_matches(['\r', '\n']);
    (!password.is_empty()).then(|| password.to_string())
}
