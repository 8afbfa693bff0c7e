//! Shared HTTP plumbing for the service clients.

use esl_core::{Error, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::time::Duration;

/// Build a blocking client with the given request timeout.
pub(crate) fn build_client(timeout_secs: u64, service: &str) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| Error::service(service, None, format!("Failed to create HTTP client: {}", e)))
}

/// Best human-readable message for a failed response.
///
/// Prefers a JSON `error.message`, `message` or first `errors` entry, then the
/// raw body, then a generic phrase for the status.
pub(crate) fn error_message(body: &str, status: StatusCode) -> String {
    if let Some(message) = extract_error_message(body) {
        return message;
    }
    if !body.trim().is_empty() {
        return body.trim().to_string();
    }
    match status.canonical_reason() {
        Some(reason) => reason.to_string(),
        None => format!("request failed with status {}", status.as_u16()),
    }
}

fn extract_error_message(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }

    let parsed = serde_json::from_str::<serde_json::Value>(body).ok()?;

    if let Some(msg) = parsed
        .get("error")
        .and_then(|error| error.get("message"))
        .and_then(|message| message.as_str())
    {
        return Some(msg.to_string());
    }

    if let Some(msg) = parsed
        .get("errors")
        .and_then(|errors| errors.get(0))
        .and_then(|first| first.as_str())
    {
        return Some(msg.to_string());
    }

    parsed.get("message").and_then(|message| message.as_str()).map(ToOwned::to_owned)
}
