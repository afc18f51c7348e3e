//! HTTP plumbing shared by the REST and document store backends

use crate::domain::{RegistryError, Result, StoreError};
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use std::time::Duration;
use url::Url;

/// Builds the HTTP client used by store and identity adapters
pub(crate) fn build_client(timeout_seconds: u64, tls_verify: bool) -> Result<Client> {
    let mut builder = ClientBuilder::new()
        .timeout(Duration::from_secs(timeout_seconds))
        .connect_timeout(Duration::from_secs(timeout_seconds.min(10)));

    if !tls_verify {
        tracing::warn!("TLS certificate verification is disabled");
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder
        .build()
        .map_err(|e| RegistryError::Configuration(format!("Failed to build HTTP client: {e}")))
}

/// Appends path segments to a base URL, percent-encoding each one
pub(crate) fn join_segments(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    {
        let mut path = url.path_segments_mut().map_err(|_| {
            RegistryError::Configuration(format!("URL cannot be used as a base: {base}"))
        })?;
        path.pop_if_empty();
        for segment in segments {
            path.push(segment);
        }
    }
    Ok(url)
}

/// Parses a configured base URL
pub(crate) fn parse_base_url(raw: &str) -> Result<Url> {
    Url::parse(raw)
        .map_err(|e| RegistryError::Configuration(format!("Invalid base URL '{raw}': {e}")))
}

/// Converts a transport failure into a store error
pub(crate) fn connection_error(err: reqwest::Error) -> RegistryError {
    if err.is_timeout() {
        StoreError::Connection(format!("request timed out: {err}")).into()
    } else {
        StoreError::Connection(err.to_string()).into()
    }
}

/// Passes a success response through, maps everything else to a [`StoreError`]
///
/// A 404 becomes `NotFound` only when the request addressed a single document.
pub(crate) async fn ensure_success(resp: Response, id: Option<&str>) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = error_message(status, &body);

    let err = match (status, id) {
        (StatusCode::NOT_FOUND, Some(id)) => StoreError::NotFound(id.to_string()),
        (StatusCode::UNAUTHORIZED, _) | (StatusCode::FORBIDDEN, _) => {
            StoreError::Unauthorized(message)
        }
        _ => StoreError::Rejected {
            status: status.as_u16(),
            message,
        },
    };
    Err(err.into())
}

/// Reads the response body as JSON
pub(crate) async fn read_json(resp: Response) -> Result<serde_json::Value> {
    resp.json::<serde_json::Value>()
        .await
        .map_err(|e| StoreError::InvalidResponse(e.to_string()).into())
}

/// Extracts a readable message from an error body
///
/// Document-store errors look like `{"error": {"message": "..."}}`; other servers
/// return plain text or an empty object.
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(msg) = value
            .get("error")
            .and_then(|e| e.get("message").or(Some(e)))
            .and_then(|m| m.as_str())
        {
            return msg.to_string();
        }
        if let Some(msg) = value.get("message").and_then(|m| m.as_str()) {
            return msg.to_string();
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "{}" {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        trimmed.chars().take(300).collect()
    }
}
