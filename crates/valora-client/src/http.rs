//! Shared HTTP plumbing for the service clients.

use valora_core::{Result, ValuationError};

use crate::config::ApiConfig;

/// Build the shared HTTP client with the crate's user agent.
pub(crate) fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(concat!("valora/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("Failed to create HTTP client")
}

/// Attach the bearer token when one is configured.
pub(crate) fn apply_auth(
    request: reqwest::RequestBuilder,
    config: &ApiConfig,
) -> reqwest::RequestBuilder {
    match &config.token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

/// Map transport errors to `ValuationError::Remote`.
pub(crate) fn transport_err(service: &str, error: reqwest::Error) -> ValuationError {
    ValuationError::remote(service, error.to_string())
}

/// Turn a non-2xx response into a `Remote` error carrying the status
/// and a snippet of the body.
pub(crate) async fn error_for_status(
    service: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let snippet: String = body.chars().take(200).collect();
    Err(ValuationError::remote(
        service,
        format!("HTTP {status}: {snippet}"),
    ))
}
