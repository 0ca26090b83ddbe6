//! Shared plumbing for the two remote HTTP APIs.
//!
//! Both gateways build their requests themselves and hand them to [`send`],
//! which times the call, maps transport failures to
//! [`NewsError::Unavailable`] and turns every non-success status into a typed
//! error via [`classify_failure`].
//!
//! # Status mapping
//!
//! | Status | Error |
//! |--------|-------|
//! | 401 | [`NewsError::Auth`] |
//! | 404 (pages API only) | [`NewsError::NotFound`] |
//! | 429 | [`NewsError::RateLimited`] |
//! | anything else | [`NewsError::Remote`] |
//!
//! Nothing is retried. A failed call ends the run.

use crate::error::{NewsError, Result, Service};
use crate::utils::truncate_for_log;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Request timeout used when the configuration does not set one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = concat!("news_to_notion/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by a gateway.
pub fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| NewsError::Config(format!("failed to build HTTP client: {e}")))
}

/// Send a request and return the response if its status is a success.
pub async fn send(service: Service, request: RequestBuilder) -> Result<Response> {
    let t0 = Instant::now();
    let response = match request.send().await {
        Ok(response) => response,
        Err(source) => {
            warn!(
                %service,
                elapsed_ms = t0.elapsed().as_millis() as u64,
                error = %source,
                "Request failed before a response arrived"
            );
            return Err(NewsError::Unavailable { service, source });
        }
    };

    let status = response.status();
    debug!(
        %service,
        status = status.as_u16(),
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "Response received"
    );

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(
        %service,
        status = status.as_u16(),
        body = %truncate_for_log(&body, 300),
        "Remote API returned an error status"
    );
    Err(classify_failure(service, status, &body))
}

/// Decode a successful response body as JSON.
pub async fn read_json<T: DeserializeOwned>(service: Service, response: Response) -> Result<T> {
    let status = response.status().as_u16();
    response.json::<T>().await.map_err(|e| NewsError::Remote {
        service,
        status,
        message: format!("malformed response body: {e}"),
    })
}

/// Map a non-success status and its body to the matching error variant.
pub fn classify_failure(service: Service, status: StatusCode, body: &str) -> NewsError {
    let message = || {
        error_message(body)
            .or_else(|| {
                let trimmed = body.trim();
                (!trimmed.is_empty()).then(|| truncate_for_log(trimmed, 500))
            })
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown").to_string())
    };

    match status {
        StatusCode::UNAUTHORIZED => NewsError::Auth { service },
        StatusCode::TOO_MANY_REQUESTS => NewsError::RateLimited { service },
        StatusCode::NOT_FOUND if service == Service::Pages => NewsError::NotFound {
            service,
            message: message(),
        },
        _ => NewsError::Remote {
            service,
            status: status.as_u16(),
            message: message(),
        },
    }
}

/// Pull the human-readable message out of a JSON error body.
///
/// The pages API uses `message`, the search API `errorMessage`.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "errorMessage"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}
