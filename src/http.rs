//! Shared blocking HTTP plumbing for the model clients.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::error::{Error, Result};

/// Builds a JSON client. `None` disables the request timeout.
pub(crate) fn json_client(timeout: Option<Duration>, bearer: Option<&str>) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(token) = bearer {
        let auth = format!("Bearer {}", token.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|_| Error::InvalidConfig("invalid API key".into()))?,
        );
    }
    Ok(Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()?)
}

/// Passes successful responses through; otherwise describes the failure.
pub(crate) fn check_status(resp: Response, what: &str) -> std::result::Result<Response, String> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp
        .text()
        .unwrap_or_else(|_| "<body unavailable>".to_string());
    Err(format!("{what} request failed ({status}): {body}"))
}

/// Joins `base` and `path` with exactly one slash.
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
