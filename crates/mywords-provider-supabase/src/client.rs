//! Shared HTTP plumbing for GoTrue and PostgREST

use mywords_core::{Error, Result};
use serde_json::Value;
use std::time::Duration;

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Service name used in backend errors
pub(crate) const SERVICE: &str = "supabase";

/// Connection to one Supabase project
///
/// The Debug implementation intentionally does NOT expose the anon key.
#[derive(Clone)]
pub struct SupabaseClient {
    base_url: String,
    /// ⚠️ NEVER log this value
    anon_key: String,
    http: reqwest::Client,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base_url", &self.base_url)
            .field("anon_key", &"<REDACTED>")
            .finish()
    }
}

impl SupabaseClient {
    /// Create a client for the project at `base_url`
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self> {
        if base_url.is_empty() {
            return Err(Error::config("Supabase URL is required"));
        }
        if anon_key.is_empty() {
            return Err(Error::config("Supabase anon key is required"));
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            http,
        })
    }

    pub(crate) fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    pub(crate) fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Request carrying the project key, authorized as `bearer` (or anon)
    pub(crate) fn request(
        &self,
        method: reqwest::Method,
        url: &str,
        bearer: Option<&str>,
    ) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer.unwrap_or(&self.anon_key))
    }

    /// Send a request, mapping transport failures and non-2xx statuses
    pub(crate) async fn send(
        &self,
        request: reqwest::RequestBuilder,
        action: &str,
    ) -> Result<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::backend(SERVICE, format!("{}: HTTP request failed: {}", action, e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());
        Err(map_status(status.as_u16(), &body, action))
    }
}

/// Map a non-success status to an error
pub(crate) fn map_status(status: u16, body: &str, action: &str) -> Error {
    let detail = error_message(body);
    match status {
        401 | 403 => Error::unauthenticated(format!("{}: {}", action, detail)),
        409 => Error::backend(SERVICE, format!("{}: conflict: {}", action, detail)),
        429 => Error::backend(
            SERVICE,
            format!("{}: rate limit exceeded, please retry later", action),
        ),
        500..=599 => Error::backend(
            SERVICE,
            format!("{}: server error (transient) {}: {}", action, status, detail),
        ),
        _ => Error::backend(SERVICE, format!("{} failed: {}: {}", action, status, detail)),
    }
}

/// Best human-readable message in a GoTrue or PostgREST error body
pub(crate) fn error_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|k| json.get(*k).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}
