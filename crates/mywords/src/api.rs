//! Client for the `mywordsd` HTTP API
//!
//! Requests carry the device cookie jar, which holds the guest-mode flag
//! and the access token, so the server's route gate admits the caller.

use mywords_core::identity::CookieJar;
use mywords_core::lookup::WordEntry;
use mywords_core::story::{Story, StoryWord};
use mywords_core::{Error, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Story generation makes two oracle calls in a row
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(150);

const SERVICE: &str = "mywordsd";

pub struct ApiClient {
    base_url: String,
    cookies: CookieJar,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl ApiClient {
    pub fn new(base_url: &str, cookies: CookieJar) -> Result<Self> {
        // Gate redirects are reported, not followed
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            cookies,
            http,
        })
    }

    /// `GET /api/word?word=<word>`
    pub async fn lookup(&self, word: &str) -> Result<WordEntry> {
        let request = self
            .http
            .get(format!("{}/api/word", self.base_url))
            .query(&[("word", word)]);
        self.send(request, "lookup").await
    }

    /// `POST /api/generate-story`
    pub async fn story(&self, words: &[StoryWord]) -> Result<Story> {
        let request = self
            .http
            .post(format!("{}/api/generate-story", self.base_url))
            .json(&serde_json::json!({ "words": words }));
        self.send(request, "story").await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        mut request: reqwest::RequestBuilder,
        action: &str,
    ) -> Result<T> {
        if let Some(cookie) = self.cookies.header_value().await? {
            request = request.header(reqwest::header::COOKIE, cookie);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::backend(SERVICE, format!("{}: HTTP request failed: {}", action, e)))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| Error::backend(SERVICE, format!("{}: failed to parse response: {}", action, e)));
        }

        let body = response.text().await.unwrap_or_default();
        Err(map_status(status, &body, action))
    }
}

fn map_status(status: StatusCode, body: &str, action: &str) -> Error {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.trim().to_string());

    if status.is_redirection() {
        return Error::unauthenticated("Sign in or run `mywords guest` first");
    }
    match status {
        StatusCode::BAD_REQUEST => Error::validation(message),
        StatusCode::UNAUTHORIZED => Error::unauthenticated(message),
        _ => Error::backend(SERVICE, format!("{} failed: {}: {}", action, status, message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_redirect_means_unauthenticated() {
        let err = map_status(StatusCode::TEMPORARY_REDIRECT, "", "lookup");
        assert!(matches!(err, Error::Unauthenticated(_)));
    }

    #[test]
    fn test_validation_message_is_kept() {
        let err = map_status(
            StatusCode::BAD_REQUEST,
            r#"{"error":"Word parameter is required"}"#,
            "lookup",
        );
        assert_eq!(err.user_message(), "Word parameter is required");
    }

    #[test]
    fn test_upstream_failure_is_retryable() {
        let err = map_status(StatusCode::BAD_GATEWAY, r#"{"error":"x"}"#, "story");
        assert!(err.is_retryable());
    }
}
