// # Supabase Identity Provider
//
// GoTrue REST endpoints used:
//
// ```http
// POST /auth/v1/token?grant_type=password   {email, password}
// POST /auth/v1/signup?redirect_to=<url>    {email, password}
// POST /auth/v1/logout                      (bearer access token)
// GET  /auth/v1/user                        (bearer access token)
// POST /auth/v1/verify                      {type: "email", token_hash}
// ```

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use mywords_core::model::{Session, SignUpOutcome, User, UserId};
use mywords_core::traits::IdentityProvider;
use mywords_core::{Error, Result};
use reqwest::Method;
use serde::Deserialize;

use crate::client::{SERVICE, SupabaseClient, error_message};

/// GoTrue-backed identity provider
///
/// Stateless: every call is one HTTP request, nothing is cached.
#[derive(Debug, Clone)]
pub struct SupabaseIdentityProvider {
    client: SupabaseClient,
}

/// GoTrue user object
#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl From<GoTrueUser> for User {
    fn from(user: GoTrueUser) -> Self {
        User {
            id: UserId::new(user.id),
            email: user.email,
        }
    }
}

/// Token response; sign-up without auto-confirm returns only the user fields
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    user: Option<GoTrueUser>,
    #[serde(default)]
    email: Option<String>,
}

impl TokenResponse {
    fn into_session(self) -> Option<Session> {
        let access_token = self.access_token.filter(|t| !t.is_empty())?;
        let user = self.user?;
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_else(|| Utc::now() + Duration::seconds(self.expires_in.unwrap_or(3600)));

        Some(Session {
            access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: user.into(),
        })
    }
}

impl SupabaseIdentityProvider {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    async fn token_request(
        &self,
        request: reqwest::RequestBuilder,
        action: &str,
    ) -> Result<TokenResponse> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::backend(SERVICE, format!("{}: HTTP request failed: {}", action, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // GoTrue answers bad credentials and bad tokens with 400
            return Err(match status.as_u16() {
                400 | 401 | 403 | 422 => Error::unauthenticated(error_message(&body)),
                code => crate::client::map_status(code, &body, action),
            });
        }

        response
            .json()
            .await
            .map_err(|e| Error::backend(SERVICE, format!("{}: failed to parse response: {}", action, e)))
    }
}

#[async_trait]
impl IdentityProvider for SupabaseIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        tracing::debug!("Signing in with password");
        let request = self
            .client
            .request(
                Method::POST,
                &self.client.auth_url("token?grant_type=password"),
                None,
            )
            .json(&serde_json::json!({ "email": email, "password": password }));

        self.token_request(request, "sign in")
            .await?
            .into_session()
            .ok_or_else(|| Error::backend(SERVICE, "sign in: response carried no session"))
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        email_redirect_to: Option<&str>,
    ) -> Result<SignUpOutcome> {
        let mut request = self
            .client
            .request(Method::POST, &self.client.auth_url("signup"), None)
            .json(&serde_json::json!({ "email": email, "password": password }));
        if let Some(redirect) = email_redirect_to {
            request = request.query(&[("redirect_to", redirect)]);
        }

        let response = self.token_request(request, "sign up").await?;
        let reported_email = response
            .email
            .clone()
            .or_else(|| response.user.as_ref().and_then(|u| u.email.clone()))
            .unwrap_or_else(|| email.to_string());

        Ok(match response.into_session() {
            Some(session) => SignUpOutcome::Confirmed(session),
            None => SignUpOutcome::ConfirmationPending {
                email: reported_email,
            },
        })
    }

    async fn sign_out(&self, session: &Session) -> Result<()> {
        let request = self.client.request(
            Method::POST,
            &self.client.auth_url("logout"),
            Some(&session.access_token),
        );
        self.client.send(request, "sign out").await?;
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<User>> {
        let request = self
            .client
            .request(Method::GET, &self.client.auth_url("user"), Some(access_token));

        match self.client.send(request, "get user").await {
            Ok(response) => {
                let user: GoTrueUser = response.json().await.map_err(|e| {
                    Error::backend(SERVICE, format!("get user: failed to parse response: {}", e))
                })?;
                Ok(Some(user.into()))
            }
            Err(Error::Unauthenticated(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn confirm_email(&self, token: &str) -> Result<Session> {
        let request = self
            .client
            .request(Method::POST, &self.client.auth_url("verify"), None)
            .json(&serde_json::json!({ "type": "email", "token_hash": token }));

        self.token_request(request, "confirm email")
            .await?
            .into_session()
            .ok_or_else(|| Error::unauthenticated("Confirmation link did not yield a session"))
    }

    fn provider_name(&self) -> &'static str {
        "supabase"
    }
}
