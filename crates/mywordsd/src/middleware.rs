//! Route gating middleware
//!
//! Applies [`RouteGate`](mywords_core::RouteGate) to every request. A request
//! counts as authenticated when its access-token cookie is recognized by the
//! identity provider, and as a guest when it carries the guest-mode cookie.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use mywords_core::GateDecision;
use mywords_core::identity::{ACCESS_TOKEN_COOKIE, GUEST_MODE_COOKIE};

use crate::server::SharedState;

pub async fn gate(State(state): State<SharedState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);

    let guest = cookie(request.headers(), GUEST_MODE_COOKIE).as_deref() == Some("true");
    let authenticated = match cookie(request.headers(), ACCESS_TOKEN_COOKIE) {
        Some(token) => match state.identity.get_user(&token).await {
            Ok(user) => user.is_some(),
            Err(e) => {
                tracing::warn!("Session check failed, treating request as anonymous: {}", e);
                false
            }
        },
        None => false,
    };

    match state
        .gate
        .decide(&path, query.as_deref(), authenticated, guest)
    {
        GateDecision::Allow => next.run(request).await,
        GateDecision::RedirectToLogin { location } => {
            tracing::debug!(path = %path, "Redirecting anonymous request to login");
            Redirect::temporary(&location).into_response()
        }
        GateDecision::RedirectHome => Redirect::temporary("/").into_response(),
    }
}

/// Value of the named cookie across all `Cookie` headers
pub fn cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_cookie_lookup() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("a=1; mywords_guest_mode=true"));
        headers.append(COOKIE, HeaderValue::from_static("mywords_access_token=t0k"));

        assert_eq!(cookie(&headers, GUEST_MODE_COOKIE).as_deref(), Some("true"));
        assert_eq!(cookie(&headers, ACCESS_TOKEN_COOKIE).as_deref(), Some("t0k"));
        assert_eq!(cookie(&headers, "missing"), None);
    }
}
