//! Request handlers

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderValue, header::SET_COOKIE},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use mywords_core::identity::{ACCESS_TOKEN_COOKIE, GUEST_MODE_COOKIE};
use mywords_core::lookup::WordEntry;
use mywords_core::story::{Story, StoryWord};
use mywords_core::{Error, Session};
use serde::Deserialize;

use crate::error::ApiError;
use crate::server::SharedState;

#[derive(Debug, Deserialize)]
pub struct WordQuery {
    word: Option<String>,
}

/// `GET /api/word?word=<token>`
pub async fn word_handler(
    State(state): State<SharedState>,
    Query(query): Query<WordQuery>,
) -> Result<Json<WordEntry>, ApiError> {
    let word = query
        .word
        .filter(|w| !w.trim().is_empty())
        .ok_or_else(|| Error::validation("Word parameter is required"))?;

    Ok(Json(state.lookup.lookup(&word).await?))
}

#[derive(Debug, Deserialize)]
pub struct StoryRequest {
    #[serde(default)]
    words: Vec<StoryWord>,
}

/// `POST /api/generate-story`
pub async fn story_handler(
    State(state): State<SharedState>,
    Json(request): Json<StoryRequest>,
) -> Result<Json<Story>, ApiError> {
    Ok(Json(state.story.generate(&request.words).await?))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
}

/// `GET /auth/callback?code=<token>`
///
/// Exchanges the confirmation token for a session cookie. The guest cookie
/// is deleted whatever the outcome, then the visitor goes home.
pub async fn auth_callback_handler(
    State(state): State<SharedState>,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let mut response = Redirect::temporary("/").into_response();

    if let Some(code) = query.code.filter(|c| !c.is_empty()) {
        match state.identity.confirm_email(&code).await {
            Ok(session) => {
                tracing::info!(user_id = %session.user_id(), "Email confirmed");
                append_cookie(&mut response, &session_cookie(&session));
            }
            Err(e) => tracing::warn!("Email confirmation failed: {}", e),
        }
    }

    append_cookie(&mut response, &expired_cookie(GUEST_MODE_COOKIE));
    response
}

fn session_cookie(session: &Session) -> String {
    let max_age = (session.expires_at - Utc::now()).num_seconds().max(0);
    format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        ACCESS_TOKEN_COOKIE, session.access_token, max_age
    )
}

fn expired_cookie(name: &str) -> String {
    format!("{}=; Path=/; Max-Age=0", name)
}

fn append_cookie(response: &mut Response, cookie: &str) {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        }
        Err(_) => tracing::warn!("Dropping cookie that is not a valid header value"),
    }
}
