//! Test doubles for the HTTP layer

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use chrono::{Duration, Utc};
use mywords_core::model::{Session, SignUpOutcome, User, UserId};
use mywords_core::traits::{CompletionRequest, IdentityProvider, TextOracle};
use mywords_core::{Error, Result};
use mywordsd::{AppState, router};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const VALID_TOKEN: &str = "valid-token";
pub const GOOD_CODE: &str = "good-code";

/// Identity provider that knows one token and one confirmation code
#[derive(Default)]
pub struct StubIdentity {
    pub get_user_calls: Arc<AtomicUsize>,
}

fn session() -> Session {
    Session {
        access_token: "confirmed-token".to_string(),
        refresh_token: None,
        expires_at: Utc::now() + Duration::hours(1),
        user: User {
            id: UserId::new("u-confirmed"),
            email: Some("new@example.com".to_string()),
        },
    }
}

#[async_trait]
impl IdentityProvider for StubIdentity {
    async fn sign_in(&self, _email: &str, _password: &str) -> Result<Session> {
        Err(Error::unauthenticated("not used"))
    }

    async fn sign_up(
        &self,
        _email: &str,
        _password: &str,
        _redirect: Option<&str>,
    ) -> Result<SignUpOutcome> {
        Err(Error::unauthenticated("not used"))
    }

    async fn sign_out(&self, _session: &Session) -> Result<()> {
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<User>> {
        self.get_user_calls.fetch_add(1, Ordering::SeqCst);
        Ok((access_token == VALID_TOKEN).then(|| User {
            id: UserId::new("u1"),
            email: None,
        }))
    }

    async fn confirm_email(&self, token: &str) -> Result<Session> {
        if token == GOOD_CODE {
            Ok(session())
        } else {
            Err(Error::unauthenticated("Email link is invalid or has expired"))
        }
    }

    fn provider_name(&self) -> &'static str {
        "stub"
    }
}

/// Oracle answering by prompt kind
#[derive(Default)]
pub struct StubOracle {
    pub calls: Arc<AtomicUsize>,
}

#[async_trait]
impl TextOracle for StubOracle {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if request.system.contains("dictionary") {
            Ok(r#"{"phonetic": "/kæt/", "meaning": "猫", "example": "The cat sleeps."}"#.to_string())
        } else if request.system.contains("translator") {
            Ok("从前有一只猫。".to_string())
        } else {
            Ok("Once upon a time there was a cat.".to_string())
        }
    }

    fn oracle_name(&self) -> &'static str {
        "stub"
    }
}

/// Router wired to the stubs, plus the oracle's call counter
pub fn app() -> (Router, Arc<AtomicUsize>) {
    let oracle = StubOracle::default();
    let calls = oracle.calls.clone();
    let state = AppState::new(
        Arc::new(StubIdentity::default()),
        Arc::new(oracle),
        "Simplified Chinese",
    );
    (router(Arc::new(state), None), calls)
}
