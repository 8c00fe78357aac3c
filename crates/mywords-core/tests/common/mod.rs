//! Test doubles and common utilities for behavioural contract tests
//!
//! The doubles keep their counters behind `Arc`s so a test can hand one copy
//! to the code under test and keep another for assertions.

#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use mywords_core::error::{Error, Result};
use mywords_core::model::{Session, SignUpOutcome, User, UserId, Word, WordStatus};
use mywords_core::traits::{CompletionRequest, IdentityProvider, RemoteWordStore, TextOracle};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A live session for `user_id`, valid for an hour
pub fn session_for(user_id: &str) -> Session {
    Session {
        access_token: format!("token-{}", user_id),
        refresh_token: Some(format!("refresh-{}", user_id)),
        expires_at: Utc::now() + Duration::hours(1),
        user: User {
            id: UserId::new(user_id),
            email: Some(format!("{}@example.com", user_id)),
        },
    }
}

/// A word created `minutes_ago` minutes before now
pub fn word_at(word: &str, meaning: &str, minutes_ago: i64) -> Word {
    Word::new(word, meaning).with_created_at(Utc::now() - Duration::minutes(minutes_ago))
}

/// Fixed timestamp helper for ordering tests
pub fn at_millis(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap()
}

/// In-memory durable word store with failure injection
#[derive(Clone, Default)]
pub struct InMemoryRemoteStore {
    rows: Arc<Mutex<HashMap<UserId, Vec<Word>>>>,
    reject_inserts: Arc<Mutex<HashSet<String>>>,
    fail_everything: Arc<AtomicBool>,
    insert_call_count: Arc<AtomicUsize>,
    find_call_count: Arc<AtomicUsize>,
}

impl InMemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every insert of `word` fail with a backend error
    pub fn reject_insert_of(&self, word: &str) {
        self.reject_inserts
            .lock()
            .unwrap()
            .insert(word.to_lowercase());
    }

    /// Make every call fail with a backend error
    pub fn fail_everything(&self, fail: bool) {
        self.fail_everything.store(fail, Ordering::SeqCst);
    }

    /// Seed a row directly, bypassing uniqueness
    pub fn seed(&self, user_id: &str, word: Word) {
        self.rows
            .lock()
            .unwrap()
            .entry(UserId::new(user_id))
            .or_default()
            .push(word);
    }

    /// Rows owned by `user_id`, in storage order
    pub fn rows_for(&self, user_id: &str) -> Vec<Word> {
        self.rows
            .lock()
            .unwrap()
            .get(&UserId::new(user_id))
            .cloned()
            .unwrap_or_default()
    }

    pub fn insert_call_count(&self) -> usize {
        self.insert_call_count.load(Ordering::SeqCst)
    }

    pub fn find_call_count(&self) -> usize {
        self.find_call_count.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.fail_everything.load(Ordering::SeqCst) {
            return Err(Error::backend("memory", "simulated outage"));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl RemoteWordStore for InMemoryRemoteStore {
    async fn select_words(&self, session: &Session) -> Result<Vec<Word>> {
        self.check()?;
        Ok(self.rows_for(session.user_id().as_str()))
    }

    async fn find_word_id(&self, session: &Session, word_lower: &str) -> Result<Option<String>> {
        self.find_call_count.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self
            .rows_for(session.user_id().as_str())
            .into_iter()
            .find(|w| w.word.to_lowercase() == word_lower)
            .map(|w| w.id))
    }

    async fn insert_word(&self, session: &Session, word: &Word) -> Result<()> {
        self.insert_call_count.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        if self.reject_inserts.lock().unwrap().contains(&word.key()) {
            return Err(Error::backend("memory", format!("insert of '{}' rejected", word.word)));
        }
        self.seed(session.user_id().as_str(), word.clone());
        Ok(())
    }

    async fn delete_word(&self, session: &Session, word_id: &str) -> Result<()> {
        self.check()?;
        if let Some(rows) = self.rows.lock().unwrap().get_mut(session.user_id()) {
            rows.retain(|w| w.id != word_id);
        }
        Ok(())
    }

    async fn update_status(&self, session: &Session, word_id: &str, status: WordStatus) -> Result<()> {
        self.check()?;
        if let Some(rows) = self.rows.lock().unwrap().get_mut(session.user_id()) {
            for row in rows.iter_mut().filter(|w| w.id == word_id) {
                row.status = status;
            }
        }
        Ok(())
    }

    fn store_name(&self) -> &'static str {
        "memory"
    }
}

/// Oracle that replays scripted answers and records every request
#[derive(Clone, Default)]
pub struct ScriptedOracle {
    answers: Arc<Mutex<VecDeque<Result<String>>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(self, text: &str) -> Self {
        self.answers.lock().unwrap().push_back(Ok(text.to_string()));
        self
    }

    pub fn fail(self) -> Self {
        self.answers
            .lock()
            .unwrap()
            .push_back(Err(Error::backend("scripted", "oracle unavailable")));
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl TextOracle for ScriptedOracle {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::backend("scripted", "no answer scripted")))
    }

    fn oracle_name(&self) -> &'static str {
        "scripted"
    }
}

/// Identity provider with one known account per email, password "secret"
#[derive(Clone, Default)]
pub struct MockIdentityProvider {
    require_confirmation: Arc<AtomicBool>,
    revoked: Arc<AtomicBool>,
    unreachable: Arc<AtomicBool>,
    sign_in_call_count: Arc<AtomicUsize>,
    sign_out_call_count: Arc<AtomicUsize>,
}

pub const PASSWORD: &str = "secret";

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sign-ups wait for email confirmation instead of returning a session
    pub fn require_confirmation(&self, required: bool) {
        self.require_confirmation.store(required, Ordering::SeqCst);
    }

    /// `get_user` stops recognizing any token
    pub fn revoke_all(&self) {
        self.revoked.store(true, Ordering::SeqCst);
    }

    /// `get_user` fails as if the provider were down
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn sign_in_call_count(&self) -> usize {
        self.sign_in_call_count.load(Ordering::SeqCst)
    }

    pub fn sign_out_call_count(&self) -> usize {
        self.sign_out_call_count.load(Ordering::SeqCst)
    }

    fn user_for(email: &str) -> String {
        email.split('@').next().unwrap_or(email).to_string()
    }
}

#[async_trait::async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        self.sign_in_call_count.fetch_add(1, Ordering::SeqCst);
        if password != PASSWORD {
            return Err(Error::unauthenticated("Invalid login credentials"));
        }
        Ok(session_for(&Self::user_for(email)))
    }

    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        _email_redirect_to: Option<&str>,
    ) -> Result<SignUpOutcome> {
        if self.require_confirmation.load(Ordering::SeqCst) {
            return Ok(SignUpOutcome::ConfirmationPending {
                email: email.to_string(),
            });
        }
        Ok(SignUpOutcome::Confirmed(session_for(&Self::user_for(email))))
    }

    async fn sign_out(&self, _session: &Session) -> Result<()> {
        self.sign_out_call_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<User>> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(Error::backend("mock", "identity provider unreachable"));
        }
        if self.revoked.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(access_token.strip_prefix("token-").map(|id| User {
            id: UserId::new(id),
            email: Some(format!("{}@example.com", id)),
        }))
    }

    async fn confirm_email(&self, token: &str) -> Result<Session> {
        Ok(session_for(token))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
