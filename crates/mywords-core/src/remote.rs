//! Remote word store semantics
//!
//! [`RemoteWordStore`] implementations are dumb pipes. This module owns the
//! rules layered on top of them: session checks, the uniqueness check on
//! save, ordering and idempotent mutation.
//!
//! ## Known race
//!
//! `save` is a read-then-write: `find_word_id` followed by `insert_word`.
//! Two concurrent saves of the same word by the same user can both pass the
//! check and insert a duplicate. Closing that gap needs a unique constraint
//! on `(user_id, lower(word))` in the durable store, not client locking.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::model::{Session, Word, WordStatus, sort_newest_first};
use crate::traits::RemoteWordStore;

/// User-owned words in the durable store
#[derive(Clone)]
pub struct RemoteWords {
    store: Arc<dyn RemoteWordStore>,
}

impl RemoteWords {
    pub fn new(store: Arc<dyn RemoteWordStore>) -> Self {
        Self { store }
    }

    /// All words of the session's user, newest first
    pub async fn list(&self, session: Option<&Session>) -> Result<Vec<Word>> {
        let session = Self::require(session)?;
        let mut words = self.store.select_words(session).await?;
        sort_newest_first(&mut words);
        Ok(words)
    }

    /// Whether the user already owns a word with this lowercase form
    pub async fn exists(&self, session: Option<&Session>, word: &str) -> Result<bool> {
        let session = Self::require(session)?;
        let lower = word.trim().to_lowercase();
        Ok(self.store.find_word_id(session, &lower).await?.is_some())
    }

    /// Save a word unless the user already has it
    ///
    /// Returns `false` when the word was already present.
    pub async fn save(&self, session: Option<&Session>, word: &Word) -> Result<bool> {
        let session = Self::require(session)?;
        let key = word.key();

        if let Some(existing) = self.store.find_word_id(session, &key).await? {
            tracing::debug!(word = %key, existing_id = %existing, "User already has word, skipping save");
            return Ok(false);
        }

        self.store.insert_word(session, word).await?;
        tracing::debug!(word = %key, store = self.store.store_name(), "Saved word");
        Ok(true)
    }

    /// Remove a word by id; removing an absent id succeeds
    pub async fn remove(&self, session: Option<&Session>, word_id: &str) -> Result<()> {
        let session = Self::require(session)?;
        self.store.delete_word(session, word_id).await
    }

    /// Set the status of a word; updating an absent id succeeds
    pub async fn update_status(
        &self,
        session: Option<&Session>,
        word_id: &str,
        status: WordStatus,
    ) -> Result<()> {
        let session = Self::require(session)?;
        self.store.update_status(session, word_id, status).await
    }

    fn require(session: Option<&Session>) -> Result<&Session> {
        match session {
            None => Err(Error::unauthenticated("No session")),
            Some(s) if s.is_expired() => Err(Error::unauthenticated("Session expired")),
            Some(s) => Ok(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{User, UserId};
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingStore {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RemoteWordStore for CountingStore {
        async fn select_words(&self, _s: &Session) -> Result<Vec<Word>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![])
        }
        async fn find_word_id(&self, _s: &Session, _w: &str) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }
        async fn insert_word(&self, _s: &Session, _w: &Word) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        async fn delete_word(&self, _s: &Session, _id: &str) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        async fn update_status(&self, _s: &Session, _id: &str, _st: WordStatus) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn store_name(&self) -> &'static str {
            "counting"
        }
    }

    fn session(expires_in: Duration) -> Session {
        Session {
            access_token: "t".to_string(),
            refresh_token: None,
            expires_at: Utc::now() + expires_in,
            user: User {
                id: UserId::new("u1"),
                email: None,
            },
        }
    }

    #[tokio::test]
    async fn test_missing_or_expired_session_never_reaches_store() {
        let store = Arc::new(CountingStore {
            calls: AtomicUsize::new(0),
        });
        let remote = RemoteWords::new(store.clone());
        let expired = session(-Duration::minutes(1));

        let err = remote.list(None).await.unwrap_err();
        assert!(matches!(err, Error::Unauthenticated(_)));
        let err = remote
            .save(Some(&expired), &Word::new("cat", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unauthenticated(_)));
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_save_checks_then_inserts() {
        let store = Arc::new(CountingStore {
            calls: AtomicUsize::new(0),
        });
        let remote = RemoteWords::new(store.clone());
        let live = session(Duration::hours(1));

        assert!(remote.save(Some(&live), &Word::new("cat", "x")).await.unwrap());
        assert_eq!(store.calls.load(Ordering::SeqCst), 2);
    }
}
