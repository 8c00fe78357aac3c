//! Word list facade
//!
//! The single entry point for word operations. Routes each call by the
//! [`Mode`] it was constructed with:
//!
//! - `Authenticated` → [`RemoteWords`], scoped by the session user
//! - `Guest` → [`LocalWordStore`], keyed by the guest id
//! - `None` → empty list, mutations do nothing

use crate::error::Result;
use crate::identity::Mode;
use crate::local_store::LocalWordStore;
use crate::model::{Word, WordStatus};
use crate::remote::RemoteWords;

/// Mode-routed word operations for one client session
#[derive(Clone)]
pub struct WordList {
    mode: Mode,
    local: LocalWordStore,
    remote: RemoteWords,
}

impl WordList {
    pub fn new(mode: Mode, local: LocalWordStore, remote: RemoteWords) -> Self {
        Self {
            mode,
            local,
            remote,
        }
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// All words of the current owner, newest first
    pub async fn list(&self) -> Result<Vec<Word>> {
        match &self.mode {
            Mode::Authenticated(session) => self.remote.list(Some(session)).await,
            Mode::Guest(guest_id) => self.local.list(guest_id).await,
            Mode::None => Ok(Vec::new()),
        }
    }

    /// Save a word; `false` when the owner already had it (or mode is `None`)
    pub async fn save(&self, word: &Word) -> Result<bool> {
        match &self.mode {
            Mode::Authenticated(session) => self.remote.save(Some(session), word).await,
            Mode::Guest(guest_id) => self.local.save(guest_id, word).await,
            Mode::None => {
                tracing::debug!("Ignoring save without an identity");
                Ok(false)
            }
        }
    }

    pub async fn remove(&self, word_id: &str) -> Result<()> {
        match &self.mode {
            Mode::Authenticated(session) => self.remote.remove(Some(session), word_id).await,
            Mode::Guest(guest_id) => self.local.remove(guest_id, word_id).await,
            Mode::None => Ok(()),
        }
    }

    pub async fn update_status(&self, word_id: &str, status: WordStatus) -> Result<()> {
        match &self.mode {
            Mode::Authenticated(session) => {
                self.remote
                    .update_status(Some(session), word_id, status)
                    .await
            }
            Mode::Guest(guest_id) => self.local.update_status(guest_id, word_id, status).await,
            Mode::None => Ok(()),
        }
    }

    /// Flip a word between learned and unlearned
    ///
    /// Returns the new status, or `None` when the id is not in the list.
    pub async fn toggle_status(&self, word_id: &str) -> Result<Option<WordStatus>> {
        let Some(current) = self
            .list()
            .await?
            .into_iter()
            .find(|w| w.id == word_id)
            .map(|w| w.status)
        else {
            return Ok(None);
        };

        let next = current.toggled();
        self.update_status(word_id, next).await?;
        Ok(Some(next))
    }
}
