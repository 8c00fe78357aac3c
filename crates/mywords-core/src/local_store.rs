//! Device-local word store
//!
//! One serialized collection per guest id, kept newest first. Backed by any
//! [`DeviceStorage`], so the same code runs against a JSON file on the CLI
//! and an in-memory map in tests.

use std::sync::Arc;

use crate::error::Result;
use crate::model::{GuestId, Word, WordStatus, sort_newest_first};
use crate::traits::DeviceStorage;

/// Key prefix of a guest's serialized word collection
pub const GUEST_WORDS_KEY_PREFIX: &str = "mywords_guest_words_";

/// Guest-owned words in device storage
#[derive(Clone)]
pub struct LocalWordStore {
    storage: Arc<dyn DeviceStorage>,
}

impl LocalWordStore {
    pub fn new(storage: Arc<dyn DeviceStorage>) -> Self {
        Self { storage }
    }

    /// Device storage key for a guest's collection
    pub fn key_for(guest_id: &GuestId) -> String {
        format!("{}{}", GUEST_WORDS_KEY_PREFIX, guest_id)
    }

    /// All words of a guest, newest first
    pub async fn list(&self, guest_id: &GuestId) -> Result<Vec<Word>> {
        let mut words = self.load(guest_id).await?;
        sort_newest_first(&mut words);
        Ok(words)
    }

    /// Save a word at the front of the collection
    ///
    /// Returns `false` without writing when the guest already has a word with
    /// the same lowercase form.
    pub async fn save(&self, guest_id: &GuestId, word: &Word) -> Result<bool> {
        let mut words = self.load(guest_id).await?;
        let key = word.key();
        if words.iter().any(|w| w.key() == key) {
            tracing::debug!("Guest already has '{}', skipping save", key);
            return Ok(false);
        }

        words.insert(0, word.clone());
        self.store(guest_id, &words).await?;
        Ok(true)
    }

    /// Remove a word by id; an absent id leaves the collection untouched
    pub async fn remove(&self, guest_id: &GuestId, word_id: &str) -> Result<()> {
        let mut words = self.load(guest_id).await?;
        let before = words.len();
        words.retain(|w| w.id != word_id);
        if words.len() == before {
            return Ok(());
        }
        self.store(guest_id, &words).await
    }

    /// Set the status of a word; an absent id leaves the collection untouched
    pub async fn update_status(
        &self,
        guest_id: &GuestId,
        word_id: &str,
        status: WordStatus,
    ) -> Result<()> {
        let mut words = self.load(guest_id).await?;
        let Some(word) = words.iter_mut().find(|w| w.id == word_id) else {
            return Ok(());
        };
        if word.status == status {
            return Ok(());
        }
        word.status = status;
        self.store(guest_id, &words).await
    }

    /// Drop the guest's whole collection
    pub async fn clear(&self, guest_id: &GuestId) -> Result<()> {
        self.storage.remove_item(&Self::key_for(guest_id)).await
    }

    pub async fn is_empty(&self, guest_id: &GuestId) -> Result<bool> {
        Ok(self.load(guest_id).await?.is_empty())
    }

    /// Read the raw collection in stored order
    ///
    /// Unparseable data counts as an empty collection.
    pub(crate) async fn load(&self, guest_id: &GuestId) -> Result<Vec<Word>> {
        let Some(raw) = self.storage.get_item(&Self::key_for(guest_id)).await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<Word>>(&raw) {
            Ok(words) => Ok(words),
            Err(e) => {
                tracing::warn!(guest_id = %guest_id, "Ignoring unreadable guest word collection: {}", e);
                Ok(Vec::new())
            }
        }
    }

    async fn store(&self, guest_id: &GuestId, words: &[Word]) -> Result<()> {
        let raw = serde_json::to_string(words)?;
        self.storage.set_item(&Self::key_for(guest_id), &raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryDeviceStorage;
    use chrono::{Duration, Utc};

    fn store() -> (LocalWordStore, Arc<MemoryDeviceStorage>, GuestId) {
        let storage = Arc::new(MemoryDeviceStorage::new());
        (
            LocalWordStore::new(storage.clone()),
            storage,
            GuestId::new("guest-1-abc"),
        )
    }

    #[tokio::test]
    async fn test_save_is_case_insensitive_noop() {
        let (store, _, guest) = store();

        assert!(store.save(&guest, &Word::new("Cat", "feline")).await.unwrap());
        let mut dup = Word::new("cat", "other");
        dup.word = "CAT".to_string();
        assert!(!store.save(&guest, &dup).await.unwrap());

        let words = store.list(&guest).await.unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].meaning, "feline");
    }

    #[tokio::test]
    async fn test_list_sorts_newest_first() {
        let (store, storage, guest) = store();
        let now = Utc::now();
        let old = Word::new("old", "o").with_created_at(now - Duration::days(2));
        let mid = Word::new("mid", "m").with_created_at(now - Duration::days(1));
        let new = Word::new("new", "n").with_created_at(now);

        // Write out of order directly to storage
        let raw = serde_json::to_string(&vec![mid.clone(), new.clone(), old.clone()]).unwrap();
        storage
            .set_item(&LocalWordStore::key_for(&guest), &raw)
            .await
            .unwrap();

        let words: Vec<String> = store
            .list(&guest)
            .await
            .unwrap()
            .into_iter()
            .map(|w| w.word)
            .collect();
        assert_eq!(words, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn test_remove_and_update_are_idempotent() {
        let (store, _, guest) = store();
        let word = Word::new("cat", "feline");
        store.save(&guest, &word).await.unwrap();

        store
            .update_status(&guest, &word.id, WordStatus::Learned)
            .await
            .unwrap();
        store
            .update_status(&guest, "missing", WordStatus::Learned)
            .await
            .unwrap();
        assert_eq!(store.list(&guest).await.unwrap()[0].status, WordStatus::Learned);

        store.remove(&guest, &word.id).await.unwrap();
        store.remove(&guest, &word.id).await.unwrap();
        assert!(store.is_empty(&guest).await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_collection_reads_as_empty() {
        let (store, storage, guest) = store();
        storage
            .set_item(&LocalWordStore::key_for(&guest), "not a list")
            .await
            .unwrap();

        assert!(store.list(&guest).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_collections_are_per_guest() {
        let (store, _, guest) = store();
        let other = GuestId::new("guest-2-def");
        store.save(&guest, &Word::new("cat", "feline")).await.unwrap();

        assert!(store.is_empty(&other).await.unwrap());
        store.clear(&guest).await.unwrap();
        assert!(store.is_empty(&guest).await.unwrap());
    }
}
