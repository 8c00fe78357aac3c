// # Remote Word Store Trait
//
// Defines the primitives of the durable per-user word store.
//
// ## Implementations
//
// - Supabase (PostgREST): `mywords-provider-supabase` crate
//
// ## Usage
//
// ```rust,ignore
// use mywords_core::RemoteWordStore;
//
// let store = /* RemoteWordStore implementation */;
// let words = store.select_words(&session).await?;
// ```

use async_trait::async_trait;

use crate::config::BackendConfig;
use crate::model::{Session, Word, WordStatus};

/// Trait for durable word store implementations
///
/// Every call is scoped to the user identified by `session`. The session's
/// access token authorizes the call and the store only ever reads or writes
/// rows owned by `session.user.id`.
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTP/HTTPS API calls to their endpoint only
/// - ✅ Translate between the wire schema and [`Word`]
///
/// ## Forbidden Capabilities
/// - ❌ Retry or back off (failures surface to the user as a retry prompt)
/// - ❌ Enforce uniqueness (owned by `RemoteWords::save`)
/// - ❌ Decide authentication mode (owned by the identity resolver)
/// - ❌ Cache rows between calls
#[async_trait]
pub trait RemoteWordStore: Send + Sync {
    /// Fetch every word owned by the session's user
    ///
    /// Order is not guaranteed; callers sort.
    async fn select_words(&self, session: &Session) -> Result<Vec<Word>, crate::Error>;

    /// Find the id of the word with the given lowercase form, if any
    async fn find_word_id(
        &self,
        session: &Session,
        word_lower: &str,
    ) -> Result<Option<String>, crate::Error>;

    /// Insert a word under the session's user
    ///
    /// The store may assign its own id. Ownership always comes from the
    /// session, never from the word.
    async fn insert_word(&self, session: &Session, word: &Word) -> Result<(), crate::Error>;

    /// Delete a word by id
    ///
    /// Deleting an absent id succeeds.
    async fn delete_word(&self, session: &Session, word_id: &str) -> Result<(), crate::Error>;

    /// Set a word's status by id
    ///
    /// Updating an absent id succeeds.
    async fn update_status(
        &self,
        session: &Session,
        word_id: &str,
        status: WordStatus,
    ) -> Result<(), crate::Error>;

    /// Get the store name (for logging/debugging)
    fn store_name(&self) -> &'static str;
}

/// Helper trait for constructing remote word stores from configuration
pub trait RemoteWordStoreFactory: Send + Sync {
    /// Create a RemoteWordStore instance from configuration
    fn create(
        &self,
        config: &BackendConfig,
    ) -> Result<std::sync::Arc<dyn RemoteWordStore>, crate::Error>;
}
