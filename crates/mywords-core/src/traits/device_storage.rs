// # Device Storage Trait
//
// Defines the interface for device-local persistent storage.
//
// ## Purpose
//
// Device storage is the on-device home of everything a guest owns:
// - The guest-mode flag and the generated guest identifier
// - One serialized word collection per guest identifier
// - The client's persisted session and request-visible cookies
//
// Values are opaque strings (usually JSON), mirroring browser `localStorage`.
//
// ## Implementations
//
// - Memory: `MemoryDeviceStorage` (tests, ephemeral clients)
// - File: `FileDeviceStorage` (JSON file with atomic writes)

use async_trait::async_trait;

/// Trait for device storage implementations
///
/// # Concurrency
///
/// A device is driven by a single logical client. Implementations must be
/// safe to share across tasks, but no ordering is promised between two
/// overlapping writers: the last write wins.
///
/// # Trust Level: Trusted (Core Component)
///
/// ## Allowed Capabilities
/// - ✅ Perform local I/O (files)
/// - ✅ Cache the full key space in memory
///
/// ## Forbidden Capabilities
/// - ❌ Network access
/// - ❌ Interpreting values (owned by `LocalWordStore`, `GuestMode`, `Authenticator`)
#[async_trait]
pub trait DeviceStorage: Send + Sync {
    /// Read a value
    ///
    /// # Returns
    ///
    /// - `Ok(Some(String))`: The stored value
    /// - `Ok(None)`: Key not present
    /// - `Err(Error)`: Storage error
    async fn get_item(&self, key: &str) -> Result<Option<String>, crate::Error>;

    /// Create or replace a value
    async fn set_item(&self, key: &str, value: &str) -> Result<(), crate::Error>;

    /// Remove a value
    ///
    /// Removing an absent key succeeds.
    async fn remove_item(&self, key: &str) -> Result<(), crate::Error>;

    /// List all keys currently stored
    async fn keys(&self) -> Result<Vec<String>, crate::Error>;

    /// Persist any pending changes
    async fn flush(&self) -> Result<(), crate::Error>;
}

/// Helper trait for constructing device storage from configuration
#[async_trait]
pub trait DeviceStorageFactory: Send + Sync {
    /// Create a DeviceStorage instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this storage backend
    async fn create(
        &self,
        config: &serde_json::Value,
    ) -> Result<std::sync::Arc<dyn DeviceStorage>, crate::Error>;
}
