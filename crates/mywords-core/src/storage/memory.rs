// # Memory Device Storage
//
// In-memory implementation of DeviceStorage.
//
// ## Purpose
//
// Stands in for device storage that does not outlive the process: tests,
// the server's throwaway request scope, or a client started with
// `device.type = "memory"`.
//
// ## Crash Behavior
//
// - Guest words, the guest flag and any persisted session are lost on exit
// - A later run starts with `Mode::None`

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::device_storage::{DeviceStorage, DeviceStorageFactory};

/// In-memory device storage
///
/// Cloning shares the underlying map, so a clone observes every write.
///
/// # Example
///
/// ```rust,no_run
/// use mywords_core::storage::MemoryDeviceStorage;
/// use mywords_core::traits::DeviceStorage;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let storage = MemoryDeviceStorage::new();
///     storage.set_item("mywords_guest_mode", "true").await?;
///     assert_eq!(storage.get_item("mywords_guest_mode").await?.as_deref(), Some("true"));
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryDeviceStorage {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryDeviceStorage {
    /// Create a new empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl DeviceStorage for MemoryDeviceStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.inner.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), Error> {
        self.inner
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), Error> {
        self.inner.write().await.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        Ok(self.inner.read().await.keys().cloned().collect())
    }

    async fn flush(&self) -> Result<(), Error> {
        Ok(())
    }
}

/// Factory registered under `"memory"`
pub struct MemoryDeviceStorageFactory;

#[async_trait]
impl DeviceStorageFactory for MemoryDeviceStorageFactory {
    async fn create(&self, _config: &serde_json::Value) -> Result<Arc<dyn DeviceStorage>, Error> {
        Ok(Arc::new(MemoryDeviceStorage::new()))
    }
}
