//! Plugin-based provider registry
//!
//! Backends register factories by type name; binaries create instances from
//! configuration without hard-coding any plugin crate into the core.
//!
//! ## Registration
//!
//! ```rust,ignore
//! // In mywords-provider-supabase
//! pub fn register(registry: &ProviderRegistry) {
//!     registry.register_identity_provider("supabase", Box::new(SupabaseIdentityFactory));
//!     registry.register_word_store("supabase", Box::new(SupabaseWordStoreFactory));
//! }
//! ```

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::{BackendConfig, DeviceStorageConfig, OracleConfig};
use crate::error::{Error, Result};
use crate::storage::{FileDeviceStorageFactory, MemoryDeviceStorageFactory};
use crate::traits::{
    DeviceStorage, DeviceStorageFactory, IdentityProvider, IdentityProviderFactory,
    RemoteWordStore, RemoteWordStoreFactory, TextOracle, TextOracleFactory,
};

type Factories<F> = RwLock<HashMap<String, Arc<F>>>;

/// Registry of backend factories
///
/// Interior mutability lets plugins register through a shared reference.
#[derive(Default)]
pub struct ProviderRegistry {
    identity_providers: Factories<dyn IdentityProviderFactory>,
    word_stores: Factories<dyn RemoteWordStoreFactory>,
    oracles: Factories<dyn TextOracleFactory>,
    device_storages: Factories<dyn DeviceStorageFactory>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in device storages registered
    pub fn with_builtin_storage() -> Self {
        let registry = Self::new();
        registry.register_builtin_storage();
        registry
    }

    /// Register `"memory"` and `"file"` device storage
    pub fn register_builtin_storage(&self) {
        self.register_device_storage("memory", Box::new(MemoryDeviceStorageFactory));
        self.register_device_storage("file", Box::new(FileDeviceStorageFactory));
    }

    pub fn register_identity_provider(
        &self,
        name: impl Into<String>,
        factory: Box<dyn IdentityProviderFactory>,
    ) {
        write(&self.identity_providers).insert(name.into(), Arc::from(factory));
    }

    pub fn register_word_store(
        &self,
        name: impl Into<String>,
        factory: Box<dyn RemoteWordStoreFactory>,
    ) {
        write(&self.word_stores).insert(name.into(), Arc::from(factory));
    }

    pub fn register_oracle(&self, name: impl Into<String>, factory: Box<dyn TextOracleFactory>) {
        write(&self.oracles).insert(name.into(), Arc::from(factory));
    }

    pub fn register_device_storage(
        &self,
        name: impl Into<String>,
        factory: Box<dyn DeviceStorageFactory>,
    ) {
        write(&self.device_storages).insert(name.into(), Arc::from(factory));
    }

    /// Create an identity provider from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Arc<dyn IdentityProvider>)`: Created provider instance
    /// - `Err(Error)`: If the type is not registered or creation fails
    pub fn create_identity_provider(
        &self,
        config: &BackendConfig,
    ) -> Result<Arc<dyn IdentityProvider>> {
        let factory = lookup(&self.identity_providers, config.type_name(), "identity provider")?;
        factory.create(config)
    }

    /// Create a remote word store from configuration
    pub fn create_word_store(&self, config: &BackendConfig) -> Result<Arc<dyn RemoteWordStore>> {
        let factory = lookup(&self.word_stores, config.type_name(), "word store")?;
        factory.create(config)
    }

    /// Create a text oracle from configuration
    pub fn create_oracle(&self, config: &OracleConfig) -> Result<Arc<dyn TextOracle>> {
        let factory = lookup(&self.oracles, config.type_name(), "oracle")?;
        factory.create(config)
    }

    /// Create device storage from configuration
    pub async fn create_device_storage(
        &self,
        config: &DeviceStorageConfig,
    ) -> Result<Arc<dyn DeviceStorage>> {
        // The lock guard is released before awaiting
        let factory = lookup(&self.device_storages, config.type_name(), "device storage")?;
        let config_json = match config {
            DeviceStorageConfig::Custom { config, .. } => config.clone(),
            other => serde_json::to_value(other)?,
        };
        factory.create(&config_json).await
    }

    pub fn has_identity_provider(&self, name: &str) -> bool {
        read(&self.identity_providers).contains_key(name)
    }

    pub fn has_word_store(&self, name: &str) -> bool {
        read(&self.word_stores).contains_key(name)
    }

    pub fn has_oracle(&self, name: &str) -> bool {
        read(&self.oracles).contains_key(name)
    }

    pub fn has_device_storage(&self, name: &str) -> bool {
        read(&self.device_storages).contains_key(name)
    }

    /// Registered oracle type names
    pub fn list_oracles(&self) -> Vec<String> {
        read(&self.oracles).keys().cloned().collect()
    }
}

fn lookup<F: ?Sized>(map: &Factories<F>, name: &str, kind: &str) -> Result<Arc<F>> {
    read(map)
        .get(name)
        .cloned()
        .ok_or_else(|| Error::config(format!("Unknown {} type: {}", kind, name)))
}

// Writers only insert, so a poisoned map is still consistent.
fn read<F: ?Sized>(map: &Factories<F>) -> RwLockReadGuard<'_, HashMap<String, Arc<F>>> {
    map.read().unwrap_or_else(|e| e.into_inner())
}

fn write<F: ?Sized>(map: &Factories<F>) -> RwLockWriteGuard<'_, HashMap<String, Arc<F>>> {
    map.write().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingOracleFactory;

    impl TextOracleFactory for FailingOracleFactory {
        fn create(&self, _config: &OracleConfig) -> Result<Arc<dyn TextOracle>> {
            Err(Error::config("not available in tests"))
        }
    }

    #[test]
    fn test_registry_registration() {
        let registry = ProviderRegistry::new();
        assert!(!registry.has_oracle("mock"));

        registry.register_oracle("mock", Box::new(FailingOracleFactory));
        assert!(registry.has_oracle("mock"));
        assert!(registry.list_oracles().contains(&"mock".to_string()));
    }

    #[test]
    fn test_unknown_type_is_config_error() {
        let registry = ProviderRegistry::new();
        let err = registry
            .create_word_store(&BackendConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_builtin_storage() {
        let registry = ProviderRegistry::with_builtin_storage();
        assert!(registry.has_device_storage("file"));

        let storage = registry
            .create_device_storage(&DeviceStorageConfig::Memory)
            .await
            .unwrap();
        storage.set_item("k", "v").await.unwrap();
        assert_eq!(storage.get_item("k").await.unwrap().as_deref(), Some("v"));
    }
}
