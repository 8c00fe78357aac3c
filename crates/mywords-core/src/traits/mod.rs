//! Core traits for the MyWords system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`DeviceStorage`]: Device-local key/value storage
//! - [`RemoteWordStore`]: Durable per-user word store primitives
//! - [`IdentityProvider`]: Sign-in, sign-up and session lookup
//! - [`TextOracle`]: Black-box text generation

pub mod device_storage;
pub mod identity_provider;
pub mod remote_store;
pub mod text_oracle;

pub use device_storage::{DeviceStorage, DeviceStorageFactory};
pub use identity_provider::{IdentityProvider, IdentityProviderFactory};
pub use remote_store::{RemoteWordStore, RemoteWordStoreFactory};
pub use text_oracle::{CompletionRequest, TextOracle, TextOracleFactory};
