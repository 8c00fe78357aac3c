// # mywords-core
//
// Core library for the MyWords vocabulary system.
//
// ## Architecture Overview
//
// This library owns every piece of state-transition logic in the system:
// - **DeviceStorage**: Trait for device-local key/value storage (guest data, flags, session)
// - **RemoteWordStore**: Trait for the durable per-user word store
// - **IdentityProvider**: Trait for sign-in, sign-up and session lookup
// - **TextOracle**: Trait for the text-generation backend
// - **MigrationEngine**: Moves a guest's words into a user's collection on authentication
// - **WordList**: Facade that routes word operations by the resolved identity mode
// - **ProviderRegistry**: Plugin-based registry for identity, store and oracle backends
//
// ## Design Principles
//
// 1. **Core-first**: Plugins perform single-shot I/O, all decisions live here
// 2. **Explicit mode**: The guest/authenticated verdict is a value passed into the facade
// 3. **Availability of login**: Migration never fails an authentication transition
// 4. **Idempotency**: Re-running a migration on an empty guest collection is a no-op

pub mod auth;
pub mod config;
pub mod error;
pub mod facade;
pub mod gate;
pub mod identity;
pub mod local_store;
pub mod lookup;
pub mod migration;
pub mod model;
pub mod registry;
pub mod remote;
pub mod storage;
pub mod story;
pub mod traits;

// Re-export core types for convenience
pub use auth::{Authenticator, SessionEvent};
pub use config::{BackendConfig, ClientConfig, DeviceStorageConfig, MywordsConfig, OracleConfig};
pub use error::{Error, Result};
pub use facade::WordList;
pub use gate::{GateDecision, RouteGate};
pub use identity::{CookieJar, GuestMode, Mode};
pub use local_store::LocalWordStore;
pub use lookup::{LookupService, WordEntry};
pub use migration::{MigrationEngine, MigrationOutcome, MigrationReport};
pub use model::{DetailedInfo, GuestId, Owner, Session, SignUpOutcome, User, UserId, Word, WordStatus};
pub use registry::ProviderRegistry;
pub use remote::RemoteWords;
pub use storage::{FileDeviceStorage, MemoryDeviceStorage};
pub use story::{Story, StoryService, StoryWord};
pub use traits::{DeviceStorage, IdentityProvider, RemoteWordStore, TextOracle};
