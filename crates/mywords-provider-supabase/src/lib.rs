// # Supabase Backend
//
// This crate provides the identity provider and durable word store for
// MyWords on top of a Supabase project.
//
// - `SupabaseIdentityProvider`: GoTrue REST (`/auth/v1/*`)
// - `SupabaseWordStore`: PostgREST `words` table (`/rest/v1/words`)
//
// ## Architectural Constraints
//
// ### Trust Level: Untrusted (Backend Plugin)
//
// **Allowed Capabilities**:
// - ✅ Perform HTTP/HTTPS API calls to the configured project only
// - ✅ Translate rows and GoTrue payloads into core types
//
// **Forbidden Capabilities**:
// - ❌ Retry or back off (backend failures surface as a retry prompt)
// - ❌ Decide word uniqueness (owned by `RemoteWords`)
// - ❌ Persist sessions (owned by `Authenticator`)
// - ❌ Spawn tasks or cache rows between calls
//
// ## Security Requirements
//
// - Anon key and access tokens NEVER appear in logs or `Debug` output
// - Every PostgREST call is filtered by `user_id` in addition to row-level security

mod auth;
mod client;
mod words;

pub use auth::SupabaseIdentityProvider;
pub use client::SupabaseClient;
pub use words::SupabaseWordStore;

use mywords_core::config::BackendConfig;
use mywords_core::traits::{
    IdentityProvider, IdentityProviderFactory, RemoteWordStore, RemoteWordStoreFactory,
};
use mywords_core::{Error, ProviderRegistry, Result};
use std::sync::Arc;

/// Factory for [`SupabaseIdentityProvider`]
pub struct SupabaseIdentityFactory;

impl IdentityProviderFactory for SupabaseIdentityFactory {
    fn create(&self, config: &BackendConfig) -> Result<Arc<dyn IdentityProvider>> {
        Ok(Arc::new(SupabaseIdentityProvider::new(client_from(config)?)))
    }
}

/// Factory for [`SupabaseWordStore`]
pub struct SupabaseWordStoreFactory;

impl RemoteWordStoreFactory for SupabaseWordStoreFactory {
    fn create(&self, config: &BackendConfig) -> Result<Arc<dyn RemoteWordStore>> {
        Ok(Arc::new(SupabaseWordStore::new(client_from(config)?)))
    }
}

fn client_from(config: &BackendConfig) -> Result<SupabaseClient> {
    match config {
        BackendConfig::Supabase { url, anon_key } => SupabaseClient::new(url, anon_key),
        _ => Err(Error::config("Invalid config for Supabase backend")),
    }
}

/// Register the Supabase identity provider and word store with a registry
///
/// # Example
///
/// ```rust
/// use mywords_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// mywords_provider_supabase::register(&registry);
/// assert!(registry.has_word_store("supabase"));
/// ```
pub fn register(registry: &ProviderRegistry) {
    registry.register_identity_provider("supabase", Box::new(SupabaseIdentityFactory));
    registry.register_word_store("supabase", Box::new(SupabaseWordStoreFactory));
}
