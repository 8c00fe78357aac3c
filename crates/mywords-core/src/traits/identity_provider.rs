// # Identity Provider Trait
//
// Defines the interface to the external identity provider.
//
// The provider handles credential storage, token issuance and email
// verification. This crate only ever sees the resulting [`Session`].
//
// ## Implementations
//
// - Supabase (GoTrue): `mywords-provider-supabase` crate

use async_trait::async_trait;

use crate::config::BackendConfig;
use crate::model::{Session, SignUpOutcome, User};

/// Trait for identity provider implementations
///
/// # Trust Level: Untrusted
///
/// Providers are stateless: they never persist sessions, never trigger
/// migration and never broadcast session changes. `Authenticator` owns all
/// of that.
///
/// # Error Contract
///
/// - Rejected credentials or tokens → `Error::Unauthenticated`
/// - Transport or server failures → `Error::Backend`
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange email and password for a session
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, crate::Error>;

    /// Register a new identity
    ///
    /// # Parameters
    ///
    /// - `email_redirect_to`: Where the confirmation email should send the user
    ///
    /// # Returns
    ///
    /// - `SignUpOutcome::Confirmed`: The identity is usable immediately
    /// - `SignUpOutcome::ConfirmationPending`: A confirmation email was sent
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        email_redirect_to: Option<&str>,
    ) -> Result<SignUpOutcome, crate::Error>;

    /// Revoke a session
    async fn sign_out(&self, session: &Session) -> Result<(), crate::Error>;

    /// Look up the user behind an access token
    ///
    /// # Returns
    ///
    /// - `Ok(Some(User))`: The token is valid
    /// - `Ok(None)`: The token is unknown, expired or revoked
    /// - `Err(Error)`: The provider could not be reached
    async fn get_user(&self, access_token: &str) -> Result<Option<User>, crate::Error>;

    /// Complete an email confirmation link and obtain a session
    async fn confirm_email(&self, token: &str) -> Result<Session, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing identity providers from configuration
pub trait IdentityProviderFactory: Send + Sync {
    /// Create an IdentityProvider instance from configuration
    fn create(
        &self,
        config: &BackendConfig,
    ) -> Result<std::sync::Arc<dyn IdentityProvider>, crate::Error>;
}
