// # Authenticator
//
// Owns the client's session lifecycle on top of an [`IdentityProvider`].
//
// ## Transition Order
//
// Every transition into an authenticated identity runs, in order:
//
// 1. Guest migration (when a guest id exists), failures swallowed
// 2. Persist the session (device storage + access-token cookie)
// 3. Disable guest mode (device flag + guest cookie together)
// 4. Broadcast `SessionEvent::SignedIn`
//
// Migration runs before the guest flag is dropped so an interrupted
// transition leaves the guest data reachable for the next load-time run.
//
// ## Notification Stream
//
// `watch()` hands out a stream of [`SessionEvent`]s backed by a broadcast
// channel. Slow subscribers lose old events rather than blocking sign-in.

use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use crate::error::Result;
use crate::identity::{ACCESS_TOKEN_COOKIE, GuestMode, Mode, resolve_mode};
use crate::migration::{MigrationEngine, MigrationReport};
use crate::model::{Session, SignUpOutcome, UserId};
use crate::traits::{DeviceStorage, IdentityProvider};

/// Device storage key of the persisted session
pub const SESSION_KEY: &str = "mywords_session";

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Session change notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A session was established (sign-in, confirmed sign-up)
    SignedIn(UserId),
    /// The user signed out
    SignedOut,
    /// The stored session expired or was revoked by the provider
    SessionExpired,
}

/// Client-side authentication state machine
pub struct Authenticator {
    identity: Arc<dyn IdentityProvider>,
    storage: Arc<dyn DeviceStorage>,
    guest: GuestMode,
    migration: MigrationEngine,
    email_redirect_to: Option<String>,
    events: broadcast::Sender<SessionEvent>,
}

impl Authenticator {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        storage: Arc<dyn DeviceStorage>,
        migration: MigrationEngine,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            identity,
            guest: GuestMode::new(storage.clone()),
            storage,
            migration,
            email_redirect_to: None,
            events,
        }
    }

    /// Where sign-up confirmation emails should send the user
    pub fn with_email_redirect(mut self, url: impl Into<String>) -> Self {
        self.email_redirect_to = Some(url.into());
        self
    }

    pub fn guest_mode(&self) -> &GuestMode {
        &self.guest
    }

    /// Subscribe to session changes
    pub fn watch(&self) -> Pin<Box<dyn Stream<Item = SessionEvent> + Send + 'static>> {
        Box::pin(BroadcastStream::new(self.events.subscribe()).filter_map(|event| event.ok()))
    }

    /// The stored session, if it is still valid
    ///
    /// Expired sessions and sessions the provider no longer recognizes are
    /// dropped and reported as `SessionExpired`. Provider outages surface
    /// as `Error::Backend`.
    pub async fn current_session(&self) -> Result<Option<Session>> {
        let Some(mut session) = self.stored_session().await? else {
            return Ok(None);
        };

        if session.is_expired() {
            tracing::info!(user_id = %session.user_id(), "Stored session expired");
            self.expire().await?;
            return Ok(None);
        }

        match self.identity.get_user(&session.access_token).await? {
            Some(user) => {
                session.user = user;
                Ok(Some(session))
            }
            None => {
                tracing::info!(user_id = %session.user_id(), "Identity provider no longer recognizes session");
                self.expire().await?;
                Ok(None)
            }
        }
    }

    /// Resolve the current mode, migrating leftover guest data
    ///
    /// This is the "page load" entry point. An authenticated caller who still
    /// has a guest id gets the idempotent load-time migration.
    pub async fn resolve_mode(&self) -> Result<Mode> {
        let session = self.current_session().await?;

        if let Some(session) = &session
            && let Some(guest_id) = self.guest.guest_id().await?
        {
            let report = self.migration.migrate(&guest_id, session).await;
            if !report.is_noop() {
                tracing::info!(migrated = report.migrated(), "Migrated leftover guest words on load");
            }
            if self.guest.is_enabled().await? {
                self.guest.disable().await?;
            }
        }

        resolve_mode(session, &self.guest).await
    }

    /// Sign in with email and password
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(Session, MigrationReport)> {
        let session = self.identity.sign_in(email, password).await?;
        let report = self.complete_authentication(&session).await?;
        Ok((session, report))
    }

    /// Register a new identity
    ///
    /// A confirmed identity is signed in immediately (with migration). A
    /// pending one leaves guest mode untouched until the email is confirmed.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome> {
        let outcome = self
            .identity
            .sign_up(email, password, self.email_redirect_to.as_deref())
            .await?;

        match &outcome {
            SignUpOutcome::Confirmed(session) => {
                self.complete_authentication(session).await?;
            }
            SignUpOutcome::ConfirmationPending { email } => {
                tracing::info!(email = %email, "Sign-up pending email confirmation");
            }
        }

        Ok(outcome)
    }

    /// Sign out and forget the stored session
    ///
    /// A provider failure is logged; the local session is dropped regardless.
    pub async fn sign_out(&self) -> Result<()> {
        if let Some(session) = self.stored_session().await?
            && let Err(e) = self.identity.sign_out(&session).await
        {
            tracing::warn!("Identity provider sign-out failed: {}", e);
        }

        self.clear_session().await?;
        let _ = self.events.send(SessionEvent::SignedOut);
        tracing::info!("Signed out");
        Ok(())
    }

    /// Adopt a session obtained out of band (e.g. an email confirmation link)
    pub async fn complete_authentication(&self, session: &Session) -> Result<MigrationReport> {
        let report = match self.guest.guest_id().await? {
            Some(guest_id) => self.migration.migrate(&guest_id, session).await,
            None => MigrationReport::default(),
        };

        self.persist_session(session).await?;
        self.guest.disable().await?;

        tracing::info!(user_id = %session.user_id(), provider = self.identity.provider_name(), "Signed in");
        let _ = self.events.send(SessionEvent::SignedIn(session.user_id().clone()));
        Ok(report)
    }

    /// Whether a session is persisted locally, without asking the provider
    pub async fn has_stored_session(&self) -> Result<bool> {
        Ok(self.stored_session().await?.is_some())
    }

    async fn stored_session(&self) -> Result<Option<Session>> {
        let Some(raw) = self.storage.get_item(SESSION_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!("Discarding unreadable stored session: {}", e);
                self.clear_session().await?;
                Ok(None)
            }
        }
    }

    async fn persist_session(&self, session: &Session) -> Result<()> {
        let raw = serde_json::to_string(session)?;
        self.storage.set_item(SESSION_KEY, &raw).await?;
        self.guest
            .cookies()
            .set(ACCESS_TOKEN_COOKIE, &session.access_token)
            .await
    }

    async fn clear_session(&self) -> Result<()> {
        self.storage.remove_item(SESSION_KEY).await?;
        self.guest.cookies().remove(ACCESS_TOKEN_COOKIE).await
    }

    async fn expire(&self) -> Result<()> {
        self.clear_session().await?;
        let _ = self.events.send(SessionEvent::SessionExpired);
        Ok(())
    }
}
