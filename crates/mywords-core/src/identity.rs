//! Identity mode resolution and the guest-mode flag
//!
//! The mode is a value ([`Mode`]) computed from a session and the persisted
//! guest flag, then handed to whoever needs it. Nothing here is global.
//!
//! The guest flag lives in two places: device storage (read by the client)
//! and a request-visible cookie (read by server-side route gating).
//! [`GuestMode`] is the only writer of either copy and always writes both.

use std::sync::Arc;

use crate::error::Result;
use crate::model::{GuestId, Session};
use crate::traits::DeviceStorage;

/// Device storage key of the guest-mode flag
pub const GUEST_MODE_KEY: &str = "mywords_guest_mode";

/// Device storage key of the generated guest id
pub const GUEST_ID_KEY: &str = "mywords_guest_user_id";

/// Cookie carrying the guest-mode flag to the server
pub const GUEST_MODE_COOKIE: &str = "mywords_guest_mode";

/// Cookie carrying the access token to the server
pub const ACCESS_TOKEN_COOKIE: &str = "mywords_access_token";

const COOKIE_KEY_PREFIX: &str = "cookie:";

/// Who the current caller is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// No valid session, guest flag set
    Guest(GuestId),
    /// A valid session for a known user
    Authenticated(Session),
    /// Neither; protected views redirect to login
    None,
}

impl Mode {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Mode::Authenticated(_))
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            Mode::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    /// Short label for logs and status output
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Guest(_) => "guest",
            Mode::Authenticated(_) => "authenticated",
            Mode::None => "none",
        }
    }
}

/// Resolve the current mode
///
/// - `Authenticated` iff a valid session exists
/// - `Guest` iff no valid session exists and the guest flag is set
/// - `None` otherwise
///
/// Entering guest mode creates the guest id when it is missing.
pub async fn resolve_mode(session: Option<Session>, guest: &GuestMode) -> Result<Mode> {
    if let Some(session) = session.filter(|s| !s.is_expired()) {
        return Ok(Mode::Authenticated(session));
    }

    if guest.is_enabled().await? {
        let id = guest.ensure_guest_id().await?;
        return Ok(Mode::Guest(id));
    }

    Ok(Mode::None)
}

/// Request-visible cookies persisted on the device
///
/// The client attaches [`CookieJar::header_value`] to every request it makes
/// to the server, the way a browser sends its cookies.
#[derive(Clone)]
pub struct CookieJar {
    storage: Arc<dyn DeviceStorage>,
}

impl CookieJar {
    pub fn new(storage: Arc<dyn DeviceStorage>) -> Self {
        Self { storage }
    }

    pub async fn set(&self, name: &str, value: &str) -> Result<()> {
        self.storage.set_item(&Self::key(name), value).await
    }

    pub async fn remove(&self, name: &str) -> Result<()> {
        self.storage.remove_item(&Self::key(name)).await
    }

    pub async fn get(&self, name: &str) -> Result<Option<String>> {
        self.storage.get_item(&Self::key(name)).await
    }

    /// `Cookie` header value with every stored cookie, or `None` when empty
    pub async fn header_value(&self) -> Result<Option<String>> {
        let mut names: Vec<String> = self
            .storage
            .keys()
            .await?
            .into_iter()
            .filter_map(|k| k.strip_prefix(COOKIE_KEY_PREFIX).map(str::to_string))
            .collect();
        names.sort();

        let mut pairs = Vec::with_capacity(names.len());
        for name in names {
            if let Some(value) = self.get(&name).await? {
                pairs.push(format!("{}={}", name, value));
            }
        }

        Ok((!pairs.is_empty()).then(|| pairs.join("; ")))
    }

    fn key(name: &str) -> String {
        format!("{}{}", COOKIE_KEY_PREFIX, name)
    }
}

/// The guest-mode flag and guest id
#[derive(Clone)]
pub struct GuestMode {
    storage: Arc<dyn DeviceStorage>,
    cookies: CookieJar,
}

impl GuestMode {
    pub fn new(storage: Arc<dyn DeviceStorage>) -> Self {
        Self {
            cookies: CookieJar::new(storage.clone()),
            storage,
        }
    }

    /// "Continue as guest": set both flag copies and make sure a guest id exists
    pub async fn enable(&self) -> Result<GuestId> {
        self.storage.set_item(GUEST_MODE_KEY, "true").await?;
        self.cookies.set(GUEST_MODE_COOKIE, "true").await?;
        let id = self.ensure_guest_id().await?;
        tracing::info!(guest_id = %id, "Guest mode enabled");
        Ok(id)
    }

    /// Clear both flag copies; the guest id is kept for a later migration
    pub async fn disable(&self) -> Result<()> {
        self.storage.remove_item(GUEST_MODE_KEY).await?;
        self.cookies.remove(GUEST_MODE_COOKIE).await?;
        tracing::debug!("Guest mode disabled");
        Ok(())
    }

    pub async fn is_enabled(&self) -> Result<bool> {
        Ok(self.storage.get_item(GUEST_MODE_KEY).await?.as_deref() == Some("true"))
    }

    /// The persisted guest id, without creating one
    pub async fn guest_id(&self) -> Result<Option<GuestId>> {
        Ok(self
            .storage
            .get_item(GUEST_ID_KEY)
            .await?
            .filter(|id| !id.is_empty())
            .map(GuestId::new))
    }

    /// The persisted guest id, created on first use
    pub async fn ensure_guest_id(&self) -> Result<GuestId> {
        if let Some(id) = self.guest_id().await? {
            return Ok(id);
        }
        let id = GuestId::generate();
        self.storage.set_item(GUEST_ID_KEY, id.as_str()).await?;
        tracing::debug!(guest_id = %id, "Generated guest id");
        Ok(id)
    }

    /// Forget the guest entirely: both flag copies and the guest id
    pub async fn clear_all(&self) -> Result<()> {
        self.disable().await?;
        self.storage.remove_item(GUEST_ID_KEY).await
    }

    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{User, UserId};
    use crate::storage::MemoryDeviceStorage;
    use chrono::{Duration, Utc};

    fn session(expires_in: Duration) -> Session {
        Session {
            access_token: "t".to_string(),
            refresh_token: None,
            expires_at: Utc::now() + expires_in,
            user: User {
                id: UserId::new("u1"),
                email: None,
            },
        }
    }

    #[tokio::test]
    async fn test_enable_writes_both_copies() {
        let storage = Arc::new(MemoryDeviceStorage::new());
        let guest = GuestMode::new(storage.clone());

        let id = guest.enable().await.unwrap();
        assert!(guest.is_enabled().await.unwrap());
        assert_eq!(
            guest.cookies().get(GUEST_MODE_COOKIE).await.unwrap().as_deref(),
            Some("true")
        );
        // Stable across calls
        assert_eq!(guest.enable().await.unwrap(), id);

        guest.disable().await.unwrap();
        assert!(!guest.is_enabled().await.unwrap());
        assert_eq!(guest.cookies().get(GUEST_MODE_COOKIE).await.unwrap(), None);
        assert_eq!(guest.guest_id().await.unwrap(), Some(id));
    }

    #[tokio::test]
    async fn test_clear_all_forgets_guest_id() {
        let guest = GuestMode::new(Arc::new(MemoryDeviceStorage::new()));
        guest.enable().await.unwrap();
        guest.clear_all().await.unwrap();
        assert_eq!(guest.guest_id().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_resolve_mode() {
        let guest = GuestMode::new(Arc::new(MemoryDeviceStorage::new()));

        assert_eq!(resolve_mode(None, &guest).await.unwrap(), Mode::None);

        let live = session(Duration::hours(1));
        let mode = resolve_mode(Some(live.clone()), &guest).await.unwrap();
        assert_eq!(mode, Mode::Authenticated(live));

        guest.enable().await.unwrap();
        let expired = session(-Duration::hours(1));
        let mode = resolve_mode(Some(expired), &guest).await.unwrap();
        assert!(matches!(mode, Mode::Guest(_)));
    }

    #[tokio::test]
    async fn test_cookie_header_value() {
        let jar = CookieJar::new(Arc::new(MemoryDeviceStorage::new()));
        assert_eq!(jar.header_value().await.unwrap(), None);

        jar.set("b", "2").await.unwrap();
        jar.set("a", "1").await.unwrap();
        assert_eq!(jar.header_value().await.unwrap().as_deref(), Some("a=1; b=2"));
    }
}
