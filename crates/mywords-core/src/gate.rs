//! Route gating decisions
//!
//! Pure decision logic for the server's gating middleware. The caller
//! supplies the request path, query string, whether the request carries a
//! valid session, and whether it carries the guest-mode cookie.

use url::form_urlencoded;

/// Path of the login view
pub const LOGIN_PATH: &str = "/login";

/// Path of the email-confirmation callback
pub const AUTH_CALLBACK_PATH: &str = "/auth/callback";

const ASSET_EXTENSIONS: &[&str] = &["svg", "png", "jpg", "jpeg", "gif", "webp"];

/// What to do with a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Let the request through
    Allow,
    /// Send an anonymous visitor to the login view
    RedirectToLogin { location: String },
    /// Send a signed-in user away from the login view
    RedirectHome,
}

/// Decides which requests need an identity
#[derive(Debug, Clone)]
pub struct RouteGate {
    public_prefixes: Vec<String>,
}

impl Default for RouteGate {
    fn default() -> Self {
        Self::new(vec![LOGIN_PATH.to_string(), AUTH_CALLBACK_PATH.to_string()])
    }
}

impl RouteGate {
    pub fn new(public_prefixes: Vec<String>) -> Self {
        Self { public_prefixes }
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.public_prefixes.iter().any(|p| path.starts_with(p.as_str())) || is_asset(path)
    }

    /// Decide what to do with a request
    ///
    /// - anonymous, non-guest, non-public → login, with `redirect=<path>`
    ///   appended to the original query
    /// - authenticated on exactly the login path → home
    /// - anything else → allow
    pub fn decide(
        &self,
        path: &str,
        query: Option<&str>,
        authenticated: bool,
        guest: bool,
    ) -> GateDecision {
        if !authenticated && !guest && !self.is_public(path) {
            let mut params = form_urlencoded::Serializer::new(String::new());
            if let Some(query) = query {
                for (k, v) in form_urlencoded::parse(query.as_bytes()) {
                    if k != "redirect" {
                        params.append_pair(&k, &v);
                    }
                }
            }
            params.append_pair("redirect", path);
            return GateDecision::RedirectToLogin {
                location: format!("{}?{}", LOGIN_PATH, params.finish()),
            };
        }

        if authenticated && path == LOGIN_PATH {
            return GateDecision::RedirectHome;
        }

        GateDecision::Allow
    }
}

fn is_asset(path: &str) -> bool {
    if path == "/favicon.ico" {
        return true;
    }
    path.rsplit_once('.')
        .map(|(_, ext)| ASSET_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
