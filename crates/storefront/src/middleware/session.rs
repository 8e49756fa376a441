//! Session middleware configuration.
//!
//! Sessions back the cart's durable per-client storage: one browser/device
//! keeps its cart across page loads, identified by the session cookie.

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "merchdrop_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with the in-memory store.
///
/// `base_url` decides whether the cookie is marked secure (HTTPS).
#[must_use]
pub fn create_session_layer(base_url: &str) -> SessionManagerLayer<MemoryStore> {
    let store = MemoryStore::default();

    let is_secure = base_url.starts_with("https://");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
