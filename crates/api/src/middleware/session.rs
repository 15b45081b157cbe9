//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. The session
//! holds the authenticated identity (`{id, role}`) server-side; the cookie
//! carries only the opaque session id.

use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::ThreadlineConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "threadline_session";

/// Session expiry time in seconds (7 days of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer around a migrated `PostgreSQL` store.
///
/// The cookie is marked `Secure` when any allowed CORS origin is served
/// over HTTPS, so local development over plain HTTP still works.
#[must_use]
pub fn create_session_layer(
    store: PostgresStore,
    config: &ThreadlineConfig,
) -> SessionManagerLayer<PostgresStore> {
    let is_secure = config
        .allowed_origins
        .iter()
        .any(|origin| origin.starts_with("https://"));

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        // Lax so checkout redirects from the gateway keep the session
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
