//! Session-related types.

use serde::{Deserialize, Serialize};

use threadline_core::{Role, UserId};

/// Session-stored identity.
///
/// The role is resolved once at login and carried in the session, so role
/// checks at the request boundary never touch the database.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Account's database ID.
    pub id: UserId,
    /// Access role granted at login.
    pub role: Role,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in identity.
    pub const CURRENT_USER: &str = "current_user";
}
