//! User domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use threadline_core::{Email, Phone, Role, UserId};

/// A registered account, customer or administrator.
///
/// The argon2 password hash is only present for admin accounts; customers
/// authenticate with a phone OTP. The hash is never serialized.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: Phone,
    pub role: Role,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Provider-issued session id for an OTP in flight.
    #[serde(skip_serializing)]
    pub otp_session: Option<String>,
    #[serde(skip_serializing)]
    pub otp_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
