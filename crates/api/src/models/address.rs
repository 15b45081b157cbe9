//! Address domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use threadline_core::{AddressId, AddressKind, Phone, Pincode, UserId};

/// A saved shipping/billing address, owned by exactly one user.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub kind: AddressKind,
    pub full_name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub pincode: Pincode,
    pub phone: Phone,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
