//! Cart domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use threadline_core::{CartId, ProductId, UserId};

/// One line in a user's cart, joined with live product data for display.
///
/// A line is keyed by the (product, size, color) variant; matching adds
/// accumulate quantity instead of creating a second line.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartLine {
    pub product_id: ProductId,
    pub size: String,
    pub color: String,
    pub quantity: i32,
    pub title: String,
    pub price: Decimal,
    pub images: Vec<String>,
}

/// A user's cart. One per user, created lazily on first add.
#[derive(Debug, Clone, Serialize)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub items: Vec<CartLine>,
    pub updated_at: DateTime<Utc>,
}
