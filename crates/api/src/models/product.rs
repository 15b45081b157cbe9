//! Product domain type.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use threadline_core::ProductId;

/// A catalog product. Mutated only by administrators.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: Option<String>,
    /// Unit price in rupees; positive by database constraint.
    pub price: Decimal,
    /// Units on hand; non-negative by database constraint.
    pub stock: i32,
    pub categories: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub tags: Vec<String>,
    /// Image URLs (object storage is an external concern).
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
}
