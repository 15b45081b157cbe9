//! Order domain types.
//!
//! An order is an immutable snapshot of the cart at checkout time: line
//! items copy the product title and unit price so later catalog edits do
//! not rewrite history.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use threadline_core::{AddressId, OrderId, OrderStatus, PaymentMethod, ProductId, UserId};

/// One snapshotted line item of an order.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub title: String,
    /// Unit price captured at checkout.
    pub unit_price: Decimal,
    pub size: String,
    pub color: String,
    pub quantity: i32,
    /// Set once when the customer requests a return; never reset.
    pub return_requested: bool,
    pub return_reason: Option<String>,
}

/// Gateway refund record attached to a refunded order.
#[derive(Debug, Clone, Serialize)]
pub struct RefundDetails {
    pub refund_id: String,
    /// Refunded amount in rupees.
    pub amount: Decimal,
    pub refunded_at: DateTime<Utc>,
}

/// Database row for an order, without its lines.
#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
    pub id: OrderId,
    pub user_id: UserId,
    pub address_id: AddressId,
    pub total_amount: Decimal,
    pub method: PaymentMethod,
    pub status: OrderStatus,
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub gateway_signature: Option<String>,
    pub refund_id: Option<String>,
    pub refund_amount: Option<Decimal>,
    pub refunded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A complete order with its snapshot lines.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub address_id: AddressId,
    /// Computed server-side at checkout as sum of unit price x quantity.
    pub total_amount: Decimal,
    pub method: PaymentMethod,
    pub status: OrderStatus,
    pub items: Vec<OrderLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_payment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_details: Option<RefundDetails>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Assemble an order from its row and lines.
    #[must_use]
    pub fn from_row(row: OrderRow, items: Vec<OrderLine>) -> Self {
        let refund_details = match (row.refund_id, row.refund_amount, row.refunded_at) {
            (Some(refund_id), Some(amount), Some(refunded_at)) => Some(RefundDetails {
                refund_id,
                amount,
                refunded_at,
            }),
            _ => None,
        };

        Self {
            id: row.id,
            user_id: row.user_id,
            address_id: row.address_id,
            total_amount: row.total_amount,
            method: row.method,
            status: row.status,
            items,
            gateway_order_id: row.gateway_order_id,
            gateway_payment_id: row.gateway_payment_id,
            refund_details,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
