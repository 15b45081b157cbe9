//! Order repository for database operations.
//!
//! Status transitions that guard the payment lifecycle (`Initiated -> Paid`
//! on a verified callback, `Paid -> Refunded` on refund) are expressed as
//! conditional updates - `UPDATE ... WHERE status = $expected` - and report
//! zero affected rows instead of clobbering whatever state a concurrent
//! request won. Admin overrides are deliberately unconditional.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use threadline_core::{AddressId, OrderId, OrderStatus, PaymentMethod, ProductId, UserId};

use super::RepositoryError;
use crate::models::order::{Order, OrderLine, OrderRow};

const ORDER_COLUMNS: &str = "id, user_id, address_id, total_amount, method, status, \
                             gateway_order_id, gateway_payment_id, gateway_signature, \
                             refund_id, refund_amount, refunded_at, created_at, updated_at";

const LINE_COLUMNS: &str =
    "product_id, title, unit_price, size, color, quantity, return_requested, return_reason";

/// A cart line frozen into an order at checkout.
#[derive(Debug, Clone)]
pub struct SnapshotLine {
    pub product_id: ProductId,
    pub title: String,
    pub unit_price: Decimal,
    pub size: String,
    pub color: String,
    pub quantity: i32,
}

/// Everything needed to persist a new order.
#[derive(Debug)]
pub struct NewOrder {
    pub user_id: UserId,
    pub address_id: AddressId,
    pub total_amount: Decimal,
    pub method: PaymentMethod,
    pub status: OrderStatus,
    pub gateway_order_id: Option<String>,
    pub lines: Vec<SnapshotLine>,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist an order and its snapshot lines in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn create(&self, new: NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders (user_id, address_id, total_amount, method, status, gateway_order_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(new.user_id)
        .bind(new.address_id)
        .bind(new.total_amount)
        .bind(new.method)
        .bind(new.status)
        .bind(&new.gateway_order_id)
        .fetch_one(&mut *tx)
        .await?;

        for line in &new.lines {
            sqlx::query(
                "INSERT INTO order_lines (order_id, product_id, title, unit_price, size, color, quantity) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(row.id)
            .bind(line.product_id)
            .bind(&line.title)
            .bind(line.unit_price)
            .bind(&line.size)
            .bind(&line.color)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let items = self.lines(row.id).await?;
        Ok(Order::from_row(row, items))
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => {
                let items = self.lines(row.id).await?;
                Ok(Some(Order::from_row(row, items)))
            }
            None => Ok(None),
        }
    }

    /// Get an order only if it belongs to the given user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_owned(
        &self,
        id: OrderId,
        user_id: UserId,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => {
                let items = self.lines(row.id).await?;
                Ok(Some(Order::from_row(row, items)))
            }
            None => Ok(None),
        }
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        self.assemble(rows).await
    }

    /// List every order in the system, newest first (admin view).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        self.assemble(rows).await
    }

    /// Move an order from `Initiated` to `Paid`, recording the gateway
    /// payment id and signature.
    ///
    /// Returns `false` if the order was not in `Initiated` (already paid,
    /// failed, or racing with another verify).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn mark_paid(
        &self,
        id: OrderId,
        payment_id: &str,
        signature: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE orders SET status = $4, gateway_payment_id = $2, gateway_signature = $3, \
                updated_at = now() \
             WHERE id = $1 AND status = $5",
        )
        .bind(id)
        .bind(payment_id)
        .bind(signature)
        .bind(OrderStatus::Paid)
        .bind(OrderStatus::Initiated)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Unconditionally set an order's status (admin override).
    ///
    /// Returns `false` if the order does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE orders SET status = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Flag a line for return. The flag is set once and never reset.
    ///
    /// Returns `false` if the line is missing or already flagged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn flag_return(
        &self,
        id: OrderId,
        product_id: ProductId,
        reason: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE order_lines SET return_requested = true, return_reason = $3 \
             WHERE order_id = $1 AND product_id = $2 AND return_requested = false",
        )
        .bind(id)
        .bind(product_id)
        .bind(reason)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Move an order from `Paid` to `Refunded`, recording refund details.
    ///
    /// Returns `false` if the order was not in `Paid` at the moment of the
    /// update (lost a race, or never paid).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn mark_refunded(
        &self,
        id: OrderId,
        refund_id: &str,
        amount: Decimal,
        refunded_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE orders SET status = $5, refund_id = $2, refund_amount = $3, \
                refunded_at = $4, updated_at = now() \
             WHERE id = $1 AND status = $6",
        )
        .bind(id)
        .bind(refund_id)
        .bind(amount)
        .bind(refunded_at)
        .bind(OrderStatus::Refunded)
        .bind(OrderStatus::Paid)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn lines(&self, id: OrderId) -> Result<Vec<OrderLine>, RepositoryError> {
        let items = sqlx::query_as::<_, OrderLine>(&format!(
            "SELECT {LINE_COLUMNS} FROM order_lines WHERE order_id = $1 ORDER BY id"
        ))
        .bind(id)
        .fetch_all(self.pool)
        .await?;
        Ok(items)
    }

    async fn assemble(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let items = self.lines(row.id).await?;
            orders.push(Order::from_row(row, items));
        }
        Ok(orders)
    }
}
