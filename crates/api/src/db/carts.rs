//! Cart repository for database operations.
//!
//! Line merging is pushed into the database: `cart_lines` carries a unique
//! key on `(cart_id, product_id, size, color)` and adds go through
//! `ON CONFLICT ... DO UPDATE SET quantity = quantity + excluded.quantity`,
//! so two concurrent adds for the same variant accumulate instead of one
//! overwriting the other.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use threadline_core::{CartId, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Cart, CartLine};

/// An incoming cart line (from an add or a client-side cart sync).
#[derive(Debug, Clone)]
pub struct IncomingLine {
    pub product_id: ProductId,
    pub size: String,
    pub color: String,
    pub quantity: i32,
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a user's cart with lines joined against live product data.
    ///
    /// Returns `None` if the user has never added anything.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        let Some((cart_id, updated_at)) = self.cart_head(user_id).await? else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, CartLine>(
            "SELECT cl.product_id, cl.size, cl.color, cl.quantity, \
                    p.title, p.price, p.images \
             FROM cart_lines cl \
             JOIN products p ON p.id = cl.product_id \
             WHERE cl.cart_id = $1 \
             ORDER BY cl.id",
        )
        .bind(cart_id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(Cart {
            id: cart_id,
            user_id,
            items,
            updated_at,
        }))
    }

    /// Add a line, creating the cart lazily and merging by variant.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn add_line(
        &self,
        user_id: UserId,
        line: &IncomingLine,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let cart_id = sqlx::query_scalar::<_, CartId>(
            "INSERT INTO carts (user_id) VALUES ($1) \
             ON CONFLICT (user_id) DO UPDATE SET updated_at = now() \
             RETURNING id",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO cart_lines (cart_id, product_id, size, color, quantity) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (cart_id, product_id, size, color) \
             DO UPDATE SET quantity = cart_lines.quantity + excluded.quantity",
        )
        .bind(cart_id)
        .bind(line.product_id)
        .bind(&line.size)
        .bind(&line.color)
        .bind(line.quantity)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Merge a batch of client-held lines into the server cart.
    ///
    /// Applies the same merge rule as [`Self::add_line`], one transaction
    /// for the whole batch.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn merge_lines(
        &self,
        user_id: UserId,
        lines: &[IncomingLine],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let cart_id = sqlx::query_scalar::<_, CartId>(
            "INSERT INTO carts (user_id) VALUES ($1) \
             ON CONFLICT (user_id) DO UPDATE SET updated_at = now() \
             RETURNING id",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        for line in lines {
            sqlx::query(
                "INSERT INTO cart_lines (cart_id, product_id, size, color, quantity) \
                 VALUES ($1, $2, $3, $4, $5) \
                 ON CONFLICT (cart_id, product_id, size, color) \
                 DO UPDATE SET quantity = cart_lines.quantity + excluded.quantity",
            )
            .bind(cart_id)
            .bind(line.product_id)
            .bind(&line.size)
            .bind(&line.color)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Set the quantity of an existing line.
    ///
    /// Returns `false` if the user has no cart or no line matches the
    /// variant.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        line: &IncomingLine,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE cart_lines cl SET quantity = $5 \
             FROM carts c \
             WHERE cl.cart_id = c.id AND c.user_id = $1 \
               AND cl.product_id = $2 AND cl.size = $3 AND cl.color = $4",
        )
        .bind(user_id)
        .bind(line.product_id)
        .bind(&line.size)
        .bind(&line.color)
        .bind(line.quantity)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }
        self.touch(user_id).await?;
        Ok(true)
    }

    /// Remove every line matching (product, size), any color.
    ///
    /// Returns `None` if the user has no cart at all. `updated_at` is
    /// stamped only when a line was actually deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove_lines(
        &self,
        user_id: UserId,
        product_id: ProductId,
        size: &str,
    ) -> Result<Option<u64>, RepositoryError> {
        let Some((cart_id, _)) = self.cart_head(user_id).await? else {
            return Ok(None);
        };

        let result = sqlx::query(
            "DELETE FROM cart_lines WHERE cart_id = $1 AND product_id = $2 AND size = $3",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(size)
        .execute(self.pool)
        .await?;

        if result.rows_affected() > 0 {
            self.touch(user_id).await?;
        }
        Ok(Some(result.rows_affected()))
    }

    /// Delete every line. Returns `false` if the user has no cart.
    ///
    /// Clearing an already-empty cart is a no-op and leaves `updated_at`
    /// alone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear(&self, user_id: UserId) -> Result<bool, RepositoryError> {
        let Some((cart_id, _)) = self.cart_head(user_id).await? else {
            return Ok(false);
        };

        let result = sqlx::query("DELETE FROM cart_lines WHERE cart_id = $1")
            .bind(cart_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() > 0 {
            self.touch(user_id).await?;
        }
        Ok(true)
    }

    async fn cart_head(
        &self,
        user_id: UserId,
    ) -> Result<Option<(CartId, DateTime<Utc>)>, RepositoryError> {
        let head = sqlx::query_as::<_, (CartId, DateTime<Utc>)>(
            "SELECT id, updated_at FROM carts WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(head)
    }

    async fn touch(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE carts SET updated_at = now() WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
