//! Storage surface for the order lifecycle.
//!
//! [`super::OrderService`] reaches persistence only through [`OrderStore`],
//! so the checkout/verify/return/refund paths can run against an in-memory
//! store in tests. [`PgOrderStore`] is the production implementation,
//! bundling the sqlx repositories behind one seam.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use threadline_core::{AddressId, OrderId, OrderStatus, ProductId, UserId};

use crate::db::orders::NewOrder;
use crate::db::{AddressRepository, CartRepository, OrderRepository, RepositoryError};
use crate::models::{Address, Cart, Order};

/// Persistence operations the order lifecycle depends on.
///
/// The conditional-transition contract carries over from the repositories:
/// `mark_paid`, `flag_return` and `mark_refunded` return `false` when the
/// guarded precondition no longer holds, and the caller treats that as a
/// lost race rather than overwriting.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Fetch an address only if it belongs to the given user.
    async fn address_owned(
        &self,
        id: AddressId,
        user_id: UserId,
    ) -> Result<Option<Address>, RepositoryError>;

    /// Fetch a user's cart, if one exists.
    async fn cart(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError>;

    /// Persist a new order with its snapshot lines.
    async fn create_order(&self, new: NewOrder) -> Result<Order, RepositoryError>;

    /// Fetch an order by id.
    async fn order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Fetch an order only if it belongs to the given user.
    async fn order_owned(
        &self,
        id: OrderId,
        user_id: UserId,
    ) -> Result<Option<Order>, RepositoryError>;

    /// `Initiated -> Paid`, recording the payment id and signature.
    async fn mark_paid(
        &self,
        id: OrderId,
        payment_id: &str,
        signature: &str,
    ) -> Result<bool, RepositoryError>;

    /// Unconditionally set a status. `false` if the order does not exist.
    async fn set_status(&self, id: OrderId, status: OrderStatus) -> Result<bool, RepositoryError>;

    /// Flag a line for return, at most once. `false` if the line is
    /// missing or already flagged.
    async fn flag_return(
        &self,
        id: OrderId,
        product_id: ProductId,
        reason: &str,
    ) -> Result<bool, RepositoryError>;

    /// `Paid -> Refunded`, recording the refund details.
    async fn mark_refunded(
        &self,
        id: OrderId,
        refund_id: &str,
        amount: Decimal,
        refunded_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError>;
}

/// Production store backed by the `PostgreSQL` repositories.
pub struct PgOrderStore<'a> {
    orders: OrderRepository<'a>,
    carts: CartRepository<'a>,
    addresses: AddressRepository<'a>,
}

impl<'a> PgOrderStore<'a> {
    /// Create a store over the shared connection pool.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            carts: CartRepository::new(pool),
            addresses: AddressRepository::new(pool),
        }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore<'_> {
    async fn address_owned(
        &self,
        id: AddressId,
        user_id: UserId,
    ) -> Result<Option<Address>, RepositoryError> {
        self.addresses.get_owned(id, user_id).await
    }

    async fn cart(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        self.carts.get(user_id).await
    }

    async fn create_order(&self, new: NewOrder) -> Result<Order, RepositoryError> {
        self.orders.create(new).await
    }

    async fn order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        self.orders.get(id).await
    }

    async fn order_owned(
        &self,
        id: OrderId,
        user_id: UserId,
    ) -> Result<Option<Order>, RepositoryError> {
        self.orders.get_owned(id, user_id).await
    }

    async fn mark_paid(
        &self,
        id: OrderId,
        payment_id: &str,
        signature: &str,
    ) -> Result<bool, RepositoryError> {
        self.orders.mark_paid(id, payment_id, signature).await
    }

    async fn set_status(&self, id: OrderId, status: OrderStatus) -> Result<bool, RepositoryError> {
        self.orders.set_status(id, status).await
    }

    async fn flag_return(
        &self,
        id: OrderId,
        product_id: ProductId,
        reason: &str,
    ) -> Result<bool, RepositoryError> {
        self.orders.flag_return(id, product_id, reason).await
    }

    async fn mark_refunded(
        &self,
        id: OrderId,
        refund_id: &str,
        amount: Decimal,
        refunded_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        self.orders
            .mark_refunded(id, refund_id, amount, refunded_at)
            .await
    }
}
