//! Database operations for `PostgreSQL`.
//!
//! One repository per entity, all using the runtime sqlx query API.
//!
//! ## Tables
//!
//! - `users` - Customer and admin accounts
//! - `products` - Catalog
//! - `carts` / `cart_lines` - Per-user mutable cart
//! - `addresses` - Saved shipping addresses
//! - `orders` / `order_lines` - Checkout snapshots and payment state
//! - `tower_sessions.session` - Session store (managed by tower-sessions)
//!
//! Migrations live in `crates/api/migrations/` and run at startup.

pub mod addresses;
pub mod carts;
pub mod orders;
pub mod products;
pub mod users;

pub use addresses::AddressRepository;
pub use carts::CartRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors surfaced by the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Unique-constraint violation mapped to a caller-visible conflict.
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a sqlx error to `Conflict` when it is a unique violation.
fn conflict_on_unique(e: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}
