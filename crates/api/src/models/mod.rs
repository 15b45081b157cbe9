//! Domain models for the API.
//!
//! Row-mapped types live here, decoded straight from `PostgreSQL` via
//! `sqlx::FromRow` with the newtype wrappers from `threadline-core`.

pub mod address;
pub mod cart;
pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use address::Address;
pub use cart::{Cart, CartLine};
pub use order::{Order, OrderLine, RefundDetails};
pub use product::Product;
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
