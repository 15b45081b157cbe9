//! Order lifecycle error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::gateway::GatewayError;

/// Errors that can occur during checkout, payment, return and refund.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Checkout address does not exist or belongs to someone else.
    #[error("address not found")]
    AddressNotFound,

    /// Checkout attempted with no cart lines.
    #[error("cart is empty")]
    EmptyCart,

    /// Order total cannot be expressed in gateway minor units.
    #[error("order amount is invalid")]
    InvalidAmount,

    /// Order does not exist (or is not owned by the caller).
    #[error("order not found")]
    OrderNotFound,

    /// Product is not part of the order snapshot.
    #[error("line item not found in order")]
    LineNotFound,

    /// Callback signature did not match the recomputed HMAC.
    #[error("invalid payment signature")]
    InvalidSignature,

    /// Signature verified but the order is not in `Initiated`.
    #[error("order is not awaiting payment")]
    NotAwaitingPayment,

    /// Return requested outside the allowed window.
    #[error("return window expired")]
    WindowExpired,

    /// Return already requested for this line item.
    #[error("return already requested")]
    AlreadyRequested,

    /// Refund requested but the order is already refunded.
    #[error("order already refunded")]
    AlreadyRefunded,

    /// Refund requested but the order is not paid.
    #[error("order not paid")]
    NotPaid,

    /// Payment gateway failure.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
