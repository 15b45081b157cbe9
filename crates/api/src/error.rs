//! Unified error handling with Sentry integration.
//!
//! Provides a unified `ApiError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, ApiError>`; the response body is always JSON
//! `{ "message": ... }` and internal detail is never leaked.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::gateway::GatewayError;
use crate::services::orders::OrderError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Order/checkout operation failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Payment gateway call failed.
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Malformed or missing input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing or invalid session.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Valid identity, insufficient role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (or not owned by the caller).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate resource.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(err) => match err {
                RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_)
                | AuthError::InvalidPhone(_)
                | AuthError::WeakPassword(_)
                | AuthError::PasswordMismatch => StatusCode::BAD_REQUEST,
                AuthError::InvalidCredentials
                | AuthError::OtpExpired
                | AuthError::OtpRejected => StatusCode::UNAUTHORIZED,
                AuthError::UserNotFound | AuthError::OtpSessionNotFound => StatusCode::NOT_FOUND,
                AuthError::EmailTaken | AuthError::PhoneTaken => StatusCode::CONFLICT,
                AuthError::Otp(_) | AuthError::PasswordHash | AuthError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Order(err) => match err {
                OrderError::EmptyCart
                | OrderError::InvalidSignature
                | OrderError::WindowExpired
                | OrderError::AlreadyRefunded
                | OrderError::NotPaid
                | OrderError::InvalidAmount => StatusCode::BAD_REQUEST,
                OrderError::AddressNotFound
                | OrderError::OrderNotFound
                | OrderError::LineNotFound => StatusCode::NOT_FOUND,
                OrderError::AlreadyRequested | OrderError::NotAwaitingPayment => {
                    StatusCode::CONFLICT
                }
                OrderError::Gateway(_) | OrderError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Gateway(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    /// Client-facing message. Internal detail stays out of the response.
    fn message(&self) -> String {
        match self {
            Self::Database(err) => match err {
                RepositoryError::Conflict(msg) => msg.clone(),
                _ => "Internal server error".to_string(),
            },
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(e) => e.to_string(),
                AuthError::InvalidPhone(e) => e.to_string(),
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::PasswordMismatch => "Passwords do not match".to_string(),
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AuthError::OtpExpired => "OTP expired. Please request a new one.".to_string(),
                AuthError::OtpRejected => "Invalid or expired OTP".to_string(),
                AuthError::UserNotFound => "User not found".to_string(),
                AuthError::OtpSessionNotFound => {
                    "Session not found. Please request OTP again.".to_string()
                }
                AuthError::EmailTaken => "Email already exists".to_string(),
                AuthError::PhoneTaken => "Phone number already exists".to_string(),
                AuthError::Otp(_) => "OTP send failed".to_string(),
                AuthError::PasswordHash | AuthError::Repository(_) => {
                    "Internal server error".to_string()
                }
            },
            Self::Order(err) => match err {
                OrderError::EmptyCart => "Cart is empty".to_string(),
                OrderError::InvalidSignature => "Invalid payment signature".to_string(),
                OrderError::WindowExpired => "Return window has expired".to_string(),
                OrderError::AlreadyRefunded => "Order already refunded".to_string(),
                OrderError::NotPaid => "Order not paid yet, cannot refund".to_string(),
                OrderError::InvalidAmount => "Order amount is invalid".to_string(),
                OrderError::AddressNotFound => "Address not found".to_string(),
                OrderError::OrderNotFound => "Order not found".to_string(),
                OrderError::LineNotFound => "Product not found in order".to_string(),
                OrderError::AlreadyRequested => {
                    "Return already requested for this item".to_string()
                }
                OrderError::NotAwaitingPayment => {
                    "Order is not awaiting payment confirmation".to_string()
                }
                OrderError::Gateway(_) => "Payment gateway error".to_string(),
                OrderError::Repository(_) => "Internal server error".to_string(),
            },
            Self::Gateway(_) => "Payment gateway error".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Validation(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry before responding
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(json!({ "message": self.message() }))).into_response()
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::orders::OrderError;

    fn get_status(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_basic_status_codes() {
        assert_eq!(
            get_status(ApiError::Validation("bad".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(ApiError::Unauthorized("no session".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(ApiError::Forbidden("wrong role".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(ApiError::NotFound("missing".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(ApiError::Conflict("dup".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(ApiError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_order_error_status_codes() {
        assert_eq!(
            get_status(OrderError::EmptyCart.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(OrderError::InvalidSignature.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(OrderError::AddressNotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(OrderError::AlreadyRequested.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(OrderError::AlreadyRefunded.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(OrderError::NotPaid.into()),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_internal_detail_not_leaked() {
        let err = ApiError::Internal("connection string leaked".into());
        assert_eq!(err.message(), "Internal server error");
    }
}
