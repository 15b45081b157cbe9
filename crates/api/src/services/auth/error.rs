//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::otp::OtpError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] threadline_core::EmailError),

    /// Invalid phone number format.
    #[error("invalid phone: {0}")]
    InvalidPhone(#[from] threadline_core::ContactError),

    /// Email already registered.
    #[error("email already registered")]
    EmailTaken,

    /// Phone number already registered.
    #[error("phone already registered")]
    PhoneTaken,

    /// Wrong password or no such account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No account for the given phone/email.
    #[error("user not found")]
    UserNotFound,

    /// No OTP in flight for this account.
    #[error("no OTP session")]
    OtpSessionNotFound,

    /// The stored OTP session expired before verification.
    #[error("OTP expired")]
    OtpExpired,

    /// The provider rejected the OTP.
    #[error("OTP rejected")]
    OtpRejected,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// OTP provider failure.
    #[error("OTP provider error: {0}")]
    Otp(#[from] OtpError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
