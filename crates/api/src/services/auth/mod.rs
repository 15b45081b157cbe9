//! Authentication service.
//!
//! Customers authenticate with a phone OTP delivered over SMS; admins use
//! an email/password pair hashed with argon2. Either path ends with the
//! identity `{id, role}` stored in the server-side session.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use sqlx::PgPool;

use threadline_core::{Email, Phone, Role};

use crate::db::RepositoryError;
use crate::db::users::{NewUser, UserRepository};
use crate::models::User;
use crate::services::otp::OtpProvider;

/// Minimum password length for admin accounts.
const MIN_PASSWORD_LENGTH: usize = 8;

/// How long a sent OTP stays verifiable.
const OTP_TTL_MINUTES: i64 = 5;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    otp: &'a dyn OtpProvider,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, otp: &'a dyn OtpProvider) -> Self {
        Self {
            users: UserRepository::new(pool),
            otp,
        }
    }

    /// Fetch an account by id.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the session points at a deleted
    /// account.
    pub async fn get_user(&self, id: threadline_core::UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    // =========================================================================
    // Customer registration and OTP login
    // =========================================================================

    /// Register a new customer account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail`/`InvalidPhone` on malformed input,
    /// `EmailTaken`/`PhoneTaken` if either identifier is already registered.
    pub async fn register_user(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        phone: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        let phone = Phone::parse(phone)?;

        if self.users.get_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }
        if self.users.get_by_phone(&phone, None).await?.is_some() {
            return Err(AuthError::PhoneTaken);
        }

        let user = self
            .users
            .create(NewUser {
                first_name,
                last_name,
                email: &email,
                phone: &phone,
                role: Role::User,
                password_hash: None,
            })
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent registration
                RepositoryError::Conflict(_) => AuthError::EmailTaken,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Send a login OTP to a registered customer's phone.
    ///
    /// Stores the provider session id and its expiry on the user row so
    /// verification can be matched later.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidPhone` for malformed/non-mobile numbers,
    /// `UserNotFound` if no customer account matches, `Otp` if the provider
    /// call fails.
    pub async fn request_otp(&self, phone: &str) -> Result<String, AuthError> {
        let phone = Phone::parse_mobile(phone)?;

        let user = self
            .users
            .get_by_phone(&phone, Some(Role::User))
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let session_id = self.otp.send(&phone).await?;
        let expires_at = Utc::now() + Duration::minutes(OTP_TTL_MINUTES);
        self.users
            .set_otp_session(user.id, &session_id, expires_at)
            .await?;

        Ok(session_id)
    }

    /// Verify a customer's OTP and return the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns `OtpSessionNotFound` if no OTP is in flight, `OtpExpired` if
    /// the stored session is past its TTL, `OtpRejected` if the provider
    /// refuses the code.
    pub async fn verify_otp(&self, phone: &str, otp: &str) -> Result<User, AuthError> {
        let phone = Phone::parse(phone)?;

        let user = self
            .users
            .get_by_phone(&phone, None)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let session_id = user
            .otp_session
            .as_deref()
            .ok_or(AuthError::OtpSessionNotFound)?;

        if user.otp_expires_at.is_none_or(|at| at < Utc::now()) {
            return Err(AuthError::OtpExpired);
        }

        if !self.otp.verify(session_id, otp).await? {
            return Err(AuthError::OtpRejected);
        }

        self.users.clear_otp_session(user.id).await?;
        Ok(user)
    }

    // =========================================================================
    // Admin password authentication
    // =========================================================================

    /// Register a new admin account with an argon2-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `WeakPassword` if the password is too short,
    /// `PasswordMismatch` if the confirmation differs, `EmailTaken` /
    /// `PhoneTaken` on duplicates.
    pub async fn register_admin(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        phone: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        let phone = Phone::parse(phone)?;

        if password != confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        validate_password(password)?;

        if self.users.get_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }
        if self.users.get_by_phone(&phone, None).await?.is_some() {
            return Err(AuthError::PhoneTaken);
        }

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(NewUser {
                first_name,
                last_name,
                email: &email,
                phone: &phone,
                role: Role::Admin,
                password_hash: Some(&password_hash),
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::EmailTaken,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login an admin with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the account does not
    /// exist, is not an admin, or the password is wrong.
    pub async fn login_admin(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        let user = self
            .users
            .get_by_email(&email)
            .await?
            .filter(|u| u.role == Role::Admin)
            .ok_or(AuthError::InvalidCredentials)?;

        let hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;
        verify_password(password, hash)?;

        Ok(user)
    }
}

// =============================================================================
// Password Helpers
// =============================================================================

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password with argon2id and a fresh random salt.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored argon2 hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHash)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_too_short() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_validate_password_ok() {
        assert!(validate_password("long enough password").is_ok());
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same password").unwrap();
        let b = hash_password("same password").unwrap();
        assert_ne!(a, b);
    }
}
