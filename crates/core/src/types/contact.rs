//! Phone number and postal pincode types.
//!
//! Both are fixed-format digit strings: Indian mobile numbers are exactly
//! 10 digits, postal pincodes exactly 6. The mobile-login flow additionally
//! requires the number to start with 6-9, which is what the national
//! numbering plan allocates to mobiles.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`] or [`Pincode`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum ContactError {
    /// The phone number is not exactly 10 digits.
    #[error("phone number must be exactly 10 digits")]
    InvalidPhone,
    /// The phone number cannot receive SMS (does not start with 6-9).
    #[error("phone number is not a valid mobile number")]
    NotMobile,
    /// The pincode is not exactly 6 digits.
    #[error("pincode must be exactly 6 digits")]
    InvalidPincode,
}

/// A 10-digit phone number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Parse a `Phone` from a string of exactly 10 ASCII digits.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::InvalidPhone` if the input is not 10 digits.
    pub fn parse(s: &str) -> Result<Self, ContactError> {
        if s.len() == 10 && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_owned()))
        } else {
            Err(ContactError::InvalidPhone)
        }
    }

    /// Parse a `Phone` and additionally require a mobile prefix (6-9).
    ///
    /// The OTP provider can only deliver to mobile numbers, so login
    /// endpoints use this stricter form.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::InvalidPhone` for malformed input and
    /// `ContactError::NotMobile` for a well-formed landline number.
    pub fn parse_mobile(s: &str) -> Result<Self, ContactError> {
        let phone = Self::parse(s)?;
        if matches!(phone.0.as_bytes().first(), Some(b'6'..=b'9')) {
            Ok(phone)
        } else {
            Err(ContactError::NotMobile)
        }
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = ContactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A 6-digit postal pincode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Pincode(String);

impl Pincode {
    /// Parse a `Pincode` from a string of exactly 6 ASCII digits.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::InvalidPincode` if the input is not 6 digits.
    pub fn parse(s: &str) -> Result<Self, ContactError> {
        if s.len() == 6 && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_owned()))
        } else {
            Err(ContactError::InvalidPincode)
        }
    }

    /// Returns the pincode as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pincode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Pincode {
    type Err = ContactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

macro_rules! text_sqlx_impls {
    ($name:ident) => {
        #[cfg(feature = "postgres")]
        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                // Rows written outside the app must not bypass validation
                Ok(Self::parse(&s)?)
            }
        }

        #[cfg(feature = "postgres")]
        impl sqlx::Encode<'_, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

text_sqlx_impls!(Phone);
text_sqlx_impls!(Pincode);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_valid() {
        assert!(Phone::parse("9876543210").is_ok());
        assert!(Phone::parse("0123456789").is_ok());
    }

    #[test]
    fn test_phone_invalid() {
        assert!(Phone::parse("12345").is_err());
        assert!(Phone::parse("12345678901").is_err());
        assert!(Phone::parse("98765abcde").is_err());
        assert!(Phone::parse("").is_err());
    }

    #[test]
    fn test_phone_mobile_prefix() {
        assert!(Phone::parse_mobile("9876543210").is_ok());
        assert!(Phone::parse_mobile("6000000000").is_ok());
        assert!(matches!(
            Phone::parse_mobile("1234567890"),
            Err(ContactError::NotMobile)
        ));
        assert!(matches!(
            Phone::parse_mobile("98765"),
            Err(ContactError::InvalidPhone)
        ));
    }

    #[test]
    fn test_pincode_valid() {
        assert!(Pincode::parse("600001").is_ok());
    }

    #[test]
    fn test_pincode_invalid() {
        assert!(Pincode::parse("60001").is_err());
        assert!(Pincode::parse("6000011").is_err());
        assert!(Pincode::parse("60000a").is_err());
    }

    #[test]
    fn test_serde_transparent() {
        let phone = Phone::parse("9876543210").unwrap();
        assert_eq!(serde_json::to_string(&phone).unwrap(), "\"9876543210\"");
    }
}
