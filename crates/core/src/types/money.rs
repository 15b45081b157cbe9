//! Money conversion helpers.
//!
//! Prices and totals are carried as `rust_decimal::Decimal` in the major
//! currency unit (rupees). The payment gateway wants integer minor units
//! (paise), so the conversion lives here as a pure function.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Convert a major-unit amount to integer minor units (x100, rounded).
///
/// Returns `None` if the amount does not fit in an `i64` after scaling,
/// which for any realistic order total cannot happen.
#[must_use]
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    (amount * Decimal::ONE_HUNDRED).round().to_i64()
}
