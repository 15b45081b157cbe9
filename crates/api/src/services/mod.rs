//! Service layer: authentication and external collaborators.
//!
//! The payment gateway and OTP provider are trait objects injected through
//! [`crate::state::AppState`], so handlers never construct HTTP clients and
//! tests can swap in fakes.

pub mod auth;
pub mod gateway;
pub mod orders;
pub mod otp;
