//! Threadline Core - Shared types library.
//!
//! This crate provides the domain vocabulary used across Threadline
//! components. It contains only types and pure functions - no I/O, no
//! database access, no HTTP clients - so it can be depended on anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, phone numbers,
//!   pincodes, money conversion, and status enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
