//! Core types for Threadline.

pub mod contact;
pub mod email;
pub mod id;
pub mod money;
pub mod status;

pub use contact::{ContactError, Phone, Pincode};
pub use email::{Email, EmailError};
pub use id::*;
pub use money::to_minor_units;
pub use status::{AddressKind, OrderStatus, PaymentMethod, Role, StatusParseError};
