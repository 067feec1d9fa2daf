//! Lotus core types library.
//!
//! Shared leaf types used by both the storefront and admin BFF binaries:
//! the gateway response envelope, integer-VND prices, and payment status.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::envelope::{Envelope, GENERIC_FAILURE_MESSAGE, Outcome};
pub use types::price::Vnd;
pub use types::status::PaymentStatus;
