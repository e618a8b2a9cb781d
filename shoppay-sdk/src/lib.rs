//! Shared types for the online-shop payments service.
//!
//! - [`objects`]: inbound/outbound JSON bodies and the processor's wire envelopes.
//! - [`card`]: sensitive card data and the RSA cryptogram built from it.
//! - [`client`]: typed HTTP clients for the payment processor (feature `client`).

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![forbid(unsafe_code)]

pub mod card;
#[cfg(feature = "client")]
pub mod client;
pub mod objects;
