//! Clementine Core - Shared types library.
//!
//! This crate provides the domain types used across all Clementine components:
//! - `client` - Cart synchronization, checkout flow, and the store API client
//! - `cli` - Command-line driver for the cart/checkout flow
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no storage. Everything here serializes to the JSON shapes of the
//! store backend contract, so the same types travel over the wire and live in
//! the local cache.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, the cart entity, addresses, delivery methods,
//!   order payloads, and exact-decimal order totals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
