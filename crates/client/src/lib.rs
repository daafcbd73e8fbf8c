//! Storefront client runtime: cart synchronization, checkout, and order
//! submission against the Clementine store API.
//!
//! The pieces compose top-down: [`ClientState`] wires configuration, the
//! durable [`DiskStore`] cache, and the [`StoreClient`] HTTP surface into a
//! [`CartService`], and [`ClientState::begin_checkout`] builds a
//! [`CheckoutFlow`] over them. Hosts that bring their own transport or
//! cache can instead assemble the services directly from the [`CartApi`]
//! and [`OrdersApi`] traits.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod orders;
pub mod state;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiError, CartApi, OrdersApi, StoreClient};
pub use cart::CartService;
pub use checkout::{
    AuthState, CheckoutError, CheckoutFlow, CheckoutGate, CheckoutSession, CheckoutStep,
};
pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, Result};
pub use orders::{OrderGateway, SubmitError};
pub use state::ClientState;
pub use storage::{DiskStore, StorageError, keys};
