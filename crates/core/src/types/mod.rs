//! Core types for Clementine.
//!
//! This module provides type-safe wrappers for the cart and checkout domain.

pub mod address;
pub mod cart;
pub mod delivery;
pub mod email;
pub mod id;
pub mod order;
pub mod product;
pub mod totals;
pub mod user;

pub use address::{Address, FieldError, InvalidAddress, ShippingAddress};
pub use cart::{Cart, CartLine, LineChange};
pub use delivery::DeliveryMethod;
pub use email::{Email, EmailError};
pub use id::*;
pub use order::{Order, OrderItem, OrderToCreate, PaymentSummary};
pub use product::Product;
pub use totals::OrderTotals;
pub use user::CurrentUser;
