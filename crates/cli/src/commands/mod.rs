//! CLI command implementations, one module per top-level command.

pub mod cart;
pub mod checkout;
pub mod delivery;
pub mod orders;
