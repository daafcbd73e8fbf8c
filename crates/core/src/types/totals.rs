//! Exact-decimal order totals.

use rust_decimal::Decimal;

use crate::types::cart::Cart;
use crate::types::delivery::DeliveryMethod;

/// Monetary breakdown for a checkout session.
///
/// All arithmetic is exact decimal; two-digit rounding is a display concern
/// and never feeds back into the computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

impl OrderTotals {
    /// Compute totals for a cart and a chosen delivery method.
    ///
    /// `subtotal` is the sum of `price × quantity` over the cart's lines;
    /// `total` adds the delivery price.
    #[must_use]
    pub fn compute(cart: &Cart, delivery: &DeliveryMethod) -> Self {
        let subtotal = cart.subtotal();
        Self {
            subtotal,
            shipping: delivery.price,
            total: subtotal + delivery.price,
        }
    }
}
