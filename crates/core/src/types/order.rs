//! Order payloads exchanged with the order collaborator.
//!
//! [`OrderToCreate`] is the outbound creation request assembled from a
//! checkout session; [`Order`] is the inbound durable record the
//! collaborator owns. Totals and status on the inbound side are the
//! server's word, not recomputed here.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::address::ShippingAddress;
use crate::types::id::{CartId, DeliveryMethodId, OrderId, ProductId};

/// Card summary attached to an order.
///
/// Payment processing is out of scope for this client; the shape exists to
/// satisfy the order contract, with [`PaymentSummary::placeholder`] standing
/// in until a processor integration fills it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    pub last4: u16,
    pub brand: String,
    pub exp_month: u8,
    pub exp_year: u16,
}

impl PaymentSummary {
    /// Well-formed stand-in used while no payment processor is wired up.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            last4: 0,
            brand: "Pending".to_owned(),
            exp_month: 0,
            exp_year: 0,
        }
    }
}

/// A product line frozen into an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub picture_url: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
}

/// Outbound order-creation request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderToCreate {
    pub cart_id: CartId,
    pub delivery_method_id: DeliveryMethodId,
    pub shipping_address: ShippingAddress,
    pub payment_summary: PaymentSummary,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub discount: Option<Decimal>,
}

/// The durable order record created from a checkout session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub order_date: DateTime<Utc>,
    pub buyer_email: String,
    pub shipping_address: ShippingAddress,
    /// Short name of the chosen delivery method.
    pub delivery_method: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub shipping_price: Decimal,
    pub payment_summary: PaymentSummary,
    pub order_items: Vec<OrderItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub discount: Option<Decimal>,
    /// Collaborator-owned status label, passed through verbatim.
    pub status: String,
    pub payment_intent_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}
