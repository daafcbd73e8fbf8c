//! The cart entity and its pure mutation rules.
//!
//! A cart is a client-identified list of product lines. All mutations here
//! are pure (no I/O); the synchronization service decides when and how the
//! result reaches the remote store. Two invariants are enforced at this
//! level:
//!
//! - No two lines share a `productId`; adding an existing product merges
//!   quantities additively.
//! - A stored quantity is always >= 1. Updates to 0 remove the line instead
//!   of storing a non-positive quantity.
//!
//! A third invariant, "a cart with zero lines is deleted rather than upserted
//! empty", belongs to the synchronization layer; mutations report what they
//! changed so that layer can apply it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::{CartId, DeliveryMethodId, ProductId};
use crate::types::product::Product;

/// A single product + quantity entry within a cart, keyed by product id.
///
/// Lines snapshot the product's name, price, and display metadata at the
/// moment the product is added; they are not live-repriced afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub product_name: String,
    /// Unit price snapshot taken at add time.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
    pub picture_url: String,
    pub brand: String,
    #[serde(rename = "type")]
    pub product_type: String,
}

impl CartLine {
    /// Snapshot a product into a fresh line with the given quantity.
    #[must_use]
    pub fn snapshot(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            product_name: product.name.clone(),
            price: product.price,
            quantity,
            picture_url: product.picture_url.clone(),
            brand: product.brand.clone(),
            product_type: product.product_type.clone(),
        }
    }

    /// Price × quantity for this line, computed in exact decimal arithmetic.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// What a line-level mutation did, reported so the caller can decide between
/// upserting the cart and deleting it (empty carts are never upserted).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineChange {
    /// The line's quantity was replaced in place.
    Updated,
    /// The line was removed from the cart.
    Removed,
    /// No line matched the product id; the cart is unchanged.
    Missing,
}

/// A client-identified collection of product lines pending purchase.
///
/// `deliveryMethodId`, `paymentIntentId`, and `clientSecret` are
/// server-assigned passthrough fields; this client never sets them but must
/// round-trip whatever the server returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: CartId,
    /// Lines in insertion order (first added comes first).
    pub items: Vec<CartLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_method_id: Option<DeliveryMethodId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_intent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

impl Cart {
    /// Create an empty cart with a freshly minted id.
    ///
    /// Pure apart from id generation; nothing is persisted or fetched.
    #[must_use]
    pub fn create() -> Self {
        Self::with_id(CartId::generate())
    }

    /// Create an empty cart with an existing id.
    #[must_use]
    pub const fn with_id(id: CartId) -> Self {
        Self {
            id,
            items: Vec::new(),
            delivery_method_id: None,
            payment_intent_id: None,
            client_secret: None,
        }
    }

    /// Find the line for a product, if present.
    #[must_use]
    pub fn find_line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.items.iter().find(|line| line.product_id == product_id)
    }

    /// Add a product to the cart.
    ///
    /// If a line for the product already exists, its quantity is incremented
    /// by `quantity` (identity by product id, additive merge). Otherwise a
    /// new line is appended, snapshotting the product's name, price, and
    /// display metadata. A `quantity` of 0 is a no-op.
    pub fn add_item(&mut self, product: &Product, quantity: u32) {
        if quantity == 0 {
            return;
        }

        match self
            .items
            .iter_mut()
            .find(|line| line.product_id == product.id)
        {
            Some(line) => line.quantity += quantity,
            None => self.items.push(CartLine::snapshot(product, quantity)),
        }
    }

    /// Remove the line for a product.
    ///
    /// Returns `true` if a line was removed; an absent product is a no-op,
    /// not an error.
    pub fn remove_item(&mut self, product_id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|line| line.product_id != product_id);
        self.items.len() != before
    }

    /// Set a line's quantity directly (replacement, not additive).
    ///
    /// A `quantity` of 0 removes the line, keeping the >= 1 invariant.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) -> LineChange {
        if quantity == 0 {
            return if self.remove_item(product_id) {
                LineChange::Removed
            } else {
                LineChange::Missing
            };
        }

        match self
            .items
            .iter_mut()
            .find(|line| line.product_id == product_id)
        {
            Some(line) => {
                line.quantity = quantity;
                LineChange::Updated
            }
            None => LineChange::Missing,
        }
    }

    /// Whether the cart holds no lines.
    ///
    /// An empty cart is semantically "no cart" and must be deleted by the
    /// synchronization layer, never upserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|line| line.quantity).sum()
    }

    /// Sum of `price × quantity` across all lines, exact decimal.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartLine::line_total).sum()
    }
}
