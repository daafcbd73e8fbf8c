//! Order submission gateway.
//!
//! Turns a reviewed checkout session into an order-creation request and
//! hands the placed order back. Once the order exists the cart is spent:
//! the gateway tears it down, but a teardown hiccup never turns a placed
//! order into a reported failure.

use std::sync::Arc;

use clementine_core::{Order, OrderToCreate, PaymentSummary};
use tracing::{instrument, warn};

use crate::api::{ApiError, OrdersApi};
use crate::cart::CartService;
use crate::checkout::CheckoutSession;

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("no cart to order")]
    MissingCart,
    #[error("no delivery method selected")]
    NoDeliveryMethod,
    #[error("no shipping address provided")]
    NoShippingAddress,
    #[error("order creation failed: {0}")]
    Api(#[from] ApiError),
}

/// Submits reviewed checkouts to the order collaborator.
#[derive(Clone)]
pub struct OrderGateway {
    api: Arc<dyn OrdersApi>,
    carts: CartService,
}

impl OrderGateway {
    #[must_use]
    pub fn new(api: Arc<dyn OrdersApi>, carts: CartService) -> Self {
        Self { api, carts }
    }

    /// Place an order from a checkout session snapshot.
    ///
    /// Fails fast on an incomplete session before anything goes over the
    /// wire. After the order is accepted, the now-spent cart is deleted;
    /// if that teardown fails the order still stands and only a warning is
    /// logged.
    ///
    /// # Errors
    ///
    /// A [`SubmitError`] naming the missing piece, or the creation call's
    /// API error. Teardown failures are not surfaced.
    #[instrument(skip_all)]
    pub async fn submit(&self, session: &CheckoutSession) -> Result<Order, SubmitError> {
        let cart = session
            .cart
            .as_ref()
            .filter(|cart| !cart.is_empty())
            .ok_or(SubmitError::MissingCart)?;
        let delivery = session
            .delivery
            .as_ref()
            .ok_or(SubmitError::NoDeliveryMethod)?;
        let address = session
            .address
            .as_ref()
            .ok_or(SubmitError::NoShippingAddress)?;

        let request = OrderToCreate {
            cart_id: cart.id.clone(),
            delivery_method_id: delivery.id,
            shipping_address: address.clone(),
            payment_summary: PaymentSummary::placeholder(),
            discount: None,
        };

        let order = self.api.create_order(&request).await?;

        if let Err(e) = self.carts.delete_cart().await {
            warn!("Order {} created but cart teardown failed: {e}", order.id);
        }

        Ok(order)
    }
}
