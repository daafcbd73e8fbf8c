//! Checkout state machine.
//!
//! Checkout is a short linear flow: gate on authentication and a non-empty
//! cart, collect a validated shipping address and delivery method, review,
//! submit. The flow owns the step pointer and the draft address; cart
//! contents stay with the [`CartService`] so they are never duplicated.
//!
//! The draft address and chosen delivery survive restarts through the
//! durable cache and are wiped once an order lands.

use std::sync::Arc;

use clementine_core::{
    Cart, CurrentUser, DeliveryMethod, DeliveryMethodId, InvalidAddress, Order, OrderId,
    OrderTotals, ShippingAddress,
};
use tracing::{instrument, warn};

use crate::cart::CartService;
use crate::orders::{OrderGateway, SubmitError};
use crate::storage::{DiskStore, keys};

/// Where an anonymous visitor is sent, with a return pointer back here.
const LOGIN_LOCATION: &str = "/account/login?returnUrl=/checkout";

/// The steps of the checkout flow, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutStep {
    /// Collecting the shipping address and delivery method.
    Delivery,
    /// Confirming totals before submission.
    Review,
    /// Order placed; terminal.
    Success,
}

/// The host application's view of the customer session.
#[derive(Debug, Clone)]
pub enum AuthState {
    /// Session resolution still in flight; checkout must hold.
    Loading,
    /// No customer signed in.
    Anonymous,
    /// A signed-in customer.
    SignedIn(CurrentUser),
}

/// Outcome of the checkout entry gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutGate {
    /// Authentication is still resolving; try again when it settles.
    AwaitingAuth,
    /// Anonymous visitor; send them to `location` and bring them back.
    RedirectToLogin { location: String },
    /// Signed in, but there is nothing to check out.
    EmptyCart,
    /// Checkout may proceed from the delivery step.
    Ready,
}

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("not at the {expected:?} step")]
    WrongStep { expected: CheckoutStep },
    #[error(transparent)]
    InvalidAddress(#[from] InvalidAddress),
    #[error("an order submission is already in flight")]
    AlreadySubmitting,
    #[error(transparent)]
    Submit(#[from] SubmitError),
}

/// Everything the order gateway needs from a checkout in one snapshot.
///
/// Fields are optional because the snapshot is taken blindly; the gateway
/// fails fast on whatever is missing.
#[derive(Debug, Clone, Default)]
pub struct CheckoutSession {
    pub cart: Option<Cart>,
    pub delivery: Option<DeliveryMethod>,
    pub address: Option<ShippingAddress>,
}

/// Drives a single checkout from entry gate to placed order.
pub struct CheckoutFlow {
    carts: CartService,
    gateway: OrderGateway,
    store: Arc<DiskStore>,
    step: CheckoutStep,
    is_submitting: bool,
    address: Option<ShippingAddress>,
    order_id: Option<OrderId>,
}

impl CheckoutFlow {
    /// Start a flow at the delivery step, restoring any draft address and
    /// delivery selection from the durable cache.
    #[must_use]
    pub fn new(carts: CartService, gateway: OrderGateway, store: Arc<DiskStore>) -> Self {
        let address = store.get::<ShippingAddress>(keys::CHECKOUT_ADDRESS);
        let delivery = store
            .get::<DeliveryMethodId>(keys::CHECKOUT_DELIVERY)
            .and_then(DeliveryMethod::by_id);
        carts.set_selected_delivery(delivery);

        Self {
            carts,
            gateway,
            store,
            step: CheckoutStep::Delivery,
            is_submitting: false,
            address,
            order_id: None,
        }
    }

    /// Gate checkout entry on the customer session and cart contents.
    ///
    /// Order matters: an unsettled or anonymous session resolves the gate
    /// before any cart fetch, so anonymous visitors never trigger network
    /// traffic from here.
    #[instrument(skip_all)]
    pub async fn enter(&mut self, auth: &AuthState) -> CheckoutGate {
        match auth {
            AuthState::Loading => CheckoutGate::AwaitingAuth,
            AuthState::Anonymous => CheckoutGate::RedirectToLogin {
                location: LOGIN_LOCATION.to_owned(),
            },
            AuthState::SignedIn(_) => {
                let cart = self.carts.get_cart().await;
                if cart.is_empty() {
                    CheckoutGate::EmptyCart
                } else {
                    CheckoutGate::Ready
                }
            }
        }
    }

    /// Complete the delivery step with a shipping address and delivery
    /// method, advancing to review.
    ///
    /// Both choices are cached durably so an interrupted checkout resumes
    /// where it stopped.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::WrongStep`] outside the delivery step, or
    /// [`CheckoutError::InvalidAddress`] listing every blank required field.
    pub fn submit_delivery(
        &mut self,
        address: ShippingAddress,
        delivery: DeliveryMethod,
    ) -> Result<(), CheckoutError> {
        if self.step != CheckoutStep::Delivery {
            return Err(CheckoutError::WrongStep {
                expected: CheckoutStep::Delivery,
            });
        }
        address.validate()?;

        if let Err(e) = self.store.insert(keys::CHECKOUT_ADDRESS, &address) {
            warn!("Failed to cache checkout address: {e}");
        }
        if let Err(e) = self.store.insert(keys::CHECKOUT_DELIVERY, &delivery.id) {
            warn!("Failed to cache delivery selection: {e}");
        }

        self.carts.set_selected_delivery(Some(delivery));
        self.address = Some(address);
        self.step = CheckoutStep::Review;
        Ok(())
    }

    /// Step back from review to the delivery step, keeping the draft.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::WrongStep`] unless currently at review.
    pub fn back_to_delivery(&mut self) -> Result<(), CheckoutError> {
        if self.step != CheckoutStep::Review {
            return Err(CheckoutError::WrongStep {
                expected: CheckoutStep::Review,
            });
        }
        self.step = CheckoutStep::Delivery;
        Ok(())
    }

    /// Submit the reviewed order.
    ///
    /// On success the cart is gone, the checkout draft is wiped, and the
    /// flow lands on the success step. On failure everything stays put so
    /// the customer can retry.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::WrongStep`] outside review,
    /// [`CheckoutError::AlreadySubmitting`] while a submission is in
    /// flight, or the gateway's [`SubmitError`].
    #[instrument(skip_all)]
    pub async fn submit_order(&mut self) -> Result<Order, CheckoutError> {
        if self.step != CheckoutStep::Review {
            return Err(CheckoutError::WrongStep {
                expected: CheckoutStep::Review,
            });
        }
        if self.is_submitting {
            return Err(CheckoutError::AlreadySubmitting);
        }
        // The address may have been restored from a stale cached session;
        // re-check it rather than trusting the delivery step ran this run.
        if let Some(address) = &self.address {
            address.validate()?;
        }

        let session = self.session();

        self.is_submitting = true;
        let result = self.gateway.submit(&session).await;
        self.is_submitting = false;

        let order = result?;
        self.clear_draft();
        self.order_id = Some(order.id);
        self.step = CheckoutStep::Success;
        Ok(order)
    }

    // ===== Accessors =====

    /// The step the flow currently sits at.
    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    /// Whether a submission is currently in flight.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    /// The draft shipping address, if one has been entered or restored.
    #[must_use]
    pub const fn address(&self) -> Option<&ShippingAddress> {
        self.address.as_ref()
    }

    /// The delivery method chosen for this checkout, if any.
    #[must_use]
    pub fn selected_delivery(&self) -> Option<DeliveryMethod> {
        self.carts.selected_delivery()
    }

    /// The placed order's id once the flow reaches success.
    #[must_use]
    pub const fn order_id(&self) -> Option<OrderId> {
        self.order_id
    }

    /// Snapshot of everything gathered so far, as the gateway will see it.
    #[must_use]
    pub fn session(&self) -> CheckoutSession {
        CheckoutSession {
            cart: self.carts.cart(),
            delivery: self.carts.selected_delivery(),
            address: self.address.clone(),
        }
    }

    /// Totals for the review step; `None` until a cart and delivery method
    /// are both in place.
    #[must_use]
    pub fn totals(&self) -> Option<OrderTotals> {
        let cart = self.carts.cart()?;
        let delivery = self.carts.selected_delivery()?;
        Some(OrderTotals::compute(&cart, &delivery))
    }

    /// Seed the delivery step's address form from the customer's saved
    /// account address, keeping any restored draft over the prefill.
    pub fn prefill_address(&mut self, user: &CurrentUser) {
        if self.address.is_none() {
            self.address = user.shipping_address();
        }
    }

    // ===== Internals =====

    /// Drop the checkout draft everywhere once an order has landed.
    fn clear_draft(&mut self) {
        for key in [keys::CHECKOUT_ADDRESS, keys::CHECKOUT_DELIVERY] {
            if let Err(e) = self.store.remove(key) {
                warn!("Failed to clear checkout key {key}: {e}");
            }
        }
        self.address = None;
        self.carts.set_selected_delivery(None);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clementine_core::{Address, Email};
    use rust_decimal::Decimal;

    use super::*;
    use crate::api::{CartApi, OrdersApi};
    use crate::testing::{InMemoryBackend, board, shipping_address};

    struct Fixture {
        backend: Arc<InMemoryBackend>,
        store: Arc<DiskStore>,
        carts: CartService,
        _dir: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let store = Arc::new(DiskStore::open(dir.path()).unwrap());
            let backend = Arc::new(InMemoryBackend::default());
            let carts = CartService::new(
                Arc::clone(&backend) as Arc<dyn CartApi>,
                Arc::clone(&store),
            );
            Self {
                backend,
                store,
                carts,
                _dir: dir,
            }
        }

        fn flow(&self) -> CheckoutFlow {
            let gateway = OrderGateway::new(
                Arc::clone(&self.backend) as Arc<dyn OrdersApi>,
                self.carts.clone(),
            );
            CheckoutFlow::new(self.carts.clone(), gateway, Arc::clone(&self.store))
        }

        async fn stock_cart(&self) {
            self.carts
                .add_item(&board(1, Decimal::new(1099, 2)), 2)
                .await
                .unwrap();
        }
    }

    fn signed_in() -> AuthState {
        AuthState::SignedIn(CurrentUser {
            first_name: "Jordan".to_owned(),
            last_name: "Blake".to_owned(),
            email: Email::parse("jordan@example.com").unwrap(),
            address: None,
        })
    }

    #[tokio::test]
    async fn test_gate_holds_while_auth_loads() {
        let fixture = Fixture::new();
        let mut flow = fixture.flow();

        assert_eq!(flow.enter(&AuthState::Loading).await, CheckoutGate::AwaitingAuth);
        // Holding must not touch the cart backend.
        assert_eq!(fixture.backend.get_calls(), 0);
    }

    #[tokio::test]
    async fn test_gate_redirects_anonymous_before_any_fetch() {
        let fixture = Fixture::new();
        let mut flow = fixture.flow();

        let gate = flow.enter(&AuthState::Anonymous).await;
        assert_eq!(
            gate,
            CheckoutGate::RedirectToLogin {
                location: "/account/login?returnUrl=/checkout".to_owned(),
            }
        );
        assert_eq!(fixture.backend.get_calls(), 0);
    }

    #[tokio::test]
    async fn test_gate_rejects_empty_cart() {
        let fixture = Fixture::new();
        let mut flow = fixture.flow();

        assert_eq!(flow.enter(&signed_in()).await, CheckoutGate::EmptyCart);
    }

    #[tokio::test]
    async fn test_gate_admits_signed_in_with_cart() {
        let fixture = Fixture::new();
        fixture.stock_cart().await;
        let mut flow = fixture.flow();

        assert_eq!(flow.enter(&signed_in()).await, CheckoutGate::Ready);
        assert_eq!(flow.step(), CheckoutStep::Delivery);
    }

    #[tokio::test]
    async fn test_delivery_step_rejects_invalid_address() {
        let fixture = Fixture::new();
        fixture.stock_cart().await;
        let mut flow = fixture.flow();

        let mut address = shipping_address();
        address.city = String::new();

        let err = flow
            .submit_delivery(address, DeliveryMethod::standard())
            .unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidAddress(_)));
        assert_eq!(flow.step(), CheckoutStep::Delivery);
    }

    #[tokio::test]
    async fn test_delivery_step_advances_and_caches_draft() {
        let fixture = Fixture::new();
        fixture.stock_cart().await;
        let mut flow = fixture.flow();

        flow.submit_delivery(shipping_address(), DeliveryMethod::standard())
            .unwrap();

        assert_eq!(flow.step(), CheckoutStep::Review);
        assert!(fixture.store.get::<ShippingAddress>(keys::CHECKOUT_ADDRESS).is_some());
        assert_eq!(
            fixture.store.get::<DeliveryMethodId>(keys::CHECKOUT_DELIVERY),
            Some(DeliveryMethod::standard().id)
        );
    }

    #[tokio::test]
    async fn test_draft_survives_restart() {
        let fixture = Fixture::new();
        fixture.stock_cart().await;
        {
            let mut flow = fixture.flow();
            let express = DeliveryMethod::by_id(DeliveryMethodId::new(2)).unwrap();
            flow.submit_delivery(shipping_address(), express).unwrap();
        }

        // A fresh flow over the same cache restores the draft.
        let flow = fixture.flow();
        assert_eq!(flow.address().unwrap().city, shipping_address().city);
        assert_eq!(
            flow.selected_delivery().unwrap().id,
            DeliveryMethodId::new(2)
        );
    }

    #[tokio::test]
    async fn test_back_to_delivery_keeps_draft() {
        let fixture = Fixture::new();
        fixture.stock_cart().await;
        let mut flow = fixture.flow();
        flow.submit_delivery(shipping_address(), DeliveryMethod::standard())
            .unwrap();

        flow.back_to_delivery().unwrap();

        assert_eq!(flow.step(), CheckoutStep::Delivery);
        assert!(flow.address().is_some());
        assert!(flow.selected_delivery().is_some());
    }

    #[tokio::test]
    async fn test_wrong_step_transitions_error() {
        let fixture = Fixture::new();
        let mut flow = fixture.flow();

        assert!(matches!(
            flow.back_to_delivery(),
            Err(CheckoutError::WrongStep {
                expected: CheckoutStep::Review,
            })
        ));
        assert!(matches!(
            flow.submit_order().await,
            Err(CheckoutError::WrongStep {
                expected: CheckoutStep::Review,
            })
        ));
    }

    #[tokio::test]
    async fn test_totals_at_review_include_shipping() {
        let fixture = Fixture::new();
        fixture.stock_cart().await;
        let mut flow = fixture.flow();
        let express = DeliveryMethod::by_id(DeliveryMethodId::new(2)).unwrap();
        flow.submit_delivery(shipping_address(), express).unwrap();

        let totals = flow.totals().unwrap();
        assert_eq!(totals.subtotal, Decimal::new(2198, 2));
        assert_eq!(totals.shipping, Decimal::new(999, 2));
        assert_eq!(totals.total, Decimal::new(3197, 2));

        let session = flow.session();
        assert!(session.cart.is_some());
        assert!(session.delivery.is_some());
        assert_eq!(session.address.unwrap().city, "Portsmouth");
    }

    #[tokio::test]
    async fn test_submit_rechecks_a_restored_address() {
        let fixture = Fixture::new();
        fixture.stock_cart().await;
        let mut flow = fixture.flow();
        flow.submit_delivery(shipping_address(), DeliveryMethod::standard())
            .unwrap();

        // Simulate a stale cached draft going bad behind the flow's back.
        let mut bad = shipping_address();
        bad.postal_code = String::new();
        flow.address = Some(bad);

        let err = flow.submit_order().await.unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidAddress(_)));
        assert_eq!(flow.step(), CheckoutStep::Review);
    }

    #[tokio::test]
    async fn test_submit_places_order_and_clears_everything() {
        let fixture = Fixture::new();
        fixture.stock_cart().await;
        let mut flow = fixture.flow();
        flow.submit_delivery(shipping_address(), DeliveryMethod::standard())
            .unwrap();

        let order = flow.submit_order().await.unwrap();

        assert_eq!(flow.step(), CheckoutStep::Success);
        assert_eq!(flow.order_id(), Some(order.id));
        assert!(flow.address().is_none());
        assert!(flow.selected_delivery().is_none());
        // Cart and draft are gone locally and in the cache.
        assert!(fixture.carts.cart().is_none());
        assert!(fixture.store.get::<ShippingAddress>(keys::CHECKOUT_ADDRESS).is_none());
        assert!(fixture
            .store
            .get::<DeliveryMethodId>(keys::CHECKOUT_DELIVERY)
            .is_none());
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_flow_retryable() {
        let fixture = Fixture::new();
        fixture.stock_cart().await;
        let mut flow = fixture.flow();
        flow.submit_delivery(shipping_address(), DeliveryMethod::standard())
            .unwrap();

        fixture.backend.fail_next_order();
        let err = flow.submit_order().await.unwrap_err();
        assert!(matches!(err, CheckoutError::Submit(_)));

        // Still at review with cart and draft intact; a retry succeeds.
        assert_eq!(flow.step(), CheckoutStep::Review);
        assert!(!flow.is_submitting());
        assert!(fixture.carts.cart().is_some());
        flow.submit_order().await.unwrap();
        assert_eq!(flow.step(), CheckoutStep::Success);
    }

    #[tokio::test]
    async fn test_prefill_respects_restored_draft() {
        let fixture = Fixture::new();
        let mut flow = fixture.flow();
        let user = CurrentUser {
            first_name: "Jordan".to_owned(),
            last_name: "Blake".to_owned(),
            email: Email::parse("jordan@example.com").unwrap(),
            address: Some(Address {
                line1: "1 Harbor Way".to_owned(),
                line2: None,
                city: "Portsmouth".to_owned(),
                state: "NH".to_owned(),
                country: "USA".to_owned(),
                postal_code: "03801".to_owned(),
            }),
        };

        flow.prefill_address(&user);
        assert_eq!(flow.address().unwrap().name, "Jordan Blake");

        // An existing draft wins over the account address.
        let mut other = shipping_address();
        other.name = "Draft Holder".to_owned();
        flow.address = Some(other);
        flow.prefill_address(&user);
        assert_eq!(flow.address().unwrap().name, "Draft Holder");
    }
}
