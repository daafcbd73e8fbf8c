//! Integration test harness for Clementine.
//!
//! [`TestBackend`] is an in-process stand-in for the store API: an axum
//! server on an ephemeral localhost port speaking the same REST contract
//! the real backend does. Tests drive the full client stack against it
//! over real HTTP and then inspect what the backend saw.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p clementine-integration-tests
//! ```
//!
//! # Capabilities
//!
//! - Carts and orders held in shared state the test can seed and inspect
//! - Per-endpoint hit counters
//! - One-shot failure injection per mutation endpoint
//! - Raw request body capture for wire-shape assertions

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use clementine_core::{Cart, DeliveryMethod, Order, OrderId, OrderItem, OrderToCreate};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

type Shared = Arc<BackendState>;

#[derive(Default)]
struct BackendState {
    carts: Mutex<HashMap<String, Cart>>,
    orders: Mutex<Vec<Order>>,
    last_cart_upsert: Mutex<Option<Value>>,
    last_order_request: Mutex<Option<Value>>,
    next_order_id: AtomicI32,
    get_cart_hits: AtomicUsize,
    set_cart_hits: AtomicUsize,
    delete_cart_hits: AtomicUsize,
    create_order_hits: AtomicUsize,
    fail_next_set: AtomicBool,
    fail_next_delete: AtomicBool,
    fail_next_order: AtomicBool,
    stamp_payment_intents: AtomicBool,
}

/// An in-process store API server for integration tests.
///
/// The server is torn down when the value is dropped.
pub struct TestBackend {
    state: Shared,
    addr: SocketAddr,
    server: tokio::task::JoinHandle<()>,
}

impl TestBackend {
    /// Bind the fake store API on an ephemeral localhost port.
    pub async fn spawn() -> Self {
        let state = Shared::default();
        let app = router(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test backend");
        let addr = listener.local_addr().expect("Failed to read local addr");

        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            state,
            addr,
            server,
        }
    }

    /// Base URL clients should be pointed at.
    pub fn api_url(&self) -> Url {
        format!("http://{}", self.addr)
            .parse()
            .expect("Test backend URL is valid")
    }

    // ===== Seeding & Inspection =====

    /// Store a cart directly, bypassing HTTP.
    pub fn seed_cart(&self, cart: &Cart) {
        self.state
            .carts
            .lock()
            .expect("carts lock")
            .insert(cart.id.as_str().to_owned(), cart.clone());
    }

    /// The server-side copy of a cart, if it exists.
    pub fn cart(&self, id: &str) -> Option<Cart> {
        self.state.carts.lock().expect("carts lock").get(id).cloned()
    }

    /// Drop a cart server-side without telling anyone.
    pub fn forget_cart(&self, id: &str) {
        self.state.carts.lock().expect("carts lock").remove(id);
    }

    /// Every order the backend has accepted, in creation order.
    pub fn orders(&self) -> Vec<Order> {
        self.state.orders.lock().expect("orders lock").clone()
    }

    /// Raw JSON body of the most recent cart upsert.
    pub fn last_cart_upsert(&self) -> Option<Value> {
        self.state
            .last_cart_upsert
            .lock()
            .expect("upsert lock")
            .clone()
    }

    /// Raw JSON body of the most recent order-creation request.
    pub fn last_order_request(&self) -> Option<Value> {
        self.state
            .last_order_request
            .lock()
            .expect("order request lock")
            .clone()
    }

    pub fn get_cart_hits(&self) -> usize {
        self.state.get_cart_hits.load(Ordering::SeqCst)
    }

    pub fn set_cart_hits(&self) -> usize {
        self.state.set_cart_hits.load(Ordering::SeqCst)
    }

    pub fn delete_cart_hits(&self) -> usize {
        self.state.delete_cart_hits.load(Ordering::SeqCst)
    }

    pub fn create_order_hits(&self) -> usize {
        self.state.create_order_hits.load(Ordering::SeqCst)
    }

    // ===== Behavior Switches =====

    /// Fail the next cart upsert with a 500.
    pub fn fail_next_cart_upsert(&self) {
        self.state.fail_next_set.store(true, Ordering::SeqCst);
    }

    /// Fail the next cart delete with a 500.
    pub fn fail_next_cart_delete(&self) {
        self.state.fail_next_delete.store(true, Ordering::SeqCst);
    }

    /// Fail the next order creation with a 500.
    pub fn fail_next_order(&self) {
        self.state.fail_next_order.store(true, Ordering::SeqCst);
    }

    /// Attach a payment intent to every upserted cart, the way the real
    /// backend does once payment processing kicks in.
    pub fn stamp_payment_intents(&self) {
        self.state
            .stamp_payment_intents
            .store(true, Ordering::SeqCst);
    }
}

impl Drop for TestBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route(
            "/cart",
            get(get_cart).post(set_cart).delete(delete_cart),
        )
        .route("/orders", get(get_orders).post(create_order))
        .route("/orders/{id}", get(get_order))
        .with_state(state)
}

#[derive(Deserialize)]
struct CartQuery {
    id: String,
}

async fn get_cart(State(state): State<Shared>, Query(query): Query<CartQuery>) -> Response {
    state.get_cart_hits.fetch_add(1, Ordering::SeqCst);

    match state.carts.lock().expect("carts lock").get(&query.id) {
        Some(cart) => (StatusCode::OK, Json(cart.clone())).into_response(),
        None => (StatusCode::NOT_FOUND, "Cart not found").into_response(),
    }
}

async fn set_cart(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    state.set_cart_hits.fetch_add(1, Ordering::SeqCst);
    *state.last_cart_upsert.lock().expect("upsert lock") = Some(body.clone());

    if state.fail_next_set.swap(false, Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "injected failure").into_response();
    }

    let mut cart: Cart = match serde_json::from_value(body) {
        Ok(cart) => cart,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    if state.stamp_payment_intents.load(Ordering::SeqCst) && cart.payment_intent_id.is_none() {
        cart.payment_intent_id = Some("pi_test_123".to_owned());
        cart.client_secret = Some("pi_test_123_secret".to_owned());
    }

    state
        .carts
        .lock()
        .expect("carts lock")
        .insert(cart.id.as_str().to_owned(), cart.clone());

    (StatusCode::OK, Json(cart)).into_response()
}

async fn delete_cart(State(state): State<Shared>, Query(query): Query<CartQuery>) -> Response {
    state.delete_cart_hits.fetch_add(1, Ordering::SeqCst);

    if state.fail_next_delete.swap(false, Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "injected failure").into_response();
    }

    match state.carts.lock().expect("carts lock").remove(&query.id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => (StatusCode::NOT_FOUND, "Cart not found").into_response(),
    }
}

async fn create_order(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    state.create_order_hits.fetch_add(1, Ordering::SeqCst);
    *state.last_order_request.lock().expect("order request lock") = Some(body.clone());

    if state.fail_next_order.swap(false, Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "injected failure").into_response();
    }

    let request: OrderToCreate = match serde_json::from_value(body) {
        Ok(request) => request,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    let Some(cart) = state
        .carts
        .lock()
        .expect("carts lock")
        .get(request.cart_id.as_str())
        .cloned()
    else {
        return (StatusCode::BAD_REQUEST, "Cart not found").into_response();
    };
    let Some(delivery) = DeliveryMethod::by_id(request.delivery_method_id) else {
        return (StatusCode::BAD_REQUEST, "Delivery method not found").into_response();
    };

    let subtotal = cart.subtotal();
    let order = Order {
        id: OrderId::new(state.next_order_id.fetch_add(1, Ordering::SeqCst) + 1),
        order_date: Utc::now(),
        buyer_email: "buyer@example.com".to_owned(),
        shipping_address: request.shipping_address.clone(),
        delivery_method: delivery.short_name.clone(),
        shipping_price: delivery.price,
        payment_summary: request.payment_summary.clone(),
        order_items: cart
            .items
            .iter()
            .map(|line| OrderItem {
                product_id: line.product_id,
                product_name: line.product_name.clone(),
                picture_url: line.picture_url.clone(),
                price: line.price,
                quantity: line.quantity,
            })
            .collect(),
        subtotal,
        discount: request.discount,
        status: "Pending".to_owned(),
        payment_intent_id: cart.payment_intent_id.clone().unwrap_or_default(),
        total: subtotal + delivery.price - request.discount.unwrap_or(Decimal::ZERO),
    };

    state.orders.lock().expect("orders lock").push(order.clone());

    (StatusCode::CREATED, Json(order)).into_response()
}

async fn get_orders(State(state): State<Shared>) -> Response {
    let orders = state.orders.lock().expect("orders lock").clone();
    (StatusCode::OK, Json(orders)).into_response()
}

async fn get_order(State(state): State<Shared>, Path(id): Path<i32>) -> Response {
    let order = state
        .orders
        .lock()
        .expect("orders lock")
        .iter()
        .find(|order| order.id == OrderId::new(id))
        .cloned();

    match order {
        Some(order) => (StatusCode::OK, Json(order)).into_response(),
        None => (StatusCode::NOT_FOUND, "Order not found").into_response(),
    }
}
