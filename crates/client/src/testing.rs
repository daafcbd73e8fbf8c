//! In-process fake of the store backend for unit tests.
//!
//! Mirrors the remote contract closely enough for service-level tests:
//! carts are echoed back on upsert, orders freeze the stored cart, and
//! every endpoint counts its calls and can be armed to fail exactly once.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use clementine_core::{
    Cart, CartId, DeliveryMethod, Order, OrderId, OrderItem, OrderToCreate, Product, ProductId,
    ShippingAddress,
};
use rust_decimal::Decimal;

use crate::api::{ApiError, CartApi, OrdersApi};

/// A skateboard-shop product fixture.
pub(crate) fn board(id: i32, price: Decimal) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("Speedster Board {id}"),
        description: "A fast board".to_owned(),
        price,
        picture_url: format!("/images/products/sb-{id}.png"),
        product_type: "Boards".to_owned(),
        brand: "Angular".to_owned(),
        quantity_in_stock: 100,
    }
}

/// A fully valid shipping address fixture.
pub(crate) fn shipping_address() -> ShippingAddress {
    ShippingAddress {
        name: "Jordan Blake".to_owned(),
        line1: "1 Harbor Way".to_owned(),
        line2: None,
        city: "Portsmouth".to_owned(),
        state: "NH".to_owned(),
        postal_code: "03801".to_owned(),
        country: "USA".to_owned(),
    }
}

#[derive(Default)]
pub(crate) struct InMemoryBackend {
    carts: Mutex<HashMap<String, Cart>>,
    orders: Mutex<Vec<Order>>,
    last_order_request: Mutex<Option<OrderToCreate>>,
    next_order_id: AtomicI32,
    get_calls: AtomicUsize,
    set_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    order_calls: AtomicUsize,
    fail_set: AtomicBool,
    fail_delete: AtomicBool,
    fail_order: AtomicBool,
}

impl InMemoryBackend {
    /// Store a single-line cart directly, bypassing the API surface.
    pub(crate) fn seed_cart(&self, product: &Product, quantity: u32) -> Cart {
        let mut cart = Cart::create();
        cart.add_item(product, quantity);
        self.carts
            .lock()
            .unwrap()
            .insert(cart.id.as_str().to_owned(), cart.clone());
        cart
    }

    /// Drop a cart server-side without the client noticing.
    pub(crate) fn forget_cart(&self, id: &CartId) {
        self.carts.lock().unwrap().remove(id.as_str());
    }

    pub(crate) fn last_order_request(&self) -> Option<OrderToCreate> {
        self.last_order_request.lock().unwrap().clone()
    }

    // One-shot failure switches; each trips on the next matching call.

    pub(crate) fn fail_next_set(&self) {
        self.fail_set.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_next_delete(&self) {
        self.fail_delete.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_next_order(&self) {
        self.fail_order.store(true, Ordering::SeqCst);
    }

    pub(crate) fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn set_calls(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn order_calls(&self) -> usize {
        self.order_calls.load(Ordering::SeqCst)
    }

    fn injected_failure() -> ApiError {
        ApiError::Api {
            status: 500,
            message: "injected failure".to_owned(),
        }
    }
}

#[async_trait]
impl CartApi for InMemoryBackend {
    async fn get_cart(&self, id: &CartId) -> Result<Cart, ApiError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.carts
            .lock()
            .unwrap()
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("cart {id}")))
    }

    async fn set_cart(&self, cart: &Cart) -> Result<Cart, ApiError> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_set.swap(false, Ordering::SeqCst) {
            return Err(Self::injected_failure());
        }
        self.carts
            .lock()
            .unwrap()
            .insert(cart.id.as_str().to_owned(), cart.clone());
        Ok(cart.clone())
    }

    async fn delete_cart(&self, id: &CartId) -> Result<(), ApiError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.swap(false, Ordering::SeqCst) {
            return Err(Self::injected_failure());
        }
        self.carts
            .lock()
            .unwrap()
            .remove(id.as_str())
            .map(|_| ())
            .ok_or_else(|| ApiError::NotFound(format!("cart {id}")))
    }
}

#[async_trait]
impl OrdersApi for InMemoryBackend {
    async fn create_order(&self, order: &OrderToCreate) -> Result<Order, ApiError> {
        self.order_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_order_request.lock().unwrap() = Some(order.clone());
        if self.fail_order.swap(false, Ordering::SeqCst) {
            return Err(Self::injected_failure());
        }

        let cart = self
            .carts
            .lock()
            .unwrap()
            .get(order.cart_id.as_str())
            .cloned()
            .ok_or_else(|| ApiError::Api {
                status: 400,
                message: "Cart not found".to_owned(),
            })?;
        let delivery = DeliveryMethod::by_id(order.delivery_method_id).ok_or_else(|| {
            ApiError::Api {
                status: 400,
                message: "Delivery method not found".to_owned(),
            }
        })?;

        let subtotal = cart.subtotal();
        let placed = Order {
            id: OrderId::new(self.next_order_id.fetch_add(1, Ordering::SeqCst) + 1),
            order_date: Utc::now(),
            buyer_email: "test@example.com".to_owned(),
            shipping_address: order.shipping_address.clone(),
            delivery_method: delivery.short_name.clone(),
            shipping_price: delivery.price,
            payment_summary: order.payment_summary.clone(),
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
            discount: order.discount,
            status: "Pending".to_owned(),
            payment_intent_id: String::new(),
            total: subtotal + delivery.price - order.discount.unwrap_or(Decimal::ZERO),
        };

        self.orders.lock().unwrap().push(placed.clone());
        Ok(placed)
    }

    async fn get_orders(&self) -> Result<Vec<Order>, ApiError> {
        Ok(self.orders.lock().unwrap().clone())
    }

    async fn get_order(&self, id: OrderId) -> Result<Order, ApiError> {
        self.orders
            .lock()
            .unwrap()
            .iter()
            .find(|order| order.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("order {id}")))
    }
}
