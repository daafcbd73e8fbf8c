//! Cart synchronization service.
//!
//! The only component that talks to the remote cart store. Every mutation is
//! read-snapshot, remote call, commit: the full cart object is upserted (the
//! backend has no partial-update endpoint) and the server's response becomes
//! the new local truth. The durable cache seeds cart identity across
//! restarts and is refreshed on every successful sync.
//!
//! Two processes racing on one cart are not reconciled; the last upsert
//! wins. See the crate docs for the known-limitation notes.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use clementine_core::{Cart, CartId, DeliveryMethod, LineChange, Product, ProductId};
use rust_decimal::Decimal;
use tracing::{error, instrument, warn};

use crate::api::{ApiError, CartApi};
use crate::storage::{DiskStore, keys};

struct CartState {
    cart: Option<Cart>,
    selected_delivery: Option<DeliveryMethod>,
}

/// Synchronizes cart state between memory, the durable cache, and the
/// remote store.
///
/// Cheaply cloneable; clones share one state. The internal lock is never
/// held across a network call: mutations work on a snapshot and commit the
/// server's response afterwards.
#[derive(Clone)]
pub struct CartService {
    inner: Arc<CartServiceInner>,
}

struct CartServiceInner {
    api: Arc<dyn CartApi>,
    store: Arc<DiskStore>,
    state: Mutex<CartState>,
}

impl CartService {
    /// Create a service over the given API and durable cache, hydrating the
    /// in-memory cart from the cache.
    #[must_use]
    pub fn new(api: Arc<dyn CartApi>, store: Arc<DiskStore>) -> Self {
        let cart = store.get::<Cart>(keys::CART);

        Self {
            inner: Arc::new(CartServiceInner {
                api,
                store,
                state: Mutex::new(CartState {
                    cart,
                    selected_delivery: None,
                }),
            }),
        }
    }

    // ===== Retrieval =====

    /// Resolve the active cart. Never fails.
    ///
    /// Identity comes from memory first, then the durable cache. With no id
    /// anywhere, a fresh empty cart is materialized locally without touching
    /// the network. With an id, the remote copy is fetched and adopted; a
    /// missing or unreachable remote cart degrades to a fresh local cart
    /// under a new id (logged, never surfaced to the caller).
    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> Cart {
        let known_id = self
            .active_cart_id()
            .or_else(|| self.inner.store.get::<CartId>(keys::CART_ID));

        let Some(id) = known_id else {
            return self.adopt_fresh_cart();
        };

        match self.inner.api.get_cart(&id).await {
            Ok(cart) => {
                self.commit(cart.clone());
                cart
            }
            Err(e) => {
                warn!("Failed to fetch cart {id}: {e}; starting a fresh cart");
                self.adopt_fresh_cart()
            }
        }
    }

    // ===== Mutations =====

    /// Upsert the full cart remotely and adopt the server's response.
    ///
    /// # Errors
    ///
    /// On failure the error is logged and returned; the previous local
    /// state is left untouched.
    #[instrument(skip(self, cart), fields(cart_id = %cart.id))]
    pub async fn set_cart(&self, cart: Cart) -> Result<Cart, ApiError> {
        match self.inner.api.set_cart(&cart).await {
            Ok(updated) => {
                self.commit(updated.clone());
                Ok(updated)
            }
            Err(e) => {
                error!("Failed to update cart {}: {e}", cart.id);
                Err(e)
            }
        }
    }

    /// Add a product to the cart, creating the cart if none exists.
    ///
    /// Identity is by product id: adding a product already in the cart
    /// increments its quantity. A `quantity` of 0 is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the upsert error; local state is unchanged on failure.
    #[instrument(skip(self, product), fields(product_id = %product.id, quantity))]
    pub async fn add_item(&self, product: &Product, quantity: u32) -> Result<(), ApiError> {
        if quantity == 0 {
            return Ok(());
        }

        let mut cart = self.snapshot().unwrap_or_else(Cart::create);
        cart.add_item(product, quantity);
        self.set_cart(cart).await?;
        Ok(())
    }

    /// Remove a product's line from the cart.
    ///
    /// An absent cart or line is a quiet no-op. Removing the last line
    /// deletes the cart outright instead of upserting an empty one.
    ///
    /// # Errors
    ///
    /// Returns the upsert or delete error; local state is unchanged on
    /// failure.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, product_id: ProductId) -> Result<(), ApiError> {
        let Some(mut cart) = self.snapshot() else {
            return Ok(());
        };

        if !cart.remove_item(product_id) {
            return Ok(());
        }

        if cart.is_empty() {
            self.delete_cart().await
        } else {
            self.set_cart(cart).await.map(|_| ())
        }
    }

    /// Set a line's quantity directly (replacement, not additive).
    ///
    /// A `quantity` of 0 removes the line. The same empty-cart rule applies
    /// as for [`remove_item`](Self::remove_item); an absent cart or line is
    /// a quiet no-op.
    ///
    /// # Errors
    ///
    /// Returns the upsert or delete error; local state is unchanged on
    /// failure.
    #[instrument(skip(self))]
    pub async fn update_quantity(&self, product_id: ProductId, quantity: u32) -> Result<(), ApiError> {
        let Some(mut cart) = self.snapshot() else {
            return Ok(());
        };

        if cart.set_quantity(product_id, quantity) == LineChange::Missing {
            return Ok(());
        }

        if cart.is_empty() {
            self.delete_cart().await
        } else {
            self.set_cart(cart).await.map(|_| ())
        }
    }

    /// Delete the active cart remotely and clear every local trace.
    ///
    /// With no cart loaded this is a no-op success. A remote cart that is
    /// already gone counts as deleted.
    ///
    /// # Errors
    ///
    /// Any other remote failure is logged and returned, leaving local state
    /// and the cache intact.
    #[instrument(skip(self))]
    pub async fn delete_cart(&self) -> Result<(), ApiError> {
        let Some(id) = self.active_cart_id() else {
            return Ok(());
        };

        match self.inner.api.delete_cart(&id).await {
            Ok(()) => {}
            Err(ApiError::NotFound(_)) => {
                // Already gone remotely; still ours to clean up locally.
            }
            Err(e) => {
                error!("Failed to delete cart {id}: {e}");
                return Err(e);
            }
        }

        self.clear_local();
        Ok(())
    }

    // ===== Selectors =====

    /// The current in-memory cart, if any.
    #[must_use]
    pub fn cart(&self) -> Option<Cart> {
        self.lock().cart.clone()
    }

    /// Total units across the active cart's lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lock().cart.as_ref().map_or(0, Cart::total_quantity)
    }

    /// Exact-decimal subtotal of the active cart.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lock().cart.as_ref().map_or(Decimal::ZERO, Cart::subtotal)
    }

    /// The delivery method chosen for checkout, if any.
    #[must_use]
    pub fn selected_delivery(&self) -> Option<DeliveryMethod> {
        self.lock().selected_delivery.clone()
    }

    /// Set or clear the delivery selection. In-memory only; the checkout
    /// flow owns its persistence.
    pub fn set_selected_delivery(&self, delivery: Option<DeliveryMethod>) {
        self.lock().selected_delivery = delivery;
    }

    // ===== Internals =====

    fn lock(&self) -> MutexGuard<'_, CartState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self) -> Option<Cart> {
        self.lock().cart.clone()
    }

    fn active_cart_id(&self) -> Option<CartId> {
        self.lock().cart.as_ref().map(|cart| cart.id.clone())
    }

    /// Materialize a brand-new empty cart as the local truth.
    fn adopt_fresh_cart(&self) -> Cart {
        let cart = Cart::create();
        self.commit(cart.clone());
        cart
    }

    /// Replace the in-memory cart and refresh the durable cache.
    ///
    /// Cache writes are best-effort: the cache only seeds the next start
    /// and is never authoritative, so a failed write degrades to a warning.
    fn commit(&self, cart: Cart) {
        if let Err(e) = self.inner.store.insert(keys::CART_ID, &cart.id) {
            warn!("Failed to cache cart id: {e}");
        }
        if let Err(e) = self.inner.store.insert(keys::CART, &cart) {
            warn!("Failed to cache cart contents: {e}");
        }
        self.lock().cart = Some(cart);
    }

    fn clear_local(&self) {
        for key in [keys::CART_ID, keys::CART] {
            if let Err(e) = self.inner.store.remove(key) {
                warn!("Failed to clear cache key {key}: {e}");
            }
        }
        self.lock().cart = None;
    }
}
