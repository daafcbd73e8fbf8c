//! Wired-together client state.
//!
//! [`ClientState`] owns the configured HTTP client, the durable cache, and
//! the cart service, and hands out checkout flows built over them. Hosts
//! construct one per process and clone it wherever it is needed.

use std::sync::Arc;

use crate::api::StoreClient;
use crate::cart::CartService;
use crate::checkout::CheckoutFlow;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::orders::OrderGateway;
use crate::storage::DiskStore;

/// Shared handle over the client's long-lived pieces.
///
/// Cheap to clone; clones share the same cache, HTTP client, and cart
/// state.
#[derive(Clone)]
pub struct ClientState {
    inner: Arc<ClientStateInner>,
}

struct ClientStateInner {
    config: ClientConfig,
    store: Arc<DiskStore>,
    api: StoreClient,
    carts: CartService,
}

impl ClientState {
    /// Wire up a client from explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache directory cannot be prepared or the
    /// HTTP client fails to build.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let store = Arc::new(DiskStore::open(&config.data_dir)?);
        let api = StoreClient::new(&config.api_url)?;
        let carts = CartService::new(Arc::new(api.clone()), Arc::clone(&store));

        Ok(Self {
            inner: Arc::new(ClientStateInner {
                config,
                store,
                api,
                carts,
            }),
        })
    }

    /// Wire up a client from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or
    /// malformed, plus everything [`ClientState::new`] can fail with.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn store(&self) -> &Arc<DiskStore> {
        &self.inner.store
    }

    #[must_use]
    pub fn api(&self) -> &StoreClient {
        &self.inner.api
    }

    #[must_use]
    pub fn carts(&self) -> &CartService {
        &self.inner.carts
    }

    /// Start a checkout flow over this client's cart and order services.
    #[must_use]
    pub fn begin_checkout(&self) -> CheckoutFlow {
        let gateway = OrderGateway::new(Arc::new(self.inner.api.clone()), self.inner.carts.clone());
        CheckoutFlow::new(
            self.inner.carts.clone(),
            gateway,
            Arc::clone(&self.inner.store),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_cart_state() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::new(
            "http://localhost:5000/api".parse().unwrap(),
            dir.path().to_path_buf(),
        );
        let state = ClientState::new(config).unwrap();

        let clone = state.clone();
        clone.carts().set_selected_delivery(Some(
            clementine_core::DeliveryMethod::standard(),
        ));

        assert!(state.carts().selected_delivery().is_some());
        assert_eq!(state.api().base_url(), "http://localhost:5000/api");
    }
}
