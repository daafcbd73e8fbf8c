//! REST client for the store backend.
//!
//! Implements the JSON contract the cart and order components consume:
//! fetch/upsert/delete cart and order creation/retrieval. The [`CartApi`]
//! and [`OrdersApi`] traits are the injection seam; [`StoreClient`] is the
//! production implementation over HTTP, and tests swap in in-memory fakes.

use async_trait::async_trait;
use clementine_core::{Cart, CartId, Order, OrderId, OrderToCreate};
use reqwest::StatusCode;
use thiserror::Error;
use tracing::instrument;
use url::Url;

/// Errors that can occur talking to the store API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failed (no usable response received).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The requested resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Remote cart store operations.
#[async_trait]
pub trait CartApi: Send + Sync {
    /// Fetch a cart by id.
    async fn get_cart(&self, id: &CartId) -> Result<Cart, ApiError>;

    /// Upsert a full cart, returning the server-normalized copy.
    async fn set_cart(&self, cart: &Cart) -> Result<Cart, ApiError>;

    /// Delete a cart by id.
    async fn delete_cart(&self, id: &CartId) -> Result<(), ApiError>;
}

/// Order collaborator operations.
#[async_trait]
pub trait OrdersApi: Send + Sync {
    /// Create an order from a checkout session.
    async fn create_order(&self, order: &OrderToCreate) -> Result<Order, ApiError>;

    /// Fetch the signed-in customer's orders.
    async fn get_orders(&self) -> Result<Vec<Order>, ApiError>;

    /// Fetch one order by id.
    async fn get_order(&self, id: OrderId) -> Result<Order, ApiError>;
}

/// HTTP client for the store backend.
///
/// Cheaply cloneable. Holds a shared cookie jar so the backend session
/// follows every request, the way the browser original sent credentialed
/// requests. No timeout is set at this layer; transport defaults apply.
#[derive(Clone)]
pub struct StoreClient {
    client: reqwest::Client,
    base_url: String,
}

impl StoreClient {
    /// Create a new store client for the given API base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(api_url: &Url) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().cookie_store(true).build()?;

        Ok(Self {
            client,
            base_url: api_url.as_str().trim_end_matches('/').to_owned(),
        })
    }

    /// The API base URL this client talks to, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

///// Read a non-success response into [`ApiError::Api`].
async fn error_for(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    ApiError::Api { status, message }
}

#[async_trait]
impl CartApi for StoreClient {
    #[instrument(skip(self))]
    async fn get_cart(&self, id: &CartId) -> Result<Cart, ApiError> {
        let url = format!("{}/cart", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("id", id.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(format!("cart {id}")));
        }
        if !status.is_success() {
            return Err(error_for(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    #[instrument(skip(self, cart), fields(cart_id = %cart.id))]
    async fn set_cart(&self, cart: &Cart) -> Result<Cart, ApiError> {
        let url = format!("{}/cart", self.base_url);
        let response = self.client.post(&url).json(cart).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_for(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    #[instrument(skip(self))]
    async fn delete_cart(&self, id: &CartId) -> Result<(), ApiError> {
        let url = format!("{}/cart", self.base_url);
        let response = self
            .client
            .delete(&url)
            .query(&[("id", id.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(format!("cart {id}")));
        }
        if !status.is_success() {
            return Err(error_for(response).await);
        }

        Ok(())
    }
}

#[async_trait]
impl OrdersApi for StoreClient {
    #[instrument(skip(self, order), fields(cart_id = %order.cart_id))]
    async fn create_order(&self, order: &OrderToCreate) -> Result<Order, ApiError> {
        let url = format!("{}/orders", self.base_url);
        let response = self.client.post(&url).json(order).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_for(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    #[instrument(skip(self))]
    async fn get_orders(&self) -> Result<Vec<Order>, ApiError> {
        let url = format!("{}/orders", self.base_url);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_for(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    #[instrument(skip(self))]
    async fn get_order(&self, id: OrderId) -> Result<Order, ApiError> {
        let url = format!("{}/orders/{id}", self.base_url);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(format!("order {id}")));
        }
        if !status.is_success() {
            return Err(error_for(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }
}
