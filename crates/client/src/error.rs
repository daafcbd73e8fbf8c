//! Unified error handling for the client.
//!
//! Each layer has its own error enum; [`ClientError`] is the umbrella the
//! application shell works with. Library code returns the layer-specific
//! types so callers can match on what actually went wrong.

use thiserror::Error;

use crate::api::ApiError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::orders::SubmitError;
use crate::storage::StorageError;

/// Top-level error type for the Clementine client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Store API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Durable cache operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration loading failed.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Checkout flow rejected a transition.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Order submission failed.
    #[error("Order error: {0}")]
    Submit(#[from] SubmitError),
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;
