//! Shipping and account addresses.

use serde::{Deserialize, Serialize};

/// An address saved on a customer account (no addressee name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
}

/// A single failed address field check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    /// Wire-format field name (camelCase).
    pub field: &'static str,
    /// User-facing message, e.g. "Name is required".
    pub message: &'static str,
}

/// Shipping address validation failure carrying every failed field at once,
/// so a form can render all messages in a single pass.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", .errors.iter().map(|e| e.message).collect::<Vec<_>>().join("; "))]
pub struct InvalidAddress {
    /// Failed fields in declaration order.
    pub errors: Vec<FieldError>,
}

/// The address an order ships to, collected once per checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub name: String,
    pub line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl ShippingAddress {
    /// Check that every required field is present and non-blank.
    ///
    /// Whitespace-only values count as missing. `line2` is optional.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidAddress`] listing every failed field, not just
    /// the first.
    pub fn validate(&self) -> Result<(), InvalidAddress> {
        let checks: [(&str, &'static str, &'static str); 6] = [
            (&self.name, "name", "Name is required"),
            (&self.line1, "line1", "Address line 1 is required"),
            (&self.city, "city", "City is required"),
            (&self.state, "state", "State is required"),
            (&self.postal_code, "postalCode", "Postal code is required"),
            (&self.country, "country", "Country is required"),
        ];

        let errors: Vec<FieldError> = checks
            .into_iter()
            .filter(|(value, _, _)| value.trim().is_empty())
            .map(|(_, field, message)| FieldError { field, message })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(InvalidAddress { errors })
        }
    }
}
