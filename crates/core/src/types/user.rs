//! The authenticated customer identity.

use serde::{Deserialize, Serialize};

use crate::types::address::{Address, ShippingAddress};
use crate::types::email::Email;

/// The signed-in customer as reported by the account collaborator.
///
/// Authentication mechanics are out of scope for this client; the host
/// application resolves the session and hands this to the checkout gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

impl CurrentUser {
    /// Display name in "First Last" form.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Prefill a shipping address from the saved account address, if any.
    #[must_use]
    pub fn shipping_address(&self) -> Option<ShippingAddress> {
        self.address.as_ref().map(|address| ShippingAddress {
            name: self.full_name(),
            line1: address.line1.clone(),
            line2: address.line2.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            postal_code: address.postal_code.clone(),
            country: address.country.clone(),
        })
    }
}
