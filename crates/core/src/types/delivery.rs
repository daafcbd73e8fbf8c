//! Delivery method catalog.
//!
//! A small fixed set of shipping options, treated as read-only reference
//! data. Nothing here is persisted server-side; the selected method travels
//! to the order collaborator as an id.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::DeliveryMethodId;

/// A priced shipping option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryMethod {
    pub id: DeliveryMethodId,
    pub short_name: String,
    /// Human-readable delivery window, e.g. "2-3 days".
    pub delivery_time: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl DeliveryMethod {
    /// The full catalog, cheapest first.
    #[must_use]
    pub fn catalog() -> Vec<Self> {
        vec![
            Self::standard(),
            Self {
                id: DeliveryMethodId::new(2),
                short_name: "Express".to_owned(),
                delivery_time: "2-3 days".to_owned(),
                description: "Express delivery".to_owned(),
                price: Decimal::new(999, 2),
            },
            Self {
                id: DeliveryMethodId::new(3),
                short_name: "Next Day".to_owned(),
                delivery_time: "1 day".to_owned(),
                description: "Next day delivery".to_owned(),
                price: Decimal::new(1999, 2),
            },
        ]
    }

    /// The default selection: free standard delivery, the cheapest option.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            id: DeliveryMethodId::new(1),
            short_name: "Standard".to_owned(),
            delivery_time: "5-7 days".to_owned(),
            description: "Standard delivery".to_owned(),
            price: Decimal::ZERO,
        }
    }

    /// Look up a catalog entry by id.
    #[must_use]
    pub fn by_id(id: DeliveryMethodId) -> Option<Self> {
        Self::catalog().into_iter().find(|method| method.id == id)
    }
}
