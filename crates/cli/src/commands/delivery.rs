//! Delivery method listing.

use clementine_core::DeliveryMethod;

use crate::commands::cart::format_money;

/// Print the delivery catalog.
#[allow(clippy::print_stdout)]
pub fn list() {
    println!(
        "{:<4} {:<12} {:<10} {:>8}  {}",
        "ID", "NAME", "TIME", "PRICE", "DESCRIPTION"
    );
    for method in DeliveryMethod::catalog() {
        let price = if method.price.is_zero() {
            "Free".to_owned()
        } else {
            format_money(method.price)
        };
        println!(
            "{:<4} {:<12} {:<10} {:>8}  {}",
            method.id.to_string(),
            method.short_name,
            method.delivery_time,
            price,
            method.description
        );
    }
}
