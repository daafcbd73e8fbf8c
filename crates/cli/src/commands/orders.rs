//! Order history commands.
//!
//! # Usage
//!
//! ```bash
//! clementine orders list
//! clementine orders show --id 7
//! ```

use clementine_client::{ApiError, ClientState, OrdersApi};
use clementine_core::{Order, OrderId};

use crate::commands::cart::format_money;

/// List placed orders, newest last.
#[allow(clippy::print_stdout)]
pub async fn list(state: &ClientState) -> Result<(), ApiError> {
    let orders = state.api().get_orders().await?;
    if orders.is_empty() {
        println!("No orders yet");
        return Ok(());
    }

    println!(
        "{:<6} {:<22} {:<10} {:>10}",
        "ID", "DATE", "STATUS", "TOTAL"
    );
    for order in &orders {
        println!(
            "{:<6} {:<22} {:<10} {:>10}",
            order.id.to_string(),
            order.order_date.format("%Y-%m-%d %H:%M UTC").to_string(),
            order.status,
            format_money(order.total),
        );
    }
    Ok(())
}

/// Show one order in full.
pub async fn show(state: &ClientState, id: i32) -> Result<(), ApiError> {
    let order = state.api().get_order(OrderId::new(id)).await?;
    print_order(&order);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_order(order: &Order) {
    println!("Order {} ({})", order.id, order.status);
    println!("  Placed:   {}", order.order_date.format("%Y-%m-%d %H:%M UTC"));
    println!("  Buyer:    {}", order.buyer_email);
    println!(
        "  Ship to:  {}, {}, {} {}, {}",
        order.shipping_address.line1,
        order.shipping_address.city,
        order.shipping_address.state,
        order.shipping_address.postal_code,
        order.shipping_address.country,
    );
    println!(
        "  Delivery: {} ({})",
        order.delivery_method,
        format_money(order.shipping_price)
    );
    println!("  Items:");
    for item in &order.order_items {
        println!(
            "    {:>3} x {:<40} @ {:>8}",
            item.quantity,
            item.product_name,
            format_money(item.price),
        );
    }
    println!("  Subtotal: {}", format_money(order.subtotal));
    if let Some(discount) = order.discount {
        println!("  Discount: -{}", format_money(discount));
    }
    println!("  Total:    {}", format_money(order.total));
}
