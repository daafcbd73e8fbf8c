//! Cart inspection and editing commands.
//!
//! # Usage
//!
//! ```bash
//! # Sync and print the active cart
//! clementine cart show
//!
//! # Add three of product 1
//! clementine cart add --id 1 --name "Angular Speedster Board 2000" --price 10.99 --quantity 3
//!
//! # Drop a line, change a quantity, clear everything
//! clementine cart remove --id 1
//! clementine cart update --id 1 --quantity 2
//! clementine cart clear
//! ```

use clap::Args;
use clementine_client::{ClientError, ClientState};
use clementine_core::{Cart, Product, ProductId};
use rust_decimal::Decimal;

#[derive(Args)]
pub struct AddArgs {
    /// Product id
    #[arg(long)]
    pub id: i32,

    /// Product name
    #[arg(long)]
    pub name: String,

    /// Unit price, e.g. 10.99
    #[arg(long)]
    pub price: Decimal,

    /// Product image URL
    #[arg(long, default_value = "")]
    pub picture_url: String,

    /// Product brand
    #[arg(long, default_value = "")]
    pub brand: String,

    /// Product type
    #[arg(long = "type", default_value = "")]
    pub product_type: String,

    /// Units to add
    #[arg(long, default_value_t = 1)]
    pub quantity: u32,
}

impl AddArgs {
    /// The product snapshot the cart line will be frozen from.
    fn into_product(self) -> Product {
        Product {
            id: ProductId::new(self.id),
            name: self.name,
            description: String::new(),
            price: self.price,
            picture_url: self.picture_url,
            product_type: self.product_type,
            brand: self.brand,
            quantity_in_stock: 0,
        }
    }
}

/// Sync the active cart from the store and print it.
pub async fn show(state: &ClientState) {
    let cart = state.carts().get_cart().await;
    print_cart(&cart);
}

/// Add a product to the cart, creating the cart on first use.
pub async fn add(state: &ClientState, args: AddArgs) -> Result<(), ClientError> {
    let quantity = args.quantity;
    state.carts().add_item(&args.into_product(), quantity).await?;
    print_current(state);
    Ok(())
}

/// Remove a product's line from the cart.
pub async fn remove(state: &ClientState, id: i32) -> Result<(), ClientError> {
    state.carts().remove_item(ProductId::new(id)).await?;
    print_current(state);
    Ok(())
}

/// Set a line's quantity; 0 removes the line.
pub async fn update(state: &ClientState, id: i32, quantity: u32) -> Result<(), ClientError> {
    state
        .carts()
        .update_quantity(ProductId::new(id), quantity)
        .await?;
    print_current(state);
    Ok(())
}

/// Delete the cart remotely and locally.
#[allow(clippy::print_stdout)]
pub async fn clear(state: &ClientState) -> Result<(), ClientError> {
    state.carts().delete_cart().await?;
    println!("Cart cleared");
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_current(state: &ClientState) {
    match state.carts().cart() {
        Some(cart) => print_cart(&cart),
        None => println!("No active cart"),
    }
}

#[allow(clippy::print_stdout)]
fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Cart {} is empty", cart.id);
        return;
    }

    println!("Cart {}", cart.id);
    for line in &cart.items {
        println!(
            "  {:>3} x {:<40} @ {:>8}  = {:>8}",
            line.quantity,
            line.product_name,
            format_money(line.price),
            format_money(line.line_total()),
        );
    }
    println!("  Subtotal: {}", format_money(cart.subtotal()));
}

pub(crate) fn format_money(amount: Decimal) -> String {
    format!("${amount:.2}")
}
