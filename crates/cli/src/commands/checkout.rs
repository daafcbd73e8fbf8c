//! Checkout command: cart to placed order in one run.
//!
//! # Usage
//!
//! ```bash
//! clementine checkout --email jordan@example.com --name "Jordan Blake" \
//!     --line1 "1 Harbor Way" --city Portsmouth --state NH \
//!     --postal-code 03801 --country USA --delivery 2
//! ```
//!
//! The flow mirrors the interactive storefront: gate on a signed-in
//! customer and a non-empty cart, complete the delivery step with the
//! given address and method, then submit from review. Any failure leaves
//! the cart and the cached checkout draft intact for another attempt.

use clap::Args;
use clementine_client::{AuthState, CheckoutError, CheckoutGate, ClientState};
use clementine_core::{
    CurrentUser, DeliveryMethod, DeliveryMethodId, Email, EmailError, Order, OrderTotals,
    ShippingAddress,
};
use thiserror::Error;

use crate::commands::cart::format_money;

#[derive(Debug, Error)]
pub enum CheckoutCliError {
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Unknown delivery method id: {0} (see `clementine delivery`)")]
    UnknownDelivery(i32),

    #[error("Checkout blocked: {0}")]
    Blocked(&'static str),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),
}

#[derive(Args)]
pub struct CheckoutArgs {
    /// Signed-in customer email
    #[arg(long)]
    pub email: String,

    /// Recipient full name
    #[arg(long)]
    pub name: String,

    /// Address line 1
    #[arg(long)]
    pub line1: String,

    /// Address line 2
    #[arg(long)]
    pub line2: Option<String>,

    /// City
    #[arg(long)]
    pub city: String,

    /// State or region
    #[arg(long)]
    pub state: String,

    /// Postal code
    #[arg(long)]
    pub postal_code: String,

    /// Country
    #[arg(long)]
    pub country: String,

    /// Delivery method id (see `clementine delivery`)
    #[arg(long, default_value_t = 1)]
    pub delivery: i32,
}

/// Drive the checkout flow end to end with the given details.
pub async fn run(state: &ClientState, args: CheckoutArgs) -> Result<(), CheckoutCliError> {
    let user = signed_in_user(&args.email, &args.name)?;
    let delivery = DeliveryMethod::by_id(DeliveryMethodId::new(args.delivery))
        .ok_or(CheckoutCliError::UnknownDelivery(args.delivery))?;
    let address = ShippingAddress {
        name: args.name,
        line1: args.line1,
        line2: args.line2,
        city: args.city,
        state: args.state,
        postal_code: args.postal_code,
        country: args.country,
    };

    let mut flow = state.begin_checkout();

    match flow.enter(&AuthState::SignedIn(user)).await {
        CheckoutGate::Ready => {}
        CheckoutGate::EmptyCart => {
            return Err(CheckoutCliError::Blocked("the cart is empty"));
        }
        CheckoutGate::AwaitingAuth | CheckoutGate::RedirectToLogin { .. } => {
            return Err(CheckoutCliError::Blocked("sign-in required"));
        }
    }

    flow.submit_delivery(address, delivery)?;
    if let Some(totals) = flow.totals() {
        print_review(&totals);
    }

    let order = flow.submit_order().await?;
    print_confirmation(&order);
    Ok(())
}

/// Build the signed-in identity the storefront host would normally hold.
fn signed_in_user(email: &str, name: &str) -> Result<CurrentUser, CheckoutCliError> {
    let email = Email::parse(email)?;
    let (first_name, last_name) = match name.split_once(' ') {
        Some((first, rest)) => (first.to_owned(), rest.to_owned()),
        None => (name.to_owned(), String::new()),
    };

    Ok(CurrentUser {
        first_name,
        last_name,
        email,
        address: None,
    })
}

#[allow(clippy::print_stdout)]
fn print_review(totals: &OrderTotals) {
    println!("Subtotal: {}", format_money(totals.subtotal));
    println!("Shipping: {}", format_money(totals.shipping));
    println!("Total:    {}", format_money(totals.total));
}

#[allow(clippy::print_stdout)]
fn print_confirmation(order: &Order) {
    println!("Order {} placed ({})", order.id, order.status);
    println!("  Delivery: {} ({})", order.delivery_method, format_money(order.shipping_price));
    println!("  Total:    {}", format_money(order.total));
}
