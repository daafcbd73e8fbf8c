//! Order creation contract and history lookups.
//!
//! Run with: cargo test -p clementine-integration-tests

use clementine_client::{ApiError, AuthState, CheckoutGate, ClientConfig, ClientState, OrdersApi};
use clementine_core::{
    CurrentUser, DeliveryMethod, DeliveryMethodId, Email, Order, OrderId, Product, ProductId,
    ShippingAddress,
};
use clementine_integration_tests::TestBackend;
use rust_decimal::Decimal;

fn client(backend: &TestBackend, dir: &tempfile::TempDir) -> ClientState {
    let config = ClientConfig::new(backend.api_url(), dir.path().to_path_buf());
    ClientState::new(config).expect("Failed to build client state")
}

fn board(id: i32, price: Decimal) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("Angular Speedster Board {id}"),
        description: "A fast board".to_owned(),
        price,
        picture_url: format!("/images/products/sb-ang{id}.png"),
        product_type: "Boards".to_owned(),
        brand: "Angular".to_owned(),
        quantity_in_stock: 100,
    }
}

fn shipping_address() -> ShippingAddress {
    ShippingAddress {
        name: "Jordan Blake".to_owned(),
        line1: "1 Harbor Way".to_owned(),
        line2: Some("Suite 4".to_owned()),
        city: "Portsmouth".to_owned(),
        state: "NH".to_owned(),
        postal_code: "03801".to_owned(),
        country: "USA".to_owned(),
    }
}

fn signed_in() -> AuthState {
    AuthState::SignedIn(CurrentUser {
        first_name: "Jordan".to_owned(),
        last_name: "Blake".to_owned(),
        email: Email::parse("jordan@example.com").expect("valid email"),
        address: None,
    })
}

/// Stock the cart and drive checkout up to a placed order.
async fn place_order(state: &ClientState, delivery_id: i32) -> Order {
    state
        .carts()
        .add_item(&board(1, Decimal::new(1099, 2)), 2)
        .await
        .expect("add_item");

    let delivery = DeliveryMethod::by_id(DeliveryMethodId::new(delivery_id)).expect("delivery");
    let mut flow = state.begin_checkout();
    assert_eq!(flow.enter(&signed_in()).await, CheckoutGate::Ready);
    flow.submit_delivery(shipping_address(), delivery)
        .expect("delivery step");
    flow.submit_order().await.expect("submit order")
}

// ============================================================================
// Creation Request Contract
// ============================================================================

#[tokio::test]
async fn test_order_request_wire_shape() {
    let backend = TestBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let state = client(&backend, &dir);

    state
        .carts()
        .add_item(&board(1, Decimal::new(1099, 2)), 2)
        .await
        .expect("add_item");
    let cart_id = state.carts().cart().expect("cart").id;

    let mut flow = state.begin_checkout();
    assert_eq!(flow.enter(&signed_in()).await, CheckoutGate::Ready);
    flow.submit_delivery(
        shipping_address(),
        DeliveryMethod::by_id(DeliveryMethodId::new(2)).expect("express"),
    )
    .expect("delivery step");
    flow.submit_order().await.expect("submit order");

    let body = backend.last_order_request().expect("captured request");
    assert_eq!(body["cartId"], cart_id.as_str());
    assert_eq!(body["deliveryMethodId"], 2);
    assert_eq!(body["shippingAddress"]["name"], "Jordan Blake");
    assert_eq!(body["shippingAddress"]["line2"], "Suite 4");
    assert_eq!(body["shippingAddress"]["postalCode"], "03801");

    // No processor integration yet: the placeholder summary goes out.
    assert_eq!(body["paymentSummary"]["last4"], 0);
    assert_eq!(body["paymentSummary"]["brand"], "Pending");
    assert_eq!(body["paymentSummary"]["expMonth"], 0);
    assert_eq!(body["paymentSummary"]["expYear"], 0);

    // And no discount key at all when none applies.
    assert!(body.get("discount").is_none());
}

#[tokio::test]
async fn test_order_totals_follow_delivery_choice() {
    let backend = TestBackend::spawn().await;

    let free_dir = tempfile::tempdir().expect("tempdir");
    let order = place_order(&client(&backend, &free_dir), 1).await;
    assert_eq!(order.shipping_price, Decimal::ZERO);
    assert_eq!(order.total, Decimal::new(2198, 2));
    assert_eq!(order.delivery_method, "Standard");

    let express_dir = tempfile::tempdir().expect("tempdir");
    let order = place_order(&client(&backend, &express_dir), 2).await;
    assert_eq!(order.shipping_price, Decimal::new(999, 2));
    assert_eq!(order.total, Decimal::new(3197, 2));
    assert_eq!(order.delivery_method, "Express");
}

#[tokio::test]
async fn test_teardown_failure_does_not_fail_the_order() {
    let backend = TestBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let state = client(&backend, &dir);

    state
        .carts()
        .add_item(&board(1, Decimal::new(1099, 2)), 1)
        .await
        .expect("add_item");
    let cart_id = state.carts().cart().expect("cart").id;

    let mut flow = state.begin_checkout();
    assert_eq!(flow.enter(&signed_in()).await, CheckoutGate::Ready);
    flow.submit_delivery(shipping_address(), DeliveryMethod::standard())
        .expect("delivery step");

    backend.fail_next_cart_delete();
    let order = flow.submit_order().await.expect("order still placed");

    assert_eq!(order.status, "Pending");
    assert_eq!(backend.orders().len(), 1);
    // The spent cart lingers server-side; that is the backend's problem.
    assert!(backend.cart(cart_id.as_str()).is_some());
}

// ============================================================================
// History Lookups
// ============================================================================

#[tokio::test]
async fn test_order_history_roundtrip() {
    let backend = TestBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let state = client(&backend, &dir);

    let first = place_order(&state, 1).await;
    let second = place_order(&state, 2).await;
    assert_ne!(first.id, second.id);

    let history = state.api().get_orders().await.expect("list orders");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, first.id);
    assert_eq!(history[1].id, second.id);

    let fetched = state.api().get_order(first.id).await.expect("get order");
    assert_eq!(fetched.total, first.total);
    assert_eq!(fetched.order_items.len(), 1);
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
    let backend = TestBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let state = client(&backend, &dir);

    let err = state
        .api()
        .get_order(OrderId::new(999))
        .await
        .expect_err("unknown order");
    assert!(matches!(err, ApiError::NotFound(_)));
}
