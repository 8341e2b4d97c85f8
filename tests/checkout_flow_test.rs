//! Integration tests for the cart → order checkout transaction.

mod common;

use axum::http::{Method, StatusCode};
use common::{response_json, TestApp};
use coursestack_api::entities::{order, order_item, Course, Order, OrderItem};
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;

fn billing_payload() -> serde_json::Value {
    json!({
        "first_name": "Ada",
        "last_name": "Lovelace",
        "email": "ada@example.com",
        "country": "Portugal"
    })
}

#[tokio::test]
async fn checkout_creates_pending_order_with_captured_prices() {
    let app = TestApp::new().await;
    let (user, token) = app.seed_student().await;
    let first = app.seed_course("Rust Fundamentals", dec!(20.00)).await;
    let second = app.seed_course("SQL Deep Dive", dec!(15.50)).await;

    let cart = &app.state.services.cart;
    cart.add_item(user.id, first.id).await.unwrap();
    cart.add_item(user.id, second.id).await.unwrap();

    let response = app
        .request(
            Method::POST,
            "/api/v1/checkout",
            Some(&token),
            Some(billing_payload()),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["total"], "35.50");
    let order_number = body["data"]["order_number"].as_str().unwrap();
    assert!(order_number.starts_with("ORD-"));

    // Order persisted with the billing details and computed total
    let persisted = Order::find()
        .filter(order::Column::UserId.eq(user.id))
        .one(&*app.state.db)
        .await
        .unwrap()
        .expect("order persisted");
    assert_eq!(persisted.total, dec!(35.50));
    assert_eq!(persisted.status, "pending");
    assert_eq!(persisted.first_name, "Ada");
    assert_eq!(persisted.country, "Portugal");
    assert!(persisted.payment_reference.is_none());

    // One order item per cart line, each with its captured price
    let items = OrderItem::find()
        .filter(order_item::Column::OrderId.eq(persisted.id))
        .all(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(items.len(), 2);
    let mut prices: Vec<_> = items.iter().map(|i| i.unit_price).collect();
    prices.sort();
    assert_eq!(prices, vec![dec!(15.50), dec!(20.00)]);

    // The cart is untouched until payment confirmation
    assert_eq!(cart.items_for_user(user.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn captured_prices_survive_catalog_changes() {
    let app = TestApp::new().await;
    let (user, token) = app.seed_student().await;
    let course = app.seed_course("Rust Fundamentals", dec!(20.00)).await;

    app.state
        .services
        .cart
        .add_item(user.id, course.id)
        .await
        .unwrap();

    let response = app
        .request(
            Method::POST,
            "/api/v1/checkout",
            Some(&token),
            Some(billing_payload()),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Reprice the course after checkout
    let mut active: coursestack_api::entities::course::ActiveModel = course.into();
    active.price = sea_orm::Set(dec!(99.99));
    sea_orm::ActiveModelTrait::update(active, &*app.state.db)
        .await
        .unwrap();

    let item = OrderItem::find().one(&*app.state.db).await.unwrap().unwrap();
    assert_eq!(item.unit_price, dec!(20.00));
}

#[tokio::test]
async fn empty_cart_is_rejected_before_any_write() {
    let app = TestApp::new().await;
    let (_, token) = app.seed_student().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/checkout",
            Some(&token),
            Some(billing_payload()),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("cart is empty"));

    let orders = Order::find().count(&*app.state.db).await.unwrap();
    assert_eq!(orders, 0);
}

#[tokio::test]
async fn failed_price_resolution_rolls_back_everything() {
    let app = TestApp::new().await;
    let (user, token) = app.seed_student().await;
    let kept = app.seed_course("Rust Fundamentals", dec!(20.00)).await;
    let doomed = app.seed_course("Ghost Course", dec!(15.50)).await;

    let cart = &app.state.services.cart;
    cart.add_item(user.id, kept.id).await.unwrap();
    cart.add_item(user.id, doomed.id).await.unwrap();

    // The course disappears between add-to-cart and checkout
    Course::delete_by_id(doomed.id)
        .exec(&*app.state.db)
        .await
        .unwrap();

    let response = app
        .request(
            Method::POST,
            "/api/v1/checkout",
            Some(&token),
            Some(billing_payload()),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Neither the order nor any item was persisted
    assert_eq!(Order::find().count(&*app.state.db).await.unwrap(), 0);
    assert_eq!(OrderItem::find().count(&*app.state.db).await.unwrap(), 0);
}

#[tokio::test]
async fn checkout_requires_authentication() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::POST, "/api/v1/checkout", None, Some(billing_payload()))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalid_billing_payload_is_rejected() {
    let app = TestApp::new().await;
    let (user, token) = app.seed_student().await;
    let course = app.seed_course("Rust Fundamentals", dec!(20.00)).await;
    app.state
        .services
        .cart
        .add_item(user.id, course.id)
        .await
        .unwrap();

    let response = app
        .request(
            Method::POST,
            "/api/v1/checkout",
            Some(&token),
            Some(json!({
                "first_name": "Ada",
                "last_name": "Lovelace",
                "email": "not-an-email",
                "country": "Portugal"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(Order::find().count(&*app.state.db).await.unwrap(), 0);
}
