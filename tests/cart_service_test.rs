mod common;

use common::TestApp;
use coursestack_api::errors::ServiceError;
use rust_decimal_macros::dec;
use uuid::Uuid;

#[tokio::test]
async fn add_and_list_cart_items() {
    let app = TestApp::new().await;
    let (user, _) = app.seed_student().await;
    let rust_course = app.seed_course("Rust Fundamentals", dec!(49.99)).await;
    let sql_course = app.seed_course("SQL Deep Dive", dec!(29.99)).await;

    let cart = &app.state.services.cart;
    cart.add_item(user.id, rust_course.id).await.unwrap();
    cart.add_item(user.id, sql_course.id).await.unwrap();

    let lines = cart.items_for_user(user.id).await.unwrap();
    assert_eq!(lines.len(), 2);
    // Oldest first
    assert_eq!(lines[0].course.id, rust_course.id);
    assert_eq!(lines[0].course.price, dec!(49.99));
    assert_eq!(lines[1].course.title, "SQL Deep Dive");
}

#[tokio::test]
async fn duplicate_add_is_a_conflict() {
    let app = TestApp::new().await;
    let (user, _) = app.seed_student().await;
    let course = app.seed_course("Rust Fundamentals", dec!(49.99)).await;

    let cart = &app.state.services.cart;
    cart.add_item(user.id, course.id).await.unwrap();

    let err = cart.add_item(user.id, course.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    // Only one row survived the conflict
    let lines = cart.items_for_user(user.id).await.unwrap();
    assert_eq!(lines.len(), 1);
}

#[tokio::test]
async fn same_course_in_two_carts_is_fine() {
    let app = TestApp::new().await;
    let (alice, _) = app.seed_student().await;
    let (bob, _) = app.seed_student().await;
    let course = app.seed_course("Rust Fundamentals", dec!(49.99)).await;

    let cart = &app.state.services.cart;
    cart.add_item(alice.id, course.id).await.unwrap();
    cart.add_item(bob.id, course.id).await.unwrap();

    assert_eq!(cart.items_for_user(alice.id).await.unwrap().len(), 1);
    assert_eq!(cart.items_for_user(bob.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn adding_unknown_course_is_not_found() {
    let app = TestApp::new().await;
    let (user, _) = app.seed_student().await;

    let err = app
        .state
        .services
        .cart
        .add_item(user.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn remove_item_scoped_to_owner() {
    let app = TestApp::new().await;
    let (alice, _) = app.seed_student().await;
    let (bob, _) = app.seed_student().await;
    let course = app.seed_course("Rust Fundamentals", dec!(49.99)).await;

    let cart = &app.state.services.cart;
    cart.add_item(alice.id, course.id).await.unwrap();

    // Bob cannot remove Alice's line
    let err = cart.remove_item(bob.id, course.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
    assert_eq!(cart.items_for_user(alice.id).await.unwrap().len(), 1);

    cart.remove_item(alice.id, course.id).await.unwrap();
    assert!(cart.items_for_user(alice.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn clear_removes_every_row_for_the_user() {
    let app = TestApp::new().await;
    let (user, _) = app.seed_student().await;
    let a = app.seed_course("Course A", dec!(10.00)).await;
    let b = app.seed_course("Course B", dec!(20.00)).await;

    let cart = &app.state.services.cart;
    cart.add_item(user.id, a.id).await.unwrap();
    cart.add_item(user.id, b.id).await.unwrap();

    let removed = cart.clear_for_user(&*app.state.db, user.id).await.unwrap();
    assert_eq!(removed, 2);
    assert!(cart.items_for_user(user.id).await.unwrap().is_empty());
}
