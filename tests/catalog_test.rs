//! Integration tests for the course catalog and enrollment listing.

mod common;

use axum::http::{Method, StatusCode};
use common::{response_json, TestApp};
use coursestack_api::auth::roles;
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn teachers_create_courses_students_cannot() {
    let app = TestApp::new().await;
    let (_, teacher_token) = app.seed_user(roles::TEACHER).await;
    let (_, student_token) = app.seed_student().await;

    let payload = json!({
        "title": "Practical Rust for Backend Engineers",
        "description": "Servers, services and SQL",
        "price": "49.99"
    });

    let response = app
        .request(
            Method::POST,
            "/api/v1/courses",
            Some(&teacher_token),
            Some(payload.clone()),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["data"]["price"], "49.99");

    let response = app
        .request(
            Method::POST,
            "/api/v1/courses",
            Some(&student_token),
            Some(payload),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn negative_price_is_rejected() {
    let app = TestApp::new().await;
    let (_, teacher_token) = app.seed_user(roles::TEACHER).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/courses",
            Some(&teacher_token),
            Some(json!({"title": "Free Money", "price": "-1.00"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn catalog_listing_is_paginated() {
    let app = TestApp::new().await;
    for i in 0..5 {
        app.seed_course(&format!("Course {i}"), dec!(10.00)).await;
    }

    let response = app
        .request(Method::GET, "/api/v1/courses?page=1&per_page=2", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["total"], 5);
    assert_eq!(body["data"]["total_pages"], 3);
}

#[tokio::test]
async fn unknown_course_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/courses/{}", Uuid::new_v4()),
            None,
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn enrollment_listing_is_scoped_to_the_caller() {
    let app = TestApp::new().await;
    let (alice, alice_token) = app.seed_student().await;
    let (_, bob_token) = app.seed_student().await;
    let course = app.seed_course("Rust Fundamentals", dec!(49.99)).await;

    app.state
        .services
        .enrollments
        .enroll_many(&*app.state.db, alice.id, &[course.id])
        .await
        .unwrap();

    let body = response_json(
        app.request(Method::GET, "/api/v1/enrollments", Some(&alice_token), None)
            .await,
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(
        body["data"][0]["course_id"].as_str().unwrap(),
        course.id.to_string()
    );

    let body = response_json(
        app.request(Method::GET, "/api/v1/enrollments", Some(&bob_token), None)
            .await,
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}
