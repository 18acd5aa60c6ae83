// ABOUTME: Integration tests for registration, login, sessions, and account deletion
// ABOUTME: Drives the full router with middleware against an in-memory database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::{create_test_app, create_test_user, TEST_PASSWORD};
use helpers::axum_test::AxumTestRequest;
use nutrilog::routes::auth::LoginResponse;
use serde_json::{json, Value};

// ============================================================================
// Registration and login
// ============================================================================

#[tokio::test]
async fn test_register_issues_session_cookie() {
    let (app, _resources) = create_test_app().await.unwrap();

    let response = AxumTestRequest::post("/api/auth/register")
        .json(&json!({
            "email": "cook@example.com",
            "password": "long-enough-password",
            "display_name": "  Cook  "
        }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED);

    let cookie = response.header("set-cookie").unwrap();
    assert!(cookie.starts_with("session="));
    assert!(cookie.contains("HttpOnly"));
    assert!(!cookie.contains("Secure"));

    let body: LoginResponse = response.json();
    assert_eq!(body.user.email, "cook@example.com");
    assert_eq!(body.user.display_name.as_deref(), Some("Cook"));

    let profile: Value = AxumTestRequest::get("/api/profile")
        .bearer(&body.token)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(profile["user"]["email"], "cook@example.com");
    assert!(profile["age"].is_null());
}

#[tokio::test]
async fn test_register_rejects_bad_input_and_duplicates() {
    let (app, resources) = create_test_app().await.unwrap();
    create_test_user(&resources, "taken@example.com").await.unwrap();

    let short = AxumTestRequest::post("/api/auth/register")
        .json(&json!({"email": "new@example.com", "password": "short"}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    let body: Value = short.json();
    assert_eq!(body["error"]["code"], "INVALID_INPUT");

    AxumTestRequest::post("/api/auth/register")
        .json(&json!({"email": "not-an-email", "password": "long-enough-password"}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    AxumTestRequest::post("/api/auth/register")
        .json(&json!({"email": "taken@example.com", "password": "long-enough-password"}))
        .send(app)
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_with_valid_and_invalid_credentials() {
    let (app, resources) = create_test_app().await.unwrap();
    create_test_user(&resources, "eater@example.com").await.unwrap();

    let ok: LoginResponse = AxumTestRequest::post("/api/auth/login")
        .json(&json!({"email": "eater@example.com", "password": TEST_PASSWORD}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert!(!ok.token.is_empty());

    let wrong_password: Value = AxumTestRequest::post("/api/auth/login")
        .json(&json!({"email": "eater@example.com", "password": "wrong-password"}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .json();
    let unknown_user: Value = AxumTestRequest::post("/api/auth/login")
        .json(&json!({"email": "nobody@example.com", "password": TEST_PASSWORD}))
        .send(app)
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .json();

    // Both failures look identical to the client
    assert_eq!(wrong_password, unknown_user);
}

// ============================================================================
// Session handling
// ============================================================================

#[tokio::test]
async fn test_cookie_session_is_accepted() {
    let (app, resources) = create_test_app().await.unwrap();
    let user = create_test_user(&resources, "cookie@example.com").await.unwrap();

    AxumTestRequest::get("/api/profile")
        .header("cookie", &format!("theme=dark; session={}", user.token))
        .send(app)
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_missing_and_forged_tokens_are_rejected() {
    let (app, _resources) = create_test_app().await.unwrap();

    let missing: Value = AxumTestRequest::get("/api/profile")
        .send(app.clone())
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .json();
    assert_eq!(missing["error"]["code"], "AUTH_REQUIRED");

    AxumTestRequest::get("/api/profile")
        .bearer("not.a.jwt")
        .send(app)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let (app, _resources) = create_test_app().await.unwrap();

    let response = AxumTestRequest::post("/api/auth/logout")
        .send(app)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let cookie = response.header("set-cookie").unwrap();
    assert!(cookie.contains("Max-Age=0"));
}

// ============================================================================
// Profile and account
// ============================================================================

#[tokio::test]
async fn test_update_profile_computes_age() {
    let (app, resources) = create_test_app().await.unwrap();
    let user = create_test_user(&resources, "profile@example.com").await.unwrap();

    let profile: Value = AxumTestRequest::put("/api/profile")
        .bearer(&user.token)
        .json(&json!({
            "display_name": "Pat",
            "height_cm": 170.0,
            "birth_date": "1990-01-01",
            "sex": "female",
            "activity_level": "moderately_active"
        }))
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(profile["user"]["display_name"], "Pat");
    assert_eq!(profile["profile"]["activity_level"], "moderately_active");
    assert!(profile["age"].as_u64().unwrap() >= 35);
}

#[tokio::test]
async fn test_delete_account_revokes_access() {
    let (app, resources) = create_test_app().await.unwrap();
    let user = create_test_user(&resources, "leaving@example.com").await.unwrap();

    AxumTestRequest::delete("/api/account")
        .bearer(&user.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    AxumTestRequest::get("/api/profile")
        .bearer(&user.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    AxumTestRequest::post("/api/auth/login")
        .json(&json!({"email": "leaving@example.com", "password": TEST_PASSWORD}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    // The address is free again
    AxumTestRequest::post("/api/auth/register")
        .json(&json!({"email": "leaving@example.com", "password": "long-enough-password"}))
        .send(app)
        .await
        .assert_status(StatusCode::CREATED);
}

// ============================================================================
// Middleware
// ============================================================================

#[tokio::test]
async fn test_health_and_request_id() {
    let (app, _resources) = create_test_app().await.unwrap();

    let response = AxumTestRequest::get("/health")
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);
    let request_id = response.header("x-request-id").unwrap();
    assert!(request_id.starts_with("req_"));

    let echoed = AxumTestRequest::get("/health")
        .header("x-request-id", "client-supplied")
        .send(app.clone())
        .await;
    assert_eq!(echoed.header("x-request-id").as_deref(), Some("client-supplied"));

    let missing: Value = AxumTestRequest::get("/api/nowhere")
        .send(app)
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .json();
    assert_eq!(missing["error"]["code"], "RESOURCE_NOT_FOUND");
}

#[tokio::test]
async fn test_malformed_input_uses_error_envelope() {
    let (app, resources) = create_test_app().await.unwrap();
    let user = create_test_user(&resources, "sloppy@example.com").await.unwrap();

    let broken: Value = AxumTestRequest::post("/api/auth/register")
        .raw_json("{\"email\": ")
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert_eq!(broken["error"]["code"], "INVALID_INPUT");

    let untyped: Value = AxumTestRequest::post("/api/auth/register")
        .raw_body(r#"{"email": "a@example.com", "password": "long-enough-password"}"#)
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert_eq!(untyped["error"]["code"], "INVALID_INPUT");

    let bad_date: Value = AxumTestRequest::post("/api/diary")
        .bearer(&user.token)
        .json(&json!({"date": "not-a-date", "meal": "lunch", "fdc_id": 1, "amount_grams": 10.0}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert_eq!(bad_date["error"]["code"], "INVALID_INPUT");
    assert!(bad_date["error"]["message"].is_string());

    let bad_query: Value = AxumTestRequest::get("/api/weight/projection?days=abc")
        .bearer(&user.token)
        .send(app)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert_eq!(bad_query["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let (app, _resources) = create_test_app().await.unwrap();
    let padding = "a".repeat(3 * 1024 * 1024);

    let rejected: Value = AxumTestRequest::post("/api/auth/register")
        .raw_json(format!(r#"{{"email": "{padding}", "password": "long-enough-password"}}"#))
        .send(app)
        .await
        .assert_status(StatusCode::PAYLOAD_TOO_LARGE)
        .json();
    assert_eq!(rejected["error"]["code"], "PAYLOAD_TOO_LARGE");
}
