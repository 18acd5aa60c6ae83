// ABOUTME: Integration tests for diary entries, portion logging, and day summaries
// ABOUTME: Checks per-meal aggregation, remaining targets, and exercise credit over HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use axum::Router;
use common::{create_test_app, create_test_user, TestUser};
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

const CHICKEN: i64 = 171_477;
const DAY: &str = "2025-06-01";

fn assert_close(actual: &Value, expected: f64) {
    let actual = actual.as_f64().unwrap();
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

/// Import chicken and return the id of its "1 cup" (140 g) portion
async fn import_chicken(app: &Router, user: &TestUser) -> String {
    AxumTestRequest::post(&format!("/api/foods/import/{CHICKEN}"))
        .bearer(&user.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED);
    let detail: Value = AxumTestRequest::get(&format!("/api/foods/{CHICKEN}"))
        .bearer(&user.token)
        .send(app.clone())
        .await
        .json();
    detail["portions"][0]["id"].as_str().unwrap().to_owned()
}

async fn log(app: &Router, user: &TestUser, body: Value) -> Value {
    AxumTestRequest::post("/api/diary")
        .bearer(&user.token)
        .json(&body)
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json()
}

#[tokio::test]
async fn test_log_by_grams_and_by_portion() {
    let (app, resources) = create_test_app().await.unwrap();
    let user = create_test_user(&resources, "eater@example.com").await.unwrap();
    let cup = import_chicken(&app, &user).await;

    let by_grams = log(
        &app,
        &user,
        json!({"date": DAY, "meal": "breakfast", "fdc_id": CHICKEN, "amount_grams": 150.0}),
    )
    .await;
    assert_close(&by_grams["amount_grams"], 150.0);
    assert!(by_grams["portion_id"].is_null());
    assert_eq!(by_grams["food"]["kind"], "usda");

    let by_portion = log(
        &app,
        &user,
        json!({"date": DAY, "meal": "lunch", "fdc_id": CHICKEN, "portion_id": cup, "quantity": 2.0}),
    )
    .await;
    assert_close(&by_portion["amount_grams"], 280.0);
    assert_eq!(by_portion["portion_id"], cup.as_str());
    assert_close(&by_portion["quantity"], 2.0);

    let entries: Value = AxumTestRequest::get(&format!("/api/diary/{DAY}"))
        .bearer(&user.token)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    let calories: f64 = entries
        .iter()
        .map(|e| e["nutrients"]["calories"].as_f64().unwrap())
        .sum();
    assert!((calories - 709.5).abs() < 1e-6);
}

#[tokio::test]
async fn test_entry_validation() {
    let (app, resources) = create_test_app().await.unwrap();
    let user = create_test_user(&resources, "careful@example.com").await.unwrap();
    let cup = import_chicken(&app, &user).await;

    let food: Value = AxumTestRequest::post("/api/my-foods")
        .bearer(&user.token)
        .json(&json!({"name": "Toast", "serving_size_g": 30.0, "nutrients": {"calories": 260.0}}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    let toast = food["id"].as_str().unwrap();

    let mismatch: Value = AxumTestRequest::post("/api/diary")
        .bearer(&user.token)
        .json(&json!({"date": DAY, "meal": "snack", "my_food_id": toast, "portion_id": cup, "quantity": 1.0}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert_eq!(mismatch["error"]["code"], "INVALID_INPUT");

    for body in [
        json!({"date": DAY, "meal": "snack", "fdc_id": CHICKEN}),
        json!({"date": DAY, "meal": "snack", "fdc_id": CHICKEN, "amount_grams": 0.0}),
        json!({"date": DAY, "meal": "snack", "fdc_id": CHICKEN, "portion_id": cup}),
        json!({"date": DAY, "meal": "snack", "fdc_id": CHICKEN, "portion_id": cup, "quantity": -1.0}),
        json!({"date": DAY, "meal": "snack", "amount_grams": 10.0}),
        json!({"date": DAY, "meal": "snack", "fdc_id": CHICKEN, "my_food_id": toast, "amount_grams": 10.0}),
    ] {
        AxumTestRequest::post("/api/diary")
            .bearer(&user.token)
            .json(&body)
            .send(app.clone())
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    // Not imported
    AxumTestRequest::post("/api/diary")
        .bearer(&user.token)
        .json(&json!({"date": DAY, "meal": "snack", "fdc_id": 171_688, "amount_grams": 100.0}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    AxumTestRequest::get("/api/diary/yesterday")
        .bearer(&user.token)
        .send(app)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_day_summary_totals_and_remaining() {
    let (app, resources) = create_test_app().await.unwrap();
    let user = create_test_user(&resources, "summary@example.com").await.unwrap();
    let cup = import_chicken(&app, &user).await;

    log(
        &app,
        &user,
        json!({"date": DAY, "meal": "breakfast", "fdc_id": CHICKEN, "amount_grams": 150.0}),
    )
    .await;
    log(
        &app,
        &user,
        json!({"date": DAY, "meal": "dinner", "fdc_id": CHICKEN, "portion_id": cup, "quantity": 2.0}),
    )
    .await;
    // Another day stays out of the summary
    log(
        &app,
        &user,
        json!({"date": "2025-06-02", "meal": "dinner", "fdc_id": CHICKEN, "amount_grams": 500.0}),
    )
    .await;

    AxumTestRequest::put("/api/goals")
        .bearer(&user.token)
        .json(&json!({"calories": 2000.0, "protein_g": 100.0}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);
    AxumTestRequest::post("/api/exercise")
        .bearer(&user.token)
        .json(&json!({"date": DAY, "activity": "Running", "duration_minutes": 30.0, "calories_burned": 300.0}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED);

    let summary: Value = AxumTestRequest::get(&format!("/api/diary/{DAY}/summary"))
        .bearer(&user.token)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();

    let meals = summary["meals"].as_array().unwrap();
    assert_eq!(meals.len(), 2);
    assert_eq!(meals[0]["meal"], "breakfast");
    assert_eq!(meals[0]["entry_count"], 1);
    assert_close(&meals[0]["nutrients"]["calories"], 247.5);
    assert_eq!(meals[1]["meal"], "dinner");
    assert_close(&meals[1]["total_grams"], 280.0);

    assert_close(&summary["total_grams"], 430.0);
    assert_close(&summary["totals"]["calories"], 709.5);
    assert_close(&summary["exercise_calories"], 300.0);
    assert_close(&summary["remaining"]["calories"], 2000.0 - 709.5 + 300.0);
    assert_close(&summary["remaining"]["protein_g"], 100.0 - 31.02 * 4.3);
    assert!(summary["remaining"]["fat_g"].is_null());
    assert!(summary["missing"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_day_summary() {
    let (app, resources) = create_test_app().await.unwrap();
    let user = create_test_user(&resources, "empty@example.com").await.unwrap();

    let summary: Value = AxumTestRequest::get(&format!("/api/diary/{DAY}/summary"))
        .bearer(&user.token)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert!(summary["meals"].as_array().unwrap().is_empty());
    assert_close(&summary["totals"]["calories"], 0.0);
    assert!(summary["remaining"]["calories"].is_null());
}

#[tokio::test]
async fn test_delete_entry_is_owner_scoped() {
    let (app, resources) = create_test_app().await.unwrap();
    let owner = create_test_user(&resources, "diarist@example.com").await.unwrap();
    let other = create_test_user(&resources, "snoop@example.com").await.unwrap();
    import_chicken(&app, &owner).await;

    let entry = log(
        &app,
        &owner,
        json!({"date": DAY, "meal": "other", "fdc_id": CHICKEN, "amount_grams": 100.0}),
    )
    .await;
    let id = entry["id"].as_str().unwrap();

    AxumTestRequest::delete(&format!("/api/diary/{id}"))
        .bearer(&other.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let others_view: Value = AxumTestRequest::get(&format!("/api/diary/{DAY}"))
        .bearer(&other.token)
        .send(app.clone())
        .await
        .json();
    assert!(others_view.as_array().unwrap().is_empty());

    AxumTestRequest::delete(&format!("/api/diary/{id}"))
        .bearer(&owner.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    AxumTestRequest::delete(&format!("/api/diary/{id}"))
        .bearer(&owner.token)
        .send(app)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
