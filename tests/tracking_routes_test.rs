// ABOUTME: Integration tests for exercise, body weight, goals, projections, and suggested goals
// ABOUTME: Exercises MET estimation and the intake source fallbacks through the HTTP API
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

const DAY: &str = "2025-06-01";

fn assert_close(actual: &Value, expected: f64) {
    let actual = actual.as_f64().unwrap();
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

async fn log_weight(app: &Router, user: &TestUser, date: &str, weight_kg: f64) -> Value {
    AxumTestRequest::post("/api/weight")
        .bearer(&user.token)
        .json(&json!({"date": date, "weight_kg": weight_kg}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json()
}

async fn complete_profile(app: &Router, user: &TestUser) {
    AxumTestRequest::put("/api/profile")
        .bearer(&user.token)
        .json(&json!({
            "height_cm": 180.0,
            "birth_date": "1985-03-10",
            "sex": "male",
            "activity_level": "lightly_active"
        }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);
}

// ============================================================================
// Exercise
// ============================================================================

#[tokio::test]
async fn test_exercise_estimate_uses_latest_weight() {
    let (app, resources) = create_test_app().await.unwrap();
    let user = create_test_user(&resources, "runner@example.com").await.unwrap();

    // No weight logged: 9.8 MET x 70 kg x 0.5 h
    let fallback: Value = AxumTestRequest::post("/api/exercise")
        .bearer(&user.token)
        .json(&json!({"date": DAY, "activity": "Running", "duration_minutes": 30.0}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(fallback["estimated"], true);
    assert_close(&fallback["calories_burned"], 343.0);

    log_weight(&app, &user, DAY, 80.0).await;
    let weighted: Value = AxumTestRequest::post("/api/exercise")
        .bearer(&user.token)
        .json(&json!({"date": DAY, "activity": "running", "duration_minutes": 30.0}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_close(&weighted["calories_burned"], 392.0);

    let explicit: Value = AxumTestRequest::post("/api/exercise")
        .bearer(&user.token)
        .json(&json!({"date": DAY, "activity": "Rowing", "duration_minutes": 20.0, "calories_burned": 150.0}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(explicit["estimated"], false);

    let listed: Value = AxumTestRequest::get(&format!("/api/exercise?date={DAY}"))
        .bearer(&user.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(listed.as_array().unwrap().len(), 3);

    let id = explicit["id"].as_str().unwrap();
    AxumTestRequest::delete(&format!("/api/exercise/{id}"))
        .bearer(&user.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);
    AxumTestRequest::delete(&format!("/api/exercise/{id}"))
        .bearer(&user.token)
        .send(app)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_exercise_validation() {
    let (app, resources) = create_test_app().await.unwrap();
    let user = create_test_user(&resources, "lazy@example.com").await.unwrap();

    for body in [
        json!({"date": DAY, "activity": " ", "duration_minutes": 30.0}),
        json!({"date": DAY, "activity": "Walking", "duration_minutes": 0.0}),
        json!({"date": DAY, "activity": "Walking", "duration_minutes": 10.0, "calories_burned": -5.0}),
    ] {
        AxumTestRequest::post("/api/exercise")
            .bearer(&user.token)
            .json(&body)
            .send(app.clone())
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    AxumTestRequest::get("/api/exercise?from=2025-06-10&to=2025-06-01")
        .bearer(&user.token)
        .send(app)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

// ============================================================================
// Weight and goals
// ============================================================================

#[tokio::test]
async fn test_weight_is_one_entry_per_day() {
    let (app, resources) = create_test_app().await.unwrap();
    let user = create_test_user(&resources, "scale@example.com").await.unwrap();

    log_weight(&app, &user, DAY, 82.0).await;
    log_weight(&app, &user, DAY, 81.5).await;
    log_weight(&app, &user, "2025-06-03", 81.0).await;

    let weights: Value = AxumTestRequest::get("/api/weight?from=2025-06-01&to=2025-06-30")
        .bearer(&user.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    let weights = weights.as_array().unwrap();
    assert_eq!(weights.len(), 2);
    assert!(weights
        .iter()
        .any(|w| w["date"] == DAY && (w["weight_kg"].as_f64().unwrap() - 81.5).abs() < 1e-9));

    for weight in [0.0, -3.0, 301.0] {
        AxumTestRequest::post("/api/weight")
            .bearer(&user.token)
            .json(&json!({"date": DAY, "weight_kg": weight}))
            .send(app.clone())
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_goals_round_trip_and_validation() {
    let (app, resources) = create_test_app().await.unwrap();
    let user = create_test_user(&resources, "planner@example.com").await.unwrap();

    let empty: Value = AxumTestRequest::get("/api/goals")
        .bearer(&user.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert!(empty["calories"].is_null());

    AxumTestRequest::put("/api/goals")
        .bearer(&user.token)
        .json(&json!({"calories": 1800.0, "protein_g": 120.0, "goal_weight_kg": 75.0}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);

    let stored: Value = AxumTestRequest::get("/api/goals")
        .bearer(&user.token)
        .send(app.clone())
        .await
        .json();
    assert_close(&stored["calories"], 1800.0);
    assert_close(&stored["goal_weight_kg"], 75.0);
    assert!(stored["fiber_g"].is_null());

    AxumTestRequest::put("/api/goals")
        .bearer(&user.token)
        .json(&json!({"calories": -100.0}))
        .send(app)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

// ============================================================================
// Projection and suggestions
// ============================================================================

#[tokio::test]
async fn test_projection_requires_weight_and_profile() {
    let (app, resources) = create_test_app().await.unwrap();
    let user = create_test_user(&resources, "projector@example.com").await.unwrap();

    let no_weight: Value = AxumTestRequest::get("/api/weight/projection")
        .bearer(&user.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert_eq!(no_weight["error"]["code"], "MISSING_REQUIRED_FIELD");

    log_weight(&app, &user, DAY, 80.0).await;
    let no_profile: Value = AxumTestRequest::get("/api/weight/projection")
        .bearer(&user.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert_eq!(no_profile["error"]["code"], "MISSING_REQUIRED_FIELD");

    AxumTestRequest::get("/api/goals/suggested")
        .bearer(&user.token)
        .send(app)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_projection_intake_sources() {
    let (app, resources) = create_test_app().await.unwrap();
    let user = create_test_user(&resources, "forecast@example.com").await.unwrap();
    log_weight(&app, &user, DAY, 80.0).await;
    complete_profile(&app, &user).await;

    let maintenance: Value = AxumTestRequest::get("/api/weight/projection?days=30")
        .bearer(&user.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(maintenance["intake_source"], "maintenance");
    assert_eq!(maintenance["start_date"], DAY);
    assert_eq!(maintenance["points"].as_array().unwrap().len(), 30);
    assert_eq!(maintenance["points"][0]["date"], "2025-06-02");
    assert_close(&maintenance["final_weight_kg"], 80.0);

    AxumTestRequest::put("/api/goals")
        .bearer(&user.token)
        .json(&json!({"calories": 1500.0, "goal_weight_kg": 79.0}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);

    let deficit: Value = AxumTestRequest::get("/api/weight/projection?days=120")
        .bearer(&user.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(deficit["intake_source"], "calorie_goal");
    assert_close(&deficit["daily_intake_kcal"], 1500.0);
    assert!(deficit["final_weight_kg"].as_f64().unwrap() < 80.0);
    assert!(deficit["goal_reached_on"].is_string());

    for uri in [
        "/api/weight/projection?days=0",
        "/api/weight/projection?days=100000",
    ] {
        AxumTestRequest::get(uri)
            .bearer(&user.token)
            .send(app.clone())
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_suggested_goals_follow_goal_kind() {
    let (app, resources) = create_test_app().await.unwrap();
    let user = create_test_user(&resources, "coachless@example.com").await.unwrap();
    log_weight(&app, &user, DAY, 80.0).await;
    complete_profile(&app, &user).await;

    let maintain: Value = AxumTestRequest::get("/api/goals/suggested?goal=maintenance")
        .bearer(&user.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    let lose: Value = AxumTestRequest::get("/api/goals/suggested?goal=weight_loss")
        .bearer(&user.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert!(maintain["bmr"].as_f64().unwrap() < maintain["tdee"].as_f64().unwrap());
    assert!(lose["calories"].as_f64().unwrap() < maintain["calories"].as_f64().unwrap());
    assert!(lose["protein_g"].as_f64().unwrap() > 0.0);
    assert_eq!(lose["activity_level"], "lightly_active");

    AxumTestRequest::get("/api/goals/suggested?goal=bulk_forever")
        .bearer(&user.token)
        .send(app)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
