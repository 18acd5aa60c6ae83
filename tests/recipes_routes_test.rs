// ABOUTME: Integration tests for recipes, ingredient rollups, sharing, and copies
// ABOUTME: Drives the full router with imported sample foods and custom foods
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

fn assert_close(actual: &Value, expected: f64) {
    let actual = actual.as_f64().unwrap();
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

async fn import_chicken(app: &Router, user: &TestUser) {
    AxumTestRequest::post(&format!("/api/foods/import/{CHICKEN}"))
        .bearer(&user.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED);
}

async fn create_oat_bar(app: &Router, user: &TestUser) -> String {
    let food: Value = AxumTestRequest::post("/api/my-foods")
        .bearer(&user.token)
        .json(&json!({
            "name": "Oat Bar",
            "serving_size_g": 50.0,
            "nutrients": {"calories": 400.0, "protein": 10.0, "fat": 13.0}
        }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    food["id"].as_str().unwrap().to_owned()
}

async fn create_recipe(app: &Router, user: &TestUser, body: Value) -> String {
    let recipe: Value = AxumTestRequest::post("/api/recipes")
        .bearer(&user.token)
        .json(&body)
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    recipe["id"].as_str().unwrap().to_owned()
}

async fn add_ingredient(app: &Router, user: &TestUser, recipe_id: &str, body: Value) -> Value {
    AxumTestRequest::post(&format!("/api/recipes/{recipe_id}/ingredients"))
        .bearer(&user.token)
        .json(&body)
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json()
}

async fn befriend(app: &Router, sender: &TestUser, receiver: &TestUser) {
    let request: Value = AxumTestRequest::post("/api/social/friends")
        .bearer(&sender.token)
        .json(&json!({"receiver_id": receiver.id}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    let connection_id = request["id"].as_str().unwrap();
    AxumTestRequest::post(&format!("/api/social/friends/{connection_id}/accept"))
        .bearer(&receiver.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);
}

/// Chicken 200 g (330 kcal) plus oat bar 100 g (400 kcal), two servings
async fn chicken_oat_recipe(app: &Router, user: &TestUser, visibility: &str) -> String {
    import_chicken(app, user).await;
    let oat_bar = create_oat_bar(app, user).await;
    let recipe_id = create_recipe(
        app,
        user,
        json!({"name": "Chicken Oat Bake", "servings": 2, "visibility": visibility}),
    )
    .await;
    add_ingredient(app, user, &recipe_id, json!({"fdc_id": CHICKEN, "amount_grams": 200.0})).await;
    add_ingredient(app, user, &recipe_id, json!({"my_food_id": oat_bar, "amount_grams": 100.0}))
        .await;
    recipe_id
}

// ============================================================================
// Rollups
// ============================================================================

#[tokio::test]
async fn test_ingredient_mutations_recompute_rollup() {
    let (app, resources) = create_test_app().await.unwrap();
    let cook = create_test_user(&resources, "cook@example.com").await.unwrap();
    let recipe_id = chicken_oat_recipe(&app, &cook, "private").await;

    let detail: Value = AxumTestRequest::get(&format!("/api/recipes/{recipe_id}"))
        .bearer(&cook.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(detail["ingredients"].as_array().unwrap().len(), 2);
    assert_eq!(detail["ingredients"][0]["food"]["kind"], "usda");
    assert_close(&detail["total_grams"], 300.0);
    assert_close(&detail["serving_grams"], 150.0);
    assert_close(&detail["per_serving"]["calories"], 365.0);
    assert_close(&detail["nutrients_per_100g"]["calories"], 730.0 / 3.0);

    // Halve the chicken: 165 + 400 kcal over 200 g
    let chicken_line = detail["ingredients"][0]["id"].as_str().unwrap();
    let updated: Value =
        AxumTestRequest::put(&format!("/api/recipes/{recipe_id}/ingredients/{chicken_line}"))
            .bearer(&cook.token)
            .json(&json!({"fdc_id": CHICKEN, "amount_grams": 100.0}))
            .send(app.clone())
            .await
            .assert_status(StatusCode::OK)
            .json();
    assert_close(&updated["total_grams"], 200.0);
    assert_close(&updated["per_serving"]["calories"], 282.5);

    let removed: Value =
        AxumTestRequest::delete(&format!("/api/recipes/{recipe_id}/ingredients/{chicken_line}"))
            .bearer(&cook.token)
            .send(app.clone())
            .await
            .assert_status(StatusCode::OK)
            .json();
    assert_eq!(removed["ingredients"].as_array().unwrap().len(), 1);
    assert_close(&removed["nutrients_per_100g"]["calories"], 400.0);

    AxumTestRequest::delete(&format!("/api/recipes/{recipe_id}/ingredients/{chicken_line}"))
        .bearer(&cook.token)
        .send(app)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_nested_recipe_scales_by_sub_recipe_weight() {
    let (app, resources) = create_test_app().await.unwrap();
    let cook = create_test_user(&resources, "nested@example.com").await.unwrap();
    let inner = chicken_oat_recipe(&app, &cook, "private").await;

    let outer = create_recipe(&app, &cook, json!({"name": "Meal Prep Box"})).await;
    let detail = add_ingredient(
        &app,
        &cook,
        &outer,
        json!({"recipe_id": inner, "amount_grams": 150.0}),
    )
    .await;

    assert_eq!(detail["ingredients"][0]["food"]["kind"], "recipe");
    assert_close(&detail["total_grams"], 150.0);
    assert_close(&detail["per_serving"]["calories"], 365.0);
}

#[tokio::test]
async fn test_ingredient_validation() {
    let (app, resources) = create_test_app().await.unwrap();
    let cook = create_test_user(&resources, "strict@example.com").await.unwrap();
    import_chicken(&app, &cook).await;
    let recipe_id = create_recipe(&app, &cook, json!({"name": "Soup"})).await;

    let self_reference: Value = AxumTestRequest::post(&format!("/api/recipes/{recipe_id}/ingredients"))
        .bearer(&cook.token)
        .json(&json!({"recipe_id": recipe_id, "amount_grams": 100.0}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert_eq!(self_reference["error"]["code"], "INVALID_INPUT");

    for body in [
        json!({"fdc_id": CHICKEN, "amount_grams": 0.0}),
        json!({"fdc_id": CHICKEN, "amount_grams": -5.0}),
        json!({"amount_grams": 10.0}),
        json!({"fdc_id": CHICKEN, "my_food_id": recipe_id, "amount_grams": 10.0}),
    ] {
        AxumTestRequest::post(&format!("/api/recipes/{recipe_id}/ingredients"))
            .bearer(&cook.token)
            .json(&body)
            .send(app.clone())
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    // Not imported
    AxumTestRequest::post(&format!("/api/recipes/{recipe_id}/ingredients"))
        .bearer(&cook.token)
        .json(&json!({"fdc_id": 171_688, "amount_grams": 100.0}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    for body in [json!({"name": "  "}), json!({"name": "Stew", "servings": 0})] {
        AxumTestRequest::post("/api/recipes")
            .bearer(&cook.token)
            .json(&body)
            .send(app.clone())
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_transitive_cycle_is_accepted() {
    let (app, resources) = create_test_app().await.unwrap();
    let cook = create_test_user(&resources, "cycles@example.com").await.unwrap();
    let oat_bar = create_oat_bar(&app, &cook).await;

    let a = create_recipe(&app, &cook, json!({"name": "A"})).await;
    let b = create_recipe(&app, &cook, json!({"name": "B"})).await;
    add_ingredient(&app, &cook, &a, json!({"my_food_id": oat_bar, "amount_grams": 100.0})).await;
    add_ingredient(&app, &cook, &b, json!({"recipe_id": a, "amount_grams": 100.0})).await;
    let detail = add_ingredient(&app, &cook, &a, json!({"recipe_id": b, "amount_grams": 100.0})).await;

    assert_eq!(detail["ingredients"].as_array().unwrap().len(), 2);
    assert!(detail["per_serving"]["calories"].as_f64().unwrap().is_finite());
}

// ============================================================================
// Ownership and sharing
// ============================================================================

#[tokio::test]
async fn test_private_recipe_hidden_from_others() {
    let (app, resources) = create_test_app().await.unwrap();
    let owner = create_test_user(&resources, "chef@example.com").await.unwrap();
    let stranger = create_test_user(&resources, "stranger@example.com").await.unwrap();
    let recipe_id = create_recipe(&app, &owner, json!({"name": "Secret Sauce"})).await;

    for request in [
        AxumTestRequest::get(&format!("/api/recipes/{recipe_id}")),
        AxumTestRequest::post(&format!("/api/recipes/{recipe_id}/copy")),
        AxumTestRequest::get(&format!("/api/recipes/{recipe_id}/label.svg")),
        AxumTestRequest::put(&format!("/api/recipes/{recipe_id}")).json(&json!({"name": "Mine"})),
    ] {
        let body: Value = request
            .bearer(&stranger.token)
            .send(app.clone())
            .await
            .assert_status(StatusCode::NOT_FOUND)
            .json();
        assert_eq!(body["error"]["code"], "RESOURCE_NOT_FOUND");
    }
}

#[tokio::test]
async fn test_friends_visibility_and_copy() {
    let (app, resources) = create_test_app().await.unwrap();
    let owner = create_test_user(&resources, "sharer@example.com").await.unwrap();
    let friend = create_test_user(&resources, "friend@example.com").await.unwrap();
    let recipe_id = chicken_oat_recipe(&app, &owner, "friends").await;

    AxumTestRequest::get(&format!("/api/recipes/{recipe_id}"))
        .bearer(&friend.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    befriend(&app, &owner, &friend).await;

    let seen: Value = AxumTestRequest::get(&format!("/api/recipes/{recipe_id}"))
        .bearer(&friend.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(seen["name"], "Chicken Oat Bake");

    let forbidden: Value = AxumTestRequest::put(&format!("/api/recipes/{recipe_id}"))
        .bearer(&friend.token)
        .json(&json!({"name": "Taken Over"}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::FORBIDDEN)
        .json();
    assert_eq!(forbidden["error"]["code"], "PERMISSION_DENIED");

    AxumTestRequest::delete(&format!("/api/recipes/{recipe_id}"))
        .bearer(&friend.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let copy: Value = AxumTestRequest::post(&format!("/api/recipes/{recipe_id}/copy"))
        .bearer(&friend.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_ne!(copy["id"], seen["id"]);
    assert_eq!(copy["user_id"], friend.id.to_string());
    assert_eq!(copy["visibility"], "private");
    assert_eq!(copy["ingredients"].as_array().unwrap().len(), 2);
    assert_close(&copy["per_serving"]["calories"], 365.0);

    let own: Value = AxumTestRequest::get("/api/recipes")
        .bearer(&friend.token)
        .send(app)
        .await
        .json();
    assert_eq!(own.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_soft_deleted_recipe_disappears() {
    let (app, resources) = create_test_app().await.unwrap();
    let owner = create_test_user(&resources, "tidy@example.com").await.unwrap();
    let recipe_id = create_recipe(&app, &owner, json!({"name": "Old Stew", "visibility": "public"})).await;

    AxumTestRequest::delete(&format!("/api/recipes/{recipe_id}"))
        .bearer(&owner.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    AxumTestRequest::get(&format!("/api/recipes/{recipe_id}"))
        .bearer(&owner.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let listed: Value = AxumTestRequest::get("/api/recipes")
        .bearer(&owner.token)
        .send(app)
        .await
        .json();
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_recipe_update_and_label() {
    let (app, resources) = create_test_app().await.unwrap();
    let cook = create_test_user(&resources, "labels@example.com").await.unwrap();
    let recipe_id = chicken_oat_recipe(&app, &cook, "private").await;

    let updated: Value = AxumTestRequest::put(&format!("/api/recipes/{recipe_id}"))
        .bearer(&cook.token)
        .json(&json!({"name": "Chicken Oat Bake", "servings": 3, "visibility": "public"}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(updated["visibility"], "public");
    assert_close(&updated["serving_grams"], 100.0);

    let response = AxumTestRequest::get(&format!("/api/recipes/{recipe_id}/label.svg"))
        .bearer(&cook.token)
        .send(app)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(response.header("content-type").as_deref(), Some("image/svg+xml"));
    let svg = response.text();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("Nutrition Facts"));
}
