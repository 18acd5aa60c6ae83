// ABOUTME: Integration tests for friend requests, user discovery, and recipe sharing
// ABOUTME: Covers request lifecycle rules and friend-only visibility over HTTP
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

async fn send_request(app: &Router, sender: &TestUser, receiver: &TestUser) -> String {
    let connection: Value = AxumTestRequest::post("/api/social/friends")
        .bearer(&sender.token)
        .json(&json!({"receiver_id": receiver.id}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(connection["status"], "pending");
    connection["id"].as_str().unwrap().to_owned()
}

async fn friend_count(app: &Router, user: &TestUser) -> u64 {
    let body: Value = AxumTestRequest::get("/api/social/friends")
        .bearer(&user.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    body["total"].as_u64().unwrap()
}

#[tokio::test]
async fn test_request_accept_and_unfriend() {
    let (app, resources) = create_test_app().await.unwrap();
    let alice = create_test_user(&resources, "alice@example.com").await.unwrap();
    let bob = create_test_user(&resources, "bob@example.com").await.unwrap();

    let connection_id = send_request(&app, &alice, &bob).await;

    let pending: Value = AxumTestRequest::get("/api/social/friends/pending")
        .bearer(&bob.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert!(pending["sent"].as_array().unwrap().is_empty());
    assert_eq!(pending["received"][0]["connection_id"], connection_id.as_str());
    assert_eq!(pending["received"][0]["user"]["id"], alice.id.to_string());

    // Only the receiver may answer
    AxumTestRequest::post(&format!("/api/social/friends/{connection_id}/accept"))
        .bearer(&alice.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let accepted: Value = AxumTestRequest::post(&format!("/api/social/friends/{connection_id}/accept"))
        .bearer(&bob.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(accepted["status"], "accepted");
    assert!(accepted["accepted_at"].is_string());

    AxumTestRequest::post(&format!("/api/social/friends/{connection_id}/accept"))
        .bearer(&bob.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    assert_eq!(friend_count(&app, &alice).await, 1);
    assert_eq!(friend_count(&app, &bob).await, 1);

    AxumTestRequest::delete(&format!("/api/social/friends/{connection_id}"))
        .bearer(&alice.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    assert_eq!(friend_count(&app, &bob).await, 0);

    // Unfriending frees the pair for a new request
    send_request(&app, &bob, &alice).await;
}

#[tokio::test]
async fn test_request_rules() {
    let (app, resources) = create_test_app().await.unwrap();
    let carol = create_test_user(&resources, "carol@example.com").await.unwrap();
    let dave = create_test_user(&resources, "dave@example.com").await.unwrap();
    let eve = create_test_user(&resources, "eve@example.com").await.unwrap();

    let to_self: Value = AxumTestRequest::post("/api/social/friends")
        .bearer(&carol.token)
        .json(&json!({"receiver_id": carol.id}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert_eq!(to_self["error"]["code"], "INVALID_INPUT");

    AxumTestRequest::post("/api/social/friends")
        .bearer(&carol.token)
        .json(&json!({"receiver_id": uuid::Uuid::new_v4()}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let connection_id = send_request(&app, &carol, &dave).await;

    // Duplicates in either direction
    for (sender, receiver) in [(&carol, &dave), (&dave, &carol)] {
        AxumTestRequest::post("/api/social/friends")
            .bearer(&sender.token)
            .json(&json!({"receiver_id": receiver.id}))
            .send(app.clone())
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    // Strangers cannot see or touch the connection
    AxumTestRequest::post(&format!("/api/social/friends/{connection_id}/decline"))
        .bearer(&eve.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    AxumTestRequest::delete(&format!("/api/social/friends/{connection_id}"))
        .bearer(&eve.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    AxumTestRequest::post(&format!("/api/social/friends/{connection_id}/decline"))
        .bearer(&dave.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    assert_eq!(friend_count(&app, &carol).await, 0);

    // A declined request still blocks a new one
    AxumTestRequest::post("/api/social/friends")
        .bearer(&carol.token)
        .json(&json!({"receiver_id": dave.id}))
        .send(app)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_shows_email_only_to_friends() {
    let (app, resources) = create_test_app().await.unwrap();
    let searcher = create_test_user(&resources, "finder@example.com").await.unwrap();
    let friend = create_test_user(&resources, "gardener.one@example.com").await.unwrap();
    let stranger = create_test_user(&resources, "gardener.two@example.com").await.unwrap();

    let connection_id = send_request(&app, &searcher, &friend).await;
    AxumTestRequest::post(&format!("/api/social/friends/{connection_id}/accept"))
        .bearer(&friend.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);

    let found: Value = AxumTestRequest::get("/api/social/users/search?q=gardener")
        .bearer(&searcher.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(found["total"], 2);
    let users = found["users"].as_array().unwrap();

    let friend_row = users
        .iter()
        .find(|u| u["user_id"] == friend.id.to_string())
        .unwrap();
    assert_eq!(friend_row["is_friend"], true);
    assert_eq!(friend_row["visible_email"], friend.email.as_str());

    let stranger_row = users
        .iter()
        .find(|u| u["user_id"] == stranger.id.to_string())
        .unwrap();
    assert_eq!(stranger_row["is_friend"], false);
    assert!(stranger_row["visible_email"].is_null());

    // The searcher is never part of their own results
    let own: Value = AxumTestRequest::get("/api/social/users/search?q=finder")
        .bearer(&searcher.token)
        .send(app.clone())
        .await
        .json();
    assert_eq!(own["total"], 0);

    AxumTestRequest::get("/api/social/users/search?q=%20")
        .bearer(&searcher.token)
        .send(app)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_shared_recipes_respect_friendship() {
    let (app, resources) = create_test_app().await.unwrap();
    let owner = create_test_user(&resources, "baker@example.com").await.unwrap();
    let friend = create_test_user(&resources, "taster@example.com").await.unwrap();
    let stranger = create_test_user(&resources, "passerby@example.com").await.unwrap();

    for (name, visibility) in [
        ("Family Bread", "private"),
        ("Club Bread", "friends"),
        ("Open Bread", "public"),
    ] {
        AxumTestRequest::post("/api/recipes")
            .bearer(&owner.token)
            .json(&json!({"name": name, "visibility": visibility}))
            .send(app.clone())
            .await
            .assert_status(StatusCode::CREATED);
    }

    let connection_id = send_request(&app, &friend, &owner).await;
    AxumTestRequest::post(&format!("/api/social/friends/{connection_id}/accept"))
        .bearer(&owner.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);

    let uri = format!("/api/social/users/{}/recipes", owner.id);
    let names = |body: &Value| -> Vec<String> {
        let mut names: Vec<String> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap().to_owned())
            .collect();
        names.sort();
        names
    };

    let as_friend: Value = AxumTestRequest::get(&uri)
        .bearer(&friend.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(names(&as_friend), vec!["Club Bread", "Open Bread"]);

    let as_stranger: Value = AxumTestRequest::get(&uri)
        .bearer(&stranger.token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(names(&as_stranger), vec!["Open Bread"]);

    let as_owner: Value = AxumTestRequest::get(&uri)
        .bearer(&owner.token)
        .send(app.clone())
        .await
        .json();
    assert_eq!(as_owner.as_array().unwrap().len(), 3);

    AxumTestRequest::get(&format!("/api/social/users/{}/recipes", uuid::Uuid::new_v4()))
        .bearer(&friend.token)
        .send(app)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
