// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides in-memory resources, user creation, and session helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `nutrilog`

use std::env;
use std::sync::{Arc, Once};

use anyhow::Result;
use axum::Router;
use nutrilog::{
    auth::hash_password,
    config::ServerConfig,
    database::Database,
    external::{FoodDataSource, MockUsdaClient},
    models::User,
    resources::ServerResources,
    server::build_router,
};
use tracing::Level;
use uuid::Uuid;

/// Password used for every test account
pub const TEST_PASSWORD: &str = "correct-horse-battery";

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard in-memory database
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    Database::new("sqlite::memory:").await
}

/// Resources backed by an in-memory database and the offline USDA sample set
pub async fn create_test_server_resources() -> Result<Arc<ServerResources>> {
    let database = create_test_database().await?;
    let source: Arc<dyn FoodDataSource> = Arc::new(MockUsdaClient::new());
    Ok(Arc::new(ServerResources::new(
        database,
        Arc::new(ServerConfig::for_testing()),
        Some(source),
    )))
}

/// Full router with middleware, as served by the binary
pub async fn create_test_app() -> Result<(Router, Arc<ServerResources>)> {
    let resources = create_test_server_resources().await?;
    Ok((build_router(&resources), resources))
}

/// A registered user with a live session token
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

/// Create a user directly in the database and issue a session token
pub async fn create_test_user(resources: &ServerResources, email: &str) -> Result<TestUser> {
    let hash = hash_password(TEST_PASSWORD.to_owned()).await?;
    let user = User::new(email, hash, Some(email.split('@').next().unwrap_or(email).to_owned()));
    resources.database.users().create_user(&user).await?;
    let session = resources.auth_manager.create_session(&user)?;
    Ok(TestUser {
        id: user.id,
        email: user.email,
        token: session.token,
    })
}
