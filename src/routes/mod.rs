// ABOUTME: Route module organization for NutriLog HTTP endpoints
// ABOUTME: Per-area routers with thin handlers that delegate to the service layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Route module for the `NutriLog` server
//!
//! Each area exposes `XRoutes::routes(resources)`; [`api_router`] merges them.

/// Registration, login, and logout
pub mod auth;
/// Food diary entries and day summaries
pub mod diary;
/// Body and query extractors with enveloped rejections
pub mod extract;
/// USDA food search, detail, and import
pub mod foods;
/// Liveness endpoint
pub mod health;
/// Custom foods, label scanning, and food labels
pub mod my_foods;
/// Named serving sizes
pub mod portions;
/// Recipes, ingredients, copies, and recipe labels
pub mod recipes;
/// Friends, discovery, and shared recipes
pub mod social;
/// Exercise, weight, goals, and projections
pub mod tracking;
/// Body profile and account deletion
pub mod users;

use std::sync::Arc;

use axum::Router;
use chrono::NaiveDate;
use nutrilog_core::errors::{AppError, AppResult};
use uuid::Uuid;

use crate::resources::ServerResources;

pub use auth::AuthRoutes;
pub use diary::DiaryRoutes;
pub use foods::FoodRoutes;
pub use health::HealthRoutes;
pub use my_foods::MyFoodRoutes;
pub use portions::PortionRoutes;
pub use recipes::RecipeRoutes;
pub use social::SocialRoutes;
pub use tracking::TrackingRoutes;
pub use users::UserRoutes;

/// All API routes with shared state applied
pub fn api_router(resources: &Arc<ServerResources>) -> Router {
    Router::new()
        .merge(HealthRoutes::routes(Arc::clone(resources)))
        .merge(AuthRoutes::routes(Arc::clone(resources)))
        .merge(UserRoutes::routes(Arc::clone(resources)))
        .merge(FoodRoutes::routes(Arc::clone(resources)))
        .merge(MyFoodRoutes::routes(Arc::clone(resources)))
        .merge(RecipeRoutes::routes(Arc::clone(resources)))
        .merge(PortionRoutes::routes(Arc::clone(resources)))
        .merge(DiaryRoutes::routes(Arc::clone(resources)))
        .merge(TrackingRoutes::routes(Arc::clone(resources)))
        .merge(SocialRoutes::routes(Arc::clone(resources)))
}

/// Parse a UUID path segment
pub(crate) fn parse_id(value: &str, what: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| AppError::invalid_input(format!("Invalid {what} format")))
}

/// Parse a `YYYY-MM-DD` path segment or query value
pub(crate) fn parse_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::invalid_input(format!("Invalid date '{value}', expected YYYY-MM-DD")))
}
