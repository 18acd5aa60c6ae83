// ABOUTME: Portion route handlers for listing, creating, and deleting serving sizes
// ABOUTME: The food is selected with exactly one of fdc_id, my_food_id, or recipe_id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use nutrilog_core::errors::AppError;
use nutrilog_core::models::FoodRef;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::resources::ServerResources;
use crate::routes::extract::{JsonBody, QueryParams};
use crate::routes::parse_id;
use crate::services::portions::{self, NewPortion};

/// Food selector for listing portions
#[derive(Debug, Deserialize)]
pub struct PortionQuery {
    /// USDA food
    pub fdc_id: Option<i64>,
    /// User-defined food
    pub my_food_id: Option<Uuid>,
    /// Recipe
    pub recipe_id: Option<Uuid>,
}

/// Portion routes implementation
pub struct PortionRoutes;

impl PortionRoutes {
    /// Create all portion routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/portions",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route("/api/portions/:id", delete(Self::handle_delete))
            .with_state(resources)
    }

    /// Handle GET /api/portions
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        QueryParams(query): QueryParams<PortionQuery>,
    ) -> Result<Response, AppError> {
        let food = FoodRef::from_options(query.fdc_id, query.my_food_id, query.recipe_id)?;
        let list = portions::list_portions(&resources.database, auth.user_id, food).await?;
        Ok((StatusCode::OK, Json(list)).into_response())
    }

    /// Handle POST /api/portions
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        JsonBody(input): JsonBody<NewPortion>,
    ) -> Result<Response, AppError> {
        let portion = portions::create_portion(&resources.database, auth.user_id, input).await?;
        Ok((StatusCode::CREATED, Json(portion)).into_response())
    }

    /// Handle DELETE /api/portions/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let id = parse_id(&id, "portion ID")?;
        portions::delete_portion(&resources.database, auth.user_id, id).await?;
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }
}
