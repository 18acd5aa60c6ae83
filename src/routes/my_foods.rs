// ABOUTME: Custom food route handlers including label scanning and label rendering
// ABOUTME: CRUD over the caller's own foods; scanned labels produce unsaved drafts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use nutrilog_core::errors::AppError;
use nutrilog_core::models::{NutrientKind, NutrientProfile};
use nutrilog_intelligence::extract_label_fields;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthenticatedUser;
use crate::labels::{render_label_pdf, render_label_svg, LabelData};
use crate::models::{MyFood, MyFoodInput};
use crate::resources::ServerResources;
use crate::routes::extract::JsonBody;
use crate::routes::parse_id;
use crate::services::foods::load_owned_my_food;

/// OCR text submitted for scanning
#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    /// Raw text of a Nutrition Facts panel
    pub text: String,
    /// Name for the draft
    #[serde(default)]
    pub name: Option<String>,
    /// Serving size to use when the label text has none
    #[serde(default)]
    pub serving_size_g: Option<f64>,
}

/// Unsaved food built from a scanned label
#[derive(Debug, Serialize)]
pub struct ScanResponse {
    /// Draft ready to submit to `POST /api/my-foods`
    pub draft: MyFoodInput,
    /// Values per serving as read from the label
    pub per_serving: NutrientProfile,
    /// Nutrients read from the text
    pub found: Vec<NutrientKind>,
    /// Fields that were not found
    pub not_found: Vec<String>,
}

/// Custom food routes implementation
pub struct MyFoodRoutes;

impl MyFoodRoutes {
    /// Create all custom food routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/my-foods",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route("/api/my-foods/scan", post(Self::handle_scan))
            .route(
                "/api/my-foods/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .route("/api/my-foods/:id/label.svg", get(Self::handle_label_svg))
            .route("/api/my-foods/:id/label.pdf", get(Self::handle_label_pdf))
            .with_state(resources)
    }

    /// Handle GET /api/my-foods
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
    ) -> Result<Response, AppError> {
        let foods = resources.database.foods().list_my_foods(auth.user_id).await?;
        Ok((StatusCode::OK, Json(foods)).into_response())
    }

    /// Handle POST /api/my-foods
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        JsonBody(input): JsonBody<MyFoodInput>,
    ) -> Result<Response, AppError> {
        input.validate()?;
        let food = MyFood::from_input(auth.user_id, input);
        resources.database.foods().create_my_food(&food).await?;
        info!(food_id = %food.id, user_id = %auth.user_id, "Custom food created");
        Ok((StatusCode::CREATED, Json(food)).into_response())
    }

    /// Handle GET /api/my-foods/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let id = parse_id(&id, "food ID")?;
        let food = load_owned_my_food(&resources.database, auth.user_id, id).await?;
        Ok((StatusCode::OK, Json(food)).into_response())
    }

    /// Handle PUT /api/my-foods/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        Path(id): Path<String>,
        JsonBody(input): JsonBody<MyFoodInput>,
    ) -> Result<Response, AppError> {
        let id = parse_id(&id, "food ID")?;
        input.validate()?;
        load_owned_my_food(&resources.database, auth.user_id, id).await?;
        resources.database.foods().update_my_food(id, &input).await?;

        let food = load_owned_my_food(&resources.database, auth.user_id, id).await?;
        Ok((StatusCode::OK, Json(food)).into_response())
    }

    /// Handle DELETE /api/my-foods/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let id = parse_id(&id, "food ID")?;
        load_owned_my_food(&resources.database, auth.user_id, id).await?;
        resources.database.foods().soft_delete_my_food(id).await?;
        info!(food_id = %id, "Custom food deleted");
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }

    /// Handle POST /api/my-foods/scan
    async fn handle_scan(
        _auth: AuthenticatedUser,
        JsonBody(request): JsonBody<ScanRequest>,
    ) -> Result<Response, AppError> {
        if request.text.trim().is_empty() {
            return Err(AppError::invalid_input("Label text is required"));
        }
        let mut scan = extract_label_fields(&request.text);
        if scan.serving_size_g.is_none() {
            scan.serving_size_g = request.serving_size_g.filter(|g| g.is_finite() && *g > 0.0);
        }
        let nutrients = scan.per_100g()?;
        let serving_size_g = scan.serving_size_g.unwrap_or_default();

        let response = ScanResponse {
            draft: MyFoodInput {
                name: request
                    .name
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| format!("Scanned food {}", Utc::now().format("%Y-%m-%d"))),
                brand: None,
                serving_size_g,
                nutrients,
            },
            per_serving: scan.per_serving,
            found: scan.found,
            not_found: scan.not_found,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/my-foods/:id/label.svg
    async fn handle_label_svg(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let id = parse_id(&id, "food ID")?;
        let food = load_owned_my_food(&resources.database, auth.user_id, id).await?;
        let svg = render_label_svg(&LabelData::for_my_food(&food));
        Ok((StatusCode::OK, [(CONTENT_TYPE, "image/svg+xml")], svg).into_response())
    }

    /// Handle GET /api/my-foods/:id/label.pdf
    async fn handle_label_pdf(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let id = parse_id(&id, "food ID")?;
        let food = load_owned_my_food(&resources.database, auth.user_id, id).await?;
        let pdf = render_label_pdf(&LabelData::for_my_food(&food), &resources.config.labels).await?;
        Ok((StatusCode::OK, [(CONTENT_TYPE, "application/pdf")], pdf).into_response())
    }
}
