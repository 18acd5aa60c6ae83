// ABOUTME: Recipe route handlers for CRUD, ingredients, copying, and labels
// ABOUTME: Ingredient changes respond with the recomputed recipe detail
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use nutrilog_core::errors::{AppError, AppResult};
use nutrilog_core::models::FoodRef;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::labels::{render_label_pdf, render_label_svg, LabelData};
use crate::models::RecipeInput;
use crate::resources::ServerResources;
use crate::routes::extract::JsonBody;
use crate::routes::parse_id;
use crate::services::recipes;

/// Ingredient line submitted by the client
#[derive(Debug, Deserialize)]
pub struct IngredientRequest {
    /// USDA food
    pub fdc_id: Option<i64>,
    /// User-defined food
    pub my_food_id: Option<Uuid>,
    /// Sub-recipe
    pub recipe_id: Option<Uuid>,
    /// Amount in grams
    pub amount_grams: f64,
}

impl IngredientRequest {
    fn food(&self) -> AppResult<FoodRef> {
        FoodRef::from_options(self.fdc_id, self.my_food_id, self.recipe_id)
    }
}

/// Recipe routes implementation
pub struct RecipeRoutes;

impl RecipeRoutes {
    /// Create all recipe routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/recipes",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/recipes/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .route(
                "/api/recipes/:id/ingredients",
                post(Self::handle_add_ingredient),
            )
            .route(
                "/api/recipes/:id/ingredients/:ingredient_id",
                put(Self::handle_update_ingredient).delete(Self::handle_remove_ingredient),
            )
            .route("/api/recipes/:id/copy", post(Self::handle_copy))
            .route("/api/recipes/:id/label.svg", get(Self::handle_label_svg))
            .route("/api/recipes/:id/label.pdf", get(Self::handle_label_pdf))
            .with_state(resources)
    }

    async fn detail_response(
        resources: &ServerResources,
        viewer: Uuid,
        recipe_id: Uuid,
        status: StatusCode,
    ) -> AppResult<Response> {
        let recipe = recipes::load_visible_recipe(&resources.database, viewer, recipe_id).await?;
        let detail = recipes::recipe_detail(&resources.database, recipe).await?;
        Ok((status, Json(detail)).into_response())
    }

    /// Handle GET /api/recipes
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
    ) -> Result<Response, AppError> {
        let list = resources
            .database
            .recipes()
            .list_user_recipes(auth.user_id)
            .await?;
        Ok((StatusCode::OK, Json(list)).into_response())
    }

    /// Handle POST /api/recipes
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        JsonBody(input): JsonBody<RecipeInput>,
    ) -> Result<Response, AppError> {
        let recipe = recipes::create_recipe(&resources.database, auth.user_id, input).await?;
        Self::detail_response(&resources, auth.user_id, recipe.id, StatusCode::CREATED).await
    }

    /// Handle GET /api/recipes/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let id = parse_id(&id, "recipe ID")?;
        Self::detail_response(&resources, auth.user_id, id, StatusCode::OK).await
    }

    /// Handle PUT /api/recipes/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        Path(id): Path<String>,
        JsonBody(input): JsonBody<RecipeInput>,
    ) -> Result<Response, AppError> {
        let id = parse_id(&id, "recipe ID")?;
        recipes::update_recipe(&resources.database, auth.user_id, id, input).await?;
        Self::detail_response(&resources, auth.user_id, id, StatusCode::OK).await
    }

    /// Handle DELETE /api/recipes/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let id = parse_id(&id, "recipe ID")?;
        recipes::delete_recipe(&resources.database, auth.user_id, id).await?;
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }

    /// Handle POST /api/recipes/:id/ingredients
    async fn handle_add_ingredient(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        Path(id): Path<String>,
        JsonBody(request): JsonBody<IngredientRequest>,
    ) -> Result<Response, AppError> {
        let id = parse_id(&id, "recipe ID")?;
        let food = request.food()?;
        recipes::add_ingredient(
            &resources.database,
            auth.user_id,
            id,
            food,
            request.amount_grams,
        )
        .await?;
        Self::detail_response(&resources, auth.user_id, id, StatusCode::CREATED).await
    }

    /// Handle PUT /api/recipes/:id/ingredients/:ingredient_id
    async fn handle_update_ingredient(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        Path((id, ingredient_id)): Path<(String, String)>,
        JsonBody(request): JsonBody<IngredientRequest>,
    ) -> Result<Response, AppError> {
        let id = parse_id(&id, "recipe ID")?;
        let ingredient_id = parse_id(&ingredient_id, "ingredient ID")?;
        let food = request.food()?;
        recipes::update_ingredient(
            &resources.database,
            auth.user_id,
            id,
            ingredient_id,
            food,
            request.amount_grams,
        )
        .await?;
        Self::detail_response(&resources, auth.user_id, id, StatusCode::OK).await
    }

    /// Handle DELETE /api/recipes/:id/ingredients/:ingredient_id
    async fn handle_remove_ingredient(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        Path((id, ingredient_id)): Path<(String, String)>,
    ) -> Result<Response, AppError> {
        let id = parse_id(&id, "recipe ID")?;
        let ingredient_id = parse_id(&ingredient_id, "ingredient ID")?;
        recipes::remove_ingredient(&resources.database, auth.user_id, id, ingredient_id).await?;
        Self::detail_response(&resources, auth.user_id, id, StatusCode::OK).await
    }

    /// Handle POST /api/recipes/:id/copy
    async fn handle_copy(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let id = parse_id(&id, "recipe ID")?;
        let copy = recipes::copy_recipe(&resources.database, auth.user_id, id).await?;
        Self::detail_response(&resources, auth.user_id, copy.id, StatusCode::CREATED).await
    }

    /// Handle GET /api/recipes/:id/label.svg
    async fn handle_label_svg(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let id = parse_id(&id, "recipe ID")?;
        let recipe = recipes::load_visible_recipe(&resources.database, auth.user_id, id).await?;
        let svg = render_label_svg(&LabelData::for_recipe(&recipe));
        Ok((StatusCode::OK, [(CONTENT_TYPE, "image/svg+xml")], svg).into_response())
    }

    /// Handle GET /api/recipes/:id/label.pdf
    async fn handle_label_pdf(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let id = parse_id(&id, "recipe ID")?;
        let recipe = recipes::load_visible_recipe(&resources.database, auth.user_id, id).await?;
        let pdf = render_label_pdf(&LabelData::for_recipe(&recipe), &resources.config.labels).await?;
        Ok((StatusCode::OK, [(CONTENT_TYPE, "application/pdf")], pdf).into_response())
    }
}
