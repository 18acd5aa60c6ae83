// ABOUTME: USDA reference food route handlers
// ABOUTME: Search of imported foods or the live API, food detail with portions, and import by FDC id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use nutrilog_core::constants::limits;
use nutrilog_core::errors::{AppError, AppResult};
use nutrilog_core::models::FoodRef;
use serde::{Deserialize, Serialize};

use crate::auth::AuthenticatedUser;
use crate::external::FoodSearchResult;
use crate::models::{Portion, UsdaFood};
use crate::resources::ServerResources;
use crate::routes::extract::QueryParams;
use crate::services::foods::import_usda_food;

/// Query parameters for food search
#[derive(Debug, Deserialize)]
pub struct FoodSearchQuery {
    /// Description substring
    pub q: String,
    /// Maximum results (1-100)
    pub limit: Option<i64>,
    /// `local` (imported foods, default) or `usda` (live API)
    pub source: Option<String>,
}

/// Search results from either source
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum FoodSearchResponse {
    /// Imported foods with nutrient profiles
    Local {
        /// Matching foods
        foods: Vec<UsdaFood>,
    },
    /// Live API hits, not yet imported
    Usda {
        /// Matching foods
        results: Vec<FoodSearchResult>,
    },
}

/// A USDA food with its portions
#[derive(Debug, Serialize)]
pub struct FoodDetailResponse {
    /// The food
    #[serde(flatten)]
    pub food: UsdaFood,
    /// Known portions
    pub portions: Vec<Portion>,
}

/// Validate a search limit, applying the default
pub(crate) fn search_limit(limit: Option<i64>) -> AppResult<i64> {
    let limit = limit.unwrap_or(limits::DEFAULT_SEARCH_RESULTS);
    if !(1..=limits::MAX_SEARCH_RESULTS).contains(&limit) {
        return Err(AppError::invalid_input(format!(
            "limit must be between 1 and {}",
            limits::MAX_SEARCH_RESULTS
        )));
    }
    Ok(limit)
}

fn parse_fdc_id(value: &str) -> AppResult<i64> {
    value
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::invalid_input("Invalid FDC id"))
}

/// USDA food routes implementation
pub struct FoodRoutes;

impl FoodRoutes {
    /// Create all USDA food routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/foods/search", get(Self::handle_search))
            .route("/api/foods/import/:fdc_id", post(Self::handle_import))
            .route("/api/foods/:fdc_id", get(Self::handle_get_food))
            .with_state(resources)
    }

    /// Handle GET /api/foods/search
    async fn handle_search(
        State(resources): State<Arc<ServerResources>>,
        _auth: AuthenticatedUser,
        QueryParams(query): QueryParams<FoodSearchQuery>,
    ) -> Result<Response, AppError> {
        if query.q.trim().is_empty() {
            return Err(AppError::invalid_input("Search query is required"));
        }
        let limit = search_limit(query.limit)?;

        let response = match query.source.as_deref().unwrap_or("local") {
            "local" => FoodSearchResponse::Local {
                foods: resources
                    .database
                    .foods()
                    .search_usda_foods(&query.q, limit)
                    .await?,
            },
            "usda" => {
                let source = resources.require_food_source()?;
                let page_size = u32::try_from(limit).unwrap_or(25);
                FoodSearchResponse::Usda {
                    results: source.search_foods(query.q.trim(), page_size).await?,
                }
            }
            other => {
                return Err(AppError::invalid_input(format!(
                    "Unknown search source '{other}', expected 'local' or 'usda'"
                )))
            }
        };

        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/foods/:fdc_id
    async fn handle_get_food(
        State(resources): State<Arc<ServerResources>>,
        _auth: AuthenticatedUser,
        Path(fdc_id): Path<String>,
    ) -> Result<Response, AppError> {
        let fdc_id = parse_fdc_id(&fdc_id)?;
        let food = resources
            .database
            .foods()
            .get_usda_food(fdc_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("USDA food {fdc_id}")))?;
        let portions = resources
            .database
            .portions()
            .list_for_food(FoodRef::Usda(fdc_id))
            .await?;

        Ok((StatusCode::OK, Json(FoodDetailResponse { food, portions })).into_response())
    }

    /// Handle POST /api/foods/import/:fdc_id
    async fn handle_import(
        State(resources): State<Arc<ServerResources>>,
        _auth: AuthenticatedUser,
        Path(fdc_id): Path<String>,
    ) -> Result<Response, AppError> {
        let fdc_id = parse_fdc_id(&fdc_id)?;
        let source = resources.require_food_source()?;
        let imported = import_usda_food(&resources.database, source, fdc_id).await?;
        Ok((StatusCode::CREATED, Json(imported)).into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_limit_bounds() {
        assert_eq!(search_limit(None).unwrap(), limits::DEFAULT_SEARCH_RESULTS);
        assert_eq!(search_limit(Some(100)).unwrap(), 100);
        assert!(search_limit(Some(0)).is_err());
        assert!(search_limit(Some(101)).is_err());
    }

    #[test]
    fn test_parse_fdc_id() {
        assert_eq!(parse_fdc_id("171477").unwrap(), 171_477);
        assert!(parse_fdc_id("-1").is_err());
        assert!(parse_fdc_id("apple").is_err());
    }
}
