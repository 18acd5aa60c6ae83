// ABOUTME: Exercise, weight, and goal route handlers
// ABOUTME: Includes the weight projection and suggested goal endpoints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use chrono::{Duration, NaiveDate, Utc};
use nutrilog_core::constants::limits;
use nutrilog_core::errors::{AppError, AppResult};
use nutrilog_core::models::GoalKind;
use serde::Deserialize;

use crate::auth::AuthenticatedUser;
use crate::models::NutritionGoals;
use crate::resources::ServerResources;
use crate::routes::extract::{JsonBody, QueryParams};
use crate::routes::parse_id;
use crate::services::tracking::{self, NewExerciseEntry};

/// Days covered by a list request without explicit bounds
const DEFAULT_RANGE_DAYS: i64 = 30;

/// Date range for list endpoints
///
/// `date` selects a single day; otherwise `from`/`to` default to the last 30 days.
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    /// Single day
    pub date: Option<NaiveDate>,
    /// First day, inclusive
    pub from: Option<NaiveDate>,
    /// Last day, inclusive
    pub to: Option<NaiveDate>,
}

impl RangeQuery {
    /// Resolve to inclusive bounds
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` when `from` is after `to`
    pub fn bounds(&self, today: NaiveDate) -> AppResult<(NaiveDate, NaiveDate)> {
        if let Some(date) = self.date {
            return Ok((date, date));
        }
        let to = self.to.unwrap_or(today);
        let from = self.from.unwrap_or(to - Duration::days(DEFAULT_RANGE_DAYS - 1));
        if from > to {
            return Err(AppError::invalid_input("'from' must not be after 'to'"));
        }
        Ok((from, to))
    }
}

/// Weight log request
#[derive(Debug, Deserialize)]
pub struct LogWeightRequest {
    /// Date of the measurement; defaults to today
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Body weight (kg)
    pub weight_kg: f64,
}

/// Projection query parameters
#[derive(Debug, Deserialize)]
pub struct ProjectionQuery {
    /// Days to project
    pub days: Option<u32>,
    /// Stop when this weight is reached
    pub goal_weight_kg: Option<f64>,
}

/// Suggested goals query parameters
#[derive(Debug, Deserialize)]
pub struct SuggestedGoalsQuery {
    /// `weight_loss`, `maintenance`, or `muscle_gain`
    pub goal: Option<String>,
}

/// Tracking routes implementation
pub struct TrackingRoutes;

impl TrackingRoutes {
    /// Create exercise, weight, and goal routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/exercise",
                get(Self::handle_list_exercise).post(Self::handle_log_exercise),
            )
            .route("/api/exercise/:id", delete(Self::handle_delete_exercise))
            .route(
                "/api/weight",
                get(Self::handle_list_weights).post(Self::handle_log_weight),
            )
            .route("/api/weight/projection", get(Self::handle_projection))
            .route(
                "/api/goals",
                get(Self::handle_get_goals).put(Self::handle_set_goals),
            )
            .route("/api/goals/suggested", get(Self::handle_suggested_goals))
            .with_state(resources)
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    /// Handle GET /api/exercise
    async fn handle_list_exercise(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        QueryParams(range): QueryParams<RangeQuery>,
    ) -> Result<Response, AppError> {
        let (from, to) = range.bounds(Self::today())?;
        let entries = resources
            .database
            .exercise()
            .list_range(auth.user_id, from, to)
            .await?;
        Ok((StatusCode::OK, Json(entries)).into_response())
    }

    /// Handle POST /api/exercise
    async fn handle_log_exercise(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        JsonBody(input): JsonBody<NewExerciseEntry>,
    ) -> Result<Response, AppError> {
        let entry = tracking::log_exercise(&resources.database, auth.user_id, input).await?;
        Ok((StatusCode::CREATED, Json(entry)).into_response())
    }

    /// Handle DELETE /api/exercise/:id
    async fn handle_delete_exercise(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let id = parse_id(&id, "exercise ID")?;
        if !resources.database.exercise().delete_entry(auth.user_id, id).await? {
            return Err(AppError::not_found("Exercise entry"));
        }
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }

    /// Handle GET /api/weight
    async fn handle_list_weights(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        QueryParams(range): QueryParams<RangeQuery>,
    ) -> Result<Response, AppError> {
        let (from, to) = range.bounds(Self::today())?;
        let weights = resources
            .database
            .tracking()
            .list_weights(auth.user_id, from, to)
            .await?;
        Ok((StatusCode::OK, Json(weights)).into_response())
    }

    /// Handle POST /api/weight
    async fn handle_log_weight(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        JsonBody(request): JsonBody<LogWeightRequest>,
    ) -> Result<Response, AppError> {
        let date = request.date.unwrap_or_else(Self::today);
        let entry = resources
            .database
            .tracking()
            .upsert_weight(auth.user_id, date, request.weight_kg)
            .await?;
        Ok((StatusCode::CREATED, Json(entry)).into_response())
    }

    /// Handle GET /api/weight/projection
    async fn handle_projection(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        QueryParams(query): QueryParams<ProjectionQuery>,
    ) -> Result<Response, AppError> {
        if query.days.is_some_and(|d| d == 0 || d > limits::MAX_PROJECTION_DAYS) {
            return Err(AppError::invalid_input(format!(
                "days must be between 1 and {}",
                limits::MAX_PROJECTION_DAYS
            )));
        }
        let report = tracking::weight_projection(
            &resources.database,
            &resources.nutrition_config,
            auth.user_id,
            Self::today(),
            query.days,
            query.goal_weight_kg,
        )
        .await?;
        Ok((StatusCode::OK, Json(report)).into_response())
    }

    /// Handle GET /api/goals
    async fn handle_get_goals(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
    ) -> Result<Response, AppError> {
        let goals = resources.database.tracking().get_goals(auth.user_id).await?;
        Ok((StatusCode::OK, Json(goals)).into_response())
    }

    /// Handle PUT /api/goals
    async fn handle_set_goals(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        JsonBody(goals): JsonBody<NutritionGoals>,
    ) -> Result<Response, AppError> {
        resources
            .database
            .tracking()
            .set_goals(auth.user_id, &goals)
            .await?;
        Ok((StatusCode::OK, Json(goals)).into_response())
    }

    /// Handle GET /api/goals/suggested
    async fn handle_suggested_goals(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        QueryParams(query): QueryParams<SuggestedGoalsQuery>,
    ) -> Result<Response, AppError> {
        let goal: GoalKind = match query.goal.as_deref() {
            Some(value) => value.parse()?,
            None => GoalKind::default(),
        };
        let needs = tracking::suggested_goals(
            &resources.database,
            &resources.nutrition_config,
            auth.user_id,
            Self::today(),
            goal,
        )
        .await?;
        Ok((StatusCode::OK, Json(needs)).into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    #[test]
    fn test_range_defaults_to_last_thirty_days() {
        let (from, to) = RangeQuery::default().bounds(day(30)).unwrap();
        assert_eq!(to, day(30));
        assert_eq!(from, day(1));
    }

    #[test]
    fn test_single_date_and_inverted_range() {
        let single = RangeQuery {
            date: Some(day(5)),
            ..RangeQuery::default()
        };
        assert_eq!(single.bounds(day(30)).unwrap(), (day(5), day(5)));

        let inverted = RangeQuery {
            date: None,
            from: Some(day(10)),
            to: Some(day(2)),
        };
        assert!(inverted.bounds(day(30)).is_err());
    }
}
