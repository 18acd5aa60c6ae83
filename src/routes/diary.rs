// ABOUTME: Food diary route handlers for entries and day summaries
// ABOUTME: Entries are listed per date with nutrition; summaries aggregate per meal against goals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use nutrilog_core::errors::AppError;
use tracing::debug;

use crate::auth::AuthenticatedUser;
use crate::resources::ServerResources;
use crate::routes::extract::JsonBody;
use crate::routes::{parse_date, parse_id};
use crate::services::diary::{self, NewDiaryEntry};

/// Diary routes implementation
pub struct DiaryRoutes;

impl DiaryRoutes {
    /// Create all diary routes
    ///
    /// `/api/diary/:key` takes a date for `GET` and an entry id for `DELETE`.
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/diary", post(Self::handle_add_entry))
            .route(
                "/api/diary/:key",
                get(Self::handle_entries_for_date).delete(Self::handle_delete_entry),
            )
            .route("/api/diary/:key/summary", get(Self::handle_day_summary))
            .with_state(resources)
    }

    /// Handle POST /api/diary
    async fn handle_add_entry(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        JsonBody(input): JsonBody<NewDiaryEntry>,
    ) -> Result<Response, AppError> {
        let entry = diary::add_entry(&resources.database, auth.user_id, input).await?;
        debug!(entry_id = %entry.id, date = %entry.date, "Diary entry added");
        Ok((StatusCode::CREATED, Json(entry)).into_response())
    }

    /// Handle GET /api/diary/:date
    async fn handle_entries_for_date(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        Path(date): Path<String>,
    ) -> Result<Response, AppError> {
        let date = parse_date(&date)?;
        let entries = diary::entries_for_date(&resources.database, auth.user_id, date).await?;
        Ok((StatusCode::OK, Json(entries)).into_response())
    }

    /// Handle DELETE /api/diary/:id
    async fn handle_delete_entry(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let id = parse_id(&id, "entry ID")?;
        if !resources.database.diary().delete_entry(auth.user_id, id).await? {
            return Err(AppError::not_found("Diary entry"));
        }
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }

    /// Handle GET /api/diary/:date/summary
    async fn handle_day_summary(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        Path(date): Path<String>,
    ) -> Result<Response, AppError> {
        let date = parse_date(&date)?;
        let summary = diary::day_summary(&resources.database, auth.user_id, date).await?;
        Ok((StatusCode::OK, Json(summary)).into_response())
    }
}
