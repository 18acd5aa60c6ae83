// ABOUTME: Body profile and account route handlers
// ABOUTME: Profile read and update plus account anonymization
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use chrono::Utc;
use nutrilog_core::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::{clear_session_cookie, AuthenticatedUser};
use crate::models::{BodyProfile, User};
use crate::resources::ServerResources;
use crate::routes::auth::UserInfo;
use crate::routes::extract::JsonBody;

/// Profile update request
#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    /// New display name; omitted keeps the current one
    #[serde(default)]
    pub display_name: Option<String>,
    /// Body measurements
    #[serde(flatten)]
    pub profile: BodyProfile,
}

/// Account and body profile
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    /// Account details
    pub user: UserInfo,
    /// Body measurements
    pub profile: BodyProfile,
    /// Age today, when the birth date is known
    pub age: Option<u32>,
}

/// User profile routes implementation
pub struct UserRoutes;

impl UserRoutes {
    /// Create profile and account routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/profile",
                get(Self::handle_get_profile).put(Self::handle_update_profile),
            )
            .route("/api/account", delete(Self::handle_delete_account))
            .with_state(resources)
    }

    async fn load_user(resources: &ServerResources, user_id: Uuid) -> AppResult<User> {
        resources
            .database
            .users()
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }

    async fn profile_response(resources: &ServerResources, user_id: Uuid) -> AppResult<ProfileResponse> {
        let user = Self::load_user(resources, user_id).await?;
        let profile = resources.database.users().get_profile(user_id).await?;
        Ok(ProfileResponse {
            user: UserInfo::from(&user),
            age: profile.age_on(Utc::now().date_naive()),
            profile,
        })
    }

    /// Handle GET /api/profile
    async fn handle_get_profile(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
    ) -> Result<Response, AppError> {
        let response = Self::profile_response(&resources, auth.user_id).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle PUT /api/profile
    async fn handle_update_profile(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        JsonBody(update): JsonBody<ProfileUpdate>,
    ) -> Result<Response, AppError> {
        update.profile.validate(Utc::now().date_naive())?;
        let users = resources.database.users();

        if let Some(name) = update.display_name {
            let name = name.trim();
            users
                .update_display_name(auth.user_id, (!name.is_empty()).then_some(name))
                .await?;
        }
        users.upsert_profile(auth.user_id, &update.profile).await?;

        let response = Self::profile_response(&resources, auth.user_id).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle DELETE /api/account
    async fn handle_delete_account(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
    ) -> Result<Response, AppError> {
        resources.database.users().anonymize_user(auth.user_id).await?;
        info!(user_id = %auth.user_id, "Account anonymized");
        Ok((
            StatusCode::NO_CONTENT,
            [(SET_COOKIE, clear_session_cookie())],
        )
            .into_response())
    }
}
