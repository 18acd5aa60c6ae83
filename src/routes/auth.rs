// ABOUTME: Authentication route handlers for registration, login, and logout
// ABOUTME: Issues session tokens in the response body and as an HttpOnly cookie
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Authentication routes

use std::sync::Arc;

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use nutrilog_core::constants::limits;
use nutrilog_core::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::auth::{clear_session_cookie, hash_password, session_cookie, verify_password};
use crate::logging::AppLogger;
use crate::models::User;
use crate::resources::ServerResources;
use crate::routes::extract::JsonBody;

/// User registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Email address
    pub email: String,
    /// Plain-text password
    pub password: String,
    /// Optional display name
    #[serde(default)]
    pub display_name: Option<String>,
}

/// User login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address
    pub email: String,
    /// Plain-text password
    pub password: String,
}

/// User info returned after login or registration
#[derive(Debug, Serialize, Deserialize)]
pub struct UserInfo {
    /// User id
    pub user_id: String,
    /// Email address
    pub email: String,
    /// Display name
    pub display_name: Option<String>,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.to_string(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
        }
    }
}

/// Session issued at login or registration
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Session token, also set as the `session` cookie
    pub token: String,
    /// Expiry as RFC 3339
    pub expires_at: String,
    /// The authenticated user
    pub user: UserInfo,
}

/// Validate email format
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

/// Authentication routes implementation
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/register", post(Self::handle_register))
            .route("/api/auth/login", post(Self::handle_login))
            .route("/api/auth/logout", post(Self::handle_logout))
            .with_state(resources)
    }

    /// Handle POST /api/auth/register
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        JsonBody(request): JsonBody<RegisterRequest>,
    ) -> Result<Response, AppError> {
        if !is_valid_email(&request.email) {
            return Err(AppError::invalid_input("Invalid email format"));
        }
        if request.password.chars().count() < limits::MIN_PASSWORD_LENGTH {
            return Err(AppError::invalid_input(format!(
                "Password must be at least {} characters",
                limits::MIN_PASSWORD_LENGTH
            )));
        }

        let display_name = request
            .display_name
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty());
        let password_hash = hash_password(request.password).await?;
        let user = User::new(&request.email, password_hash, display_name);
        resources.database.users().create_user(&user).await?;
        AppLogger::log_auth_event(&user.id.to_string(), "register", true, None);

        Self::session_response(&resources, &user, StatusCode::CREATED)
    }

    /// Handle POST /api/auth/login
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        JsonBody(request): JsonBody<LoginRequest>,
    ) -> Result<Response, AppError> {
        let invalid = || AppError::auth_invalid("Invalid email or password");

        let user = resources
            .database
            .users()
            .get_user_by_email(&request.email)
            .await?
            .filter(|user| !user.is_deleted())
            .ok_or_else(invalid)?;
        let hash = user.password_hash.clone().ok_or_else(invalid)?;

        if !verify_password(request.password, hash).await? {
            AppLogger::log_auth_event(&user.id.to_string(), "login", false, None);
            return Err(invalid());
        }

        AppLogger::log_auth_event(&user.id.to_string(), "login", true, None);
        Self::session_response(&resources, &user, StatusCode::OK)
    }

    /// Handle POST /api/auth/logout
    async fn handle_logout() -> Response {
        (
            StatusCode::NO_CONTENT,
            [(SET_COOKIE, clear_session_cookie())],
        )
            .into_response()
    }

    fn session_response(
        resources: &ServerResources,
        user: &User,
        status: StatusCode,
    ) -> AppResult<Response> {
        let session = resources.auth_manager.create_session(user)?;
        let cookie = session_cookie(
            &session.token,
            resources.auth_manager.session_max_age_secs(),
            resources.config.environment.is_production(),
        );
        let body = LoginResponse {
            token: session.token,
            expires_at: session.expires_at.to_rfc3339(),
            user: UserInfo::from(user),
        };
        Ok((status, [(SET_COOKIE, cookie)], Json(body)).into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("cook@example.com"));
        assert!(is_valid_email("  cook@example.co.uk "));
        assert!(!is_valid_email("cook"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("cook@localhost"));
        assert!(!is_valid_email("co ok@example.com"));
    }
}
