// ABOUTME: Route handlers for friends, user discovery, and shared recipes
// ABOUTME: Friend connections gate which recipes another user can read
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Social routes
//!
//! All endpoints require an authenticated session.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::Utc;
use nutrilog_core::errors::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::models::{FriendConnection, FriendInfo};
use crate::resources::ServerResources;
use crate::routes::extract::{JsonBody, QueryParams};
use crate::routes::foods::search_limit;
use crate::routes::parse_id;
use crate::services::recipes::shared_recipes;
use crate::services::social::{self, EnrichedUserResult};

// ============================================================================
// Request and Response Types
// ============================================================================

/// Request to send a friend request
#[derive(Debug, Deserialize)]
pub struct SendFriendRequestBody {
    /// Target user ID
    pub receiver_id: Uuid,
}

/// Query parameters for searching users
#[derive(Debug, Deserialize)]
pub struct SearchUsersQuery {
    /// Email or display name substring
    pub q: String,
    /// Maximum results
    pub limit: Option<i64>,
}

/// Response metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct SocialMetadata {
    /// Response timestamp
    pub timestamp: String,
}

/// Response for listing friends
#[derive(Debug, Serialize)]
pub struct ListFriendsResponse {
    /// Accepted connections
    pub friends: Vec<FriendInfo>,
    /// Total count
    pub total: usize,
    /// Metadata
    pub metadata: SocialMetadata,
}

/// Response for pending friend requests
#[derive(Debug, Serialize)]
pub struct PendingRequestsResponse {
    /// Requests sent by the user
    pub sent: Vec<FriendInfo>,
    /// Requests received by the user
    pub received: Vec<FriendInfo>,
    /// Metadata
    pub metadata: SocialMetadata,
}

/// Response for user search
#[derive(Debug, Serialize)]
pub struct SearchUsersResponse {
    /// Matching users
    pub users: Vec<EnrichedUserResult>,
    /// Total count
    pub total: usize,
}

/// Social routes implementation
pub struct SocialRoutes;

impl SocialRoutes {
    /// Create all social routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            // Friend connections
            .route(
                "/api/social/friends",
                get(Self::handle_list_friends).post(Self::handle_send_request),
            )
            .route(
                "/api/social/friends/pending",
                get(Self::handle_pending_requests),
            )
            .route(
                "/api/social/friends/:id/accept",
                post(Self::handle_accept_request),
            )
            .route(
                "/api/social/friends/:id/decline",
                post(Self::handle_decline_request),
            )
            .route("/api/social/friends/:id", delete(Self::handle_unfriend))
            // Discovery and sharing
            .route("/api/social/users/search", get(Self::handle_search_users))
            .route(
                "/api/social/users/:id/recipes",
                get(Self::handle_shared_recipes),
            )
            .with_state(resources)
    }

    fn build_metadata() -> SocialMetadata {
        SocialMetadata {
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// Handle GET /api/social/friends
    async fn handle_list_friends(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
    ) -> Result<Response, AppError> {
        let friends = resources.database.social().get_friends(auth.user_id).await?;
        let response = ListFriendsResponse {
            total: friends.len(),
            friends,
            metadata: Self::build_metadata(),
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/social/friends
    async fn handle_send_request(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        JsonBody(body): JsonBody<SendFriendRequestBody>,
    ) -> Result<Response, AppError> {
        let connection: FriendConnection = social::create_friend_request(
            &resources.database.social(),
            &resources.database.users(),
            auth.user_id,
            body.receiver_id,
        )
        .await?;
        Ok((StatusCode::CREATED, Json(connection)).into_response())
    }

    /// Handle GET /api/social/friends/pending
    async fn handle_pending_requests(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
    ) -> Result<Response, AppError> {
        let pending = social::pending_requests(&resources.database.social(), auth.user_id).await?;
        let response = PendingRequestsResponse {
            sent: pending.sent,
            received: pending.received,
            metadata: Self::build_metadata(),
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/social/friends/:id/accept
    async fn handle_accept_request(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let connection_id = parse_id(&id, "connection ID")?;
        let connection = social::respond_to_request(
            &resources.database.social(),
            auth.user_id,
            connection_id,
            true,
        )
        .await?;
        Ok((StatusCode::OK, Json(connection)).into_response())
    }

    /// Handle POST /api/social/friends/:id/decline
    async fn handle_decline_request(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let connection_id = parse_id(&id, "connection ID")?;
        social::respond_to_request(
            &resources.database.social(),
            auth.user_id,
            connection_id,
            false,
        )
        .await?;
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }

    /// Handle DELETE /api/social/friends/:id
    async fn handle_unfriend(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let connection_id = parse_id(&id, "connection ID")?;
        social::remove_friend(&resources.database.social(), auth.user_id, connection_id).await?;
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }

    /// Handle GET /api/social/users/search
    async fn handle_search_users(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        QueryParams(query): QueryParams<SearchUsersQuery>,
    ) -> Result<Response, AppError> {
        let limit = search_limit(query.limit)?;
        let users = social::search_users_with_status(
            &resources.database.social(),
            &resources.database.users(),
            auth.user_id,
            &query.q,
            limit,
        )
        .await?;
        let response = SearchUsersResponse {
            total: users.len(),
            users,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/social/users/:id/recipes
    async fn handle_shared_recipes(
        State(resources): State<Arc<ServerResources>>,
        auth: AuthenticatedUser,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let owner_id = parse_id(&id, "user ID")?;
        let recipes = shared_recipes(&resources.database, auth.user_id, owner_id).await?;
        Ok((StatusCode::OK, Json(recipes)).into_response())
    }
}
