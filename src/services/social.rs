// ABOUTME: Friend request validation and user discovery for recipe sharing
// ABOUTME: Extracts friend-request rules and search enrichment from route handlers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use nutrilog_core::errors::{AppError, AppResult};
use nutrilog_core::models::FriendStatus;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::database::{SocialManager, UserManager};
use crate::models::{FriendConnection, PendingRequests};

/// A search result enriched with friend-status information
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedUserResult {
    /// User ID
    pub user_id: Uuid,
    /// Display name if set
    pub display_name: Option<String>,
    /// Email visible only to connected friends
    pub visible_email: Option<String>,
    /// Whether the searcher and this user are connected friends
    pub is_friend: bool,
    /// Whether there is a pending friend request
    pub has_pending_request: bool,
}

/// Validate and create a friend connection request.
///
/// Enforces business rules:
/// - Cannot send request to yourself
/// - Receiver must be an active account
/// - Cannot create duplicate connections in either direction
/// - Creates connection in Pending status
///
/// # Errors
///
/// Returns `INVALID_INPUT` for self-requests and duplicates, `RESOURCE_NOT_FOUND` for unknown receivers
pub async fn create_friend_request(
    social: &SocialManager,
    users: &UserManager,
    sender_id: Uuid,
    receiver_id: Uuid,
) -> AppResult<FriendConnection> {
    if sender_id == receiver_id {
        return Err(AppError::invalid_input(
            "Cannot send friend request to yourself",
        ));
    }

    users
        .get_user(receiver_id)
        .await?
        .filter(|u| !u.is_deleted())
        .ok_or_else(|| AppError::not_found("User"))?;

    let existing = social
        .get_friend_connection_between(sender_id, receiver_id)
        .await?;
    if existing.is_some() {
        return Err(AppError::invalid_input(
            "Friend connection already exists between these users",
        ));
    }

    let connection = FriendConnection::new(sender_id, receiver_id);
    social.create_friend_connection(&connection).await?;
    info!(connection_id = %connection.id, "Friend request sent");

    Ok(connection)
}

/// Accept or decline a pending request addressed to `user_id`
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` for unknown connections, `PERMISSION_DENIED` when the
/// caller is not the receiver, and `INVALID_INPUT` when the request is not pending
pub async fn respond_to_request(
    social: &SocialManager,
    user_id: Uuid,
    connection_id: Uuid,
    accept: bool,
) -> AppResult<FriendConnection> {
    let mut connection = social
        .get_friend_connection(connection_id)
        .await?
        .filter(|c| c.involves_user(user_id))
        .ok_or_else(|| AppError::not_found("Friend request"))?;

    if connection.receiver_id != user_id {
        return Err(AppError::permission_denied(
            "Only the receiver can respond to a friend request",
        ));
    }
    if connection.status != FriendStatus::Pending {
        return Err(AppError::invalid_input("Friend request is not pending"));
    }

    let status = if accept {
        FriendStatus::Accepted
    } else {
        FriendStatus::Declined
    };
    social
        .update_friend_connection_status(connection_id, status)
        .await?;

    // Re-read to pick up the stored timestamps
    if let Some(updated) = social.get_friend_connection(connection_id).await? {
        connection = updated;
    }
    info!(%connection_id, status = %status, "Friend request answered");
    Ok(connection)
}

/// Remove a connection the caller is part of
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` when the connection does not involve the caller
pub async fn remove_friend(
    social: &SocialManager,
    user_id: Uuid,
    connection_id: Uuid,
) -> AppResult<()> {
    social
        .get_friend_connection(connection_id)
        .await?
        .filter(|c| c.involves_user(user_id))
        .ok_or_else(|| AppError::not_found("Friend connection"))?;

    social.delete_friend_connection(connection_id).await?;
    info!(%connection_id, "Friend connection removed");
    Ok(())
}

/// Pending requests split into sent and received
///
/// # Errors
///
/// Returns database errors on lookup failure
pub async fn pending_requests(social: &SocialManager, user_id: Uuid) -> AppResult<PendingRequests> {
    Ok(PendingRequests {
        sent: social.get_sent_requests(user_id).await?,
        received: social.get_received_requests(user_id).await?,
    })
}

/// Search for discoverable users with friend-status enrichment.
///
/// Business rules:
/// - Excludes the searching user and anonymized accounts
/// - Enriches each result with friend connection status
/// - Email is only visible to connected friends
///
/// # Errors
///
/// Returns database errors on search or connection lookup failure.
pub async fn search_users_with_status(
    social: &SocialManager,
    users: &UserManager,
    searcher_id: Uuid,
    query: &str,
    limit: i64,
) -> AppResult<Vec<EnrichedUserResult>> {
    if query.trim().is_empty() {
        return Err(AppError::invalid_input("Search query is required"));
    }
    let found = users.search_users(query, searcher_id, limit).await?;

    let mut results = Vec::with_capacity(found.len());
    for user in found {
        let connection = social
            .get_friend_connection_between(searcher_id, user.id)
            .await?;

        let is_friend = connection.as_ref().is_some_and(|c| c.status.is_connected());
        let has_pending_request = connection
            .as_ref()
            .is_some_and(|c| c.status == FriendStatus::Pending);

        results.push(EnrichedUserResult {
            user_id: user.id,
            display_name: user.display_name,
            visible_email: is_friend.then_some(user.email),
            is_friend,
            has_pending_request,
        });
    }

    Ok(results)
}
