// ABOUTME: Friend connection database operations for recipe sharing
// ABOUTME: Connection lifecycle, friend lists joined with user summaries, and friendship checks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::Result;
use chrono::Utc;
use nutrilog_core::errors::{AppError, AppResult};
use nutrilog_core::models::FriendStatus;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{execute_all, parse_datetime, parse_optional_datetime, parse_uuid};
use crate::models::{FriendConnection, FriendInfo, UserSummary};

pub(super) async fn migrate(pool: &SqlitePool) -> Result<()> {
    execute_all(
        pool,
        &[
            r"
            CREATE TABLE IF NOT EXISTS friend_connections (
                id TEXT PRIMARY KEY,
                initiator_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                receiver_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                status TEXT NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'accepted', 'declined')),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                accepted_at TEXT,
                CHECK (initiator_id != receiver_id),
                UNIQUE (initiator_id, receiver_id)
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_friend_connections_initiator ON friend_connections(initiator_id, status)",
            "CREATE INDEX IF NOT EXISTS idx_friend_connections_receiver ON friend_connections(receiver_id, status)",
        ],
    )
    .await
}

/// Social features database operations manager
pub struct SocialManager {
    pool: SqlitePool,
}

impl SocialManager {
    /// Create a new social manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new friend connection request
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn create_friend_connection(&self, connection: &FriendConnection) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO friend_connections (id, initiator_id, receiver_id, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(connection.id.to_string())
        .bind(connection.initiator_id.to_string())
        .bind(connection.receiver_id.to_string())
        .bind(connection.status.as_str())
        .bind(connection.created_at.to_rfc3339())
        .bind(connection.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create friend connection: {e}")))?;

        Ok(connection.id)
    }

    /// Get a friend connection by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_friend_connection(&self, id: Uuid) -> AppResult<Option<FriendConnection>> {
        let row = sqlx::query(
            r"
            SELECT id, initiator_id, receiver_id, status, created_at, updated_at, accepted_at
            FROM friend_connections
            WHERE id = $1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get friend connection: {e}")))?;

        row.map(|r| Self::row_to_friend_connection(&r)).transpose()
    }

    /// Get friend connection between two users (in either direction)
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_friend_connection_between(
        &self,
        user_a: Uuid,
        user_b: Uuid,
    ) -> AppResult<Option<FriendConnection>> {
        let row = sqlx::query(
            r"
            SELECT id, initiator_id, receiver_id, status, created_at, updated_at, accepted_at
            FROM friend_connections
            WHERE (initiator_id = $1 AND receiver_id = $2)
               OR (initiator_id = $2 AND receiver_id = $1)
            ",
        )
        .bind(user_a.to_string())
        .bind(user_b.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get friend connection: {e}")))?;

        row.map(|r| Self::row_to_friend_connection(&r)).transpose()
    }

    /// Whether two users have an accepted connection
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn are_friends(&self, user_a: Uuid, user_b: Uuid) -> AppResult<bool> {
        Ok(self
            .get_friend_connection_between(user_a, user_b)
            .await?
            .is_some_and(|c| c.status.is_connected()))
    }

    /// Update friend connection status
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn update_friend_connection_status(
        &self,
        id: Uuid,
        status: FriendStatus,
    ) -> AppResult<()> {
        let now = Utc::now();
        let accepted_at = if status == FriendStatus::Accepted {
            Some(now.to_rfc3339())
        } else {
            None
        };

        sqlx::query(
            r"
            UPDATE friend_connections
            SET status = $1, updated_at = $2, accepted_at = $3
            WHERE id = $4
            ",
        )
        .bind(status.as_str())
        .bind(now.to_rfc3339())
        .bind(accepted_at)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update friend connection: {e}")))?;

        Ok(())
    }

    /// Accepted friends of a user with the other party's summary
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_friends(&self, user_id: Uuid) -> AppResult<Vec<FriendInfo>> {
        let rows = sqlx::query(
            r"
            SELECT c.id AS connection_id, c.status, c.created_at, c.accepted_at,
                   u.id AS user_id, u.email, u.display_name
            FROM friend_connections c
            JOIN users u ON u.id = CASE WHEN c.initiator_id = $1 THEN c.receiver_id ELSE c.initiator_id END
            WHERE (c.initiator_id = $1 OR c.receiver_id = $1)
              AND c.status = 'accepted'
            ORDER BY c.accepted_at DESC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get friends: {e}")))?;

        rows.iter().map(Self::row_to_friend_info).collect()
    }

    /// Pending requests sent by the user
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_sent_requests(&self, user_id: Uuid) -> AppResult<Vec<FriendInfo>> {
        let rows = sqlx::query(
            r"
            SELECT c.id AS connection_id, c.status, c.created_at, c.accepted_at,
                   u.id AS user_id, u.email, u.display_name
            FROM friend_connections c
            JOIN users u ON u.id = c.receiver_id
            WHERE c.initiator_id = $1 AND c.status = 'pending'
            ORDER BY c.created_at DESC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get sent requests: {e}")))?;

        rows.iter().map(Self::row_to_friend_info).collect()
    }

    /// Pending requests received by the user
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_received_requests(&self, user_id: Uuid) -> AppResult<Vec<FriendInfo>> {
        let rows = sqlx::query(
            r"
            SELECT c.id AS connection_id, c.status, c.created_at, c.accepted_at,
                   u.id AS user_id, u.email, u.display_name
            FROM friend_connections c
            JOIN users u ON u.id = c.initiator_id
            WHERE c.receiver_id = $1 AND c.status = 'pending'
            ORDER BY c.created_at DESC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get received requests: {e}")))?;

        rows.iter().map(Self::row_to_friend_info).collect()
    }

    /// Delete a friend connection
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn delete_friend_connection(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM friend_connections WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete friend connection: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    fn row_to_friend_connection(row: &SqliteRow) -> AppResult<FriendConnection> {
        let id: String = row.get("id");
        let initiator_id: String = row.get("initiator_id");
        let receiver_id: String = row.get("receiver_id");
        let status: String = row.get("status");
        let created_at: String = row.get("created_at");
        let updated_at: String = row.get("updated_at");

        Ok(FriendConnection {
            id: parse_uuid(&id)?,
            initiator_id: parse_uuid(&initiator_id)?,
            receiver_id: parse_uuid(&receiver_id)?,
            status: status
                .parse()
                .map_err(|e: AppError| AppError::database(e.to_string()))?,
            created_at: parse_datetime(&created_at)?,
            updated_at: parse_datetime(&updated_at)?,
            accepted_at: parse_optional_datetime(row.get("accepted_at"))?,
        })
    }

    fn row_to_friend_info(row: &SqliteRow) -> AppResult<FriendInfo> {
        let connection_id: String = row.get("connection_id");
        let user_id: String = row.get("user_id");
        let status: String = row.get("status");
        let created_at: String = row.get("created_at");

        Ok(FriendInfo {
            connection_id: parse_uuid(&connection_id)?,
            user: UserSummary {
                id: parse_uuid(&user_id)?,
                email: row.get("email"),
                display_name: row.get("display_name"),
            },
            status: status
                .parse()
                .map_err(|e: AppError| AppError::database(e.to_string()))?,
            requested_at: parse_datetime(&created_at)?,
            friends_since: parse_optional_datetime(row.get("accepted_at"))?,
        })
    }
}
