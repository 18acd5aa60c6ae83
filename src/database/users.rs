// ABOUTME: User management database operations
// ABOUTME: Registration, lookup, body profiles, discovery search, and account anonymization
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::Result;
use chrono::Utc;
use nutrilog_core::errors::{AppError, AppResult};
use nutrilog_core::models::{ActivityLevel, Sex};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

use super::{
    execute_all, format_date, like_pattern, parse_date, parse_datetime, parse_optional_datetime,
    parse_uuid,
};
use crate::models::user::{anonymized_email, normalize_email, DELETED_USER_NAME};
use crate::models::{BodyProfile, User, UserSummary};

pub(super) async fn migrate(pool: &SqlitePool) -> Result<()> {
    execute_all(
        pool,
        &[
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                display_name TEXT,
                password_hash TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                deleted_at TEXT
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS user_profiles (
                user_id TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                height_cm REAL,
                birth_date TEXT,
                sex TEXT CHECK (sex IN ('male', 'female')),
                activity_level TEXT NOT NULL DEFAULT 'sedentary',
                updated_at TEXT NOT NULL
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_users_deleted_at ON users(deleted_at)",
        ],
    )
    .await
}

/// User database operations manager
pub struct UserManager {
    pool: SqlitePool,
}

impl UserManager {
    /// Create a new user manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new user
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_ALREADY_EXISTS` if the email is taken, or a database error
    pub async fn create_user(&self, user: &User) -> AppResult<Uuid> {
        if self.get_user_by_email(&user.email).await?.is_some() {
            return Err(AppError::already_exists("Email already registered"));
        }

        sqlx::query(
            r"
            INSERT INTO users (id, email, display_name, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.password_hash)
        .bind(user.created_at.to_rfc3339())
        .bind(user.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create user: {e}")))?;

        info!(user_id = %user.id, "User registered");
        Ok(user.id)
    }

    /// Get a user by id, including anonymized users
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query(
            r"
            SELECT id, email, display_name, password_hash, created_at, updated_at, deleted_at
            FROM users WHERE id = $1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get user: {e}")))?;

        row.map(|r| Self::row_to_user(&r)).transpose()
    }

    /// Get a user by email (case-insensitive)
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(
            r"
            SELECT id, email, display_name, password_hash, created_at, updated_at, deleted_at
            FROM users WHERE email = $1
            ",
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get user by email: {e}")))?;

        row.map(|r| Self::row_to_user(&r)).transpose()
    }

    /// Update the display name
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn update_display_name(&self, id: Uuid, display_name: Option<&str>) -> AppResult<()> {
        sqlx::query("UPDATE users SET display_name = $1, updated_at = $2 WHERE id = $3")
            .bind(display_name)
            .bind(Utc::now().to_rfc3339())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update user: {e}")))?;
        Ok(())
    }

    /// Get the body profile; a user without one gets the default
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or a stored value is malformed
    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<BodyProfile> {
        let row = sqlx::query(
            r"
            SELECT height_cm, birth_date, sex, activity_level
            FROM user_profiles WHERE user_id = $1
            ",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get profile: {e}")))?;

        let Some(row) = row else {
            return Ok(BodyProfile::default());
        };

        let birth_date: Option<String> = row.get("birth_date");
        let sex: Option<String> = row.get("sex");
        let activity_level: String = row.get("activity_level");

        Ok(BodyProfile {
            height_cm: row.get("height_cm"),
            birth_date: birth_date.as_deref().map(parse_date).transpose()?,
            sex: sex
                .map(|s| s.parse::<Sex>())
                .transpose()
                .map_err(|e| AppError::database(e.to_string()))?,
            activity_level: activity_level
                .parse::<ActivityLevel>()
                .map_err(|e| AppError::database(e.to_string()))?,
        })
    }

    /// Create or replace the body profile
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn upsert_profile(&self, user_id: Uuid, profile: &BodyProfile) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO user_profiles (user_id, height_cm, birth_date, sex, activity_level, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT(user_id) DO UPDATE SET
                height_cm = excluded.height_cm,
                birth_date = excluded.birth_date,
                sex = excluded.sex,
                activity_level = excluded.activity_level,
                updated_at = excluded.updated_at
            ",
        )
        .bind(user_id.to_string())
        .bind(profile.height_cm)
        .bind(profile.birth_date.map(format_date))
        .bind(profile.sex.map(|s| s.as_str()))
        .bind(profile.activity_level.as_str())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to save profile: {e}")))?;
        Ok(())
    }

    /// Search active users by email or display name substring
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn search_users(
        &self,
        query: &str,
        exclude_user_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<UserSummary>> {
        let pattern = like_pattern(query);
        let rows = sqlx::query(
            r"
            SELECT id, email, display_name FROM users
            WHERE deleted_at IS NULL
              AND id != $1
              AND (email LIKE $2 ESCAPE '\' OR display_name LIKE $2 ESCAPE '\')
            ORDER BY email
            LIMIT $3
            ",
        )
        .bind(exclude_user_id.to_string())
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to search users: {e}")))?;

        rows.iter().map(Self::row_to_summary).collect()
    }

    /// Anonymize an account in one transaction
    ///
    /// Personal logs are deleted, friend connections removed, and recipes made
    /// private. The user row stays so shared references keep resolving.
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` for unknown or already deleted users, or a database error
    pub async fn anonymize_user(&self, user_id: Uuid) -> AppResult<()> {
        let id = user_id.to_string();
        let now = Utc::now().to_rfc3339();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let updated = sqlx::query(
            r"
            UPDATE users
            SET email = $1, display_name = $2, password_hash = NULL, deleted_at = $3, updated_at = $3
            WHERE id = $4 AND deleted_at IS NULL
            ",
        )
        .bind(anonymized_email(user_id))
        .bind(DELETED_USER_NAME)
        .bind(&now)
        .bind(&id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to anonymize user: {e}")))?;

        if updated.rows_affected() == 0 {
            return Err(AppError::not_found("User"));
        }

        for statement in [
            "DELETE FROM friend_connections WHERE initiator_id = $1 OR receiver_id = $1",
            "UPDATE recipes SET visibility = 'private' WHERE user_id = $1",
            "DELETE FROM diary_entries WHERE user_id = $1",
            "DELETE FROM exercise_entries WHERE user_id = $1",
            "DELETE FROM weight_entries WHERE user_id = $1",
            "DELETE FROM nutrition_goals WHERE user_id = $1",
            "DELETE FROM user_profiles WHERE user_id = $1",
        ] {
            sqlx::query(statement)
                .bind(&id)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to anonymize user: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit anonymization: {e}")))?;

        info!(user_id = %user_id, "Account anonymized");
        Ok(())
    }

    fn row_to_user(row: &SqliteRow) -> AppResult<User> {
        let id: String = row.get("id");
        let created_at: String = row.get("created_at");
        let updated_at: String = row.get("updated_at");

        Ok(User {
            id: parse_uuid(&id)?,
            email: row.get("email"),
            display_name: row.get("display_name"),
            password_hash: row.get("password_hash"),
            created_at: parse_datetime(&created_at)?,
            updated_at: parse_datetime(&updated_at)?,
            deleted_at: parse_optional_datetime(row.get("deleted_at"))?,
        })
    }

    fn row_to_summary(row: &SqliteRow) -> AppResult<UserSummary> {
        let id: String = row.get("id");
        Ok(UserSummary {
            id: parse_uuid(&id)?,
            email: row.get("email"),
            display_name: row.get("display_name"),
        })
    }
}
