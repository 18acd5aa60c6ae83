// ABOUTME: Exercise log database operations
// ABOUTME: Stores logged or MET-estimated calories burned per activity
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::Result;
use chrono::NaiveDate;
use nutrilog_core::errors::{AppError, AppResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::{execute_all, format_date, parse_date, parse_datetime, parse_uuid};
use crate::models::ExerciseEntry;

pub(super) async fn migrate(pool: &SqlitePool) -> Result<()> {
    execute_all(
        pool,
        &[
            r"
            CREATE TABLE IF NOT EXISTS exercise_entries (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                date TEXT NOT NULL,
                activity TEXT NOT NULL,
                duration_minutes REAL NOT NULL CHECK (duration_minutes > 0),
                calories_burned REAL NOT NULL CHECK (calories_burned >= 0),
                estimated INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_exercise_user_date ON exercise_entries(user_id, date)",
        ],
    )
    .await
}

/// Exercise log database operations manager
pub struct ExerciseManager {
    pool: SqlitePool,
}

impl ExerciseManager {
    /// Create a new exercise manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert an exercise entry
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn add_entry(&self, entry: &ExerciseEntry) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO exercise_entries (id, user_id, date, activity, duration_minutes,
                                          calories_burned, estimated, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(entry.id.to_string())
        .bind(entry.user_id.to_string())
        .bind(format_date(entry.date))
        .bind(&entry.activity)
        .bind(entry.duration_minutes)
        .bind(entry.calories_burned)
        .bind(entry.estimated)
        .bind(entry.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to add exercise: {e}")))?;

        debug!(
            entry_id = %entry.id,
            activity = %entry.activity,
            calories = entry.calories_burned,
            estimated = entry.estimated,
            "Exercise logged"
        );
        Ok(entry.id)
    }

    /// Delete an entry owned by `user_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn delete_entry(&self, user_id: Uuid, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM exercise_entries WHERE id = $1 AND user_id = $2")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete exercise: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Entries between two dates, inclusive
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_range(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<ExerciseEntry>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, date, activity, duration_minutes, calories_burned, estimated, created_at
            FROM exercise_entries
            WHERE user_id = $1 AND date BETWEEN $2 AND $3
            ORDER BY date, created_at
            ",
        )
        .bind(user_id.to_string())
        .bind(format_date(from))
        .bind(format_date(to))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list exercise: {e}")))?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    /// Total calories burned on one date
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn calories_for_date(&self, user_id: Uuid, date: NaiveDate) -> AppResult<f64> {
        let row = sqlx::query(
            r"
            SELECT COALESCE(SUM(calories_burned), 0.0) AS total
            FROM exercise_entries WHERE user_id = $1 AND date = $2
            ",
        )
        .bind(user_id.to_string())
        .bind(format_date(date))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to sum exercise: {e}")))?;

        Ok(row.get("total"))
    }

    fn row_to_entry(row: &SqliteRow) -> AppResult<ExerciseEntry> {
        let id: String = row.get("id");
        let user_id: String = row.get("user_id");
        let date: String = row.get("date");
        let created_at: String = row.get("created_at");

        Ok(ExerciseEntry {
            id: parse_uuid(&id)?,
            user_id: parse_uuid(&user_id)?,
            date: parse_date(&date)?,
            activity: row.get("activity"),
            duration_minutes: row.get("duration_minutes"),
            calories_burned: row.get("calories_burned"),
            estimated: row.get("estimated"),
            created_at: parse_datetime(&created_at)?,
        })
    }
}
