// ABOUTME: Body weight log and nutrition goal database operations
// ABOUTME: One weight per user per date (upsert) and one goals row per user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use nutrilog_core::errors::{AppError, AppResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::{execute_all, format_date, parse_date, parse_datetime, parse_uuid};
use crate::models::tracking::validate_weight_kg;
use crate::models::{NutritionGoals, WeightEntry};

pub(super) async fn migrate(pool: &SqlitePool) -> Result<()> {
    execute_all(
        pool,
        &[
            r"
            CREATE TABLE IF NOT EXISTS weight_entries (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                date TEXT NOT NULL,
                weight_kg REAL NOT NULL CHECK (weight_kg > 0 AND weight_kg <= 300),
                created_at TEXT NOT NULL,
                UNIQUE (user_id, date)
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS nutrition_goals (
                user_id TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                calories REAL,
                protein_g REAL,
                carbs_g REAL,
                fat_g REAL,
                fiber_g REAL,
                goal_weight_kg REAL,
                updated_at TEXT NOT NULL
            )
            ",
        ],
    )
    .await
}

/// Weight and goals database operations manager
pub struct TrackingManager {
    pool: SqlitePool,
}

impl TrackingManager {
    /// Create a new tracking manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ========================================================================
    // Weight log
    // ========================================================================

    /// Log a weight, replacing any earlier weight on the same date
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for an out-of-range weight, or a database error
    pub async fn upsert_weight(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        weight_kg: f64,
    ) -> AppResult<WeightEntry> {
        validate_weight_kg(weight_kg)?;

        let row = sqlx::query(
            r"
            INSERT INTO weight_entries (id, user_id, date, weight_kg, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT(user_id, date) DO UPDATE SET weight_kg = excluded.weight_kg
            RETURNING id, user_id, date, weight_kg, created_at
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id.to_string())
        .bind(format_date(date))
        .bind(weight_kg)
        .bind(Utc::now().to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to log weight: {e}")))?;

        debug!(%user_id, %date, weight_kg, "Weight logged");
        Self::row_to_weight(&row)
    }

    /// Weights between two dates, inclusive, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_weights(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<WeightEntry>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, date, weight_kg, created_at
            FROM weight_entries
            WHERE user_id = $1 AND date BETWEEN $2 AND $3
            ORDER BY date
            ",
        )
        .bind(user_id.to_string())
        .bind(format_date(from))
        .bind(format_date(to))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list weights: {e}")))?;

        rows.iter().map(Self::row_to_weight).collect()
    }

    /// The most recent weight on or before `date`
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn latest_weight(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Option<WeightEntry>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, date, weight_kg, created_at
            FROM weight_entries
            WHERE user_id = $1 AND date <= $2
            ORDER BY date DESC
            LIMIT 1
            ",
        )
        .bind(user_id.to_string())
        .bind(format_date(date))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get latest weight: {e}")))?;

        row.map(|r| Self::row_to_weight(&r)).transpose()
    }

    fn row_to_weight(row: &SqliteRow) -> AppResult<WeightEntry> {
        let id: String = row.get("id");
        let user_id: String = row.get("user_id");
        let date: String = row.get("date");
        let created_at: String = row.get("created_at");

        Ok(WeightEntry {
            id: parse_uuid(&id)?,
            user_id: parse_uuid(&user_id)?,
            date: parse_date(&date)?,
            weight_kg: row.get("weight_kg"),
            created_at: parse_datetime(&created_at)?,
        })
    }

    // ========================================================================
    // Goals
    // ========================================================================

    /// Get goals; unset goals are all `None`
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_goals(&self, user_id: Uuid) -> AppResult<NutritionGoals> {
        let row = sqlx::query(
            r"
            SELECT calories, protein_g, carbs_g, fat_g, fiber_g, goal_weight_kg
            FROM nutrition_goals WHERE user_id = $1
            ",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get goals: {e}")))?;

        Ok(row.map_or_else(NutritionGoals::default, |row| NutritionGoals {
            calories: row.get("calories"),
            protein_g: row.get("protein_g"),
            carbs_g: row.get("carbs_g"),
            fat_g: row.get("fat_g"),
            fiber_g: row.get("fiber_g"),
            goal_weight_kg: row.get("goal_weight_kg"),
        }))
    }

    /// Replace goals
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for negative values, or a database error
    pub async fn set_goals(&self, user_id: Uuid, goals: &NutritionGoals) -> AppResult<()> {
        goals.validate()?;

        sqlx::query(
            r"
            INSERT INTO nutrition_goals (user_id, calories, protein_g, carbs_g, fat_g, fiber_g,
                                         goal_weight_kg, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT(user_id) DO UPDATE SET
                calories = excluded.calories,
                protein_g = excluded.protein_g,
                carbs_g = excluded.carbs_g,
                fat_g = excluded.fat_g,
                fiber_g = excluded.fiber_g,
                goal_weight_kg = excluded.goal_weight_kg,
                updated_at = excluded.updated_at
            ",
        )
        .bind(user_id.to_string())
        .bind(goals.calories)
        .bind(goals.protein_g)
        .bind(goals.carbs_g)
        .bind(goals.fat_g)
        .bind(goals.fiber_g)
        .bind(goals.goal_weight_kg)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to save goals: {e}")))?;

        Ok(())
    }
}
