// ABOUTME: Food diary database operations
// ABOUTME: Entries reference exactly one food source with a logged gram amount
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::Result;
use chrono::NaiveDate;
use nutrilog_core::errors::{AppError, AppResult};
use nutrilog_core::models::{validate_amount_grams, FoodRef};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::{execute_all, format_date, parse_date, parse_datetime, parse_optional_uuid, parse_uuid};
use crate::models::DiaryEntry;

pub(super) async fn migrate(pool: &SqlitePool) -> Result<()> {
    execute_all(
        pool,
        &[
            r"
            CREATE TABLE IF NOT EXISTS diary_entries (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                date TEXT NOT NULL,
                meal TEXT NOT NULL CHECK (meal IN ('breakfast', 'lunch', 'dinner', 'snack', 'other')),
                fdc_id INTEGER,
                my_food_id TEXT,
                recipe_id TEXT,
                amount_grams REAL NOT NULL CHECK (amount_grams > 0),
                portion_id TEXT,
                quantity REAL,
                created_at TEXT NOT NULL,
                CHECK (
                    (fdc_id IS NOT NULL) + (my_food_id IS NOT NULL) + (recipe_id IS NOT NULL) = 1
                )
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_diary_user_date ON diary_entries(user_id, date)",
        ],
    )
    .await
}

/// Food diary database operations manager
pub struct DiaryManager {
    pool: SqlitePool,
}

impl DiaryManager {
    /// Create a new diary manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a diary entry
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for a bad amount, or a database error
    pub async fn add_entry(&self, entry: &DiaryEntry) -> AppResult<Uuid> {
        validate_amount_grams(entry.amount_grams)?;
        let (fdc_id, my_food_id, recipe_id) = entry.food.to_columns();

        sqlx::query(
            r"
            INSERT INTO diary_entries (id, user_id, date, meal, fdc_id, my_food_id, recipe_id,
                                       amount_grams, portion_id, quantity, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(entry.id.to_string())
        .bind(entry.user_id.to_string())
        .bind(format_date(entry.date))
        .bind(entry.meal.as_str())
        .bind(fdc_id)
        .bind(my_food_id)
        .bind(recipe_id)
        .bind(entry.amount_grams)
        .bind(entry.portion_id.map(|id| id.to_string()))
        .bind(entry.quantity)
        .bind(entry.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to add diary entry: {e}")))?;

        debug!(entry_id = %entry.id, date = %entry.date, food = %entry.food, "Diary entry added");
        Ok(entry.id)
    }

    /// Get one entry
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_entry(&self, id: Uuid) -> AppResult<Option<DiaryEntry>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, date, meal, fdc_id, my_food_id, recipe_id, amount_grams,
                   portion_id, quantity, created_at
            FROM diary_entries WHERE id = $1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get diary entry: {e}")))?;

        row.map(|r| Self::row_to_entry(&r)).transpose()
    }

    /// Delete an entry owned by `user_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn delete_entry(&self, user_id: Uuid, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM diary_entries WHERE id = $1 AND user_id = $2")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete diary entry: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Entries for one date in meal order, then insertion order
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_for_date(&self, user_id: Uuid, date: NaiveDate) -> AppResult<Vec<DiaryEntry>> {
        self.list_range(user_id, date, date).await
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
    ) -> AppResult<Vec<DiaryEntry>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, date, meal, fdc_id, my_food_id, recipe_id, amount_grams,
                   portion_id, quantity, created_at
            FROM diary_entries
            WHERE user_id = $1 AND date BETWEEN $2 AND $3
            ORDER BY date,
                     CASE meal
                         WHEN 'breakfast' THEN 0 WHEN 'lunch' THEN 1 WHEN 'dinner' THEN 2
                         WHEN 'snack' THEN 3 ELSE 4
                     END,
                     created_at
            ",
        )
        .bind(user_id.to_string())
        .bind(format_date(from))
        .bind(format_date(to))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list diary entries: {e}")))?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    /// The most recent dates with at least one entry, on or before `until`, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn recent_logged_dates(
        &self,
        user_id: Uuid,
        until: NaiveDate,
        limit: i64,
    ) -> AppResult<Vec<NaiveDate>> {
        let rows = sqlx::query(
            r"
            SELECT DISTINCT date FROM diary_entries
            WHERE user_id = $1 AND date <= $2
            ORDER BY date DESC
            LIMIT $3
            ",
        )
        .bind(user_id.to_string())
        .bind(format_date(until))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list logged dates: {e}")))?;

        rows.iter()
            .map(|row| {
                let date: String = row.get("date");
                parse_date(&date)
            })
            .collect()
    }

    fn row_to_entry(row: &SqliteRow) -> AppResult<DiaryEntry> {
        let id: String = row.get("id");
        let user_id: String = row.get("user_id");
        let date: String = row.get("date");
        let meal: String = row.get("meal");
        let fdc_id: Option<i64> = row.get("fdc_id");
        let my_food_id: Option<String> = row.get("my_food_id");
        let recipe_id: Option<String> = row.get("recipe_id");
        let created_at: String = row.get("created_at");

        Ok(DiaryEntry {
            id: parse_uuid(&id)?,
            user_id: parse_uuid(&user_id)?,
            date: parse_date(&date)?,
            meal: meal
                .parse()
                .map_err(|e: AppError| AppError::database(e.to_string()))?,
            food: FoodRef::from_columns(fdc_id, my_food_id.as_deref(), recipe_id.as_deref())
                .map_err(|e| AppError::database(e.message))?,
            amount_grams: row.get("amount_grams"),
            portion_id: parse_optional_uuid(row.get("portion_id"))?,
            quantity: row.get("quantity"),
            created_at: parse_datetime(&created_at)?,
        })
    }
}
