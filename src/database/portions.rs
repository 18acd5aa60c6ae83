// ABOUTME: Named portion database operations for USDA foods, MyFoods, and recipes
// ABOUTME: USDA portions are global rows; other portions belong to the food's owner
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::Result;
use chrono::Utc;
use nutrilog_core::errors::{AppError, AppResult};
use nutrilog_core::models::FoodRef;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::{execute_all, parse_datetime, parse_optional_uuid, parse_uuid};
use crate::models::Portion;

pub(super) async fn migrate(pool: &SqlitePool) -> Result<()> {
    execute_all(
        pool,
        &[
            r"
            CREATE TABLE IF NOT EXISTS portions (
                id TEXT PRIMARY KEY,
                user_id TEXT REFERENCES users(id) ON DELETE CASCADE,
                fdc_id INTEGER REFERENCES usda_foods(fdc_id) ON DELETE CASCADE,
                my_food_id TEXT REFERENCES my_foods(id),
                recipe_id TEXT REFERENCES recipes(id),
                name TEXT NOT NULL,
                gram_weight REAL NOT NULL CHECK (gram_weight > 0),
                created_at TEXT NOT NULL,
                CHECK (
                    (fdc_id IS NOT NULL) + (my_food_id IS NOT NULL) + (recipe_id IS NOT NULL) = 1
                )
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_portions_fdc ON portions(fdc_id)",
            "CREATE INDEX IF NOT EXISTS idx_portions_my_food ON portions(my_food_id)",
            "CREATE INDEX IF NOT EXISTS idx_portions_recipe ON portions(recipe_id)",
        ],
    )
    .await
}

/// Portion database operations manager
pub struct PortionManager {
    pool: SqlitePool,
}

impl PortionManager {
    /// Create a new portion manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a portion
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for a non-positive gram weight, or a database error
    pub async fn create_portion(&self, portion: &Portion) -> AppResult<Uuid> {
        if !portion.gram_weight.is_finite() || portion.gram_weight <= 0.0 {
            return Err(AppError::invalid_input("gram_weight must be greater than 0"));
        }
        let (fdc_id, my_food_id, recipe_id) = portion.food.to_columns();

        sqlx::query(
            r"
            INSERT INTO portions (id, user_id, fdc_id, my_food_id, recipe_id, name, gram_weight, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(portion.id.to_string())
        .bind(portion.user_id.map(|id| id.to_string()))
        .bind(fdc_id)
        .bind(my_food_id)
        .bind(recipe_id)
        .bind(&portion.name)
        .bind(portion.gram_weight)
        .bind(portion.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create portion: {e}")))?;

        debug!(portion_id = %portion.id, food = %portion.food, "Portion created");
        Ok(portion.id)
    }

    /// Get a portion by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_portion(&self, id: Uuid) -> AppResult<Option<Portion>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, fdc_id, my_food_id, recipe_id, name, gram_weight, created_at
            FROM portions WHERE id = $1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get portion: {e}")))?;

        row.map(|r| Self::row_to_portion(&r)).transpose()
    }

    /// List portions attached to a food, smallest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_for_food(&self, food: FoodRef) -> AppResult<Vec<Portion>> {
        let (fdc_id, my_food_id, recipe_id) = food.to_columns();
        let rows = sqlx::query(
            r"
            SELECT id, user_id, fdc_id, my_food_id, recipe_id, name, gram_weight, created_at
            FROM portions
            WHERE fdc_id IS $1 AND my_food_id IS $2 AND recipe_id IS $3
            ORDER BY gram_weight, name
            ",
        )
        .bind(fdc_id)
        .bind(my_food_id)
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list portions: {e}")))?;

        rows.iter().map(Self::row_to_portion).collect()
    }

    /// Replace the global portions of a USDA food
    ///
    /// # Errors
    ///
    /// Returns an error if the database transaction fails
    pub async fn replace_usda_portions(
        &self,
        fdc_id: i64,
        portions: &[(String, f64)],
    ) -> AppResult<usize> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query("DELETE FROM portions WHERE fdc_id = $1 AND user_id IS NULL")
            .bind(fdc_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to clear portions: {e}")))?;

        let now = Utc::now().to_rfc3339();
        let mut inserted = 0;
        for (name, gram_weight) in portions {
            if !gram_weight.is_finite() || *gram_weight <= 0.0 {
                continue;
            }
            sqlx::query(
                r"
                INSERT INTO portions (id, user_id, fdc_id, name, gram_weight, created_at)
                VALUES ($1, NULL, $2, $3, $4, $5)
                ",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(fdc_id)
            .bind(name)
            .bind(gram_weight)
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to save portion: {e}")))?;
            inserted += 1;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit portions: {e}")))?;
        Ok(inserted)
    }

    /// Delete a portion
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn delete_portion(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM portions WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete portion: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    fn row_to_portion(row: &SqliteRow) -> AppResult<Portion> {
        let id: String = row.get("id");
        let fdc_id: Option<i64> = row.get("fdc_id");
        let my_food_id: Option<String> = row.get("my_food_id");
        let recipe_id: Option<String> = row.get("recipe_id");
        let created_at: String = row.get("created_at");

        Ok(Portion {
            id: parse_uuid(&id)?,
            user_id: parse_optional_uuid(row.get("user_id"))?,
            food: FoodRef::from_columns(fdc_id, my_food_id.as_deref(), recipe_id.as_deref())
                .map_err(|e| AppError::database(e.message))?,
            name: row.get("name"),
            gram_weight: row.get("gram_weight"),
            created_at: parse_datetime(&created_at)?,
        })
    }
}
