// ABOUTME: Food database operations for USDA reference foods and user-defined foods
// ABOUTME: USDA upsert with normalized nutrient rows, MyFood CRUD with soft delete
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::Result;
use chrono::Utc;
use nutrilog_core::errors::{AppError, AppResult};
use nutrilog_core::models::{NutrientKind, NutrientProfile};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

use super::{execute_all, like_pattern, parse_datetime, parse_optional_datetime, parse_uuid};
use crate::models::{MyFood, MyFoodInput, UsdaFood};

pub(super) async fn migrate(pool: &SqlitePool) -> Result<()> {
    execute_all(
        pool,
        &[
            r"
            CREATE TABLE IF NOT EXISTS usda_foods (
                fdc_id INTEGER PRIMARY KEY,
                description TEXT NOT NULL,
                data_type TEXT,
                brand_owner TEXT,
                imported_at TEXT NOT NULL
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS usda_food_nutrients (
                fdc_id INTEGER NOT NULL REFERENCES usda_foods(fdc_id) ON DELETE CASCADE,
                nutrient_id INTEGER NOT NULL,
                amount REAL NOT NULL,
                PRIMARY KEY (fdc_id, nutrient_id)
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS my_foods (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                brand TEXT,
                serving_size_g REAL NOT NULL CHECK (serving_size_g > 0),
                nutrients TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                deleted_at TEXT
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_my_foods_user ON my_foods(user_id, deleted_at)",
        ],
    )
    .await
}

/// Food database operations manager
pub struct FoodManager {
    pool: SqlitePool,
}

impl FoodManager {
    /// Create a new food manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ========================================================================
    // USDA foods
    // ========================================================================

    /// Insert or replace a USDA food and its nutrient rows
    ///
    /// # Errors
    ///
    /// Returns an error if the database transaction fails
    pub async fn upsert_usda_food(&self, food: &UsdaFood) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO usda_foods (fdc_id, description, data_type, brand_owner, imported_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT(fdc_id) DO UPDATE SET
                description = excluded.description,
                data_type = excluded.data_type,
                brand_owner = excluded.brand_owner,
                imported_at = excluded.imported_at
            ",
        )
        .bind(food.fdc_id)
        .bind(&food.description)
        .bind(&food.data_type)
        .bind(&food.brand_owner)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to save USDA food: {e}")))?;

        sqlx::query("DELETE FROM usda_food_nutrients WHERE fdc_id = $1")
            .bind(food.fdc_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to clear USDA nutrients: {e}")))?;

        for (kind, amount) in food.nutrients.iter() {
            sqlx::query(
                "INSERT INTO usda_food_nutrients (fdc_id, nutrient_id, amount) VALUES ($1, $2, $3)",
            )
            .bind(food.fdc_id)
            .bind(kind.usda_nutrient_id())
            .bind(amount)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to save USDA nutrient: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit USDA food: {e}")))?;

        info!(fdc_id = food.fdc_id, "USDA food stored");
        Ok(())
    }

    /// Get a USDA food with its nutrient profile
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_usda_food(&self, fdc_id: i64) -> AppResult<Option<UsdaFood>> {
        let row = sqlx::query(
            "SELECT fdc_id, description, data_type, brand_owner FROM usda_foods WHERE fdc_id = $1",
        )
        .bind(fdc_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get USDA food: {e}")))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let nutrient_rows =
            sqlx::query("SELECT nutrient_id, amount FROM usda_food_nutrients WHERE fdc_id = $1")
                .bind(fdc_id)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to get USDA nutrients: {e}")))?;

        Ok(Some(UsdaFood {
            fdc_id: row.get("fdc_id"),
            description: row.get("description"),
            data_type: row.get("data_type"),
            brand_owner: row.get("brand_owner"),
            nutrients: profile_from_nutrient_rows(&nutrient_rows),
        }))
    }

    /// Search stored USDA foods by description substring
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn search_usda_foods(&self, query: &str, limit: i64) -> AppResult<Vec<UsdaFood>> {
        let rows = sqlx::query(
            r"
            SELECT fdc_id FROM usda_foods
            WHERE description LIKE $1 ESCAPE '\'
            ORDER BY length(description), description
            LIMIT $2
            ",
        )
        .bind(like_pattern(query))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to search USDA foods: {e}")))?;

        let mut foods = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(food) = self.get_usda_food(row.get("fdc_id")).await? {
                foods.push(food);
            }
        }
        Ok(foods)
    }

    // ========================================================================
    // MyFoods
    // ========================================================================

    /// Create a user-defined food
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn create_my_food(&self, food: &MyFood) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO my_foods (id, user_id, name, brand, serving_size_g, nutrients, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(food.id.to_string())
        .bind(food.user_id.to_string())
        .bind(&food.name)
        .bind(&food.brand)
        .bind(food.serving_size_g)
        .bind(serde_json::to_string(&food.nutrients)?)
        .bind(food.created_at.to_rfc3339())
        .bind(food.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create food: {e}")))?;

        Ok(food.id)
    }

    /// Get a food by id, including soft-deleted foods
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_my_food(&self, id: Uuid) -> AppResult<Option<MyFood>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, name, brand, serving_size_g, nutrients, created_at, updated_at, deleted_at
            FROM my_foods WHERE id = $1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get food: {e}")))?;

        row.map(|r| Self::row_to_my_food(&r)).transpose()
    }

    /// List a user's foods, excluding soft-deleted ones
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_my_foods(&self, user_id: Uuid) -> AppResult<Vec<MyFood>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, name, brand, serving_size_g, nutrients, created_at, updated_at, deleted_at
            FROM my_foods
            WHERE user_id = $1 AND deleted_at IS NULL
            ORDER BY name COLLATE NOCASE
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list foods: {e}")))?;

        rows.iter().map(Self::row_to_my_food).collect()
    }

    /// Replace a food's fields
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` when the food does not exist or is deleted
    pub async fn update_my_food(&self, id: Uuid, input: &MyFoodInput) -> AppResult<()> {
        let result = sqlx::query(
            r"
            UPDATE my_foods
            SET name = $1, brand = $2, serving_size_g = $3, nutrients = $4, updated_at = $5
            WHERE id = $6 AND deleted_at IS NULL
            ",
        )
        .bind(input.name.trim())
        .bind(input.brand.as_deref().filter(|b| !b.trim().is_empty()))
        .bind(input.serving_size_g)
        .bind(serde_json::to_string(&input.nutrients)?)
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update food: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Food"));
        }
        Ok(())
    }

    /// Soft delete a food
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn soft_delete_my_food(&self, id: Uuid) -> AppResult<bool> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "UPDATE my_foods SET deleted_at = $1, updated_at = $1 WHERE id = $2 AND deleted_at IS NULL",
        )
        .bind(now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete food: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    fn row_to_my_food(row: &SqliteRow) -> AppResult<MyFood> {
        let id: String = row.get("id");
        let user_id: String = row.get("user_id");
        let nutrients: String = row.get("nutrients");
        let created_at: String = row.get("created_at");
        let updated_at: String = row.get("updated_at");

        Ok(MyFood {
            id: parse_uuid(&id)?,
            user_id: parse_uuid(&user_id)?,
            name: row.get("name"),
            brand: row.get("brand"),
            serving_size_g: row.get("serving_size_g"),
            nutrients: parse_profile(&nutrients)?,
            created_at: parse_datetime(&created_at)?,
            updated_at: parse_datetime(&updated_at)?,
            deleted_at: parse_optional_datetime(row.get("deleted_at"))?,
        })
    }
}

/// Parse a stored JSON nutrient profile
pub(crate) fn parse_profile(json: &str) -> AppResult<NutrientProfile> {
    serde_json::from_str(json)
        .map_err(|e| AppError::database(format!("Invalid nutrient profile: {e}")))
}

/// Build a profile from `(nutrient_id, amount)` rows; untracked ids are ignored
pub(crate) fn profile_from_nutrient_rows(rows: &[SqliteRow]) -> NutrientProfile {
    let mut profile = NutrientProfile::zero();
    for row in rows {
        let nutrient_id: i64 = row.get("nutrient_id");
        if let Some(kind) = NutrientKind::from_usda_nutrient_id(nutrient_id) {
            profile.set(kind, row.get("amount"));
        }
    }
    profile
}
