// ABOUTME: Recipe database operations with ingredient management and cached rollups
// ABOUTME: Every ingredient mutation recomputes the recipe's per-100g nutrition
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::Result;
use chrono::Utc;
use nutrilog_core::errors::{AppError, AppResult};
use nutrilog_core::models::{validate_amount_grams, FoodRef, RecipeVisibility};
use nutrilog_intelligence::{calculate_recipe_rollup, RecipeRollup};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::catalog::CatalogLoader;
use super::foods::parse_profile;
use super::{execute_all, parse_datetime, parse_optional_datetime, parse_uuid};
use crate::models::{Recipe, RecipeIngredient};

pub(super) async fn migrate(pool: &SqlitePool) -> Result<()> {
    execute_all(
        pool,
        &[
            r"
            CREATE TABLE IF NOT EXISTS recipes (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                description TEXT,
                servings INTEGER NOT NULL DEFAULT 1 CHECK (servings >= 1),
                visibility TEXT NOT NULL DEFAULT 'private'
                    CHECK (visibility IN ('private', 'friends', 'public')),
                nutrients TEXT NOT NULL,
                total_grams REAL NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                deleted_at TEXT
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS recipe_ingredients (
                id TEXT PRIMARY KEY,
                recipe_id TEXT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                fdc_id INTEGER REFERENCES usda_foods(fdc_id),
                my_food_id TEXT REFERENCES my_foods(id),
                sub_recipe_id TEXT REFERENCES recipes(id),
                amount_grams REAL NOT NULL CHECK (amount_grams > 0),
                CHECK (
                    (fdc_id IS NOT NULL) + (my_food_id IS NOT NULL) + (sub_recipe_id IS NOT NULL) = 1
                )
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_recipes_user ON recipes(user_id, deleted_at)",
            "CREATE INDEX IF NOT EXISTS idx_recipe_ingredients_recipe ON recipe_ingredients(recipe_id, position)",
        ],
    )
    .await
}

/// Recipe database operations manager
pub struct RecipeManager {
    pool: SqlitePool,
}

impl RecipeManager {
    /// Create a new recipe manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a recipe row
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn create_recipe(&self, recipe: &Recipe) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO recipes (id, user_id, name, description, servings, visibility, nutrients,
                                 total_grams, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(recipe.id.to_string())
        .bind(recipe.user_id.to_string())
        .bind(&recipe.name)
        .bind(&recipe.description)
        .bind(i64::from(recipe.servings))
        .bind(recipe.visibility.as_str())
        .bind(serde_json::to_string(&recipe.nutrients_per_100g)?)
        .bind(recipe.total_grams)
        .bind(recipe.created_at.to_rfc3339())
        .bind(recipe.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create recipe: {e}")))?;

        info!(recipe_id = %recipe.id, user_id = %recipe.user_id, "Recipe created");
        Ok(recipe.id)
    }

    /// Get a recipe by id, including soft-deleted recipes
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_recipe(&self, id: Uuid) -> AppResult<Option<Recipe>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, name, description, servings, visibility, nutrients, total_grams,
                   created_at, updated_at, deleted_at
            FROM recipes WHERE id = $1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get recipe: {e}")))?;

        row.map(|r| Self::row_to_recipe(&r)).transpose()
    }

    /// List a user's live recipes
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_user_recipes(&self, user_id: Uuid) -> AppResult<Vec<Recipe>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, name, description, servings, visibility, nutrients, total_grams,
                   created_at, updated_at, deleted_at
            FROM recipes
            WHERE user_id = $1 AND deleted_at IS NULL
            ORDER BY name COLLATE NOCASE
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list recipes: {e}")))?;

        rows.iter().map(Self::row_to_recipe).collect()
    }

    /// List an owner's live recipes shared at least as widely as `min_visibility`
    ///
    /// `Friends` includes public recipes; `Public` returns only public ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_shared_recipes(
        &self,
        owner_id: Uuid,
        min_visibility: RecipeVisibility,
    ) -> AppResult<Vec<Recipe>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, name, description, servings, visibility, nutrients, total_grams,
                   created_at, updated_at, deleted_at
            FROM recipes
            WHERE user_id = $1 AND deleted_at IS NULL
              AND (visibility = 'public' OR ($2 = 'friends' AND visibility = 'friends')
                   OR $2 = 'private')
            ORDER BY name COLLATE NOCASE
            ",
        )
        .bind(owner_id.to_string())
        .bind(min_visibility.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list shared recipes: {e}")))?;

        rows.iter().map(Self::row_to_recipe).collect()
    }

    /// Update name, description, servings, and visibility
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` when the recipe does not exist or is deleted
    pub async fn update_recipe_meta(&self, recipe: &Recipe) -> AppResult<()> {
        let result = sqlx::query(
            r"
            UPDATE recipes
            SET name = $1, description = $2, servings = $3, visibility = $4, updated_at = $5
            WHERE id = $6 AND deleted_at IS NULL
            ",
        )
        .bind(&recipe.name)
        .bind(&recipe.description)
        .bind(i64::from(recipe.servings))
        .bind(recipe.visibility.as_str())
        .bind(Utc::now().to_rfc3339())
        .bind(recipe.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update recipe: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Recipe"));
        }
        Ok(())
    }

    /// Soft delete a recipe
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn soft_delete_recipe(&self, id: Uuid) -> AppResult<bool> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "UPDATE recipes SET deleted_at = $1, updated_at = $1 WHERE id = $2 AND deleted_at IS NULL",
        )
        .bind(now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete recipe: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    // ========================================================================
    // Ingredients
    // ========================================================================

    /// List a recipe's ingredients in display order
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_ingredients(&self, recipe_id: Uuid) -> AppResult<Vec<RecipeIngredient>> {
        let rows = sqlx::query(
            r"
            SELECT id, recipe_id, position, fdc_id, my_food_id, sub_recipe_id, amount_grams
            FROM recipe_ingredients
            WHERE recipe_id = $1
            ORDER BY position
            ",
        )
        .bind(recipe_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list ingredients: {e}")))?;

        rows.iter().map(Self::row_to_ingredient).collect()
    }

    /// Get one ingredient line
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_ingredient(&self, id: Uuid) -> AppResult<Option<RecipeIngredient>> {
        let row = sqlx::query(
            r"
            SELECT id, recipe_id, position, fdc_id, my_food_id, sub_recipe_id, amount_grams
            FROM recipe_ingredients WHERE id = $1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get ingredient: {e}")))?;

        row.map(|r| Self::row_to_ingredient(&r)).transpose()
    }

    /// Append an ingredient and refresh the rollup
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for a non-positive amount or a direct self-reference
    pub async fn add_ingredient(
        &self,
        recipe_id: Uuid,
        food: FoodRef,
        amount_grams: f64,
    ) -> AppResult<RecipeIngredient> {
        validate_ingredient(recipe_id, food, amount_grams)?;

        let position: i64 = sqlx::query(
            "SELECT COALESCE(MAX(position), -1) + 1 AS next FROM recipe_ingredients WHERE recipe_id = $1",
        )
        .bind(recipe_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get ingredient position: {e}")))?
        .get("next");

        let ingredient = RecipeIngredient {
            id: Uuid::new_v4(),
            recipe_id,
            position,
            food,
            amount_grams,
        };
        let (fdc_id, my_food_id, sub_recipe_id) = food.to_columns();

        sqlx::query(
            r"
            INSERT INTO recipe_ingredients (id, recipe_id, position, fdc_id, my_food_id, sub_recipe_id, amount_grams)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(ingredient.id.to_string())
        .bind(recipe_id.to_string())
        .bind(position)
        .bind(fdc_id)
        .bind(my_food_id)
        .bind(sub_recipe_id)
        .bind(amount_grams)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to add ingredient: {e}")))?;

        debug!(%recipe_id, food = %food, amount_grams, "Ingredient added");
        self.update_recipe_nutrition(recipe_id).await?;
        Ok(ingredient)
    }

    /// Replace an ingredient's food and amount and refresh the rollup
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for a bad amount or self-reference, `RESOURCE_NOT_FOUND` for a missing line
    pub async fn update_ingredient(
        &self,
        ingredient_id: Uuid,
        food: FoodRef,
        amount_grams: f64,
    ) -> AppResult<RecipeIngredient> {
        let mut ingredient = self
            .get_ingredient(ingredient_id)
            .await?
            .ok_or_else(|| AppError::not_found("Ingredient"))?;
        validate_ingredient(ingredient.recipe_id, food, amount_grams)?;

        let (fdc_id, my_food_id, sub_recipe_id) = food.to_columns();
        sqlx::query(
            r"
            UPDATE recipe_ingredients
            SET fdc_id = $1, my_food_id = $2, sub_recipe_id = $3, amount_grams = $4
            WHERE id = $5
            ",
        )
        .bind(fdc_id)
        .bind(my_food_id)
        .bind(sub_recipe_id)
        .bind(amount_grams)
        .bind(ingredient_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update ingredient: {e}")))?;

        ingredient.food = food;
        ingredient.amount_grams = amount_grams;
        self.update_recipe_nutrition(ingredient.recipe_id).await?;
        Ok(ingredient)
    }

    /// Remove an ingredient and refresh the rollup
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` when the line does not belong to the recipe
    pub async fn remove_ingredient(&self, recipe_id: Uuid, ingredient_id: Uuid) -> AppResult<()> {
        let result =
            sqlx::query("DELETE FROM recipe_ingredients WHERE id = $1 AND recipe_id = $2")
                .bind(ingredient_id.to_string())
                .bind(recipe_id.to_string())
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to remove ingredient: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Ingredient"));
        }
        self.update_recipe_nutrition(recipe_id).await?;
        Ok(())
    }

    /// Recompute and store a recipe's per-100g rollup and total grams
    ///
    /// # Errors
    ///
    /// Returns an error if loading the catalog or saving the rollup fails
    pub async fn update_recipe_nutrition(&self, recipe_id: Uuid) -> AppResult<RecipeRollup> {
        let catalog = CatalogLoader::new(self.pool.clone())
            .load_for_recipe(recipe_id)
            .await?;
        let rollup = calculate_recipe_rollup(&catalog, recipe_id);
        if !rollup.missing.is_empty() {
            warn!(%recipe_id, missing = rollup.missing.len(), "Recipe has unresolved ingredients");
        }

        sqlx::query("UPDATE recipes SET nutrients = $1, total_grams = $2, updated_at = $3 WHERE id = $4")
            .bind(serde_json::to_string(&rollup.per_100g)?)
            .bind(rollup.total_grams)
            .bind(Utc::now().to_rfc3339())
            .bind(recipe_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to save recipe nutrition: {e}")))?;

        debug!(%recipe_id, total_grams = rollup.total_grams, "Recipe nutrition updated");
        Ok(rollup)
    }

    /// Copy a recipe and its ingredients into a new private recipe owned by `new_owner`
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` for an unknown source, or a database error
    pub async fn copy_recipe(&self, source_id: Uuid, new_owner: Uuid) -> AppResult<Recipe> {
        let source = self
            .get_recipe(source_id)
            .await?
            .ok_or_else(|| AppError::not_found("Recipe"))?;
        let ingredients = self.list_ingredients(source_id).await?;

        let copy = Recipe::new(
            new_owner,
            source.name.clone(),
            source.description.clone(),
            source.servings,
            RecipeVisibility::Private,
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO recipes (id, user_id, name, description, servings, visibility, nutrients,
                                 total_grams, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(copy.id.to_string())
        .bind(new_owner.to_string())
        .bind(&copy.name)
        .bind(&copy.description)
        .bind(i64::from(copy.servings))
        .bind(copy.visibility.as_str())
        .bind(serde_json::to_string(&copy.nutrients_per_100g)?)
        .bind(copy.total_grams)
        .bind(copy.created_at.to_rfc3339())
        .bind(copy.updated_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to copy recipe: {e}")))?;

        for ingredient in &ingredients {
            let (fdc_id, my_food_id, sub_recipe_id) = ingredient.food.to_columns();
            sqlx::query(
                r"
                INSERT INTO recipe_ingredients (id, recipe_id, position, fdc_id, my_food_id, sub_recipe_id, amount_grams)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(copy.id.to_string())
            .bind(ingredient.position)
            .bind(fdc_id)
            .bind(my_food_id)
            .bind(sub_recipe_id)
            .bind(ingredient.amount_grams)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to copy ingredient: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit recipe copy: {e}")))?;

        self.update_recipe_nutrition(copy.id).await?;
        info!(source = %source_id, copy = %copy.id, "Recipe copied");

        self.get_recipe(copy.id)
            .await?
            .ok_or_else(|| AppError::internal("Copied recipe vanished"))
    }

    fn row_to_recipe(row: &SqliteRow) -> AppResult<Recipe> {
        let id: String = row.get("id");
        let user_id: String = row.get("user_id");
        let servings: i64 = row.get("servings");
        let visibility: String = row.get("visibility");
        let nutrients: String = row.get("nutrients");
        let created_at: String = row.get("created_at");
        let updated_at: String = row.get("updated_at");

        Ok(Recipe {
            id: parse_uuid(&id)?,
            user_id: parse_uuid(&user_id)?,
            name: row.get("name"),
            description: row.get("description"),
            servings: u32::try_from(servings)
                .map_err(|e| AppError::database(format!("Invalid servings: {e}")))?,
            visibility: visibility
                .parse()
                .map_err(|e: AppError| AppError::database(e.to_string()))?,
            nutrients_per_100g: parse_profile(&nutrients)?,
            total_grams: row.get("total_grams"),
            created_at: parse_datetime(&created_at)?,
            updated_at: parse_datetime(&updated_at)?,
            deleted_at: parse_optional_datetime(row.get("deleted_at"))?,
        })
    }

    fn row_to_ingredient(row: &SqliteRow) -> AppResult<RecipeIngredient> {
        let id: String = row.get("id");
        let recipe_id: String = row.get("recipe_id");
        let fdc_id: Option<i64> = row.get("fdc_id");
        let my_food_id: Option<String> = row.get("my_food_id");
        let sub_recipe_id: Option<String> = row.get("sub_recipe_id");

        Ok(RecipeIngredient {
            id: parse_uuid(&id)?,
            recipe_id: parse_uuid(&recipe_id)?,
            position: row.get("position"),
            food: FoodRef::from_columns(fdc_id, my_food_id.as_deref(), sub_recipe_id.as_deref())
                .map_err(|e| AppError::database(e.message))?,
            amount_grams: row.get("amount_grams"),
        })
    }
}

fn validate_ingredient(recipe_id: Uuid, food: FoodRef, amount_grams: f64) -> AppResult<()> {
    validate_amount_grams(amount_grams)?;
    if food == FoodRef::Recipe(recipe_id) {
        return Err(AppError::invalid_input(
            "A recipe cannot contain itself as an ingredient",
        ));
    }
    Ok(())
}
