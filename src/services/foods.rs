// ABOUTME: Food access rules and USDA import orchestration
// ABOUTME: Decides which food references a user may log or use as ingredients
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use nutrilog_core::errors::{AppError, AppResult};
use nutrilog_core::models::FoodRef;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::database::Database;
use crate::external::FoodDataSource;
use crate::models::{MyFood, UsdaFood};
use crate::services::recipes::load_visible_recipe;

/// Result of importing one food from `FoodData` Central
#[derive(Debug, Clone, Serialize)]
pub struct ImportResult {
    /// The stored food
    pub food: UsdaFood,
    /// Number of household portions stored with it
    pub portions: usize,
}

/// Load a live `MyFood` owned by `user_id`
///
/// Foods of other users are reported as not found.
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` for a missing, deleted, or foreign food
pub async fn load_owned_my_food(db: &Database, user_id: Uuid, id: Uuid) -> AppResult<MyFood> {
    db.foods()
        .get_my_food(id)
        .await?
        .filter(|food| food.user_id == user_id && food.deleted_at.is_none())
        .ok_or_else(|| AppError::not_found("Food"))
}

/// Check that a user may reference `food` in a new diary entry, ingredient, or portion
///
/// USDA foods must be imported, `MyFoods` must be the user's own, and recipes
/// must be visible to the user.
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` when the reference cannot be used
pub async fn ensure_food_accessible(db: &Database, user_id: Uuid, food: FoodRef) -> AppResult<()> {
    match food {
        FoodRef::Usda(fdc_id) => {
            if db.foods().get_usda_food(fdc_id).await?.is_none() {
                return Err(AppError::not_found(format!("USDA food {fdc_id}")));
            }
        }
        FoodRef::MyFood(id) => {
            load_owned_my_food(db, user_id, id).await?;
        }
        FoodRef::Recipe(id) => {
            load_visible_recipe(db, user_id, id).await?;
        }
    }
    Ok(())
}

/// Fetch a food from `FoodData` Central and store it with its portions
///
/// # Errors
///
/// Returns the data source's error (`RESOURCE_NOT_FOUND`, `EXTERNAL_SERVICE_ERROR`) or a database error
pub async fn import_usda_food(
    db: &Database,
    source: &dyn FoodDataSource,
    fdc_id: i64,
) -> AppResult<ImportResult> {
    let details = source.get_food_details(fdc_id).await?;
    let food = details.to_usda_food();
    db.foods().upsert_usda_food(&food).await?;

    let portions: Vec<(String, f64)> = details
        .portions
        .iter()
        .map(|p| (p.name.clone(), p.gram_weight))
        .collect();
    let stored = db.portions().replace_usda_portions(fdc_id, &portions).await?;

    info!(fdc_id, portions = stored, "USDA food imported");
    Ok(ImportResult {
        food,
        portions: stored,
    })
}
