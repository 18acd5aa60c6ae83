// ABOUTME: Portion ownership rules for listing, creating, and deleting serving sizes
// ABOUTME: USDA portions are shared while custom food and recipe portions follow their owner
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::Utc;
use nutrilog_core::errors::{AppError, AppResult};
use nutrilog_core::models::FoodRef;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::database::Database;
use crate::models::Portion;
use crate::services::foods::{ensure_food_accessible, load_owned_my_food};
use crate::services::recipes::load_owned_recipe;

/// Request body for a new portion
#[derive(Debug, Clone, Deserialize)]
pub struct NewPortion {
    /// USDA food
    pub fdc_id: Option<i64>,
    /// User-defined food
    pub my_food_id: Option<Uuid>,
    /// Recipe
    pub recipe_id: Option<Uuid>,
    /// Portion name
    pub name: String,
    /// Weight of one portion (g)
    pub gram_weight: f64,
}

/// Portions of a food the caller can use
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` when the food is not accessible
pub async fn list_portions(db: &Database, user_id: Uuid, food: FoodRef) -> AppResult<Vec<Portion>> {
    ensure_food_accessible(db, user_id, food).await?;
    db.portions().list_for_food(food).await
}

/// Create a portion
///
/// Anyone may add a portion to an imported USDA food; custom food and
/// recipe portions require ownership.
///
/// # Errors
///
/// Returns `INVALID_INPUT` for a blank name or bad weight, `RESOURCE_NOT_FOUND` or `PERMISSION_DENIED` for the food
pub async fn create_portion(db: &Database, user_id: Uuid, input: NewPortion) -> AppResult<Portion> {
    let food = FoodRef::from_options(input.fdc_id, input.my_food_id, input.recipe_id)?;
    let name = input.name.trim().to_owned();
    if name.is_empty() {
        return Err(AppError::invalid_input("Portion name is required"));
    }

    match food {
        FoodRef::Usda(_) => ensure_food_accessible(db, user_id, food).await?,
        FoodRef::MyFood(id) => {
            load_owned_my_food(db, user_id, id).await?;
        }
        FoodRef::Recipe(id) => {
            load_owned_recipe(db, user_id, id).await?;
        }
    }

    let portion = Portion {
        id: Uuid::new_v4(),
        user_id: Some(user_id),
        food,
        name,
        gram_weight: input.gram_weight,
        created_at: Utc::now(),
    };
    db.portions().create_portion(&portion).await?;
    info!(portion_id = %portion.id, food = %food, "Portion added");
    Ok(portion)
}

/// Delete a portion the caller created
///
/// Imported USDA portions have no owner and cannot be deleted.
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` for unknown portions and `PERMISSION_DENIED` for someone else's
pub async fn delete_portion(db: &Database, user_id: Uuid, id: Uuid) -> AppResult<()> {
    let portion = db
        .portions()
        .get_portion(id)
        .await?
        .ok_or_else(|| AppError::not_found("Portion"))?;
    if portion.user_id != Some(user_id) {
        return Err(AppError::permission_denied(
            "Only the creator can delete this portion",
        ));
    }
    db.portions().delete_portion(id).await?;
    Ok(())
}
