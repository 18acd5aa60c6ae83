// ABOUTME: Recipe ownership, visibility, and ingredient orchestration
// ABOUTME: Route handlers call these so every entry point applies the same sharing rules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use nutrilog_core::errors::{AppError, AppResult};
use nutrilog_core::models::{FoodRef, NutrientProfile, RecipeVisibility};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::database::Database;
use crate::models::{Recipe, RecipeIngredient, RecipeInput};
use crate::services::foods::ensure_food_accessible;

/// A recipe with its ingredient lines and per-serving nutrition
#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetail {
    /// The recipe row
    #[serde(flatten)]
    pub recipe: Recipe,
    /// Ingredients in display order
    pub ingredients: Vec<RecipeIngredient>,
    /// Grams in one serving
    pub serving_grams: f64,
    /// Nutrients in one serving
    pub per_serving: NutrientProfile,
}

/// Load a recipe the viewer may read
///
/// Recipes the viewer may not see are reported as not found so their
/// existence is not disclosed.
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` for a missing, deleted, or hidden recipe
pub async fn load_visible_recipe(db: &Database, viewer: Uuid, id: Uuid) -> AppResult<Recipe> {
    let recipe = db
        .recipes()
        .get_recipe(id)
        .await?
        .ok_or_else(|| AppError::not_found("Recipe"))?;

    let is_friend = recipe.visibility == RecipeVisibility::Friends
        && recipe.user_id != viewer
        && db.social().are_friends(viewer, recipe.user_id).await?;

    if recipe.is_visible_to(viewer, is_friend) {
        Ok(recipe)
    } else {
        Err(AppError::not_found("Recipe"))
    }
}

/// Load a live recipe owned by `user_id`
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` when missing or deleted, `PERMISSION_DENIED` when another user owns it
pub async fn load_owned_recipe(db: &Database, user_id: Uuid, id: Uuid) -> AppResult<Recipe> {
    let recipe = load_visible_recipe(db, user_id, id).await?;
    if recipe.user_id != user_id {
        return Err(AppError::permission_denied(
            "Only the owner can modify this recipe",
        ));
    }
    Ok(recipe)
}

/// Assemble the detail view of a recipe
///
/// # Errors
///
/// Returns a database error if the ingredients cannot be loaded
pub async fn recipe_detail(db: &Database, recipe: Recipe) -> AppResult<RecipeDetail> {
    let ingredients = db.recipes().list_ingredients(recipe.id).await?;
    Ok(RecipeDetail {
        serving_grams: recipe.serving_grams(),
        per_serving: recipe.per_serving(),
        recipe,
        ingredients,
    })
}

/// Create an empty recipe
///
/// # Errors
///
/// Returns `INVALID_INPUT` for invalid fields, or a database error
pub async fn create_recipe(db: &Database, user_id: Uuid, input: RecipeInput) -> AppResult<Recipe> {
    input.validate()?;
    let mut recipe = Recipe::new(user_id, String::new(), None, 1, RecipeVisibility::Private);
    input.apply_to(&mut recipe);
    db.recipes().create_recipe(&recipe).await?;
    Ok(recipe)
}

/// Replace a recipe's name, description, servings, and visibility
///
/// # Errors
///
/// Returns `INVALID_INPUT`, `RESOURCE_NOT_FOUND`, or `PERMISSION_DENIED`
pub async fn update_recipe(
    db: &Database,
    user_id: Uuid,
    id: Uuid,
    input: RecipeInput,
) -> AppResult<Recipe> {
    input.validate()?;
    let mut recipe = load_owned_recipe(db, user_id, id).await?;
    input.apply_to(&mut recipe);
    db.recipes().update_recipe_meta(&recipe).await?;
    Ok(recipe)
}

/// Soft delete an owned recipe
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` or `PERMISSION_DENIED`
pub async fn delete_recipe(db: &Database, user_id: Uuid, id: Uuid) -> AppResult<()> {
    load_owned_recipe(db, user_id, id).await?;
    db.recipes().soft_delete_recipe(id).await?;
    info!(recipe_id = %id, "Recipe deleted");
    Ok(())
}

/// Add an ingredient the owner has access to
///
/// # Errors
///
/// Returns `INVALID_INPUT` for bad amounts or self-references, `RESOURCE_NOT_FOUND` for unusable foods
pub async fn add_ingredient(
    db: &Database,
    user_id: Uuid,
    recipe_id: Uuid,
    food: FoodRef,
    amount_grams: f64,
) -> AppResult<RecipeIngredient> {
    load_owned_recipe(db, user_id, recipe_id).await?;
    if food == FoodRef::Recipe(recipe_id) {
        return Err(AppError::invalid_input(
            "A recipe cannot contain itself as an ingredient",
        ));
    }
    ensure_food_accessible(db, user_id, food).await?;
    db.recipes()
        .add_ingredient(recipe_id, food, amount_grams)
        .await
}

/// Replace an ingredient line of an owned recipe
///
/// # Errors
///
/// Returns `INVALID_INPUT`, `RESOURCE_NOT_FOUND`, or `PERMISSION_DENIED`
pub async fn update_ingredient(
    db: &Database,
    user_id: Uuid,
    recipe_id: Uuid,
    ingredient_id: Uuid,
    food: FoodRef,
    amount_grams: f64,
) -> AppResult<RecipeIngredient> {
    load_owned_recipe(db, user_id, recipe_id).await?;
    let existing = db
        .recipes()
        .get_ingredient(ingredient_id)
        .await?
        .filter(|i| i.recipe_id == recipe_id)
        .ok_or_else(|| AppError::not_found("Ingredient"))?;

    if food != existing.food {
        if food == FoodRef::Recipe(recipe_id) {
            return Err(AppError::invalid_input(
                "A recipe cannot contain itself as an ingredient",
            ));
        }
        ensure_food_accessible(db, user_id, food).await?;
    }
    db.recipes()
        .update_ingredient(ingredient_id, food, amount_grams)
        .await
}

/// Remove an ingredient line from an owned recipe
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` or `PERMISSION_DENIED`
pub async fn remove_ingredient(
    db: &Database,
    user_id: Uuid,
    recipe_id: Uuid,
    ingredient_id: Uuid,
) -> AppResult<()> {
    load_owned_recipe(db, user_id, recipe_id).await?;
    db.recipes().remove_ingredient(recipe_id, ingredient_id).await
}

/// Copy a visible recipe into the viewer's own private recipes
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` when the source is not visible
pub async fn copy_recipe(db: &Database, viewer: Uuid, source_id: Uuid) -> AppResult<Recipe> {
    load_visible_recipe(db, viewer, source_id).await?;
    db.recipes().copy_recipe(source_id, viewer).await
}

/// Recipes of `owner_id` that `viewer` may read
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` for an unknown or deleted owner
pub async fn shared_recipes(db: &Database, viewer: Uuid, owner_id: Uuid) -> AppResult<Vec<Recipe>> {
    if owner_id == viewer {
        return db.recipes().list_user_recipes(viewer).await;
    }
    db.users()
        .get_user(owner_id)
        .await?
        .filter(|u| !u.is_deleted())
        .ok_or_else(|| AppError::not_found("User"))?;

    let min_visibility = if db.social().are_friends(viewer, owner_id).await? {
        RecipeVisibility::Friends
    } else {
        RecipeVisibility::Public
    };
    db.recipes()
        .list_shared_recipes(owner_id, min_visibility)
        .await
}
