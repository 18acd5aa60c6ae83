// ABOUTME: Recipe and ingredient models with cached nutrition rollup
// ABOUTME: Visibility rules decide who can read a recipe
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use nutrilog_core::errors::{AppError, AppResult};
use nutrilog_core::models::{FoodRef, LoggableItem, NutrientProfile, RecipeVisibility};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Unique identifier
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Recipe name
    pub name: String,
    /// Free-form description
    pub description: Option<String>,
    /// Number of servings the recipe yields (at least 1)
    pub servings: u32,
    /// Who may read the recipe
    pub visibility: RecipeVisibility,
    /// Cached nutrients per 100 g of the finished recipe
    pub nutrients_per_100g: NutrientProfile,
    /// Cached sum of ingredient grams
    pub total_grams: f64,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
    /// Soft-delete time
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Recipe {
    /// Create an empty recipe
    #[must_use]
    pub fn new(
        user_id: Uuid,
        name: String,
        description: Option<String>,
        servings: u32,
        visibility: RecipeVisibility,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            description,
            servings,
            visibility,
            nutrients_per_100g: NutrientProfile::zero(),
            total_grams: 0.0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Whether `viewer` may read this recipe
    #[must_use]
    pub fn is_visible_to(&self, viewer: Uuid, is_friend: bool) -> bool {
        self.deleted_at.is_none() && self.visibility.allows(self.user_id == viewer, is_friend)
    }

    /// Grams in one serving
    #[must_use]
    pub fn serving_grams(&self) -> f64 {
        self.total_grams / f64::from(self.servings.max(1))
    }

    /// Nutrients in one serving
    #[must_use]
    pub fn per_serving(&self) -> NutrientProfile {
        self.nutrients_per_100g.scaled(self.serving_grams() / 100.0)
    }
}

fn default_servings() -> u32 {
    1
}

/// Recipe fields supplied on create and update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeInput {
    /// Recipe name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Servings the recipe yields
    #[serde(default = "default_servings")]
    pub servings: u32,
    /// Who may read the recipe
    #[serde(default)]
    pub visibility: RecipeVisibility,
}

impl RecipeInput {
    /// Validate the input
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for a blank name or zero servings
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::invalid_input("Recipe name is required"));
        }
        if self.servings == 0 {
            return Err(AppError::invalid_input("servings must be at least 1"));
        }
        Ok(())
    }

    /// Copy the fields onto an existing recipe
    pub fn apply_to(self, recipe: &mut Recipe) {
        recipe.name = self.name.trim().to_owned();
        recipe.description = self.description.filter(|d| !d.trim().is_empty());
        recipe.servings = self.servings;
        recipe.visibility = self.visibility;
    }
}

/// One ingredient line of a recipe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    /// Unique identifier
    pub id: Uuid,
    /// Recipe this line belongs to
    pub recipe_id: Uuid,
    /// Display order
    pub position: i64,
    /// Ingredient reference
    pub food: FoodRef,
    /// Amount in grams
    pub amount_grams: f64,
}

impl RecipeIngredient {
    /// The ingredient as an aggregation item
    #[must_use]
    pub const fn item(&self) -> LoggableItem {
        LoggableItem::new(self.food, self.amount_grams)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_and_soft_delete() {
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut recipe = Recipe::new(owner, "Soup".into(), None, 4, RecipeVisibility::Friends);

        assert!(recipe.is_visible_to(owner, false));
        assert!(recipe.is_visible_to(other, true));
        assert!(!recipe.is_visible_to(other, false));

        recipe.deleted_at = Some(Utc::now());
        assert!(!recipe.is_visible_to(owner, false));
    }

    #[test]
    fn test_per_serving_divides_total_weight() {
        let mut recipe = Recipe::new(Uuid::new_v4(), "Stew".into(), None, 4, RecipeVisibility::Private);
        recipe.total_grams = 800.0;
        recipe.nutrients_per_100g.calories = 120.0;
        assert!((recipe.serving_grams() - 200.0).abs() < 1e-9);
        assert!((recipe.per_serving().calories - 240.0).abs() < 1e-9);
    }
}
