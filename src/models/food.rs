// ABOUTME: Food models for USDA reference foods and user-defined foods
// ABOUTME: Includes validated input for creating and updating MyFoods
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use nutrilog_core::errors::{AppError, AppResult};
use nutrilog_core::models::NutrientProfile;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A USDA `FoodData` Central reference food
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsdaFood {
    /// FDC identifier
    pub fdc_id: i64,
    /// Food description
    pub description: String,
    /// FDC data type (Foundation, SR Legacy, Branded, ...)
    pub data_type: Option<String>,
    /// Brand owner for branded foods
    pub brand_owner: Option<String>,
    /// Nutrients per 100 g
    pub nutrients: NutrientProfile,
}

/// A food defined by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MyFood {
    /// Unique identifier
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Food name
    pub name: String,
    /// Optional brand
    pub brand: Option<String>,
    /// Label serving size (g)
    pub serving_size_g: f64,
    /// Nutrients per 100 g
    pub nutrients: NutrientProfile,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
    /// Soft-delete time
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Fields accepted when creating or replacing a `MyFood`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MyFoodInput {
    /// Food name
    pub name: String,
    /// Optional brand
    #[serde(default)]
    pub brand: Option<String>,
    /// Label serving size (g)
    pub serving_size_g: f64,
    /// Nutrients per 100 g
    #[serde(default)]
    pub nutrients: NutrientProfile,
}

impl MyFoodInput {
    /// Validate the input
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for a blank name, a non-positive serving size, or a negative nutrient
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::invalid_input("Food name is required"));
        }
        if !self.serving_size_g.is_finite() || self.serving_size_g <= 0.0 {
            return Err(AppError::invalid_input(
                "serving_size_g must be greater than 0",
            ));
        }
        self.nutrients.validate().map_err(|kind| {
            AppError::invalid_input(format!("{kind} must be a non-negative number"))
        })
    }
}

impl MyFood {
    /// Build a new food for `user_id` from validated input
    #[must_use]
    pub fn from_input(user_id: Uuid, input: MyFoodInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: input.name.trim().to_owned(),
            brand: input.brand.filter(|b| !b.trim().is_empty()),
            serving_size_g: input.serving_size_g,
            nutrients: input.nutrients,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Nutrients in one serving
    #[must_use]
    pub fn per_serving(&self) -> NutrientProfile {
        self.nutrients.scaled(self.serving_size_g / 100.0)
    }
}
