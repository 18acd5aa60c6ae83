// ABOUTME: Food diary entry model and day summary shapes
// ABOUTME: Per-meal and total nutrition compared against the user's goals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, NaiveDate, Utc};
use nutrilog_core::models::{FoodRef, LoggableItem, MealType, NutrientProfile};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::tracking::NutritionGoals;

/// One food logged on a date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryEntry {
    /// Unique identifier
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Day the food was eaten
    pub date: NaiveDate,
    /// Meal slot
    pub meal: MealType,
    /// What was eaten
    pub food: FoodRef,
    /// How much (g)
    pub amount_grams: f64,
    /// Portion used to log the amount, if any
    pub portion_id: Option<Uuid>,
    /// Number of portions, if logged by portion
    pub quantity: Option<f64>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl DiaryEntry {
    /// The entry as an aggregation item
    #[must_use]
    pub const fn item(&self) -> LoggableItem {
        LoggableItem::new(self.food, self.amount_grams)
    }
}

/// Nutrition of one meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealSummary {
    /// Meal slot
    pub meal: MealType,
    /// Number of entries
    pub entry_count: usize,
    /// Summed grams
    pub total_grams: f64,
    /// Summed nutrients
    pub nutrients: NutrientProfile,
}

/// Goal minus consumed plus exercise, per tracked target
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RemainingTargets {
    /// Calories left
    pub calories: Option<f64>,
    /// Protein left (g)
    pub protein_g: Option<f64>,
    /// Carbohydrate left (g)
    pub carbs_g: Option<f64>,
    /// Fat left (g)
    pub fat_g: Option<f64>,
    /// Fiber left (g)
    pub fiber_g: Option<f64>,
}

/// Nutrition summary of one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    /// Summarized date
    pub date: NaiveDate,
    /// One entry per meal that has food, in meal order
    pub meals: Vec<MealSummary>,
    /// Whole-day totals
    pub totals: NutrientProfile,
    /// Whole-day grams
    pub total_grams: f64,
    /// Calories burned by logged exercise
    pub exercise_calories: f64,
    /// The user's goals, if set
    pub goals: NutritionGoals,
    /// Remaining amounts for the goals that are set
    pub remaining: RemainingTargets,
    /// References that could not be resolved
    pub missing: Vec<FoodRef>,
}

impl RemainingTargets {
    /// Compute remaining targets; exercise calories extend only the calorie budget
    #[must_use]
    pub fn compute(goals: &NutritionGoals, consumed: &NutrientProfile, exercise_kcal: f64) -> Self {
        Self {
            calories: goals
                .calories
                .map(|goal| goal - consumed.calories + exercise_kcal),
            protein_g: goals.protein_g.map(|goal| goal - consumed.protein),
            carbs_g: goals.carbs_g.map(|goal| goal - consumed.carbohydrate),
            fat_g: goals.fat_g.map(|goal| goal - consumed.fat),
            fiber_g: goals.fiber_g.map(|goal| goal - consumed.fiber),
        }
    }
}
