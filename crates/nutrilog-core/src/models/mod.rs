// ABOUTME: Shared domain models used by both the algorithms crate and the server
// ABOUTME: Re-exports nutrient, diary, profile, and social model types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Tracked nutrients and the per-100g profile value type
pub mod nutrients;

/// Food references, loggable items, and meal types
pub mod diary;

/// Body profile enums (sex, activity level, goal)
pub mod profile;

/// Friend status and recipe visibility
pub mod social;

pub use diary::{validate_amount_grams, FoodRef, LoggableItem, MealType};
pub use nutrients::{NutrientKind, NutrientProfile};
pub use profile::{ActivityLevel, GoalKind, Sex};
pub use social::{FriendStatus, RecipeVisibility};
