// ABOUTME: Persistent record types for the NutriLog server
// ABOUTME: Users, foods, recipes, portions, diary, tracking, and social connections
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! Records as stored by the database managers and returned by the HTTP API.
//! Shared enums and nutrient types live in `nutrilog_core::models` and are
//! re-exported here.

/// Users and body profiles
pub mod user;
/// USDA foods and user-defined foods
pub mod food;
/// Recipes and their ingredients
pub mod recipe;
/// Named serving sizes
pub mod portion;
/// Food diary entries
pub mod diary;
/// Exercise, weight, and nutrition goals
pub mod tracking;
/// Friend connections
pub mod social;

pub use diary::DiaryEntry;
pub use food::{MyFood, MyFoodInput, UsdaFood};
pub use nutrilog_core::models::{
    ActivityLevel, FoodRef, FriendStatus, GoalKind, LoggableItem, MealType, NutrientKind,
    NutrientProfile, RecipeVisibility, Sex,
};
pub use portion::Portion;
pub use recipe::{Recipe, RecipeIngredient, RecipeInput};
pub use social::{FriendConnection, FriendInfo, PendingRequests};
pub use tracking::{ExerciseEntry, NutritionGoals, WeightEntry};
pub use user::{BodyProfile, User, UserSummary};
