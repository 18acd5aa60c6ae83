// ABOUTME: Nutrition algorithms for NutriLog, free of I/O
// ABOUTME: Aggregation, BMR/TDEE targets, weight projection, label scanning, exercise estimates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # `NutriLog` Intelligence
//!
//! Pure computation used by the server. Everything here is synchronous and
//! operates on in-memory values; loading data is the caller's job.

/// Algorithm configuration with validated defaults
pub mod config;

/// Recursive nutrient aggregation over foods and recipes
pub mod aggregation;

/// BMR, TDEE, and daily macronutrient targets
pub mod nutrition_calculator;

/// Day-by-day body weight projection
pub mod projection;

/// Nutrition facts extraction from OCR text
pub mod label_scan;

/// Exercise calorie estimation
pub mod exercise;

pub use aggregation::{
    calculate_nutrition_for_items, calculate_recipe_rollup, partition_refs, NutritionCatalog,
    NutritionTotals, RecipeRollup, ReferenceSet,
};
pub use config::NutritionConfig;
pub use label_scan::{extract_label_fields, LabelScan};
pub use nutrition_calculator::{
    calculate_daily_nutrition_needs, DailyNutritionNeeds, DailyNutritionParams,
};
pub use projection::{
    calculate_weight_projection, select_projection_intake, IntakeSource, ProjectionParams,
    WeightProjection,
};
