// ABOUTME: Nutrition Facts label generation for custom foods and recipes
// ABOUTME: SVG rendering in-process and PDF rendering through the Typst compiler
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Nutrition label rendering

/// Typst-based PDF output
pub mod pdf;

/// SVG output
pub mod svg;

use nutrilog_core::models::{NutrientKind, NutrientProfile};
use serde::Serialize;

use crate::models::{MyFood, Recipe};

pub use pdf::render_label_pdf;
pub use svg::render_label_svg;

/// Nutrient rows in panel order, excluding calories
pub const LABEL_ROWS: [NutrientKind; 14] = [
    NutrientKind::Fat,
    NutrientKind::SaturatedFat,
    NutrientKind::TransFat,
    NutrientKind::Cholesterol,
    NutrientKind::Sodium,
    NutrientKind::Carbohydrate,
    NutrientKind::Fiber,
    NutrientKind::Sugars,
    NutrientKind::AddedSugars,
    NutrientKind::Protein,
    NutrientKind::VitaminD,
    NutrientKind::Calcium,
    NutrientKind::Iron,
    NutrientKind::Potassium,
];

/// Sub-rows printed indented under their parent nutrient
const fn is_indented(kind: NutrientKind) -> bool {
    matches!(
        kind,
        NutrientKind::SaturatedFat
            | NutrientKind::TransFat
            | NutrientKind::Fiber
            | NutrientKind::Sugars
            | NutrientKind::AddedSugars
    )
}

/// Everything printed on one label
#[derive(Debug, Clone, Serialize)]
pub struct LabelData {
    /// Product name shown above the panel
    pub title: String,
    /// Servings per container, when known
    pub servings: Option<u32>,
    /// Grams in one serving
    pub serving_size_g: f64,
    /// Nutrients in one serving
    pub per_serving: NutrientProfile,
}

impl LabelData {
    /// Label for a custom food, per its declared serving
    #[must_use]
    pub fn for_my_food(food: &MyFood) -> Self {
        Self {
            title: food.brand.as_ref().map_or_else(
                || food.name.clone(),
                |brand| format!("{} ({brand})", food.name),
            ),
            servings: None,
            serving_size_g: food.serving_size_g,
            per_serving: food.per_serving(),
        }
    }

    /// Label for a recipe, per serving of its total weight
    #[must_use]
    pub fn for_recipe(recipe: &Recipe) -> Self {
        Self {
            title: recipe.name.clone(),
            servings: Some(recipe.servings),
            serving_size_g: recipe.serving_grams(),
            per_serving: recipe.per_serving(),
        }
    }

    /// Rows to print: label, formatted amount, and %DV where a daily value exists
    #[must_use]
    pub fn rows(&self) -> Vec<LabelRow> {
        LABEL_ROWS
            .into_iter()
            .map(|kind| {
                let amount = self.per_serving.get(kind);
                LabelRow {
                    label: kind.label(),
                    amount: format_amount(amount, kind.unit()),
                    daily_value_percent: percent_daily_value(kind, amount),
                    indented: is_indented(kind),
                }
            })
            .collect()
    }

    /// Calories per serving rounded for display
    #[must_use]
    pub fn calories(&self) -> i64 {
        self.per_serving.calories.round() as i64
    }
}

/// One printed nutrient row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRow {
    /// Printed name
    pub label: &'static str,
    /// Amount with unit, e.g. `8g`
    pub amount: String,
    /// Rounded percent of the daily value
    pub daily_value_percent: Option<i64>,
    /// Whether the row is a sub-row
    pub indented: bool,
}

/// Percent of the daily value, rounded to a whole number
#[must_use]
pub fn percent_daily_value(kind: NutrientKind, amount: f64) -> Option<i64> {
    kind.daily_value()
        .filter(|dv| *dv > 0.0)
        .map(|dv| (amount / dv * 100.0).round() as i64)
}

/// Amount rounded for display: whole numbers at 10 and above, one decimal below
fn format_amount(amount: f64, unit: &str) -> String {
    if amount >= 10.0 || amount == 0.0 {
        format!("{}{unit}", amount.round())
    } else {
        let rounded = (amount * 10.0).round() / 10.0;
        format!("{rounded}{unit}")
    }
}
