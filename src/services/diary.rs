// ABOUTME: Food diary orchestration: portion resolution, day summaries, and intake history
// ABOUTME: Loads the nutrition catalog once per request and aggregates per meal
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Diary service
//!
//! A day summary loads the catalog for every entry of the date in one pass
//! and then aggregates each meal from the same in-memory catalog.

use chrono::{NaiveDate, Utc};
use nutrilog_core::errors::{AppError, AppResult};
use nutrilog_core::models::{FoodRef, LoggableItem, MealType, NutrientProfile};
use nutrilog_intelligence::calculate_nutrition_for_items;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::database::Database;
use crate::models::diary::{DaySummary, MealSummary, RemainingTargets};
use crate::models::DiaryEntry;
use crate::services::foods::ensure_food_accessible;

/// Request body for a new diary entry
///
/// Exactly one of `fdc_id`, `my_food_id`, or `recipe_id` is required, and
/// either `amount_grams` or `portion_id` with `quantity`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDiaryEntry {
    /// Date eaten
    pub date: NaiveDate,
    /// Meal slot
    pub meal: MealType,
    /// USDA food
    pub fdc_id: Option<i64>,
    /// User-defined food
    pub my_food_id: Option<Uuid>,
    /// Recipe
    pub recipe_id: Option<Uuid>,
    /// Amount in grams
    pub amount_grams: Option<f64>,
    /// Portion to convert `quantity` with
    pub portion_id: Option<Uuid>,
    /// Number of portions
    pub quantity: Option<f64>,
}

/// Validate and store a diary entry
///
/// # Errors
///
/// Returns `INVALID_INPUT` for ambiguous references or amounts, `RESOURCE_NOT_FOUND` for unusable foods or portions
pub async fn add_entry(db: &Database, user_id: Uuid, input: NewDiaryEntry) -> AppResult<DiaryEntry> {
    let food = FoodRef::from_options(input.fdc_id, input.my_food_id, input.recipe_id)?;
    ensure_food_accessible(db, user_id, food).await?;

    let amount_grams = match (input.amount_grams, input.portion_id) {
        (Some(grams), None) => grams,
        (None, Some(portion_id)) => {
            let portion = db
                .portions()
                .get_portion(portion_id)
                .await?
                .ok_or_else(|| AppError::not_found("Portion"))?;
            if portion.food != food {
                return Err(AppError::invalid_input(
                    "Portion does not belong to the logged food",
                ));
            }
            let quantity = input
                .quantity
                .ok_or_else(|| AppError::invalid_input("quantity is required with portion_id"))?;
            portion.grams_for(quantity)?
        }
        _ => {
            return Err(AppError::invalid_input(
                "Provide either amount_grams or portion_id with quantity",
            ))
        }
    };

    let entry = DiaryEntry {
        id: Uuid::new_v4(),
        user_id,
        date: input.date,
        meal: input.meal,
        food,
        amount_grams,
        portion_id: input.portion_id,
        quantity: input.portion_id.and(input.quantity),
        created_at: Utc::now(),
    };
    db.diary().add_entry(&entry).await?;
    Ok(entry)
}

/// Aggregate a day's entries per meal and compare with goals
///
/// # Errors
///
/// Returns a database error if entries, exercise, goals, or the catalog cannot be loaded
pub async fn day_summary(db: &Database, user_id: Uuid, date: NaiveDate) -> AppResult<DaySummary> {
    let entries = db.diary().list_for_date(user_id, date).await?;
    let items: Vec<LoggableItem> = entries.iter().map(DiaryEntry::item).collect();
    let catalog = db.catalog().load_for_items(&items).await?;

    let mut meals = Vec::new();
    for meal in MealType::ALL {
        let meal_items: Vec<LoggableItem> = entries
            .iter()
            .filter(|e| e.meal == meal)
            .map(DiaryEntry::item)
            .collect();
        if meal_items.is_empty() {
            continue;
        }
        let totals = calculate_nutrition_for_items(&catalog, &meal_items);
        meals.push(MealSummary {
            meal,
            entry_count: meal_items.len(),
            total_grams: totals.total_grams,
            nutrients: totals.nutrients,
        });
    }

    let day = calculate_nutrition_for_items(&catalog, &items);
    let exercise_calories = db.exercise().calories_for_date(user_id, date).await?;
    let goals = db.tracking().get_goals(user_id).await?;
    let remaining = RemainingTargets::compute(&goals, &day.nutrients, exercise_calories);

    debug!(%user_id, %date, entries = entries.len(), "Day summary computed");
    Ok(DaySummary {
        date,
        meals,
        totals: day.nutrients,
        total_grams: day.total_grams,
        exercise_calories,
        goals,
        remaining,
        missing: day.missing,
    })
}

/// Daily calorie totals of the most recent `window` logged days on or before `until`
///
/// Days without entries are not counted.
///
/// # Errors
///
/// Returns a database error if entries or the catalog cannot be loaded
pub async fn recent_daily_calories(
    db: &Database,
    user_id: Uuid,
    until: NaiveDate,
    window: i64,
) -> AppResult<Vec<f64>> {
    let dates = db.diary().recent_logged_dates(user_id, until, window).await?;
    let (Some(&newest), Some(&oldest)) = (dates.first(), dates.last()) else {
        return Ok(Vec::new());
    };

    let entries = db.diary().list_range(user_id, oldest, newest).await?;
    let items: Vec<LoggableItem> = entries.iter().map(DiaryEntry::item).collect();
    let catalog = db.catalog().load_for_items(&items).await?;

    Ok(dates
        .iter()
        .map(|date| {
            let day_items: Vec<LoggableItem> = entries
                .iter()
                .filter(|e| e.date == *date)
                .map(DiaryEntry::item)
                .collect();
            calculate_nutrition_for_items(&catalog, &day_items)
                .nutrients
                .calories
        })
        .collect())
}

/// A diary entry with the nutrition of its logged amount
#[derive(Debug, Clone, Serialize)]
pub struct DiaryEntryView {
    /// The stored entry
    #[serde(flatten)]
    pub entry: DiaryEntry,
    /// Nutrients in the logged amount
    pub nutrients: NutrientProfile,
}

/// Entries of one date, each with its nutrition
///
/// # Errors
///
/// Returns a database error if entries or the catalog cannot be loaded
pub async fn entries_for_date(
    db: &Database,
    user_id: Uuid,
    date: NaiveDate,
) -> AppResult<Vec<DiaryEntryView>> {
    let entries = db.diary().list_for_date(user_id, date).await?;
    let items: Vec<LoggableItem> = entries.iter().map(DiaryEntry::item).collect();
    let catalog = db.catalog().load_for_items(&items).await?;

    Ok(entries
        .into_iter()
        .map(|entry| {
            let nutrients = calculate_nutrition_for_items(&catalog, &[entry.item()]).nutrients;
            DiaryEntryView { entry, nutrients }
        })
        .collect())
}
