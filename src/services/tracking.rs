// ABOUTME: Exercise logging, weight projection, and suggested goal orchestration
// ABOUTME: Combines the body profile, weight log, diary history, and goals for the algorithms
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{NaiveDate, Utc};
use nutrilog_core::constants::{defaults, limits};
use nutrilog_core::errors::{AppError, AppResult, ErrorCode};
use nutrilog_core::models::GoalKind;
use nutrilog_intelligence::exercise::estimate_calories_burned;
use nutrilog_intelligence::nutrition_calculator::{calculate_mifflin_st_jeor, calculate_tdee};
use nutrilog_intelligence::{
    calculate_daily_nutrition_needs, calculate_weight_projection, select_projection_intake,
    DailyNutritionNeeds, DailyNutritionParams, IntakeSource, NutritionConfig, ProjectionParams,
    WeightProjection,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::database::Database;
use crate::models::ExerciseEntry;
use crate::services::diary::recent_daily_calories;

/// Request body for a new exercise entry
#[derive(Debug, Clone, Deserialize)]
pub struct NewExerciseEntry {
    /// Date of the activity
    pub date: NaiveDate,
    /// Activity name
    pub activity: String,
    /// Duration in minutes
    pub duration_minutes: f64,
    /// Calories burned; estimated from MET values when omitted
    pub calories_burned: Option<f64>,
}

/// Store an exercise entry, estimating calories when none are given
///
/// The estimate uses the latest weight logged on or before the activity date.
///
/// # Errors
///
/// Returns `INVALID_INPUT` for a blank activity, non-positive duration, or negative calories
pub async fn log_exercise(
    db: &Database,
    user_id: Uuid,
    input: NewExerciseEntry,
) -> AppResult<ExerciseEntry> {
    let activity = input.activity.trim().to_owned();
    if activity.is_empty() {
        return Err(AppError::invalid_input("Activity name is required"));
    }
    if !input.duration_minutes.is_finite() || input.duration_minutes <= 0.0 {
        return Err(AppError::invalid_input(
            "duration_minutes must be greater than 0",
        ));
    }

    let (calories_burned, estimated) = match input.calories_burned {
        Some(kcal) if kcal.is_finite() && kcal >= 0.0 => (kcal, false),
        Some(_) => {
            return Err(AppError::invalid_input(
                "calories_burned must be a non-negative number",
            ))
        }
        None => {
            let weight_kg = db
                .tracking()
                .latest_weight(user_id, input.date)
                .await?
                .map_or(defaults::FALLBACK_BODY_WEIGHT_KG, |w| w.weight_kg);
            let kcal = estimate_calories_burned(&activity, input.duration_minutes, weight_kg)?;
            (kcal, true)
        }
    };

    let entry = ExerciseEntry {
        id: Uuid::new_v4(),
        user_id,
        date: input.date,
        activity,
        duration_minutes: input.duration_minutes,
        calories_burned,
        estimated,
        created_at: Utc::now(),
    };
    db.exercise().add_entry(&entry).await?;
    Ok(entry)
}

/// Projection result with the inputs it was derived from
#[derive(Debug, Clone, Serialize)]
pub struct ProjectionReport {
    /// Day-by-day projection
    #[serde(flatten)]
    pub projection: WeightProjection,
    /// Where the daily intake came from
    pub intake_source: IntakeSource,
    /// Starting weight (kg)
    pub start_weight_kg: f64,
    /// Date of the starting weight
    pub start_date: NaiveDate,
    /// Number of logged days averaged, when the intake came from the diary
    pub logged_days: usize,
}

/// Project the user's weight from their profile, latest weight, and intake history
///
/// # Errors
///
/// Returns `MISSING_REQUIRED_FIELD` without a logged weight or complete profile, `INVALID_INPUT` for bad parameters
pub async fn weight_projection(
    db: &Database,
    config: &NutritionConfig,
    user_id: Uuid,
    today: NaiveDate,
    days: Option<u32>,
    goal_weight_kg: Option<f64>,
) -> AppResult<ProjectionReport> {
    let latest = db
        .tracking()
        .latest_weight(user_id, today)
        .await?
        .ok_or_else(|| {
            AppError::new(
                ErrorCode::MissingRequiredField,
                "Log a body weight before requesting a projection",
            )
        })?;
    let profile = db.users().get_profile(user_id).await?;
    let (height_cm, age, sex) = profile.require_metrics(today)?;
    let goals = db.tracking().get_goals(user_id).await?;

    let logged = recent_daily_calories(
        db,
        user_id,
        today,
        defaults::PROJECTION_INTAKE_WINDOW_DAYS,
    )
    .await?;

    let bmr = calculate_mifflin_st_jeor(latest.weight_kg, height_cm, age, sex, &config.bmr)?;
    let tdee = calculate_tdee(bmr, profile.activity_level, &config.activity_factors)?;
    let (daily_intake_kcal, intake_source) = select_projection_intake(&logged, goals.calories, tdee);

    let params = ProjectionParams {
        start_weight_kg: latest.weight_kg,
        height_cm,
        age,
        sex,
        activity_level: profile.activity_level,
        daily_intake_kcal: daily_intake_kcal.min(limits::MAX_DAILY_INTAKE_KCAL),
        days: days.unwrap_or(defaults::PROJECTION_DAYS),
        start_date: latest.date,
        goal_weight_kg: goal_weight_kg.or(goals.goal_weight_kg),
    };
    let projection = calculate_weight_projection(&params, config)?;

    debug!(
        %user_id,
        intake = daily_intake_kcal,
        source = ?intake_source,
        final_weight = projection.final_weight_kg,
        "Weight projection computed"
    );
    Ok(ProjectionReport {
        projection,
        intake_source,
        start_weight_kg: latest.weight_kg,
        start_date: latest.date,
        logged_days: logged.len(),
    })
}

/// Suggest daily targets from the profile and latest weight
///
/// # Errors
///
/// Returns `MISSING_REQUIRED_FIELD` without a logged weight or complete profile
pub async fn suggested_goals(
    db: &Database,
    config: &NutritionConfig,
    user_id: Uuid,
    today: NaiveDate,
    goal: GoalKind,
) -> AppResult<DailyNutritionNeeds> {
    let latest = db
        .tracking()
        .latest_weight(user_id, today)
        .await?
        .ok_or_else(|| {
            AppError::new(
                ErrorCode::MissingRequiredField,
                "Log a body weight before requesting suggested goals",
            )
        })?;
    let profile = db.users().get_profile(user_id).await?;
    let (height_cm, age, sex) = profile.require_metrics(today)?;

    calculate_daily_nutrition_needs(
        &DailyNutritionParams {
            weight_kg: latest.weight_kg,
            height_cm,
            age,
            sex,
            activity_level: profile.activity_level,
            goal,
        },
        config,
    )
}
