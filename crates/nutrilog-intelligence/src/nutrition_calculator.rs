// ABOUTME: Energy expenditure and daily target calculations from a body profile
// ABOUTME: Mifflin-St Jeor BMR, TDEE, goal calorie targets, and macronutrient grams
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Nutrition Calculator
//!
//! # Scientific References
//!
//! - Mifflin, M.D., et al. (1990). A new predictive equation for resting energy expenditure.
//!   *American Journal of Clinical Nutrition*, 51(2), 241-247.
//!   <https://doi.org/10.1093/ajcn/51.2.241>
//!
//! - Phillips, S.M., & Van Loon, L.J. (2011). Dietary protein for athletes.
//!   *Journal of Sports Sciences*, 29(sup1), S29-S38.
//!   <https://doi.org/10.1080/02640414.2011.619204>
//!
//! - Burke, L.M., et al. (2011). Carbohydrates for training and competition.
//!   *Journal of Sports Sciences*, 29(sup1), S17-S27.
//!   <https://doi.org/10.1080/02640414.2011.585473>

use nutrilog_core::constants::{energy, limits};
use nutrilog_core::errors::{AppError, AppResult};
use nutrilog_core::models::{ActivityLevel, GoalKind, Sex};
use serde::{Deserialize, Serialize};

use crate::config::{
    ActivityFactorsConfig, BmrConfig, GoalAdjustmentConfig, MacronutrientConfig,
    NutritionConfig,
};

/// Complete daily nutrition targets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyNutritionNeeds {
    /// Basal Metabolic Rate (BMR) in kcal/day
    pub bmr: f64,
    /// Total Daily Energy Expenditure (TDEE) in kcal/day
    pub tdee: f64,
    /// Daily calorie target after the goal adjustment
    pub calories: f64,
    /// Recommended daily protein (grams)
    pub protein_g: f64,
    /// Recommended daily carbohydrates (grams)
    pub carbs_g: f64,
    /// Recommended daily fats (grams)
    pub fat_g: f64,
    /// Recommended daily fiber (grams)
    pub fiber_g: f64,
    /// Macronutrient percentages
    pub macro_percentages: MacroPercentages,
    /// Calculation method used
    pub method: String,
    /// Activity level used
    pub activity_level: ActivityLevel,
    /// Goal used
    pub goal: GoalKind,
}

/// Macronutrient percentage breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacroPercentages {
    /// Protein as percentage of total calories
    pub protein_percent: f64,
    /// Carbohydrates as percentage of total calories
    pub carbs_percent: f64,
    /// Fat as percentage of total calories
    pub fat_percent: f64,
}

/// Validate the body metrics accepted by the BMR equation
///
/// # Errors
///
/// Returns `INVALID_INPUT` when weight, height, or age are outside the validated ranges
pub fn validate_body_metrics(weight_kg: f64, height_cm: f64, age: u32) -> AppResult<()> {
    if !weight_kg.is_finite() || weight_kg <= 0.0 || weight_kg > limits::MAX_BODY_WEIGHT_KG {
        return Err(AppError::invalid_input(
            "Weight must be between 0 and 300 kg",
        ));
    }
    if !height_cm.is_finite() || height_cm <= 0.0 || height_cm > limits::MAX_HEIGHT_CM {
        return Err(AppError::invalid_input(
            "Height must be between 0 and 300 cm",
        ));
    }
    if !(10..=120).contains(&age) {
        return Err(AppError::invalid_input(
            "Age must be between 10 and 120 years",
        ));
    }
    Ok(())
}

/// Calculate Basal Metabolic Rate using the Mifflin-St Jeor equation (1990)
///
/// Formula: BMR = (10 x `weight_kg`) + (6.25 x `height_cm`) - (5 x age) + `sex_offset`
/// - Men: +5
/// - Women: -161
///
/// The result is floored at `config.min_bmr_kcal`.
///
/// # Errors
///
/// Returns an error if input values are out of valid ranges
pub fn calculate_mifflin_st_jeor(
    weight_kg: f64,
    height_cm: f64,
    age: u32,
    sex: Sex,
    config: &BmrConfig,
) -> AppResult<f64> {
    validate_body_metrics(weight_kg, height_cm, age)?;
    Ok(mifflin_st_jeor_unchecked(weight_kg, height_cm, age, sex, config))
}

/// Mifflin-St Jeor without input validation, for callers that already validated
pub(crate) fn mifflin_st_jeor_unchecked(
    weight_kg: f64,
    height_cm: f64,
    age: u32,
    sex: Sex,
    config: &BmrConfig,
) -> f64 {
    let sex_constant = match sex {
        Sex::Male => config.msj_male_constant,
        Sex::Female => config.msj_female_constant,
    };

    let bmr = config.msj_age_coef.mul_add(
        f64::from(age),
        config
            .msj_weight_coef
            .mul_add(weight_kg, config.msj_height_coef * height_cm),
    ) + sex_constant;

    bmr.max(config.min_bmr_kcal)
}

/// Activity multiplier for a level
#[must_use]
pub const fn activity_factor(activity_level: ActivityLevel, config: &ActivityFactorsConfig) -> f64 {
    match activity_level {
        ActivityLevel::Sedentary => config.sedentary,
        ActivityLevel::LightlyActive => config.lightly_active,
        ActivityLevel::ModeratelyActive => config.moderately_active,
        ActivityLevel::VeryActive => config.very_active,
        ActivityLevel::ExtraActive => config.extra_active,
    }
}

/// Calculate Total Daily Energy Expenditure (TDEE)
///
/// Formula: TDEE = BMR x Activity Factor
///
/// # Errors
///
/// Returns an error if BMR is not positive
pub fn calculate_tdee(
    bmr: f64,
    activity_level: ActivityLevel,
    config: &ActivityFactorsConfig,
) -> AppResult<f64> {
    if bmr <= 0.0 {
        return Err(AppError::invalid_input("BMR must be positive"));
    }
    Ok(bmr * activity_factor(activity_level, config))
}

/// Daily calorie target for a goal, never below BMR
#[must_use]
pub fn calculate_calorie_target(
    bmr: f64,
    tdee: f64,
    goal: GoalKind,
    config: &GoalAdjustmentConfig,
) -> f64 {
    let target = match goal {
        GoalKind::WeightLoss => tdee - config.weight_loss_deficit_kcal,
        GoalKind::Maintenance => tdee,
        GoalKind::MuscleGain => tdee + config.muscle_gain_surplus_kcal,
    };
    target.max(bmr)
}

/// Calculate recommended daily protein intake
///
/// Formula: Protein (g) = `weight_kg` x `protein_factor`
///
/// Weight loss and muscle gain use elevated targets regardless of activity
/// (muscle preservation and synthesis respectively).
///
/// # Errors
///
/// Returns an error if weight is not positive
pub fn calculate_protein_needs(
    weight_kg: f64,
    activity_level: ActivityLevel,
    goal: GoalKind,
    config: &MacronutrientConfig,
) -> AppResult<f64> {
    if weight_kg <= 0.0 {
        return Err(AppError::invalid_input("Weight must be positive"));
    }

    let protein_g_per_kg = match (activity_level, goal) {
        (_, GoalKind::WeightLoss) => config.protein_weight_loss_g_per_kg,
        (_, GoalKind::MuscleGain) => config.protein_muscle_gain_g_per_kg,
        (ActivityLevel::Sedentary, GoalKind::Maintenance) => config.protein_min_g_per_kg,
        (
            ActivityLevel::LightlyActive | ActivityLevel::ModeratelyActive,
            GoalKind::Maintenance,
        ) => config.protein_moderate_g_per_kg,
        (ActivityLevel::VeryActive | ActivityLevel::ExtraActive, GoalKind::Maintenance) => {
            config.protein_active_g_per_kg
        }
    };

    Ok(weight_kg * protein_g_per_kg)
}

/// Calculate the activity-based carbohydrate ceiling
///
/// Formula: Carbs (g) = `weight_kg` x `carb_factor`
///
/// # Errors
///
/// Returns an error if weight is not positive
pub fn calculate_carb_needs(
    weight_kg: f64,
    activity_level: ActivityLevel,
    config: &MacronutrientConfig,
) -> AppResult<f64> {
    if weight_kg <= 0.0 {
        return Err(AppError::invalid_input("Weight must be positive"));
    }

    let carbs_g_per_kg = match activity_level {
        ActivityLevel::Sedentary | ActivityLevel::LightlyActive => {
            config.carbs_low_activity_g_per_kg
        }
        ActivityLevel::ModeratelyActive => config.carbs_moderate_activity_g_per_kg,
        ActivityLevel::VeryActive | ActivityLevel::ExtraActive => {
            config.carbs_high_activity_g_per_kg
        }
    };

    Ok(weight_kg * carbs_g_per_kg)
}

/// Calculate fat from the calories left after protein and carbs
///
/// Fat is bounded to the configured share of the calorie target.
///
/// # Errors
///
/// Returns an error if the calorie target is not positive
pub fn calculate_fat_needs(
    calories: f64,
    protein_g: f64,
    carbs_g: f64,
    config: &MacronutrientConfig,
) -> AppResult<f64> {
    if calories <= 0.0 {
        return Err(AppError::invalid_input("Calorie target must be positive"));
    }

    let remaining_kcal = carbs_g.mul_add(
        -energy::KCAL_PER_G_CARBS,
        protein_g.mul_add(-energy::KCAL_PER_G_PROTEIN, calories),
    );
    let min_fat = calories * config.fat_min_percent / 100.0 / energy::KCAL_PER_G_FAT;
    let max_fat = calories * config.fat_max_percent / 100.0 / energy::KCAL_PER_G_FAT;

    Ok((remaining_kcal / energy::KCAL_PER_G_FAT).clamp(min_fat, max_fat))
}

/// User parameters for daily nutrition calculation
#[derive(Debug, Clone, Copy)]
pub struct DailyNutritionParams {
    /// Body weight in kilograms
    pub weight_kg: f64,
    /// Height in centimeters
    pub height_cm: f64,
    /// Age in years
    pub age: u32,
    /// Sex for the BMR equation
    pub sex: Sex,
    /// Activity level for the TDEE multiplier
    pub activity_level: ActivityLevel,
    /// Body-weight goal
    pub goal: GoalKind,
}

/// Calculate complete daily nutrition targets
///
/// Protein is fixed first. Fat takes its bounded share of what the activity
/// carbohydrate ceiling leaves, and carbohydrates fill the remaining calories.
///
/// # Errors
///
/// Returns an error if any input validation fails
pub fn calculate_daily_nutrition_needs(
    params: &DailyNutritionParams,
    config: &NutritionConfig,
) -> AppResult<DailyNutritionNeeds> {
    let bmr = calculate_mifflin_st_jeor(
        params.weight_kg,
        params.height_cm,
        params.age,
        params.sex,
        &config.bmr,
    )?;
    let tdee = calculate_tdee(bmr, params.activity_level, &config.activity_factors)?;
    let calories = calculate_calorie_target(bmr, tdee, params.goal, &config.goal_adjustments);

    let protein_g = calculate_protein_needs(
        params.weight_kg,
        params.activity_level,
        params.goal,
        &config.macronutrients,
    )?;
    let carbs_ceiling =
        calculate_carb_needs(params.weight_kg, params.activity_level, &config.macronutrients)?;
    let fat_g = calculate_fat_needs(calories, protein_g, carbs_ceiling, &config.macronutrients)?;

    let carbs_room = fat_g.mul_add(
        -energy::KCAL_PER_G_FAT,
        protein_g.mul_add(-energy::KCAL_PER_G_PROTEIN, calories),
    ) / energy::KCAL_PER_G_CARBS;
    let carbs_g = carbs_room.max(0.0);

    let fiber_g = calories / 1000.0 * config.macronutrients.fiber_g_per_1000_kcal;

    let total_kcal = fat_g.mul_add(
        energy::KCAL_PER_G_FAT,
        protein_g.mul_add(energy::KCAL_PER_G_PROTEIN, carbs_g * energy::KCAL_PER_G_CARBS),
    );
    let macro_percentages = MacroPercentages {
        protein_percent: protein_g * energy::KCAL_PER_G_PROTEIN / total_kcal * 100.0,
        carbs_percent: carbs_g * energy::KCAL_PER_G_CARBS / total_kcal * 100.0,
        fat_percent: fat_g * energy::KCAL_PER_G_FAT / total_kcal * 100.0,
    };

    Ok(DailyNutritionNeeds {
        bmr,
        tdee,
        calories,
        protein_g,
        carbs_g,
        fat_g,
        fiber_g,
        macro_percentages,
        method: "Mifflin-St Jeor + Activity Factor".to_owned(),
        activity_level: params.activity_level,
        goal: params.goal,
    })
}
