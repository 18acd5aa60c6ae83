// ABOUTME: Day-by-day body weight projection from average calorie intake
// ABOUTME: Recomputes Mifflin-St Jeor BMR and TDEE each day as the weight changes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Weight Projection
//!
//! For each projected day the energy balance `intake - TDEE` is converted to
//! body mass at 7700 kcal/kg. BMR is recomputed from the running weight so the
//! curve flattens as the user approaches a new equilibrium.

use chrono::{Days, NaiveDate};
use nutrilog_core::constants::limits;
use nutrilog_core::errors::{AppError, AppResult};
use nutrilog_core::models::{ActivityLevel, Sex};
use serde::{Deserialize, Serialize};

use crate::config::NutritionConfig;
use crate::nutrition_calculator::{activity_factor, mifflin_st_jeor_unchecked, validate_body_metrics};

/// Inputs to a weight projection
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProjectionParams {
    /// Weight on the start date (kg)
    pub start_weight_kg: f64,
    /// Height (cm)
    pub height_cm: f64,
    /// Age (years)
    pub age: u32,
    /// Sex for the BMR equation
    pub sex: Sex,
    /// Activity level for TDEE
    pub activity_level: ActivityLevel,
    /// Average daily calorie intake (kcal)
    pub daily_intake_kcal: f64,
    /// Number of days to project
    pub days: u32,
    /// Date of the starting weight
    pub start_date: NaiveDate,
    /// Optional goal weight (kg)
    pub goal_weight_kg: Option<f64>,
}

/// One projected day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    /// Projected date
    pub date: NaiveDate,
    /// Weight at the end of the day (kg)
    pub weight_kg: f64,
    /// TDEE used for the day (kcal)
    pub tdee: f64,
}

/// Complete projection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightProjection {
    /// Daily points, one per projected day
    pub points: Vec<ProjectionPoint>,
    /// Weight on the last projected day (kg)
    pub final_weight_kg: f64,
    /// `final_weight_kg - start_weight_kg`
    pub total_change_kg: f64,
    /// First date the projection reaches or crosses the goal weight
    pub goal_reached_on: Option<NaiveDate>,
    /// Whether the projection stopped early at the minimum weight
    pub stopped_at_floor: bool,
    /// Intake the projection was run with (kcal/day)
    pub daily_intake_kcal: f64,
}

/// Validate projection inputs
///
/// # Errors
///
/// Returns `INVALID_INPUT` for any value outside its accepted range
pub fn validate_projection_params(
    params: &ProjectionParams,
    config: &NutritionConfig,
) -> AppResult<()> {
    validate_body_metrics(params.start_weight_kg, params.height_cm, params.age)?;

    if !params.daily_intake_kcal.is_finite()
        || !(0.0..=limits::MAX_DAILY_INTAKE_KCAL).contains(&params.daily_intake_kcal)
    {
        return Err(AppError::invalid_input(
            "Daily intake must be between 0 and 20000 kcal",
        ));
    }
    if params.days == 0 || params.days > config.projection.max_days {
        return Err(AppError::invalid_input(format!(
            "Projection days must be between 1 and {}",
            config.projection.max_days
        )));
    }
    if let Some(goal) = params.goal_weight_kg {
        if !goal.is_finite() || goal <= 0.0 || goal > limits::MAX_BODY_WEIGHT_KG {
            return Err(AppError::invalid_input(
                "Goal weight must be between 0 and 300 kg",
            ));
        }
    }
    Ok(())
}

/// Project body weight day by day
///
/// # Errors
///
/// Returns `INVALID_INPUT` when the parameters fail validation
pub fn calculate_weight_projection(
    params: &ProjectionParams,
    config: &NutritionConfig,
) -> AppResult<WeightProjection> {
    validate_projection_params(params, config)?;

    let factor = activity_factor(params.activity_level, &config.activity_factors);
    let floor = config.projection.min_weight_kg;
    let goal = params.goal_weight_kg;

    let mut weight = params.start_weight_kg;
    let mut points = Vec::with_capacity(params.days as usize);
    let mut goal_reached_on = goal
        .filter(|g| (g - weight).abs() < f64::EPSILON)
        .map(|_| params.start_date);
    let mut stopped_at_floor = false;

    for day in 1..=params.days {
        let bmr = mifflin_st_jeor_unchecked(
            weight,
            params.height_cm,
            params.age,
            params.sex,
            &config.bmr,
        );
        let tdee = bmr * factor;
        let change = (params.daily_intake_kcal - tdee) / config.projection.kcal_per_kg;

        // Only a loss can hit the floor; a start already below it never drops further
        if change < 0.0 && weight + change <= floor {
            weight = weight.min(floor);
            stopped_at_floor = true;
        } else {
            weight += change;
        }

        let date = params
            .start_date
            .checked_add_days(Days::new(u64::from(day)))
            .ok_or_else(|| AppError::invalid_input("Projection runs past the supported date range"))?;
        points.push(ProjectionPoint {
            date,
            weight_kg: weight,
            tdee,
        });

        if goal_reached_on.is_none() {
            if let Some(goal) = goal {
                if crossed(params.start_weight_kg, goal, weight) {
                    goal_reached_on = Some(date);
                }
            }
        }

        if stopped_at_floor {
            break;
        }
    }

    Ok(WeightProjection {
        points,
        final_weight_kg: weight,
        total_change_kg: weight - params.start_weight_kg,
        goal_reached_on,
        stopped_at_floor,
        daily_intake_kcal: params.daily_intake_kcal,
    })
}

fn crossed(start: f64, goal: f64, current: f64) -> bool {
    if goal < start {
        current <= goal
    } else {
        current >= goal
    }
}

/// Where the projection intake came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeSource {
    /// Mean of recently logged daily totals
    LoggedAverage,
    /// The user's calorie goal
    CalorieGoal,
    /// Maintenance (TDEE) because nothing else was available
    Maintenance,
}

/// Choose the intake for a projection
///
/// Logged daily totals win, then the calorie goal, then maintenance.
#[must_use]
pub fn select_projection_intake(
    logged_daily_kcal: &[f64],
    calorie_goal: Option<f64>,
    tdee: f64,
) -> (f64, IntakeSource) {
    if !logged_daily_kcal.is_empty() {
        let mean = logged_daily_kcal.iter().sum::<f64>() / logged_daily_kcal.len() as f64;
        return (mean, IntakeSource::LoggedAverage);
    }
    calorie_goal.map_or((tdee, IntakeSource::Maintenance), |goal| {
        (goal, IntakeSource::CalorieGoal)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition_calculator::{calculate_mifflin_st_jeor, calculate_tdee};

    fn params(intake: f64, days: u32) -> ProjectionParams {
        ProjectionParams {
            start_weight_kg: 90.0,
            height_cm: 180.0,
            age: 40,
            sex: Sex::Male,
            activity_level: ActivityLevel::Sedentary,
            daily_intake_kcal: intake,
            days,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            goal_weight_kg: None,
        }
    }

    fn maintenance(p: &ProjectionParams, config: &NutritionConfig) -> f64 {
        let bmr =
            calculate_mifflin_st_jeor(p.start_weight_kg, p.height_cm, p.age, p.sex, &config.bmr)
                .unwrap();
        calculate_tdee(bmr, p.activity_level, &config.activity_factors).unwrap()
    }

    #[test]
    fn test_first_day_matches_energy_balance() {
        let config = NutritionConfig::default();
        let p = params(1500.0, 30);
        let tdee = maintenance(&p, &config);

        let projection = calculate_weight_projection(&p, &config).unwrap();
        let first = projection.points[0];
        assert!((first.tdee - tdee).abs() < 1e-9);
        assert!((first.weight_kg - (90.0 + (1500.0 - tdee) / 7700.0)).abs() < 1e-9);
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
        assert_eq!(projection.points.len(), 30);
    }

    #[test]
    fn test_maintenance_intake_holds_weight() {
        let config = NutritionConfig::default();
        let mut p = params(0.0, 90);
        p.daily_intake_kcal = maintenance(&p, &config);

        let projection = calculate_weight_projection(&p, &config).unwrap();
        assert!(projection.total_change_kg.abs() < 1e-9);
    }

    #[test]
    fn test_deficit_loses_weight_monotonically() {
        let config = NutritionConfig::default();
        let projection = calculate_weight_projection(&params(1400.0, 180), &config).unwrap();
        assert!(projection.total_change_kg < 0.0);
        assert!(projection
            .points
            .windows(2)
            .all(|w| w[1].weight_kg < w[0].weight_kg));
        // TDEE falls as weight falls
        assert!(projection.points[179].tdee < projection.points[0].tdee);
    }

    #[test]
    fn test_goal_date_found_and_absent() {
        let config = NutritionConfig::default();
        let mut p = params(1400.0, 365);
        p.goal_weight_kg = Some(85.0);
        let projection = calculate_weight_projection(&p, &config).unwrap();
        let reached = projection.goal_reached_on.unwrap();
        let point = projection.points.iter().find(|pt| pt.date == reached).unwrap();
        assert!(point.weight_kg <= 85.0);

        p.goal_weight_kg = Some(95.0);
        let projection = calculate_weight_projection(&p, &config).unwrap();
        assert_eq!(projection.goal_reached_on, None);
    }

    #[test]
    fn test_stops_at_floor() {
        let config = NutritionConfig::default();
        let mut p = params(0.0, 730);
        p.start_weight_kg = 35.0;
        let projection = calculate_weight_projection(&p, &config).unwrap();
        assert!(projection.stopped_at_floor);
        assert!(projection.points.len() < 730);
        assert!((projection.final_weight_kg - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_light_start_weight_gains_normally() {
        let config = NutritionConfig::default();
        let mut p = params(1500.0, 30);
        p.start_weight_kg = 25.0;
        p.height_cm = 140.0;
        p.age = 12;
        p.sex = Sex::Female;

        let projection = calculate_weight_projection(&p, &config).unwrap();
        assert!(!projection.stopped_at_floor);
        assert_eq!(projection.points.len(), 30);
        let first = projection.points[0].weight_kg;
        assert!(first > 25.0 && first < 26.0, "first day was {first}");
        assert!(projection
            .points
            .windows(2)
            .all(|w| w[1].weight_kg > w[0].weight_kg));
    }

    #[test]
    fn test_light_start_weight_losing_holds_and_stops() {
        let config = NutritionConfig::default();
        let mut p = params(0.0, 30);
        p.start_weight_kg = 25.0;
        p.height_cm = 140.0;
        p.age = 12;
        p.sex = Sex::Female;

        let projection = calculate_weight_projection(&p, &config).unwrap();
        assert!(projection.stopped_at_floor);
        assert_eq!(projection.points.len(), 1);
        assert!((projection.final_weight_kg - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_validation() {
        let config = NutritionConfig::default();
        assert!(calculate_weight_projection(&params(1500.0, 0), &config).is_err());
        assert!(calculate_weight_projection(&params(1500.0, 731), &config).is_err());
        assert!(calculate_weight_projection(&params(-1.0, 30), &config).is_err());
        assert!(calculate_weight_projection(&params(20_001.0, 30), &config).is_err());

        let mut p = params(1500.0, 30);
        p.age = 9;
        assert!(calculate_weight_projection(&p, &config).is_err());
        p.age = 40;
        p.start_weight_kg = 301.0;
        assert!(calculate_weight_projection(&p, &config).is_err());
    }

    #[test]
    fn test_select_projection_intake() {
        assert_eq!(
            select_projection_intake(&[1800.0, 2200.0], Some(1500.0), 2500.0),
            (2000.0, IntakeSource::LoggedAverage)
        );
        assert_eq!(
            select_projection_intake(&[], Some(1500.0), 2500.0),
            (1500.0, IntakeSource::CalorieGoal)
        );
        assert_eq!(
            select_projection_intake(&[], None, 2500.0),
            (2500.0, IntakeSource::Maintenance)
        );
    }
}
