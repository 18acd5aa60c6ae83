// ABOUTME: Exercise, body weight, and nutrition goal models
// ABOUTME: Validation for logged weights and goal values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, NaiveDate, Utc};
use nutrilog_core::constants::limits;
use nutrilog_core::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A logged exercise session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseEntry {
    /// Unique identifier
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Day of the session
    pub date: NaiveDate,
    /// Activity name
    pub activity: String,
    /// Duration (minutes)
    pub duration_minutes: f64,
    /// Energy expended (kcal)
    pub calories_burned: f64,
    /// Whether `calories_burned` was estimated from MET values
    pub estimated: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// A body weight measurement; one per user per date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    /// Unique identifier
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Measurement date
    pub date: NaiveDate,
    /// Body weight (kg)
    pub weight_kg: f64,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Validate a body weight
///
/// # Errors
///
/// Returns `INVALID_INPUT` unless the weight is in (0, 300] kg
pub fn validate_weight_kg(weight_kg: f64) -> AppResult<()> {
    if !weight_kg.is_finite() || weight_kg <= 0.0 || weight_kg > limits::MAX_BODY_WEIGHT_KG {
        return Err(AppError::invalid_input(
            "Weight must be between 0 and 300 kg",
        ));
    }
    Ok(())
}

/// Daily nutrition targets; every field is optional
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutritionGoals {
    /// Calories (kcal/day)
    pub calories: Option<f64>,
    /// Protein (g/day)
    pub protein_g: Option<f64>,
    /// Carbohydrate (g/day)
    pub carbs_g: Option<f64>,
    /// Fat (g/day)
    pub fat_g: Option<f64>,
    /// Fiber (g/day)
    pub fiber_g: Option<f64>,
    /// Target body weight (kg)
    pub goal_weight_kg: Option<f64>,
}

impl NutritionGoals {
    /// Validate goal values
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for negative or non-finite values, or an out-of-range goal weight
    pub fn validate(&self) -> AppResult<()> {
        for (name, value) in [
            ("calories", self.calories),
            ("protein_g", self.protein_g),
            ("carbs_g", self.carbs_g),
            ("fat_g", self.fat_g),
            ("fiber_g", self.fiber_g),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(AppError::invalid_input(format!(
                        "{name} must be a non-negative number"
                    )));
                }
            }
        }
        if let Some(weight) = self.goal_weight_kg {
            validate_weight_kg(weight)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_validation() {
        assert!(NutritionGoals::default().validate().is_ok());
        let goals = NutritionGoals {
            calories: Some(-5.0),
            ..NutritionGoals::default()
        };
        assert!(goals.validate().is_err());
        let goals = NutritionGoals {
            goal_weight_kg: Some(0.0),
            ..NutritionGoals::default()
        };
        assert!(goals.validate().is_err());
    }

    #[test]
    fn test_weight_bounds() {
        assert!(validate_weight_kg(300.0).is_ok());
        assert!(validate_weight_kg(300.1).is_err());
        assert!(validate_weight_kg(0.0).is_err());
    }
}
