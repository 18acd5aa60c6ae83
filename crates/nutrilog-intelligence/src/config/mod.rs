// ABOUTME: Nutrition algorithm configuration with validated scientific defaults
// ABOUTME: BMR coefficients, activity factors, macronutrient targets, goal adjustments, projection limits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Nutrition Algorithm Configuration
//!
//! # Scientific References
//!
//! - BMR: Mifflin et al. (1990) DOI: 10.1093/ajcn/51.2.241
//! - Protein: Phillips & Van Loon (2011) DOI: 10.1080/02640414.2011.619204
//! - Carbs: Burke et al. (2011) DOI: 10.1080/02640414.2011.585473
//! - Energy density of body mass change: Hall (2008) DOI: 10.1038/ijo.2008.1

use nutrilog_core::constants::{energy, limits};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Numeric value outside valid range for parameter
    #[error("Value out of range: {0}")]
    ValueOutOfRange(String),

    /// Weights don't sum to required total
    #[error("Invalid weights: {0}")]
    InvalidWeights(String),
}

/// Complete configuration for the nutrition algorithms
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NutritionConfig {
    /// Basal Metabolic Rate (BMR) calculation settings
    pub bmr: BmrConfig,
    /// Activity factor multipliers for TDEE calculation
    pub activity_factors: ActivityFactorsConfig,
    /// Macronutrient distribution targets
    pub macronutrients: MacronutrientConfig,
    /// Calorie adjustments per body-weight goal
    pub goal_adjustments: GoalAdjustmentConfig,
    /// Weight projection settings
    pub projection: ProjectionConfig,
}

impl NutritionConfig {
    /// Validate every section
    ///
    /// # Errors
    ///
    /// Returns the first section that fails validation
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bmr.validate()?;
        self.activity_factors.validate()?;
        self.macronutrients.validate()?;
        self.projection.validate()
    }
}

/// BMR (Basal Metabolic Rate) calculation configuration
///
/// Reference: Mifflin, M.D., et al. (1990). A new predictive equation for resting energy expenditure.
/// American Journal of Clinical Nutrition, 51(2), 241-247. DOI: 10.1093/ajcn/51.2.241
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BmrConfig {
    /// Mifflin-St Jeor weight coefficient (10.0)
    pub msj_weight_coef: f64,
    /// Mifflin-St Jeor height coefficient (6.25)
    pub msj_height_coef: f64,
    /// Mifflin-St Jeor age coefficient (-5.0)
    pub msj_age_coef: f64,
    /// Mifflin-St Jeor male constant (+5)
    pub msj_male_constant: f64,
    /// Mifflin-St Jeor female constant (-161)
    pub msj_female_constant: f64,
    /// BMR never reported below this value (kcal/day)
    pub min_bmr_kcal: f64,
}

impl Default for BmrConfig {
    fn default() -> Self {
        Self {
            msj_weight_coef: 10.0,
            msj_height_coef: 6.25,
            msj_age_coef: -5.0,
            msj_male_constant: 5.0,
            msj_female_constant: -161.0,
            min_bmr_kcal: 1000.0,
        }
    }
}

impl BmrConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.min_bmr_kcal <= 0.0 {
            return Err(ConfigError::ValueOutOfRange(format!(
                "min_bmr_kcal must be positive, got {}",
                self.min_bmr_kcal
            )));
        }
        Ok(())
    }
}

/// Activity factor multipliers for TDEE calculation
///
/// Reference: `McArdle`, W.D., Katch, F.I., & Katch, V.L. (2010). Exercise Physiology
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityFactorsConfig {
    /// Sedentary (little/no exercise): 1.2
    pub sedentary: f64,
    /// Lightly active (1-3 days/week): 1.375
    pub lightly_active: f64,
    /// Moderately active (3-5 days/week): 1.55
    pub moderately_active: f64,
    /// Very active (6-7 days/week): 1.725
    pub very_active: f64,
    /// Extra active (hard training 2x/day): 1.9
    pub extra_active: f64,
}

impl Default for ActivityFactorsConfig {
    fn default() -> Self {
        Self {
            sedentary: 1.2,
            lightly_active: 1.375,
            moderately_active: 1.55,
            very_active: 1.725,
            extra_active: 1.9,
        }
    }
}

impl ActivityFactorsConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let factors = [
            ("sedentary", self.sedentary),
            ("lightly_active", self.lightly_active),
            ("moderately_active", self.moderately_active),
            ("very_active", self.very_active),
            ("extra_active", self.extra_active),
        ];
        for (name, factor) in factors {
            if !(1.0..=2.5).contains(&factor) {
                return Err(ConfigError::ValueOutOfRange(format!(
                    "{name} activity factor must be between 1.0 and 2.5, got {factor}"
                )));
            }
        }
        Ok(())
    }
}

/// Macronutrient recommendation configuration
///
/// References:
/// - Protein: Phillips & Van Loon (2011) DOI: 10.1080/02640414.2011.619204
/// - Carbs: Burke et al. (2011) DOI: 10.1080/02640414.2011.585473
/// - Fats: DRI (Dietary Reference Intakes)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacronutrientConfig {
    /// Minimum protein (g/kg bodyweight) - sedentary: 0.8
    pub protein_min_g_per_kg: f64,
    /// Moderate activity protein (g/kg): 1.3
    pub protein_moderate_g_per_kg: f64,
    /// Very active protein (g/kg): 1.8
    pub protein_active_g_per_kg: f64,
    /// Weight loss protein for muscle preservation (g/kg): 2.0
    pub protein_weight_loss_g_per_kg: f64,
    /// Muscle gain protein (g/kg): 2.2
    pub protein_muscle_gain_g_per_kg: f64,
    /// Carbs at low activity (g/kg): 3.0
    pub carbs_low_activity_g_per_kg: f64,
    /// Carbs at moderate activity (g/kg): 5.0
    pub carbs_moderate_activity_g_per_kg: f64,
    /// Carbs at high activity (g/kg): 7.0
    pub carbs_high_activity_g_per_kg: f64,
    /// Minimum fat percentage of calorie target: 20%
    pub fat_min_percent: f64,
    /// Maximum fat percentage of calorie target: 35%
    pub fat_max_percent: f64,
    /// Fiber per 1000 kcal (g): 14
    pub fiber_g_per_1000_kcal: f64,
}

impl Default for MacronutrientConfig {
    fn default() -> Self {
        Self {
            protein_min_g_per_kg: 0.8,
            protein_moderate_g_per_kg: 1.3,
            protein_active_g_per_kg: 1.8,
            protein_weight_loss_g_per_kg: 2.0,
            protein_muscle_gain_g_per_kg: 2.2,
            carbs_low_activity_g_per_kg: 3.0,
            carbs_moderate_activity_g_per_kg: 5.0,
            carbs_high_activity_g_per_kg: 7.0,
            fat_min_percent: 20.0,
            fat_max_percent: 35.0,
            fiber_g_per_1000_kcal: 14.0,
        }
    }
}

impl MacronutrientConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.fat_min_percent >= self.fat_max_percent {
            return Err(ConfigError::InvalidWeights(format!(
                "fat_min_percent ({}) must be below fat_max_percent ({})",
                self.fat_min_percent, self.fat_max_percent
            )));
        }
        if !(0.0..=100.0).contains(&self.fat_max_percent) {
            return Err(ConfigError::ValueOutOfRange(format!(
                "fat_max_percent must be between 0 and 100, got {}",
                self.fat_max_percent
            )));
        }
        Ok(())
    }
}

/// Daily calorie adjustment applied to TDEE per goal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalAdjustmentConfig {
    /// Weight loss deficit (kcal/day): 500
    pub weight_loss_deficit_kcal: f64,
    /// Muscle gain surplus (kcal/day): 300
    pub muscle_gain_surplus_kcal: f64,
}

impl Default for GoalAdjustmentConfig {
    fn default() -> Self {
        Self {
            weight_loss_deficit_kcal: 500.0,
            muscle_gain_surplus_kcal: 300.0,
        }
    }
}

/// Weight projection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Energy per kilogram of body mass change (kcal/kg): 7700
    pub kcal_per_kg: f64,
    /// Projection stops at this weight (kg): 30
    pub min_weight_kg: f64,
    /// Longest accepted projection (days): 730
    pub max_days: u32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            kcal_per_kg: energy::KCAL_PER_KG_BODY_MASS,
            min_weight_kg: limits::MIN_PROJECTED_WEIGHT_KG,
            max_days: limits::MAX_PROJECTION_DAYS,
        }
    }
}

impl ProjectionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.kcal_per_kg <= 0.0 {
            return Err(ConfigError::ValueOutOfRange(format!(
                "kcal_per_kg must be positive, got {}",
                self.kcal_per_kg
            )));
        }
        if self.max_days == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "max_days must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(NutritionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_activity_factor_rejected() {
        let mut config = NutritionConfig::default();
        config.activity_factors.very_active = 4.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValueOutOfRange(_))
        ));
    }

    #[test]
    fn test_fat_bounds_must_be_ordered() {
        let mut config = NutritionConfig::default();
        config.macronutrients.fat_min_percent = 40.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWeights(_))
        ));
    }
}
