// ABOUTME: Tracked nutrient definitions and the fixed-size NutrientProfile value type
// ABOUTME: Maps each tracked nutrient to its USDA FoodData Central nutrient id and unit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// A nutrient tracked on every food, recipe, and diary total
///
/// The set matches the FDA "Nutrition Facts" panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NutrientKind {
    /// Energy (kcal)
    Calories,
    /// Protein (g)
    Protein,
    /// Total lipid (g)
    Fat,
    /// Saturated fatty acids (g)
    SaturatedFat,
    /// Trans fatty acids (g)
    TransFat,
    /// Cholesterol (mg)
    Cholesterol,
    /// Sodium (mg)
    Sodium,
    /// Carbohydrate, by difference (g)
    Carbohydrate,
    /// Dietary fiber (g)
    Fiber,
    /// Total sugars (g)
    Sugars,
    /// Added sugars (g)
    AddedSugars,
    /// Vitamin D (µg)
    VitaminD,
    /// Calcium (mg)
    Calcium,
    /// Iron (mg)
    Iron,
    /// Potassium (mg)
    Potassium,
}

impl NutrientKind {
    /// Every tracked nutrient, in label order
    pub const ALL: [Self; 15] = [
        Self::Calories,
        Self::Fat,
        Self::SaturatedFat,
        Self::TransFat,
        Self::Cholesterol,
        Self::Sodium,
        Self::Carbohydrate,
        Self::Fiber,
        Self::Sugars,
        Self::AddedSugars,
        Self::Protein,
        Self::VitaminD,
        Self::Calcium,
        Self::Iron,
        Self::Potassium,
    ];

    /// USDA `FoodData` Central nutrient id
    #[must_use]
    pub const fn usda_nutrient_id(&self) -> i64 {
        match self {
            Self::Calories => 1008,
            Self::Protein => 1003,
            Self::Fat => 1004,
            Self::SaturatedFat => 1258,
            Self::TransFat => 1257,
            Self::Cholesterol => 1253,
            Self::Sodium => 1093,
            Self::Carbohydrate => 1005,
            Self::Fiber => 1079,
            Self::Sugars => 2000,
            Self::AddedSugars => 1235,
            Self::VitaminD => 1114,
            Self::Calcium => 1087,
            Self::Iron => 1089,
            Self::Potassium => 1092,
        }
    }

    /// Look up a tracked nutrient by USDA nutrient id
    #[must_use]
    pub fn from_usda_nutrient_id(id: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.usda_nutrient_id() == id)
    }

    /// Display unit
    #[must_use]
    pub const fn unit(&self) -> &'static str {
        match self {
            Self::Calories => "kcal",
            Self::Cholesterol | Self::Sodium | Self::Calcium | Self::Iron | Self::Potassium => {
                "mg"
            }
            Self::VitaminD => "µg",
            Self::Protein
            | Self::Fat
            | Self::SaturatedFat
            | Self::TransFat
            | Self::Carbohydrate
            | Self::Fiber
            | Self::Sugars
            | Self::AddedSugars => "g",
        }
    }

    /// Label as printed on a nutrition facts panel
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Calories => "Calories",
            Self::Protein => "Protein",
            Self::Fat => "Total Fat",
            Self::SaturatedFat => "Saturated Fat",
            Self::TransFat => "Trans Fat",
            Self::Cholesterol => "Cholesterol",
            Self::Sodium => "Sodium",
            Self::Carbohydrate => "Total Carbohydrate",
            Self::Fiber => "Dietary Fiber",
            Self::Sugars => "Total Sugars",
            Self::AddedSugars => "Added Sugars",
            Self::VitaminD => "Vitamin D",
            Self::Calcium => "Calcium",
            Self::Iron => "Iron",
            Self::Potassium => "Potassium",
        }
    }

    /// FDA daily value used for %DV, when one exists
    #[must_use]
    pub const fn daily_value(&self) -> Option<f64> {
        match self {
            Self::Fat => Some(78.0),
            Self::SaturatedFat => Some(20.0),
            Self::Cholesterol => Some(300.0),
            Self::Sodium => Some(2300.0),
            Self::Carbohydrate => Some(275.0),
            Self::Fiber => Some(28.0),
            Self::AddedSugars => Some(50.0),
            Self::Protein => Some(50.0),
            Self::VitaminD => Some(20.0),
            Self::Calcium => Some(1300.0),
            Self::Iron => Some(18.0),
            Self::Potassium => Some(4700.0),
            Self::Calories | Self::TransFat | Self::Sugars => None,
        }
    }

    /// Snake-case identifier, as used in JSON
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Calories => "calories",
            Self::Protein => "protein",
            Self::Fat => "fat",
            Self::SaturatedFat => "saturated_fat",
            Self::TransFat => "trans_fat",
            Self::Cholesterol => "cholesterol",
            Self::Sodium => "sodium",
            Self::Carbohydrate => "carbohydrate",
            Self::Fiber => "fiber",
            Self::Sugars => "sugars",
            Self::AddedSugars => "added_sugars",
            Self::VitaminD => "vitamin_d",
            Self::Calcium => "calcium",
            Self::Iron => "iron",
            Self::Potassium => "potassium",
        }
    }
}

impl Display for NutrientKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Amounts of every tracked nutrient
///
/// Stored per 100 g on foods and recipes; the same type carries absolute totals
/// once scaled by a logged amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutrientProfile {
    /// Energy (kcal)
    pub calories: f64,
    /// Protein (g)
    pub protein: f64,
    /// Total fat (g)
    pub fat: f64,
    /// Saturated fat (g)
    pub saturated_fat: f64,
    /// Trans fat (g)
    pub trans_fat: f64,
    /// Cholesterol (mg)
    pub cholesterol: f64,
    /// Sodium (mg)
    pub sodium: f64,
    /// Carbohydrate (g)
    pub carbohydrate: f64,
    /// Fiber (g)
    pub fiber: f64,
    /// Total sugars (g)
    pub sugars: f64,
    /// Added sugars (g)
    pub added_sugars: f64,
    /// Vitamin D (µg)
    pub vitamin_d: f64,
    /// Calcium (mg)
    pub calcium: f64,
    /// Iron (mg)
    pub iron: f64,
    /// Potassium (mg)
    pub potassium: f64,
}

impl NutrientProfile {
    /// A profile with every nutrient at zero
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// Build a profile from `(kind, amount)` pairs; unspecified nutrients are zero
    #[must_use]
    pub fn from_pairs(pairs: impl IntoIterator<Item = (NutrientKind, f64)>) -> Self {
        let mut profile = Self::zero();
        for (kind, amount) in pairs {
            profile.set(kind, amount);
        }
        profile
    }

    /// Amount of one nutrient
    #[must_use]
    pub const fn get(&self, kind: NutrientKind) -> f64 {
        match kind {
            NutrientKind::Calories => self.calories,
            NutrientKind::Protein => self.protein,
            NutrientKind::Fat => self.fat,
            NutrientKind::SaturatedFat => self.saturated_fat,
            NutrientKind::TransFat => self.trans_fat,
            NutrientKind::Cholesterol => self.cholesterol,
            NutrientKind::Sodium => self.sodium,
            NutrientKind::Carbohydrate => self.carbohydrate,
            NutrientKind::Fiber => self.fiber,
            NutrientKind::Sugars => self.sugars,
            NutrientKind::AddedSugars => self.added_sugars,
            NutrientKind::VitaminD => self.vitamin_d,
            NutrientKind::Calcium => self.calcium,
            NutrientKind::Iron => self.iron,
            NutrientKind::Potassium => self.potassium,
        }
    }

    /// Mutable access to one nutrient
    pub fn get_mut(&mut self, kind: NutrientKind) -> &mut f64 {
        match kind {
            NutrientKind::Calories => &mut self.calories,
            NutrientKind::Protein => &mut self.protein,
            NutrientKind::Fat => &mut self.fat,
            NutrientKind::SaturatedFat => &mut self.saturated_fat,
            NutrientKind::TransFat => &mut self.trans_fat,
            NutrientKind::Cholesterol => &mut self.cholesterol,
            NutrientKind::Sodium => &mut self.sodium,
            NutrientKind::Carbohydrate => &mut self.carbohydrate,
            NutrientKind::Fiber => &mut self.fiber,
            NutrientKind::Sugars => &mut self.sugars,
            NutrientKind::AddedSugars => &mut self.added_sugars,
            NutrientKind::VitaminD => &mut self.vitamin_d,
            NutrientKind::Calcium => &mut self.calcium,
            NutrientKind::Iron => &mut self.iron,
            NutrientKind::Potassium => &mut self.potassium,
        }
    }

    /// Set one nutrient
    pub fn set(&mut self, kind: NutrientKind, amount: f64) {
        *self.get_mut(kind) = amount;
    }

    /// Every nutrient multiplied by `factor`
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        let mut out = *self;
        for kind in NutrientKind::ALL {
            *out.get_mut(kind) *= factor;
        }
        out
    }

    /// Accumulate `other * factor` into this profile
    pub fn add_scaled(&mut self, other: &Self, factor: f64) {
        for kind in NutrientKind::ALL {
            *self.get_mut(kind) += other.get(kind) * factor;
        }
    }

    /// Whether every nutrient is exactly zero
    #[must_use]
    pub fn is_zero(&self) -> bool {
        NutrientKind::ALL.iter().all(|kind| self.get(*kind) == 0.0)
    }

    /// Validate that every amount is finite and non-negative
    ///
    /// # Errors
    ///
    /// Returns the first offending nutrient
    pub fn validate(&self) -> Result<(), NutrientKind> {
        for kind in NutrientKind::ALL {
            let value = self.get(kind);
            if !value.is_finite() || value < 0.0 {
                return Err(kind);
            }
        }
        Ok(())
    }

    /// Iterate `(kind, amount)` in label order
    pub fn iter(&self) -> impl Iterator<Item = (NutrientKind, f64)> + '_ {
        NutrientKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }
}

impl Add for NutrientProfile {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}

impl AddAssign for NutrientProfile {
    fn add_assign(&mut self, rhs: Self) {
        self.add_scaled(&rhs, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usda_id_roundtrip_covers_every_kind() {
        for kind in NutrientKind::ALL {
            assert_eq!(
                NutrientKind::from_usda_nutrient_id(kind.usda_nutrient_id()),
                Some(kind)
            );
        }
        assert_eq!(NutrientKind::from_usda_nutrient_id(1162), None);
    }

    #[test]
    fn test_scaled_and_add() {
        let apple = NutrientProfile::from_pairs([
            (NutrientKind::Calories, 52.0),
            (NutrientKind::Carbohydrate, 13.81),
        ]);
        let half = apple.scaled(0.5);
        assert!((half.calories - 26.0).abs() < f64::EPSILON);

        let sum = half + half;
        assert!((sum.carbohydrate - 13.81).abs() < 1e-9);
    }

    #[test]
    fn test_validate_rejects_negative() {
        let mut profile = NutrientProfile::zero();
        assert!(profile.validate().is_ok());
        profile.sodium = -1.0;
        assert_eq!(profile.validate(), Err(NutrientKind::Sodium));
    }

    #[test]
    fn test_missing_fields_deserialize_as_zero() {
        let profile: NutrientProfile =
            serde_json::from_str(r#"{"calories": 100.0, "protein": 5.0}"#).unwrap();
        assert!((profile.calories - 100.0).abs() < f64::EPSILON);
        assert!(profile.iron.abs() < f64::EPSILON);
    }
}
