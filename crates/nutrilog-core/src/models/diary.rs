// ABOUTME: Food references and loggable items shared by diary entries and recipe ingredients
// ABOUTME: FoodRef enforces the exactly-one-of USDA / MyFood / Recipe reference rule
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::limits;
use crate::errors::{AppError, AppResult};

/// Meal a diary entry belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    /// Breakfast meal
    Breakfast,
    /// Lunch meal
    Lunch,
    /// Dinner meal
    Dinner,
    /// Snack between meals
    Snack,
    /// Unspecified or other meal type
    Other,
}

impl MealType {
    /// Every meal, in the order a day summary lists them
    pub const ALL: [Self; 5] = [
        Self::Breakfast,
        Self::Lunch,
        Self::Dinner,
        Self::Snack,
        Self::Other,
    ];

    /// Parse meal type from string, falling back to `Other`
    #[must_use]
    pub fn from_str_lossy(s: &str) -> Self {
        s.parse().unwrap_or(Self::Other)
    }

    /// Database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
            Self::Other => "other",
        }
    }
}

impl Display for MealType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MealType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "breakfast" => Ok(Self::Breakfast),
            "lunch" => Ok(Self::Lunch),
            "dinner" => Ok(Self::Dinner),
            "snack" => Ok(Self::Snack),
            "other" => Ok(Self::Other),
            _ => Err(AppError::invalid_input(format!("Invalid meal type: {s}"))),
        }
    }
}

/// Reference to exactly one nutrient source
///
/// Serialized as `{"kind": "usda", "id": 171688}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum FoodRef {
    /// USDA reference food by FDC id
    Usda(i64),
    /// User-defined food
    MyFood(Uuid),
    /// Recipe, expanded recursively
    Recipe(Uuid),
}

impl FoodRef {
    /// Build a reference from the three nullable columns used by the database
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` unless exactly one column is set or when an id is malformed
    pub fn from_columns(
        fdc_id: Option<i64>,
        my_food_id: Option<&str>,
        recipe_id: Option<&str>,
    ) -> AppResult<Self> {
        match (fdc_id, my_food_id, recipe_id) {
            (Some(fdc_id), None, None) => Ok(Self::Usda(fdc_id)),
            (None, Some(id), None) => Uuid::parse_str(id)
                .map(Self::MyFood)
                .map_err(|e| AppError::invalid_input(format!("Invalid food id: {e}"))),
            (None, None, Some(id)) => Uuid::parse_str(id)
                .map(Self::Recipe)
                .map_err(|e| AppError::invalid_input(format!("Invalid recipe id: {e}"))),
            _ => Err(AppError::invalid_input(
                "Exactly one of fdc_id, my_food_id, or recipe_id must be set",
            )),
        }
    }

    /// Build a reference from optional request fields
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` unless exactly one field is set
    pub fn from_options(
        fdc_id: Option<i64>,
        my_food_id: Option<Uuid>,
        recipe_id: Option<Uuid>,
    ) -> AppResult<Self> {
        match (fdc_id, my_food_id, recipe_id) {
            (Some(fdc_id), None, None) => Ok(Self::Usda(fdc_id)),
            (None, Some(id), None) => Ok(Self::MyFood(id)),
            (None, None, Some(id)) => Ok(Self::Recipe(id)),
            _ => Err(AppError::invalid_input(
                "Exactly one of fdc_id, my_food_id, or recipe_id must be set",
            )),
        }
    }

    /// Split into `(fdc_id, my_food_id, recipe_id)` database columns
    #[must_use]
    pub fn to_columns(&self) -> (Option<i64>, Option<String>, Option<String>) {
        match self {
            Self::Usda(fdc_id) => (Some(*fdc_id), None, None),
            Self::MyFood(id) => (None, Some(id.to_string()), None),
            Self::Recipe(id) => (None, None, Some(id.to_string())),
        }
    }
}

impl Display for FoodRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Usda(fdc_id) => write!(f, "usda:{fdc_id}"),
            Self::MyFood(id) => write!(f, "my_food:{id}"),
            Self::Recipe(id) => write!(f, "recipe:{id}"),
        }
    }
}

/// A food reference with a logged gram amount
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoggableItem {
    /// What was eaten
    pub food: FoodRef,
    /// How much, in grams
    pub amount_grams: f64,
}

impl LoggableItem {
    /// Create a new loggable item
    #[must_use]
    pub const fn new(food: FoodRef, amount_grams: f64) -> Self {
        Self { food, amount_grams }
    }
}

/// Validate a logged or ingredient gram amount
///
/// # Errors
///
/// Returns `INVALID_INPUT` when the amount is not finite, not positive, or implausibly large
pub fn validate_amount_grams(amount_grams: f64) -> AppResult<()> {
    if !amount_grams.is_finite() || amount_grams <= 0.0 {
        return Err(AppError::invalid_input("amount_grams must be greater than 0"));
    }
    if amount_grams > limits::MAX_LOGGED_GRAMS {
        return Err(AppError::invalid_input(format!(
            "amount_grams must not exceed {}",
            limits::MAX_LOGGED_GRAMS
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meal_type_parse() {
        assert_eq!("Dinner".parse::<MealType>().unwrap(), MealType::Dinner);
        assert!("brunch".parse::<MealType>().is_err());
        assert_eq!(MealType::from_str_lossy("brunch"), MealType::Other);
    }

    #[test]
    fn test_food_ref_requires_exactly_one_column() {
        assert_eq!(
            FoodRef::from_columns(Some(1), None, None).unwrap(),
            FoodRef::Usda(1)
        );
        assert!(FoodRef::from_columns(None, None, None).is_err());
        assert!(FoodRef::from_columns(Some(1), Some("x"), None).is_err());
        assert!(FoodRef::from_columns(None, Some("not-a-uuid"), None).is_err());
    }

    #[test]
    fn test_food_ref_columns_roundtrip() {
        let id = Uuid::new_v4();
        let (fdc, my_food, recipe) = FoodRef::Recipe(id).to_columns();
        let parsed =
            FoodRef::from_columns(fdc, my_food.as_deref(), recipe.as_deref()).unwrap();
        assert_eq!(parsed, FoodRef::Recipe(id));
    }

    #[test]
    fn test_food_ref_json_shape() {
        let json = serde_json::to_value(FoodRef::Usda(171_688)).unwrap();
        assert_eq!(json["kind"], "usda");
        assert_eq!(json["id"], 171_688);
    }

    #[test]
    fn test_validate_amount_grams() {
        assert!(validate_amount_grams(150.0).is_ok());
        assert!(validate_amount_grams(0.0).is_err());
        assert!(validate_amount_grams(f64::NAN).is_err());
        assert!(validate_amount_grams(1e9).is_err());
    }
}
