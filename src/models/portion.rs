// ABOUTME: Named serving-size model attachable to any food reference
// ABOUTME: Converts a quantity of portions into grams
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use nutrilog_core::errors::{AppError, AppResult};
use nutrilog_core::models::FoodRef;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named serving size such as "1 cup"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portion {
    /// Unique identifier
    pub id: Uuid,
    /// Creator; `None` for shared USDA portions
    pub user_id: Option<Uuid>,
    /// Food the portion applies to
    pub food: FoodRef,
    /// Portion name
    pub name: String,
    /// Weight of one portion (g)
    pub gram_weight: f64,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Portion {
    /// Grams for `quantity` portions
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` when the quantity is not positive
    pub fn grams_for(&self, quantity: f64) -> AppResult<f64> {
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(AppError::invalid_input("quantity must be greater than 0"));
        }
        Ok(quantity * self.gram_weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grams_for_quantity() {
        let portion = Portion {
            id: Uuid::new_v4(),
            user_id: None,
            food: FoodRef::Usda(1),
            name: "1 cup".into(),
            gram_weight: 240.0,
            created_at: Utc::now(),
        };
        assert!((portion.grams_for(1.5).unwrap() - 360.0).abs() < 1e-9);
        assert!(portion.grams_for(0.0).is_err());
    }
}
