// ABOUTME: Exercise energy estimation from MET values, body weight, and duration
// ABOUTME: Built-in MET table for common activities with a default for unknown ones
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Exercise calorie estimation
//!
//! `kcal = MET x weight_kg x hours`
//!
//! Reference: Ainsworth, B.E., et al. (2011). Compendium of Physical Activities.
//! *Medicine & Science in Sports & Exercise*, 43(8), 1575-1581.

use nutrilog_core::errors::{AppError, AppResult};

/// MET used for activities not in the table
pub const DEFAULT_MET: f64 = 4.0;

/// Built-in MET values, keyed by a lowercase keyword
const MET_TABLE: &[(&str, f64)] = &[
    ("walking", 3.5),
    ("walk", 3.5),
    ("running", 9.8),
    ("run", 9.8),
    ("jogging", 9.8),
    ("cycling", 7.5),
    ("bike", 7.5),
    ("biking", 7.5),
    ("swimming", 8.0),
    ("swim", 8.0),
    ("strength training", 5.0),
    ("strength", 5.0),
    ("weightlifting", 5.0),
    ("weights", 5.0),
    ("yoga", 2.5),
    ("hiking", 6.0),
    ("hike", 6.0),
    ("rowing", 7.0),
    ("row", 7.0),
];

/// MET value for an activity name
///
/// The name is matched case-insensitively, first exactly and then by keyword.
#[must_use]
pub fn met_for_activity(activity: &str) -> f64 {
    let normalized = activity.trim().to_lowercase();
    if let Some((_, met)) = MET_TABLE.iter().find(|(name, _)| *name == normalized) {
        return *met;
    }
    normalized
        .split(|c: char| !c.is_alphanumeric())
        .find_map(|word| {
            MET_TABLE
                .iter()
                .find(|(name, _)| *name == word)
                .map(|(_, met)| *met)
        })
        .unwrap_or(DEFAULT_MET)
}

/// Estimate calories burned
///
/// # Errors
///
/// Returns `INVALID_INPUT` when the duration or weight is not positive
pub fn estimate_calories_burned(
    activity: &str,
    duration_minutes: f64,
    weight_kg: f64,
) -> AppResult<f64> {
    if !duration_minutes.is_finite() || duration_minutes <= 0.0 {
        return Err(AppError::invalid_input("Duration must be greater than 0"));
    }
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return Err(AppError::invalid_input("Weight must be positive"));
    }
    Ok(met_for_activity(activity) * weight_kg * duration_minutes / 60.0)
}
