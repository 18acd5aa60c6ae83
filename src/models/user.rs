// ABOUTME: User account and body profile models
// ABOUTME: Account lifecycle including anonymization and public user summaries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use nutrilog_core::constants::limits;
use nutrilog_core::errors::{AppError, AppResult, ErrorCode};
use nutrilog_core::models::{ActivityLevel, Sex};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display name given to anonymized accounts
pub const DELETED_USER_NAME: &str = "Deleted user";

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,
    /// Email address, stored lowercase
    pub email: String,
    /// Display name
    pub display_name: Option<String>,
    /// Bcrypt hash; cleared when the account is anonymized
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// When the account was created
    pub created_at: DateTime<Utc>,
    /// When the account was last changed
    pub updated_at: DateTime<Utc>,
    /// When the account was anonymized
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create a new user with the given email and password hash
    #[must_use]
    pub fn new(email: &str, password_hash: String, display_name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: normalize_email(email),
            display_name,
            password_hash: Some(password_hash),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Whether the account has been anonymized
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Public view used in search results and friend lists
    #[must_use]
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            email: self.email.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

/// Publicly visible user fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// User identifier
    pub id: Uuid,
    /// Email address
    pub email: String,
    /// Display name
    pub display_name: Option<String>,
}

/// Email in its canonical stored form
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Placeholder email for an anonymized account
#[must_use]
pub fn anonymized_email(user_id: Uuid) -> String {
    format!("deleted-{user_id}@deleted.invalid")
}

/// Body measurements used for energy calculations
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyProfile {
    /// Height (cm)
    pub height_cm: Option<f64>,
    /// Date of birth
    pub birth_date: Option<NaiveDate>,
    /// Sex for the BMR equation
    pub sex: Option<Sex>,
    /// Typical activity level
    #[serde(default)]
    pub activity_level: ActivityLevel,
}

impl BodyProfile {
    /// Age in whole years on the given date
    #[must_use]
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        let birth = self.birth_date?;
        let mut years = today.year() - birth.year();
        if (today.month(), today.day()) < (birth.month(), birth.day()) {
            years -= 1;
        }
        u32::try_from(years).ok()
    }

    /// Validate stored values
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` when the height is out of range or the birth date is in the future
    pub fn validate(&self, today: NaiveDate) -> AppResult<()> {
        if let Some(height) = self.height_cm {
            if !height.is_finite() || height <= 0.0 || height > limits::MAX_HEIGHT_CM {
                return Err(AppError::invalid_input(
                    "Height must be between 0 and 300 cm",
                ));
            }
        }
        if let Some(birth) = self.birth_date {
            if birth > today {
                return Err(AppError::invalid_input("Birth date cannot be in the future"));
            }
        }
        Ok(())
    }

    /// Height, age, and sex, or an error naming what is missing
    ///
    /// # Errors
    ///
    /// Returns `MISSING_REQUIRED_FIELD` when the profile is incomplete
    pub fn require_metrics(&self, today: NaiveDate) -> AppResult<(f64, u32, Sex)> {
        let height = self.height_cm.ok_or_else(|| missing("height_cm"))?;
        let age = self.age_on(today).ok_or_else(|| missing("birth_date"))?;
        let sex = self.sex.ok_or_else(|| missing("sex"))?;
        Ok((height, age, sex))
    }
}

fn missing(field: &str) -> AppError {
    AppError::new(
        ErrorCode::MissingRequiredField,
        format!("Profile field {field} is required for this calculation"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_on_handles_birthday() {
        let profile = BodyProfile {
            birth_date: NaiveDate::from_ymd_opt(1990, 6, 15),
            ..BodyProfile::default()
        };
        let before = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap();
        let on = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        assert_eq!(profile.age_on(before), Some(34));
        assert_eq!(profile.age_on(on), Some(35));
    }

    #[test]
    fn test_require_metrics_reports_missing_field() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let profile = BodyProfile {
            height_cm: Some(170.0),
            ..BodyProfile::default()
        };
        let err = profile.require_metrics(today).unwrap_err();
        assert!(err.message.contains("birth_date"));
    }

    #[test]
    fn test_email_helpers() {
        assert_eq!(normalize_email("  Ana@Example.COM "), "ana@example.com");
        let id = Uuid::nil();
        assert_eq!(
            anonymized_email(id),
            "deleted-00000000-0000-0000-0000-000000000000@deleted.invalid"
        );
    }
}
