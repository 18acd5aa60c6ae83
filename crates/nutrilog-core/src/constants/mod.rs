// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Pure data constants for nutrition math, limits, and service identity
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped by domain rather than kept in a single flat namespace.

/// Service identity used in logs and session tokens
pub mod service_names {
    /// Name of the HTTP server binary and default log target
    pub const NUTRILOG_SERVER: &str = "nutrilog-server";
    /// Audience claim of session tokens
    pub const SESSION_AUDIENCE: &str = "nutrilog";
}

/// Network defaults
pub mod ports {
    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 8081;
}

/// Energy and mass conversion constants used by nutrition math
pub mod energy {
    /// Nutrient values are stored per this many grams
    pub const REFERENCE_GRAMS: f64 = 100.0;
    /// Energy stored in one kilogram of body mass change (kcal)
    pub const KCAL_PER_KG_BODY_MASS: f64 = 7700.0;
    /// Protein energy density (kcal/g)
    pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
    /// Carbohydrate energy density (kcal/g)
    pub const KCAL_PER_G_CARBS: f64 = 4.0;
    /// Fat energy density (kcal/g)
    pub const KCAL_PER_G_FAT: f64 = 9.0;
}

/// Input validation limits
pub mod limits {
    /// Maximum accepted body weight (kg)
    pub const MAX_BODY_WEIGHT_KG: f64 = 300.0;
    /// Projection never goes below this body weight (kg)
    pub const MIN_PROJECTED_WEIGHT_KG: f64 = 30.0;
    /// Maximum accepted height (cm)
    pub const MAX_HEIGHT_CM: f64 = 300.0;
    /// Maximum projection horizon (days)
    pub const MAX_PROJECTION_DAYS: u32 = 730;
    /// Maximum accepted daily intake (kcal)
    pub const MAX_DAILY_INTAKE_KCAL: f64 = 20_000.0;
    /// Maximum single logged amount (grams)
    pub const MAX_LOGGED_GRAMS: f64 = 100_000.0;
    /// Minimum password length
    pub const MIN_PASSWORD_LENGTH: usize = 8;
    /// Maximum search results per request
    pub const MAX_SEARCH_RESULTS: i64 = 100;
    /// Default search results per request
    pub const DEFAULT_SEARCH_RESULTS: i64 = 25;
}

/// Defaults used when the user has not supplied data
pub mod defaults {
    /// Body weight assumed for exercise estimates when none is logged (kg)
    pub const FALLBACK_BODY_WEIGHT_KG: f64 = 70.0;
    /// Number of recent logged days averaged for projections
    pub const PROJECTION_INTAKE_WINDOW_DAYS: i64 = 14;
    /// Default projection horizon (days)
    pub const PROJECTION_DAYS: u32 = 90;
    /// Session lifetime (hours)
    pub const SESSION_EXPIRY_HOURS: i64 = 24;
}
