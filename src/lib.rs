// ABOUTME: Main library entry point for the NutriLog nutrition tracking server
// ABOUTME: Provides the JSON API, persistence, USDA import, and label rendering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

// Crate-level attributes:
// - recursion_limit: Increased from default 128 to 256 for complex derive macros
//   (serde) on deeply nested response types
// - deny(unsafe_code): Zero-tolerance unsafe policy
#![recursion_limit = "256"]
#![deny(unsafe_code)]

//! # `NutriLog` Server
//!
//! A nutrition tracker: users import foods from USDA `FoodData Central`, define
//! their own foods and recipes, log what they eat, and follow calorie and
//! weight trends over time.
//!
//! ## Features
//!
//! - **Food catalog**: USDA search and import, custom foods, label text scanning
//! - **Recipes**: nested recipes with per-serving nutrition and sharing between friends
//! - **Diary**: daily food log with nutrient totals against goals
//! - **Tracking**: exercise, body weight, and weight projections
//! - **Labels**: FDA-style nutrition facts panels as SVG or PDF
//!
//! ## Architecture
//!
//! - **Routes**: thin axum handlers grouped per area
//! - **Services**: ownership and visibility rules shared by the handlers
//! - **Database**: `SQLite` managers, one per table group
//! - **Algorithms**: pure calculations in the `nutrilog_intelligence` crate
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use nutrilog::config::ServerConfig;
//! use nutrilog::resources::ServerResources;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     let resources = Arc::new(ServerResources::initialize(config).await?);
//!     nutrilog::server::run_server(resources).await
//! }
//! ```

// ── Public API ──────────────────────────────────────────────────────────
// These modules are used by the server binary and integration tests (tests/).

/// Session tokens, password hashing, and the authenticated-user extractor
pub mod auth;

/// Environment-driven configuration
pub mod config;

/// `SQLite` persistence managers
pub mod database;

/// External API clients (USDA `FoodData Central`)
pub mod external;

/// Nutrition facts label rendering
pub mod labels;

/// Production logging and structured output
pub mod logging;

/// HTTP middleware for request tracing and CORS
pub mod middleware;

/// Persistent record types
pub mod models;

/// Shared server resources
pub mod resources;

/// HTTP route handlers
pub mod routes;

/// Router assembly and server lifecycle
pub mod server;

/// Domain services shared by route handlers
pub mod services;

/// Unified error handling re-exported from the core crate
pub use nutrilog_core::errors;
