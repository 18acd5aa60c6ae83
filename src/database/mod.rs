// ABOUTME: Database connection setup, schema migrations, and row parsing helpers
// ABOUTME: SQLite via sqlx with foreign keys enabled and one manager per domain area
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Database Management
//!
//! The schema is created by idempotent `CREATE TABLE IF NOT EXISTS` statements
//! at startup. Each manager wraps a cloned `SqlitePool`.

/// Batched loading of aggregation catalogs
pub mod catalog;
/// Food diary entries
pub mod diary;
/// Exercise log
pub mod exercise;
/// USDA foods and user-defined foods
pub mod foods;
/// Named serving sizes
pub mod portions;
/// Recipes and ingredients
pub mod recipes;
/// Friend connections
pub mod social;
/// Weight log and nutrition goals
pub mod tracking;
/// Users, profiles, and account anonymization
pub mod users;

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use nutrilog_core::errors::{AppError, AppResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tokio::fs;
use tracing::info;
use uuid::Uuid;

pub use catalog::CatalogLoader;
pub use diary::DiaryManager;
pub use exercise::ExerciseManager;
pub use foods::FoodManager;
pub use portions::PortionManager;
pub use recipes::RecipeManager;
pub use social::SocialManager;
pub use tracking::TrackingManager;
pub use users::UserManager;

/// Database handle owning the connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect and run migrations
    ///
    /// In-memory databases use a single connection so every query sees the
    /// same schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the connection fails, or a migration fails
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL: {database_url}"))?
            .create_if_missing(true)
            .foreign_keys(true);

        let is_memory = database_url.contains(":memory:");
        if !is_memory {
            if let Some(parent) = Path::new(options.get_filename()).parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)
                        .await
                        .with_context(|| format!("Failed to create {}", parent.display()))?;
                }
            }
        }

        let mut pool_options = SqlitePoolOptions::new().max_connections(if is_memory { 1 } else { 8 });
        if is_memory {
            // Closing the only connection would drop the in-memory database
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }
        let pool = pool_options
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        let db = Self { pool };
        db.migrate().await?;
        info!(url = %database_url, "Database ready");
        Ok(db)
    }

    /// Get a reference to the connection pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run all schema migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails
    pub async fn migrate(&self) -> Result<()> {
        users::migrate(&self.pool).await?;
        foods::migrate(&self.pool).await?;
        recipes::migrate(&self.pool).await?;
        portions::migrate(&self.pool).await?;
        diary::migrate(&self.pool).await?;
        exercise::migrate(&self.pool).await?;
        tracking::migrate(&self.pool).await?;
        social::migrate(&self.pool).await?;
        Ok(())
    }

    /// User manager over this pool
    #[must_use]
    pub fn users(&self) -> UserManager {
        UserManager::new(self.pool.clone())
    }

    /// Food manager over this pool
    #[must_use]
    pub fn foods(&self) -> FoodManager {
        FoodManager::new(self.pool.clone())
    }

    /// Recipe manager over this pool
    #[must_use]
    pub fn recipes(&self) -> RecipeManager {
        RecipeManager::new(self.pool.clone())
    }

    /// Portion manager over this pool
    #[must_use]
    pub fn portions(&self) -> PortionManager {
        PortionManager::new(self.pool.clone())
    }

    /// Diary manager over this pool
    #[must_use]
    pub fn diary(&self) -> DiaryManager {
        DiaryManager::new(self.pool.clone())
    }

    /// Exercise manager over this pool
    #[must_use]
    pub fn exercise(&self) -> ExerciseManager {
        ExerciseManager::new(self.pool.clone())
    }

    /// Weight and goals manager over this pool
    #[must_use]
    pub fn tracking(&self) -> TrackingManager {
        TrackingManager::new(self.pool.clone())
    }

    /// Social manager over this pool
    #[must_use]
    pub fn social(&self) -> SocialManager {
        SocialManager::new(self.pool.clone())
    }

    /// Catalog loader over this pool
    #[must_use]
    pub fn catalog(&self) -> CatalogLoader {
        CatalogLoader::new(self.pool.clone())
    }
}

/// Execute a list of DDL statements in order
pub(crate) async fn execute_all(pool: &SqlitePool, statements: &[&str]) -> Result<()> {
    for statement in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("Migration failed: {}", statement.trim()))?;
    }
    Ok(())
}

pub(crate) fn parse_uuid(value: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value).map_err(|e| AppError::database(format!("Invalid UUID: {e}")))
}

pub(crate) fn parse_optional_uuid(value: Option<String>) -> AppResult<Option<Uuid>> {
    value.as_deref().map(parse_uuid).transpose()
}

pub(crate) fn parse_datetime(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::database(format!("Invalid date: {e}")))
}

pub(crate) fn parse_optional_datetime(value: Option<String>) -> AppResult<Option<DateTime<Utc>>> {
    value.as_deref().map(parse_datetime).transpose()
}

pub(crate) fn parse_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| AppError::database(format!("Invalid date: {e}")))
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Case-insensitive substring pattern for `LIKE ... ESCAPE '\'`
pub(crate) fn like_pattern(query: &str) -> String {
    let escaped = query
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" oat "), "%oat%");
        assert_eq!(like_pattern("100%_x"), "%100\\%\\_x%");
    }

    #[test]
    fn test_date_round_trip_format() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(format_date(date), "2025-03-09");
        assert_eq!(parse_date("2025-03-09").unwrap(), date);
    }
}
