// ABOUTME: Centralized resource container shared by every HTTP handler
// ABOUTME: Holds the database, configuration, session manager, food source, and algorithm settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Server Resources
//!
//! Built once at startup and handed to the router as `Arc<ServerResources>`.

use std::sync::Arc;

use anyhow::{Context, Result};
use nutrilog_core::errors::{AppError, AppResult};
use nutrilog_intelligence::NutritionConfig;
use tracing::{info, warn};

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::external::{FoodDataSource, UsdaClient, UsdaClientConfig};

/// Shared server state
#[derive(Clone)]
pub struct ServerResources {
    /// Database handle
    pub database: Arc<Database>,
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Session token issuer and validator
    pub auth_manager: Arc<AuthManager>,
    /// USDA data source; `None` when no API key is configured
    pub food_source: Option<Arc<dyn FoodDataSource>>,
    /// Algorithm settings
    pub nutrition_config: Arc<NutritionConfig>,
}

impl ServerResources {
    /// Assemble resources from already-constructed parts
    #[must_use]
    pub fn new(
        database: Database,
        config: Arc<ServerConfig>,
        food_source: Option<Arc<dyn FoodDataSource>>,
    ) -> Self {
        let auth_manager = AuthManager::new(
            config.auth.jwt_secret.as_bytes(),
            config.auth.session_expiry_hours,
        );
        Self {
            database: Arc::new(database),
            auth_manager: Arc::new(auth_manager),
            config,
            food_source,
            nutrition_config: Arc::new(NutritionConfig::default()),
        }
    }

    /// Open and migrate the database, then build the USDA client
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the HTTP client cannot be built
    pub async fn initialize(config: ServerConfig) -> Result<Self> {
        let database = Database::new(&config.database_url.to_connection_string())
            .await
            .context("Failed to open database")?;

        let food_source: Option<Arc<dyn FoodDataSource>> = match &config.usda.api_key {
            Some(api_key) => {
                let client = UsdaClient::new(UsdaClientConfig {
                    api_key: api_key.clone(),
                    base_url: config.usda.base_url.clone(),
                    ..UsdaClientConfig::default()
                })?;
                info!("USDA FoodData Central import enabled");
                Some(Arc::new(client))
            }
            None => {
                warn!("USDA_API_KEY not set; searching imported foods only");
                None
            }
        };

        let resources = Self::new(database, Arc::new(config), food_source);
        resources
            .nutrition_config
            .validate()
            .context("Invalid nutrition configuration")?;
        Ok(resources)
    }

    /// The configured USDA source, or `EXTERNAL_SERVICE_UNAVAILABLE`
    ///
    /// # Errors
    ///
    /// Returns an error when no API key is configured
    pub fn require_food_source(&self) -> AppResult<&dyn FoodDataSource> {
        self.food_source
            .as_deref()
            .ok_or_else(|| AppError::external_unavailable("USDA FoodData Central"))
    }
}
