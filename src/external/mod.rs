// ABOUTME: External API client modules (USDA FoodData Central)
// ABOUTME: Provides reference food data with caching and rate limiting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! External API Clients

/// USDA `FoodData` Central client
pub mod usda_client;

pub use usda_client::{
    FoodDataSource, FoodDetails, FoodNutrient, FoodPortion, FoodSearchResult, MockUsdaClient,
    UsdaClient, UsdaClientConfig,
};
