// ABOUTME: USDA FoodData Central API client for importing reference foods
// ABOUTME: Implements food search, detail retrieval, caching, and rate limiting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! USDA `FoodData` Central API Client
//!
//! # Features
//! - Food search and detail retrieval
//! - TTL caching to minimize API calls
//! - Rate limiting per minute
//! - In-memory source for tests
//!
//! # API Reference
//! USDA `FoodData` Central API: <https://fdc.nal.usda.gov/api-guide.html>

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use nutrilog_core::errors::{AppError, AppResult};
use nutrilog_core::models::{NutrientKind, NutrientProfile};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::time;
use tracing::{debug, info};

use crate::config::environment::DEFAULT_USDA_BASE_URL;
use crate::models::UsdaFood;

const SERVICE_NAME: &str = "USDA FoodData Central";

/// Atwater-factor energy rows used when "Energy" (1008) is absent
const ATWATER_ENERGY_IDS: [u32; 2] = [2047, 2048];

/// USDA API client configuration
#[derive(Debug, Clone)]
pub struct UsdaClientConfig {
    /// USDA API key
    pub api_key: String,
    /// Base URL for the API
    pub base_url: String,
    /// Cache TTL in seconds
    pub cache_ttl_secs: u64,
    /// Requests allowed per minute
    pub rate_limit_per_minute: u32,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for UsdaClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_USDA_BASE_URL.to_owned(),
            cache_ttl_secs: 86400,
            rate_limit_per_minute: 30,
            request_timeout: Duration::from_secs(15),
        }
    }
}

/// USDA food search result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct FoodSearchResult {
    /// `FoodData` Central ID
    pub fdc_id: i64,
    /// Food description
    pub description: String,
    /// Data type (e.g., "Foundation", "SR Legacy", "Branded")
    #[serde(default)]
    pub data_type: Option<String>,
    /// Brand owner (for branded foods)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_owner: Option<String>,
}

/// One nutrient amount per 100 g
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodNutrient {
    /// Nutrient ID
    pub nutrient_id: u32,
    /// Nutrient name
    pub nutrient_name: String,
    /// Nutrient unit
    pub unit_name: String,
    /// Amount per 100 g
    pub amount: f64,
}

/// A household measure published with a food
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodPortion {
    /// Portion label, e.g. "1 cup, chopped"
    pub name: String,
    /// Weight of one portion (g)
    pub gram_weight: f64,
}

/// Detailed food information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodDetails {
    /// `FoodData` Central ID
    pub fdc_id: i64,
    /// Food description
    pub description: String,
    /// Data type
    pub data_type: Option<String>,
    /// Brand owner
    pub brand_owner: Option<String>,
    /// Nutrients with amounts per 100 g
    pub food_nutrients: Vec<FoodNutrient>,
    /// Household portions
    pub portions: Vec<FoodPortion>,
}

impl FoodDetails {
    /// Tracked nutrients as a per-100g profile
    ///
    /// Untracked nutrient ids are ignored.
    #[must_use]
    pub fn nutrient_profile(&self) -> NutrientProfile {
        let mut profile = NutrientProfile::zero();
        let mut has_energy = false;
        for nutrient in &self.food_nutrients {
            if let Some(kind) = NutrientKind::from_usda_nutrient_id(i64::from(nutrient.nutrient_id)) {
                profile.set(kind, nutrient.amount.max(0.0));
                has_energy |= kind == NutrientKind::Calories;
            }
        }
        if !has_energy {
            if let Some(energy) = ATWATER_ENERGY_IDS.iter().find_map(|id| {
                self.food_nutrients
                    .iter()
                    .find(|n| n.nutrient_id == *id && n.unit_name.eq_ignore_ascii_case("kcal"))
            }) {
                profile.calories = energy.amount.max(0.0);
            }
        }
        profile
    }

    /// Convert to the stored food record
    #[must_use]
    pub fn to_usda_food(&self) -> UsdaFood {
        UsdaFood {
            fdc_id: self.fdc_id,
            description: self.description.clone(),
            data_type: self.data_type.clone(),
            brand_owner: self.brand_owner.clone(),
            nutrients: self.nutrient_profile(),
        }
    }
}

/// Source of USDA food data
#[async_trait]
pub trait FoodDataSource: Send + Sync {
    /// Search foods by description
    async fn search_foods(&self, query: &str, page_size: u32) -> AppResult<Vec<FoodSearchResult>>;

    /// Fetch one food with nutrients and portions
    async fn get_food_details(&self, fdc_id: i64) -> AppResult<FoodDetails>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    foods: Vec<FoodSearchResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FoodDetailsResponse {
    fdc_id: i64,
    description: String,
    #[serde(default)]
    data_type: Option<String>,
    #[serde(default)]
    brand_owner: Option<String>,
    #[serde(default)]
    food_nutrients: Vec<FoodNutrientResponse>,
    #[serde(default)]
    food_portions: Vec<FoodPortionResponse>,
}

#[derive(Debug, Deserialize)]
struct FoodNutrientResponse {
    nutrient: Option<NutrientInfo>,
    amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NutrientInfo {
    id: u32,
    name: String,
    unit_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FoodPortionResponse {
    gram_weight: Option<f64>,
    amount: Option<f64>,
    modifier: Option<String>,
    portion_description: Option<String>,
    measure_unit: Option<MeasureUnit>,
}

#[derive(Debug, Deserialize)]
struct MeasureUnit {
    name: Option<String>,
}

impl FoodPortionResponse {
    fn into_portion(self) -> Option<FoodPortion> {
        let gram_weight = self.gram_weight.filter(|g| *g > 0.0)?;
        let name = self
            .portion_description
            .filter(|d| !d.trim().is_empty() && d != "Quantity not specified")
            .or_else(|| {
                let unit = self
                    .measure_unit
                    .and_then(|u| u.name)
                    .filter(|n| n != "undetermined");
                let label = [unit, self.modifier]
                    .into_iter()
                    .flatten()
                    .filter(|s| !s.trim().is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                if label.is_empty() {
                    return None;
                }
                Some(match self.amount {
                    Some(amount) => format!("{amount} {label}"),
                    None => label,
                })
            })?;
        Some(FoodPortion { name, gram_weight })
    }
}

impl From<FoodDetailsResponse> for FoodDetails {
    fn from(response: FoodDetailsResponse) -> Self {
        Self {
            fdc_id: response.fdc_id,
            description: response.description,
            data_type: response.data_type,
            brand_owner: response.brand_owner,
            food_nutrients: response
                .food_nutrients
                .into_iter()
                .filter_map(|n| {
                    let nutrient = n.nutrient?;
                    Some(FoodNutrient {
                        nutrient_id: nutrient.id,
                        nutrient_name: nutrient.name,
                        unit_name: nutrient.unit_name,
                        amount: n.amount.unwrap_or(0.0),
                    })
                })
                .collect(),
            portions: response
                .food_portions
                .into_iter()
                .filter_map(FoodPortionResponse::into_portion)
                .collect(),
        }
    }
}

/// Cache entry with expiration
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    expires_at: Instant,
}

/// Sliding-window rate limiter
#[derive(Debug)]
struct RateLimiter {
    requests: Vec<Instant>,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    const fn new(limit: u32, window: Duration) -> Self {
        Self {
            requests: Vec::new(),
            limit,
            window,
        }
    }

    fn can_request(&mut self) -> bool {
        let now = Instant::now();
        self.requests.retain(|&t| now.duration_since(t) < self.window);
        self.requests.len() < self.limit as usize
    }

    fn record_request(&mut self) {
        self.requests.push(Instant::now());
    }

    async fn wait_if_needed(&mut self) {
        while !self.can_request() {
            time::sleep(Duration::from_secs(1)).await;
        }
    }
}

/// USDA `FoodData` Central API client
pub struct UsdaClient {
    config: UsdaClientConfig,
    http_client: reqwest::Client,
    search_cache: Arc<RwLock<HashMap<String, CacheEntry<Vec<FoodSearchResult>>>>>,
    details_cache: Arc<RwLock<HashMap<i64, CacheEntry<FoodDetails>>>>,
    rate_limiter: Arc<RwLock<RateLimiter>>,
}

impl UsdaClient {
    /// Create a new USDA API client
    ///
    /// # Errors
    ///
    /// Returns `CONFIG_ERROR` if the HTTP client cannot be built
    pub fn new(config: UsdaClientConfig) -> AppResult<Self> {
        let rate_limiter = RateLimiter::new(config.rate_limit_per_minute, Duration::from_secs(60));
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            http_client,
            search_cache: Arc::new(RwLock::new(HashMap::new())),
            details_cache: Arc::new(RwLock::new(HashMap::new())),
            rate_limiter: Arc::new(RwLock::new(rate_limiter)),
        })
    }

    async fn throttle(&self) {
        let mut limiter = self.rate_limiter.write().await;
        limiter.wait_if_needed().await;
        limiter.record_request();
    }

    fn expiry(&self) -> Instant {
        Instant::now() + Duration::from_secs(self.config.cache_ttl_secs)
    }

    /// Get cache sizes as `(search, details)`
    pub async fn cache_stats(&self) -> (usize, usize) {
        let search_count = self.search_cache.read().await.len();
        let details_count = self.details_cache.read().await.len();
        (search_count, details_count)
    }
}

#[async_trait]
impl FoodDataSource for UsdaClient {
    async fn search_foods(&self, query: &str, page_size: u32) -> AppResult<Vec<FoodSearchResult>> {
        if query.trim().is_empty() {
            return Err(AppError::invalid_input("Search query cannot be empty"));
        }
        if page_size == 0 || page_size > 200 {
            return Err(AppError::invalid_input(
                "Page size must be between 1 and 200",
            ));
        }

        let cache_key = format!("{}:{page_size}", query.trim().to_lowercase());
        {
            let cache = self.search_cache.read().await;
            if let Some(entry) = cache.get(&cache_key) {
                if Instant::now() < entry.expires_at {
                    debug!(query, "USDA search cache hit");
                    return Ok(entry.data.clone());
                }
            }
        }

        self.throttle().await;

        let url = format!("{}/foods/search", self.config.base_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("query", query),
                ("pageSize", &page_size.to_string()),
                ("api_key", &self.config.api_key),
            ])
            .send()
            .await
            .map_err(|e| AppError::external_service(SERVICE_NAME, e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::external_service(
                SERVICE_NAME,
                format!("HTTP {}", response.status()),
            ));
        }

        let search_response: SearchResponse = response.json().await.map_err(|e| {
            AppError::external_service(SERVICE_NAME, format!("JSON parse error: {e}"))
        })?;

        self.search_cache.write().await.insert(
            cache_key,
            CacheEntry {
                data: search_response.foods.clone(),
                expires_at: self.expiry(),
            },
        );

        Ok(search_response.foods)
    }

    async fn get_food_details(&self, fdc_id: i64) -> AppResult<FoodDetails> {
        if fdc_id <= 0 {
            return Err(AppError::invalid_input("FDC id must be positive"));
        }

        {
            let cache = self.details_cache.read().await;
            if let Some(entry) = cache.get(&fdc_id) {
                if Instant::now() < entry.expires_at {
                    debug!(fdc_id, "USDA details cache hit");
                    return Ok(entry.data.clone());
                }
            }
        }

        self.throttle().await;

        let url = format!("{}/food/{fdc_id}", self.config.base_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", &self.config.api_key)])
            .send()
            .await
            .map_err(|e| AppError::external_service(SERVICE_NAME, e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(AppError::not_found(format!("Food with FDC ID {fdc_id}")));
            }
            status if !status.is_success() => {
                return Err(AppError::external_service(
                    SERVICE_NAME,
                    format!("HTTP {status}"),
                ));
            }
            _ => {}
        }

        let details_response: FoodDetailsResponse = response.json().await.map_err(|e| {
            AppError::external_service(SERVICE_NAME, format!("JSON parse error: {e}"))
        })?;
        let details = FoodDetails::from(details_response);

        self.details_cache.write().await.insert(
            fdc_id,
            CacheEntry {
                data: details.clone(),
                expires_at: self.expiry(),
            },
        );

        info!(fdc_id, nutrients = details.food_nutrients.len(), "Fetched USDA food");
        Ok(details)
    }
}

/// In-memory food source for tests (no API calls)
#[derive(Default)]
pub struct MockUsdaClient {
    foods: HashMap<i64, FoodDetails>,
}

impl MockUsdaClient {
    /// Create a mock with a couple of common foods
    #[must_use]
    pub fn new() -> Self {
        let mut mock = Self::default();
        mock.insert(FoodDetails {
            fdc_id: 171_477,
            description: "Chicken, breast, meat only, cooked, roasted".into(),
            data_type: Some("SR Legacy".into()),
            brand_owner: None,
            food_nutrients: vec![
                nutrient(1003, "Protein", "g", 31.02),
                nutrient(1004, "Total lipid (fat)", "g", 3.57),
                nutrient(1005, "Carbohydrate, by difference", "g", 0.0),
                nutrient(1008, "Energy", "kcal", 165.0),
                nutrient(1093, "Sodium, Na", "mg", 74.0),
            ],
            portions: vec![FoodPortion {
                name: "1 cup, chopped or diced".into(),
                gram_weight: 140.0,
            }],
        });
        mock.insert(FoodDetails {
            fdc_id: 171_688,
            description: "Apples, raw, with skin".into(),
            data_type: Some("SR Legacy".into()),
            brand_owner: None,
            food_nutrients: vec![
                nutrient(1003, "Protein", "g", 0.26),
                nutrient(1004, "Total lipid (fat)", "g", 0.17),
                nutrient(1005, "Carbohydrate, by difference", "g", 13.81),
                nutrient(1008, "Energy", "kcal", 52.0),
                nutrient(1079, "Fiber, total dietary", "g", 2.4),
            ],
            portions: vec![FoodPortion {
                name: "1 medium".into(),
                gram_weight: 182.0,
            }],
        });
        mock
    }

    /// Add or replace a food
    pub fn insert(&mut self, details: FoodDetails) {
        self.foods.insert(details.fdc_id, details);
    }
}

fn nutrient(id: u32, name: &str, unit: &str, amount: f64) -> FoodNutrient {
    FoodNutrient {
        nutrient_id: id,
        nutrient_name: name.to_owned(),
        unit_name: unit.to_owned(),
        amount,
    }
}

#[async_trait]
impl FoodDataSource for MockUsdaClient {
    async fn search_foods(&self, query: &str, page_size: u32) -> AppResult<Vec<FoodSearchResult>> {
        if query.trim().is_empty() {
            return Err(AppError::invalid_input("Search query cannot be empty"));
        }
        let query_lower = query.to_lowercase();
        let mut results: Vec<FoodSearchResult> = self
            .foods
            .values()
            .filter(|food| food.description.to_lowercase().contains(&query_lower))
            .map(|food| FoodSearchResult {
                fdc_id: food.fdc_id,
                description: food.description.clone(),
                data_type: food.data_type.clone(),
                brand_owner: food.brand_owner.clone(),
            })
            .collect();
        results.sort_by_key(|r| r.fdc_id);
        results.truncate(page_size as usize);
        Ok(results)
    }

    async fn get_food_details(&self, fdc_id: i64) -> AppResult<FoodDetails> {
        self.foods
            .get(&fdc_id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Food with FDC ID {fdc_id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_ignores_untracked_nutrients() {
        let details = FoodDetails {
            fdc_id: 1,
            description: "Test".into(),
            data_type: None,
            brand_owner: None,
            food_nutrients: vec![
                nutrient(1008, "Energy", "kcal", 100.0),
                nutrient(1003, "Protein", "g", 5.0),
                nutrient(1162, "Vitamin C", "mg", 30.0),
            ],
            portions: Vec::new(),
        };
        let profile = details.nutrient_profile();
        assert!((profile.calories - 100.0).abs() < f64::EPSILON);
        assert!((profile.protein - 5.0).abs() < f64::EPSILON);
        assert!((profile.iron).abs() < f64::EPSILON);
    }

    #[test]
    fn test_profile_falls_back_to_atwater_energy() {
        let details = FoodDetails {
            fdc_id: 2,
            description: "Foundation food".into(),
            data_type: Some("Foundation".into()),
            brand_owner: None,
            food_nutrients: vec![nutrient(2047, "Energy (Atwater General Factors)", "kcal", 61.0)],
            portions: Vec::new(),
        };
        assert!((details.nutrient_profile().calories - 61.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_details_response_parsing() {
        let json = serde_json::json!({
            "fdcId": 42,
            "description": "Oats",
            "dataType": "Foundation",
            "foodNutrients": [
                {"nutrient": {"id": 1003, "name": "Protein", "unitName": "g"}, "amount": 13.2},
                {"amount": 1.0}
            ],
            "foodPortions": [
                {"gramWeight": 81.0, "amount": 1.0, "measureUnit": {"name": "cup"}},
                {"gramWeight": 0.0, "portionDescription": "nothing"}
            ]
        });
        let response: FoodDetailsResponse = serde_json::from_value(json).unwrap();
        let details = FoodDetails::from(response);
        assert_eq!(details.food_nutrients.len(), 1);
        assert_eq!(details.portions.len(), 1);
        assert_eq!(details.portions[0].name, "1 cup");
    }

    #[test]
    fn test_search_result_reads_camel_case_and_writes_snake_case() {
        let json = serde_json::json!({
            "fdcId": 171_705,
            "description": "Rice, white, cooked",
            "dataType": "SR Legacy",
            "brandOwner": "Acme"
        });
        let result: FoodSearchResult = serde_json::from_value(json).unwrap();
        assert_eq!(result.fdc_id, 171_705);

        let out = serde_json::to_value(&result).unwrap();
        assert_eq!(out["fdc_id"], 171_705);
        assert_eq!(out["data_type"], "SR Legacy");
        assert_eq!(out["brand_owner"], "Acme");
        assert!(out.get("fdcId").is_none());
    }

    #[tokio::test]
    async fn test_mock_search_and_details() {
        let mock = MockUsdaClient::new();
        let results = mock.search_foods("apple", 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(mock.get_food_details(171_477).await.is_ok());
        assert!(mock.get_food_details(1).await.is_err());
    }
}
