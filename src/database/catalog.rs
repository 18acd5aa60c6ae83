// ABOUTME: Batched loading of nutrition catalogs for recursive aggregation
// ABOUTME: Walks recipe references breadth-first with one IN query per level
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Catalog loading
//!
//! Aggregation itself is synchronous (`nutrilog_intelligence::aggregation`).
//! This loader gathers everything it needs up front: recipe ingredient lists
//! level by level, then every referenced USDA food and `MyFood` in one query
//! each. Soft-deleted foods and recipes are loaded like any other so that old
//! diary entries keep their nutrition.

use std::collections::{BTreeSet, HashMap};

use nutrilog_core::errors::{AppError, AppResult};
use nutrilog_core::models::{FoodRef, LoggableItem, NutrientKind, NutrientProfile};
use nutrilog_intelligence::{partition_refs, NutritionCatalog, ReferenceSet};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::foods::parse_profile;
use super::parse_uuid;

/// Upper bound on bound parameters per `IN (...)` query
const MAX_BINDS_PER_QUERY: usize = 500;

/// Loads the catalog reachable from a set of items
pub struct CatalogLoader {
    pool: SqlitePool,
}

impl CatalogLoader {
    /// Create a new catalog loader
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Load every profile and recipe reachable from `items`
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails or a stored row is malformed
    pub async fn load_for_items(&self, items: &[LoggableItem]) -> AppResult<NutritionCatalog> {
        self.load(partition_refs(items)).await
    }

    /// Load everything reachable from one recipe, including the recipe itself
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails or a stored row is malformed
    pub async fn load_for_recipe(&self, recipe_id: Uuid) -> AppResult<NutritionCatalog> {
        let mut refs = ReferenceSet::default();
        refs.insert(FoodRef::Recipe(recipe_id));
        self.load(refs).await
    }

    async fn load(&self, mut refs: ReferenceSet) -> AppResult<NutritionCatalog> {
        let mut catalog = NutritionCatalog::new();
        let mut frontier: Vec<Uuid> = refs.recipes.iter().copied().collect();
        let mut visited: BTreeSet<Uuid> = refs.recipes.clone();
        let mut depth = 0_usize;

        while !frontier.is_empty() {
            let level = self.load_recipe_level(&frontier).await?;
            frontier = Vec::new();

            for (recipe_id, ingredients) in level {
                for item in &ingredients {
                    refs.insert(item.food);
                    if let FoodRef::Recipe(sub_id) = item.food {
                        if visited.insert(sub_id) {
                            frontier.push(sub_id);
                        }
                    }
                }
                catalog.insert_recipe(recipe_id, ingredients);
            }
            depth += 1;
        }

        self.load_usda_profiles(&refs.usda, &mut catalog).await?;
        self.load_my_food_profiles(&refs.my_foods, &mut catalog).await?;

        debug!(
            recipes = refs.recipes.len(),
            usda = refs.usda.len(),
            my_foods = refs.my_foods.len(),
            depth,
            "Nutrition catalog loaded"
        );
        Ok(catalog)
    }

    /// Ingredient lists for one breadth-first level; unknown recipes are omitted
    async fn load_recipe_level(&self, ids: &[Uuid]) -> AppResult<Vec<(Uuid, Vec<LoggableItem>)>> {
        let mut level: HashMap<Uuid, Vec<LoggableItem>> = HashMap::new();

        for chunk in ids.chunks(MAX_BINDS_PER_QUERY) {
            let mut exists = QueryBuilder::<Sqlite>::new("SELECT id FROM recipes WHERE id IN (");
            push_id_list(&mut exists, chunk.iter().map(ToString::to_string));
            let rows = exists
                .build()
                .fetch_all(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to load recipes: {e}")))?;
            for row in &rows {
                let id: String = row.get("id");
                level.entry(parse_uuid(&id)?).or_default();
            }

            let mut ingredients = QueryBuilder::<Sqlite>::new(
                "SELECT recipe_id, fdc_id, my_food_id, sub_recipe_id, amount_grams \
                 FROM recipe_ingredients WHERE recipe_id IN (",
            );
            push_id_list(&mut ingredients, chunk.iter().map(ToString::to_string));
            ingredients.push(" ORDER BY recipe_id, position");
            let rows = ingredients
                .build()
                .fetch_all(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to load ingredients: {e}")))?;

            for row in &rows {
                let (recipe_id, item) = row_to_ingredient_item(row)?;
                level.entry(recipe_id).or_default().push(item);
            }
        }

        Ok(level.into_iter().collect())
    }

    async fn load_usda_profiles(
        &self,
        fdc_ids: &BTreeSet<i64>,
        catalog: &mut NutritionCatalog,
    ) -> AppResult<()> {
        let ids: Vec<i64> = fdc_ids.iter().copied().collect();
        for chunk in ids.chunks(MAX_BINDS_PER_QUERY) {
            let mut query = QueryBuilder::<Sqlite>::new(
                "SELECT f.fdc_id, n.nutrient_id, n.amount FROM usda_foods f \
                 LEFT JOIN usda_food_nutrients n ON n.fdc_id = f.fdc_id WHERE f.fdc_id IN (",
            );
            let mut separated = query.separated(", ");
            for id in chunk {
                separated.push_bind(*id);
            }
            separated.push_unseparated(")");

            let rows = query
                .build()
                .fetch_all(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to load USDA nutrients: {e}")))?;

            let mut profiles: HashMap<i64, NutrientProfile> = HashMap::new();
            for row in &rows {
                let fdc_id: i64 = row.get("fdc_id");
                let profile = profiles.entry(fdc_id).or_default();
                let nutrient_id: Option<i64> = row.get("nutrient_id");
                let amount: Option<f64> = row.get("amount");
                if let (Some(kind), Some(amount)) =
                    (nutrient_id.and_then(NutrientKind::from_usda_nutrient_id), amount)
                {
                    profile.set(kind, amount);
                }
            }
            for (fdc_id, profile) in profiles {
                catalog.insert_usda(fdc_id, profile);
            }
        }
        Ok(())
    }

    async fn load_my_food_profiles(
        &self,
        ids: &BTreeSet<Uuid>,
        catalog: &mut NutritionCatalog,
    ) -> AppResult<()> {
        let ids: Vec<Uuid> = ids.iter().copied().collect();
        for chunk in ids.chunks(MAX_BINDS_PER_QUERY) {
            let mut query =
                QueryBuilder::<Sqlite>::new("SELECT id, nutrients FROM my_foods WHERE id IN (");
            push_id_list(&mut query, chunk.iter().map(ToString::to_string));

            let rows = query
                .build()
                .fetch_all(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to load foods: {e}")))?;

            for row in &rows {
                let id: String = row.get("id");
                let nutrients: String = row.get("nutrients");
                catalog.insert_my_food(parse_uuid(&id)?, parse_profile(&nutrients)?);
            }
        }
        Ok(())
    }
}

fn push_id_list(query: &mut QueryBuilder<'_, Sqlite>, ids: impl Iterator<Item = String>) {
    let mut separated = query.separated(", ");
    for id in ids {
        separated.push_bind(id);
    }
    separated.push_unseparated(")");
}

fn row_to_ingredient_item(row: &SqliteRow) -> AppResult<(Uuid, LoggableItem)> {
    let recipe_id: String = row.get("recipe_id");
    let fdc_id: Option<i64> = row.get("fdc_id");
    let my_food_id: Option<String> = row.get("my_food_id");
    let sub_recipe_id: Option<String> = row.get("sub_recipe_id");

    let food = FoodRef::from_columns(fdc_id, my_food_id.as_deref(), sub_recipe_id.as_deref())
        .map_err(|e| AppError::database(e.message))?;
    Ok((
        parse_uuid(&recipe_id)?,
        LoggableItem::new(food, row.get("amount_grams")),
    ))
}
