// ABOUTME: Recursive weighted nutrient aggregation over foods and nested recipes
// ABOUTME: Pure computation over an in-memory NutritionCatalog with a cycle guard
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Nutrition Aggregation
//!
//! Totals are computed in two phases. The server first loads a
//! [`NutritionCatalog`] holding every profile and recipe ingredient list
//! reachable from the items (batched queries, one per recipe depth level).
//! [`calculate_nutrition_for_items`] then walks the catalog synchronously.
//!
//! Each item contributes `per_100g * amount_grams / 100`. A recipe item
//! contributes its nested ingredient total scaled by
//! `amount_grams / sum(ingredient grams)`. A recipe revisited while it is
//! still being expanded contributes nothing.

use std::collections::{BTreeSet, HashMap, HashSet};

use nutrilog_core::constants::energy::REFERENCE_GRAMS;
use nutrilog_core::models::{FoodRef, LoggableItem, NutrientProfile};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// In-memory snapshot of every nutrient source reachable from a set of items
#[derive(Debug, Clone, Default)]
pub struct NutritionCatalog {
    usda: HashMap<i64, NutrientProfile>,
    my_foods: HashMap<Uuid, NutrientProfile>,
    recipes: HashMap<Uuid, Vec<LoggableItem>>,
}

impl NutritionCatalog {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a USDA food's per-100g profile
    pub fn insert_usda(&mut self, fdc_id: i64, per_100g: NutrientProfile) {
        self.usda.insert(fdc_id, per_100g);
    }

    /// Add a `MyFood`'s per-100g profile
    pub fn insert_my_food(&mut self, id: Uuid, per_100g: NutrientProfile) {
        self.my_foods.insert(id, per_100g);
    }

    /// Add a recipe's ingredient list
    pub fn insert_recipe(&mut self, id: Uuid, ingredients: Vec<LoggableItem>) {
        self.recipes.insert(id, ingredients);
    }

    /// Whether the recipe's ingredient list has been loaded
    #[must_use]
    pub fn has_recipe(&self, id: &Uuid) -> bool {
        self.recipes.contains_key(id)
    }

    /// Ingredient list of a loaded recipe
    #[must_use]
    pub fn recipe_ingredients(&self, id: &Uuid) -> Option<&[LoggableItem]> {
        self.recipes.get(id).map(Vec::as_slice)
    }

    /// Per-100g profile of a USDA food or `MyFood`
    ///
    /// Recipes have no stored profile in the catalog; use
    /// [`calculate_recipe_rollup`] for them.
    #[must_use]
    pub fn base_profile(&self, food: &FoodRef) -> Option<&NutrientProfile> {
        match food {
            FoodRef::Usda(fdc_id) => self.usda.get(fdc_id),
            FoodRef::MyFood(id) => self.my_foods.get(id),
            FoodRef::Recipe(_) => None,
        }
    }
}

/// Food references grouped by kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceSet {
    /// USDA FDC ids
    pub usda: BTreeSet<i64>,
    /// `MyFood` ids
    pub my_foods: BTreeSet<Uuid>,
    /// Recipe ids
    pub recipes: BTreeSet<Uuid>,
}

impl ReferenceSet {
    /// Whether no references were collected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.usda.is_empty() && self.my_foods.is_empty() && self.recipes.is_empty()
    }

    /// Add one reference
    pub fn insert(&mut self, food: FoodRef) {
        match food {
            FoodRef::Usda(fdc_id) => {
                self.usda.insert(fdc_id);
            }
            FoodRef::MyFood(id) => {
                self.my_foods.insert(id);
            }
            FoodRef::Recipe(id) => {
                self.recipes.insert(id);
            }
        }
    }
}

/// Partition items by reference type
#[must_use]
pub fn partition_refs<'a>(items: impl IntoIterator<Item = &'a LoggableItem>) -> ReferenceSet {
    let mut refs = ReferenceSet::default();
    for item in items {
        refs.insert(item.food);
    }
    refs
}

/// Result of an aggregation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionTotals {
    /// Summed absolute nutrient amounts
    pub nutrients: NutrientProfile,
    /// Sum of the items' logged grams
    pub total_grams: f64,
    /// References not found in the catalog; they contributed zero
    pub missing: Vec<FoodRef>,
    /// Recipes skipped because they were already being expanded
    pub skipped_cycles: Vec<Uuid>,
}

impl NutritionTotals {
    fn note_missing(&mut self, food: FoodRef) {
        if !self.missing.contains(&food) {
            self.missing.push(food);
        }
    }

    fn note_cycle(&mut self, recipe_id: Uuid) {
        if !self.skipped_cycles.contains(&recipe_id) {
            self.skipped_cycles.push(recipe_id);
        }
    }

    fn absorb_diagnostics(&mut self, nested: Self) {
        for food in nested.missing {
            self.note_missing(food);
        }
        for recipe_id in nested.skipped_cycles {
            self.note_cycle(recipe_id);
        }
    }
}

/// Compute the total nutrition of a list of items
///
/// Never fails: missing references contribute zero and are reported in
/// [`NutritionTotals::missing`].
#[must_use]
pub fn calculate_nutrition_for_items(
    catalog: &NutritionCatalog,
    items: &[LoggableItem],
) -> NutritionTotals {
    let mut expanding = HashSet::new();
    aggregate(catalog, items, &mut expanding)
}

fn aggregate(
    catalog: &NutritionCatalog,
    items: &[LoggableItem],
    expanding: &mut HashSet<Uuid>,
) -> NutritionTotals {
    let mut totals = NutritionTotals::default();

    for item in items {
        totals.total_grams += item.amount_grams;
        let scaling_factor = item.amount_grams / REFERENCE_GRAMS;

        match item.food {
            FoodRef::Usda(_) | FoodRef::MyFood(_) => match catalog.base_profile(&item.food) {
                Some(per_100g) => totals.nutrients.add_scaled(per_100g, scaling_factor),
                None => totals.note_missing(item.food),
            },
            FoodRef::Recipe(recipe_id) => {
                if expanding.contains(&recipe_id) {
                    debug!(%recipe_id, "Skipping recipe already being expanded");
                    totals.note_cycle(recipe_id);
                    continue;
                }
                let Some(ingredients) = catalog.recipe_ingredients(&recipe_id) else {
                    totals.note_missing(item.food);
                    continue;
                };

                expanding.insert(recipe_id);
                let nested = aggregate(catalog, ingredients, expanding);
                expanding.remove(&recipe_id);

                if nested.total_grams > 0.0 {
                    totals
                        .nutrients
                        .add_scaled(&nested.nutrients, item.amount_grams / nested.total_grams);
                }
                totals.absorb_diagnostics(nested);
            }
        }
    }

    totals
}

/// Per-100g rollup of a recipe, as stored on the recipe row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeRollup {
    /// Nutrients per 100 g of the finished recipe
    pub per_100g: NutrientProfile,
    /// Sum of ingredient grams
    pub total_grams: f64,
    /// Ingredient references that could not be resolved
    pub missing: Vec<FoodRef>,
}

/// Compute the per-100g rollup of a loaded recipe
///
/// The recipe itself is marked as expanding, so an ingredient chain leading
/// back to it contributes nothing. A recipe whose ingredients weigh 0 g rolls
/// up to all zeros.
#[must_use]
pub fn calculate_recipe_rollup(catalog: &NutritionCatalog, recipe_id: Uuid) -> RecipeRollup {
    let Some(ingredients) = catalog.recipe_ingredients(&recipe_id) else {
        return RecipeRollup {
            missing: vec![FoodRef::Recipe(recipe_id)],
            ..RecipeRollup::default()
        };
    };

    let mut expanding = HashSet::from([recipe_id]);
    let totals = aggregate(catalog, ingredients, &mut expanding);

    let per_100g = if totals.total_grams > 0.0 {
        totals.nutrients.scaled(REFERENCE_GRAMS / totals.total_grams)
    } else {
        NutrientProfile::zero()
    };

    RecipeRollup {
        per_100g,
        total_grams: totals.total_grams,
        missing: totals.missing,
    }
}

#[cfg(test)]
mod tests {
    use nutrilog_core::models::NutrientKind;

    use super::*;

    const OATS: i64 = 173_904;
    const MILK: i64 = 171_265;

    fn profile(calories: f64, protein: f64) -> NutrientProfile {
        NutrientProfile::from_pairs([
            (NutrientKind::Calories, calories),
            (NutrientKind::Protein, protein),
        ])
    }

    fn item(food: FoodRef, grams: f64) -> LoggableItem {
        LoggableItem::new(food, grams)
    }

    fn catalog() -> NutritionCatalog {
        let mut catalog = NutritionCatalog::new();
        catalog.insert_usda(OATS, profile(379.0, 13.15));
        catalog.insert_usda(MILK, profile(61.0, 3.15));
        catalog
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_single_usda_item_scales_by_grams() {
        let totals =
            calculate_nutrition_for_items(&catalog(), &[item(FoodRef::Usda(OATS), 40.0)]);
        assert_close(totals.nutrients.calories, 151.6);
        assert_close(totals.total_grams, 40.0);
        assert!(totals.missing.is_empty());
    }

    #[test]
    fn test_nested_recipe_scaled_by_its_total_weight() {
        let mut catalog = catalog();
        let porridge = Uuid::new_v4();
        catalog.insert_recipe(
            porridge,
            vec![item(FoodRef::Usda(OATS), 50.0), item(FoodRef::Usda(MILK), 250.0)],
        );

        // 300 g of porridge holds 189.5 + 152.5 = 342 kcal; eat 150 g
        let totals =
            calculate_nutrition_for_items(&catalog, &[item(FoodRef::Recipe(porridge), 150.0)]);
        assert_close(totals.nutrients.calories, 171.0);
    }

    #[test]
    fn test_idempotent() {
        let mut catalog = catalog();
        let my_food = Uuid::new_v4();
        catalog.insert_my_food(my_food, profile(250.0, 20.0));
        let items = [
            item(FoodRef::Usda(OATS), 40.0),
            item(FoodRef::MyFood(my_food), 33.0),
        ];

        let first = calculate_nutrition_for_items(&catalog, &items);
        let second = calculate_nutrition_for_items(&catalog, &items);
        assert_eq!(first, second);
    }

    #[test]
    fn test_linear_in_amounts() {
        let mut catalog = catalog();
        let recipe = Uuid::new_v4();
        catalog.insert_recipe(
            recipe,
            vec![item(FoodRef::Usda(OATS), 80.0), item(FoodRef::Usda(MILK), 200.0)],
        );
        let items = [
            item(FoodRef::Usda(MILK), 125.0),
            item(FoodRef::Recipe(recipe), 90.0),
        ];
        let doubled: Vec<_> = items
            .iter()
            .map(|i| item(i.food, i.amount_grams * 2.0))
            .collect();

        let single = calculate_nutrition_for_items(&catalog, &items);
        let double = calculate_nutrition_for_items(&catalog, &doubled);
        for kind in NutrientKind::ALL {
            assert_close(double.nutrients.get(kind), single.nutrients.get(kind) * 2.0);
        }
    }

    #[test]
    fn test_direct_self_reference_is_skipped() {
        let mut catalog = catalog();
        let recipe = Uuid::new_v4();
        catalog.insert_recipe(
            recipe,
            vec![item(FoodRef::Usda(OATS), 100.0), item(FoodRef::Recipe(recipe), 100.0)],
        );

        // The self-reference weighs 100 g but contributes nothing: 379 kcal over 200 g
        let totals =
            calculate_nutrition_for_items(&catalog, &[item(FoodRef::Recipe(recipe), 200.0)]);
        assert_close(totals.nutrients.calories, 379.0);
        assert_eq!(totals.skipped_cycles, vec![recipe]);
    }

    #[test]
    fn test_transitive_cycle_terminates() {
        let mut catalog = catalog();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        catalog.insert_recipe(
            a,
            vec![item(FoodRef::Usda(OATS), 100.0), item(FoodRef::Recipe(b), 100.0)],
        );
        catalog.insert_recipe(
            b,
            vec![item(FoodRef::Usda(MILK), 100.0), item(FoodRef::Recipe(a), 100.0)],
        );

        let totals = calculate_nutrition_for_items(&catalog, &[item(FoodRef::Recipe(a), 200.0)]);
        // b expands to 61 kcal over 200 g; a = 379 + 100 * 61 / 200 = 409.5 kcal over 200 g
        assert_close(totals.nutrients.calories, 409.5);
        assert_eq!(totals.skipped_cycles, vec![a]);
    }

    #[test]
    fn test_shared_sub_recipe_is_not_a_cycle() {
        let mut catalog = catalog();
        let base = Uuid::new_v4();
        let outer = Uuid::new_v4();
        catalog.insert_recipe(base, vec![item(FoodRef::Usda(OATS), 100.0)]);
        catalog.insert_recipe(
            outer,
            vec![item(FoodRef::Recipe(base), 50.0), item(FoodRef::Recipe(base), 50.0)],
        );

        let totals =
            calculate_nutrition_for_items(&catalog, &[item(FoodRef::Recipe(outer), 100.0)]);
        assert_close(totals.nutrients.calories, 379.0);
        assert!(totals.skipped_cycles.is_empty());
    }

    #[test]
    fn test_zero_weight_recipe_yields_zero() {
        let mut catalog = catalog();
        let empty = Uuid::new_v4();
        catalog.insert_recipe(empty, Vec::new());

        let totals =
            calculate_nutrition_for_items(&catalog, &[item(FoodRef::Recipe(empty), 120.0)]);
        assert!(totals.nutrients.is_zero());
        assert!(totals.nutrients.calories.is_finite());

        let rollup = calculate_recipe_rollup(&catalog, empty);
        assert!(rollup.per_100g.is_zero());
        assert_close(rollup.total_grams, 0.0);
    }

    #[test]
    fn test_missing_references_contribute_zero_and_are_reported() {
        let ghost_food = FoodRef::MyFood(Uuid::new_v4());
        let ghost_recipe = FoodRef::Recipe(Uuid::new_v4());
        let items = [
            item(FoodRef::Usda(OATS), 100.0),
            item(FoodRef::Usda(999), 100.0),
            item(ghost_food, 50.0),
            item(ghost_recipe, 50.0),
            item(FoodRef::Usda(999), 10.0),
        ];

        let totals = calculate_nutrition_for_items(&catalog(), &items);
        assert_close(totals.nutrients.calories, 379.0);
        assert_eq!(
            totals.missing,
            vec![FoodRef::Usda(999), ghost_food, ghost_recipe]
        );
    }

    #[test]
    fn test_recipe_rollup_per_100g() {
        let mut catalog = catalog();
        let recipe = Uuid::new_v4();
        catalog.insert_recipe(
            recipe,
            vec![item(FoodRef::Usda(OATS), 50.0), item(FoodRef::Usda(MILK), 150.0)],
        );

        let rollup = calculate_recipe_rollup(&catalog, recipe);
        // (189.5 + 91.5) kcal over 200 g
        assert_close(rollup.per_100g.calories, 140.5);
        assert_close(rollup.total_grams, 200.0);
    }

    #[test]
    fn test_partition_refs() {
        let my_food = Uuid::new_v4();
        let recipe = Uuid::new_v4();
        let refs = partition_refs(&[
            item(FoodRef::Usda(OATS), 1.0),
            item(FoodRef::Usda(OATS), 2.0),
            item(FoodRef::MyFood(my_food), 1.0),
            item(FoodRef::Recipe(recipe), 1.0),
        ]);
        assert_eq!(refs.usda.len(), 1);
        assert!(refs.my_foods.contains(&my_food));
        assert!(refs.recipes.contains(&recipe));
    }
}
