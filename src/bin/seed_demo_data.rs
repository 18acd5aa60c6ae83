// ABOUTME: Demo data seeder for local NutriLog development
// ABOUTME: Creates a demo user with foods, a recipe, diary history, weights, and goals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Demo data seeder for `NutriLog`.
//!
//! Foods come from the built-in offline USDA sample set, so no API key is
//! needed.
//!
//! Usage:
//! ```bash
//! # Seed the default database
//! cargo run --bin seed-demo-data
//!
//! # Seed a specific database with 60 days of history
//! cargo run --bin seed-demo-data -- --database-url sqlite:./data/demo.db --days 60
//! ```

use anyhow::{bail, Result};
use chrono::{Duration, NaiveDate, Utc};
use clap::Parser;
use nutrilog::auth::hash_password;
use nutrilog::database::Database;
use nutrilog::external::MockUsdaClient;
use nutrilog::logging;
use nutrilog::models::{
    ActivityLevel, BodyProfile, FoodRef, MealType, MyFood, MyFoodInput, NutrientKind,
    NutrientProfile, NutritionGoals, RecipeInput, RecipeVisibility, Sex, User,
};
use nutrilog::services::diary::{self, NewDiaryEntry};
use nutrilog::services::foods::import_usda_food;
use nutrilog::services::recipes;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

/// Password for the demo account: `DemoUser123!`
const DEMO_USER_PASSWORD: &str = "DemoUser123!";
const DEMO_USER_EMAIL: &str = "demo@nutrilog.local";

/// USDA sample foods bundled with the offline client
const CHICKEN_FDC_ID: i64 = 171_477;
const APPLE_FDC_ID: i64 = 171_688;

#[derive(Parser)]
#[command(
    name = "seed-demo-data",
    about = "NutriLog Demo Data Seeder",
    long_about = "Populate the database with a demo account and realistic diary history"
)]
struct SeedArgs {
    /// Database URL
    #[arg(long, default_value = "sqlite:./data/nutrilog.db")]
    database_url: String,

    /// Number of days of history to generate
    #[arg(long, default_value = "30")]
    days: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = SeedArgs::parse();
    logging::init_from_env()?;

    let db = Database::new(&args.database_url).await?;
    if db.users().get_user_by_email(DEMO_USER_EMAIL).await?.is_some() {
        bail!("{DEMO_USER_EMAIL} already exists; use a fresh database");
    }

    let password_hash = hash_password(DEMO_USER_PASSWORD.to_owned()).await?;
    let user = User::new(DEMO_USER_EMAIL, password_hash, Some("Demo User".to_owned()));
    db.users().create_user(&user).await?;
    db.users()
        .upsert_profile(
            user.id,
            &BodyProfile {
                height_cm: Some(172.0),
                birth_date: NaiveDate::from_ymd_opt(1990, 4, 12),
                sex: Some(Sex::Female),
                activity_level: ActivityLevel::LightlyActive,
            },
        )
        .await?;
    db.tracking()
        .set_goals(
            user.id,
            &NutritionGoals {
                calories: Some(1900.0),
                protein_g: Some(110.0),
                carbs_g: Some(210.0),
                fat_g: Some(65.0),
                fiber_g: Some(28.0),
                goal_weight_kg: Some(64.0),
            },
        )
        .await?;
    info!(user_id = %user.id, "Created {DEMO_USER_EMAIL} (password: {DEMO_USER_PASSWORD})");

    let usda = MockUsdaClient::new();
    for fdc_id in [CHICKEN_FDC_ID, APPLE_FDC_ID] {
        import_usda_food(&db, &usda, fdc_id).await?;
    }

    let oats = MyFood::from_input(
        user.id,
        MyFoodInput {
            name: "Rolled Oats".to_owned(),
            brand: Some("Pantry".to_owned()),
            serving_size_g: 40.0,
            nutrients: NutrientProfile::from_pairs([
                (NutrientKind::Calories, 379.0),
                (NutrientKind::Protein, 13.2),
                (NutrientKind::Fat, 6.5),
                (NutrientKind::SaturatedFat, 1.1),
                (NutrientKind::Carbohydrate, 67.7),
                (NutrientKind::Fiber, 10.1),
                (NutrientKind::Sugars, 1.0),
                (NutrientKind::Sodium, 6.0),
                (NutrientKind::Iron, 4.3),
            ]),
        },
    );
    db.foods().create_my_food(&oats).await?;

    let bowl = recipes::create_recipe(
        &db,
        user.id,
        RecipeInput {
            name: "Chicken Apple Bowl".to_owned(),
            description: Some("Grilled chicken over sliced apple and oats".to_owned()),
            servings: 2,
            visibility: RecipeVisibility::Friends,
        },
    )
    .await?;
    for (food, grams) in [
        (FoodRef::Usda(CHICKEN_FDC_ID), 280.0),
        (FoodRef::Usda(APPLE_FDC_ID), 182.0),
        (FoodRef::MyFood(oats.id), 80.0),
    ] {
        recipes::add_ingredient(&db, user.id, bowl.id, food, grams).await?;
    }

    let mut rng = StdRng::seed_from_u64(42);
    let today = Utc::now().date_naive();
    let mut weight_kg = 70.0;
    for offset in (0..i64::from(args.days)).rev() {
        let date = today - Duration::days(offset);

        let day = [
            (MealType::Breakfast, FoodRef::MyFood(oats.id), rng.gen_range(40.0..90.0)),
            (MealType::Lunch, FoodRef::Recipe(bowl.id), rng.gen_range(250.0..350.0)),
            (MealType::Dinner, FoodRef::Usda(CHICKEN_FDC_ID), rng.gen_range(120.0..220.0)),
            (MealType::Snack, FoodRef::Usda(APPLE_FDC_ID), 182.0),
        ];
        for (meal, food, amount_grams) in day {
            let (fdc_id, my_food_id, recipe_id) = match food {
                FoodRef::Usda(id) => (Some(id), None, None),
                FoodRef::MyFood(id) => (None, Some(id), None),
                FoodRef::Recipe(id) => (None, None, Some(id)),
            };
            diary::add_entry(
                &db,
                user.id,
                NewDiaryEntry {
                    date,
                    meal,
                    fdc_id,
                    my_food_id,
                    recipe_id,
                    amount_grams: Some(amount_grams),
                    portion_id: None,
                    quantity: None,
                },
            )
            .await?;
        }

        if offset % 3 == 0 {
            weight_kg += rng.gen_range(-0.35..0.2);
            db.tracking().upsert_weight(user.id, date, weight_kg).await?;
        }
    }

    info!(days = args.days, "Demo data seeded");
    Ok(())
}
