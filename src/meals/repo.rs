use std::collections::HashMap;

use anyhow::Context;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::meals::filter::{MealFilter, RatingSummary};
use crate::meals::repo_types::{Meal, MealListingRow, MEAL_COLUMNS};

fn listing_select() -> String {
    format!(
        "SELECT {MEAL_COLUMNS}, c.name AS category_name, p.restaurant_name AS provider_name \
         FROM meals m \
         JOIN categories c ON c.id = m.category_id \
         JOIN provider_profiles p ON p.id = m.provider_id"
    )
}

/// One page of available meals matching `filter`.
pub async fn list_available(db: &PgPool, filter: &MealFilter) -> anyhow::Result<Vec<MealListingRow>> {
    let mut qb = QueryBuilder::<Postgres>::new(listing_select());
    filter.push_where(&mut qb);
    filter.push_order_and_page(&mut qb);
    let rows = qb
        .build_query_as::<MealListingRow>()
        .fetch_all(db)
        .await
        .context("list meals")?;
    Ok(rows)
}

/// Number of available meals matching `filter`, ignoring pagination.
pub async fn count_available(db: &PgPool, filter: &MealFilter) -> anyhow::Result<i64> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM meals m");
    filter.push_where(&mut qb);
    let (total,) = qb
        .build_query_as::<(i64,)>()
        .fetch_one(db)
        .await
        .context("count meals")?;
    Ok(total)
}

pub async fn find_available(db: &PgPool, id: Uuid) -> anyhow::Result<Option<MealListingRow>> {
    let row = sqlx::query_as::<_, MealListingRow>(&format!(
        "{} WHERE m.id = $1 AND m.available = TRUE",
        listing_select()
    ))
    .bind(id)
    .fetch_optional(db)
    .await
    .context("find meal")?;
    Ok(row)
}

/// Every meal of one provider, available or not.
pub async fn list_by_provider(db: &PgPool, provider_id: Uuid) -> anyhow::Result<Vec<MealListingRow>> {
    let rows = sqlx::query_as::<_, MealListingRow>(&format!(
        "{} WHERE m.provider_id = $1 ORDER BY m.created_at DESC",
        listing_select()
    ))
    .bind(provider_id)
    .fetch_all(db)
    .await
    .context("list provider meals")?;
    Ok(rows)
}

/// Review summaries for `meal_ids`. Meals without reviews are absent.
pub async fn ratings_for(
    db: &PgPool,
    meal_ids: &[Uuid],
) -> anyhow::Result<HashMap<Uuid, RatingSummary>> {
    if meal_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = sqlx::query_as::<_, (Uuid, i32)>(
        r#"
        SELECT meal_id, rating
          FROM reviews
         WHERE meal_id = ANY($1)
        "#,
    )
    .bind(meal_ids)
    .fetch_all(db)
    .await
    .context("load ratings")?;

    let mut grouped: HashMap<Uuid, Vec<i32>> = HashMap::new();
    for (meal_id, rating) in rows {
        grouped.entry(meal_id).or_default().push(rating);
    }
    Ok(grouped
        .into_iter()
        .map(|(id, ratings)| (id, RatingSummary::from_ratings(&ratings)))
        .collect())
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Meal>> {
    let meal = sqlx::query_as::<_, Meal>(&format!("SELECT {MEAL_COLUMNS} FROM meals m WHERE m.id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find meal by id")?;
    Ok(meal)
}

pub async fn find_many(db: &PgPool, ids: &[Uuid]) -> anyhow::Result<Vec<Meal>> {
    let meals = sqlx::query_as::<_, Meal>(&format!(
        "SELECT {MEAL_COLUMNS} FROM meals m WHERE m.id = ANY($1)"
    ))
    .bind(ids)
    .fetch_all(db)
    .await
    .context("find meals by ids")?;
    Ok(meals)
}

/// Inserts `meal`; timestamps come from column defaults.
pub async fn insert(db: &PgPool, meal: &Meal) -> anyhow::Result<Meal> {
    let saved = sqlx::query_as::<_, Meal>(&format!(
        r#"
        INSERT INTO meals AS m (id, provider_id, category_id, name, slug, description, price,
                               original_price, image, is_vegetarian, is_spicy, is_popular,
                               available, ingredients, preparation_time)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        RETURNING {MEAL_COLUMNS}
        "#
    ))
    .bind(meal.id)
    .bind(meal.provider_id)
    .bind(meal.category_id)
    .bind(&meal.name)
    .bind(&meal.slug)
    .bind(&meal.description)
    .bind(meal.price)
    .bind(meal.original_price)
    .bind(&meal.image)
    .bind(meal.is_vegetarian)
    .bind(meal.is_spicy)
    .bind(meal.is_popular)
    .bind(meal.available)
    .bind(&meal.ingredients)
    .bind(meal.preparation_time)
    .fetch_one(db)
    .await
    .context("insert meal")?;
    Ok(saved)
}

pub async fn update(db: &PgPool, meal: &Meal) -> anyhow::Result<Meal> {
    let saved = sqlx::query_as::<_, Meal>(&format!(
        r#"
        UPDATE meals AS m
           SET category_id = $2, name = $3, slug = $4, description = $5, price = $6,
               original_price = $7, image = $8, is_vegetarian = $9, is_spicy = $10,
               is_popular = $11, available = $12, ingredients = $13, preparation_time = $14,
               updated_at = now()
         WHERE m.id = $1
        RETURNING {MEAL_COLUMNS}
        "#
    ))
    .bind(meal.id)
    .bind(meal.category_id)
    .bind(&meal.name)
    .bind(&meal.slug)
    .bind(&meal.description)
    .bind(meal.price)
    .bind(meal.original_price)
    .bind(&meal.image)
    .bind(meal.is_vegetarian)
    .bind(meal.is_spicy)
    .bind(meal.is_popular)
    .bind(meal.available)
    .bind(&meal.ingredients)
    .bind(meal.preparation_time)
    .fetch_one(db)
    .await
    .context("update meal")?;
    Ok(saved)
}

/// True when any order item references the meal.
pub async fn is_ordered(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let (exists,) =
        sqlx::query_as::<_, (bool,)>("SELECT EXISTS (SELECT 1 FROM order_items WHERE meal_id = $1)")
            .bind(id)
            .fetch_one(db)
            .await
            .context("check meal orders")?;
    Ok(exists)
}

pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM meals WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("delete meal")?;
    Ok(())
}

pub async fn mark_unavailable(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
    sqlx::query("UPDATE meals SET available = FALSE, updated_at = now() WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("mark meal unavailable")?;
    Ok(())
}
