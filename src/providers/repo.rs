use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use crate::meals::filter::escape_like;
use crate::providers::repo_types::{ProviderListingRow, ProviderProfile, TopMealRow, PROFILE_COLUMNS};

pub async fn find_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<ProviderProfile>> {
    let profile = sqlx::query_as::<_, ProviderProfile>(&format!(
        "SELECT {PROFILE_COLUMNS} FROM provider_profiles p WHERE p.user_id = $1"
    ))
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("find provider by user")?;
    Ok(profile)
}

pub async fn find_listing(db: &PgPool, id: Uuid) -> anyhow::Result<Option<ProviderListingRow>> {
    let row = sqlx::query_as::<_, ProviderListingRow>(&format!(
        r#"
        SELECT {PROFILE_COLUMNS},
               (SELECT COUNT(*) FROM meals m WHERE m.provider_id = p.id AND m.available) AS meals_count
          FROM provider_profiles p
         WHERE p.id = $1
        "#
    ))
    .bind(id)
    .fetch_optional(db)
    .await
    .context("find provider")?;
    Ok(row)
}

/// Public restaurant list, name search case-insensitive.
pub async fn list_listings(
    db: &PgPool,
    search: Option<&str>,
) -> anyhow::Result<Vec<ProviderListingRow>> {
    let pattern = search.map(|s| format!("%{}%", escape_like(s)));
    let rows = sqlx::query_as::<_, ProviderListingRow>(&format!(
        r#"
        SELECT {PROFILE_COLUMNS},
               (SELECT COUNT(*) FROM meals m WHERE m.provider_id = p.id AND m.available) AS meals_count
          FROM provider_profiles p
         WHERE ($1::text IS NULL OR p.restaurant_name ILIKE $1)
         ORDER BY p.restaurant_name
        "#
    ))
    .bind(pattern)
    .fetch_all(db)
    .await
    .context("list providers")?;
    Ok(rows)
}

pub async fn insert(db: &PgPool, profile: &ProviderProfile) -> anyhow::Result<ProviderProfile> {
    let saved = sqlx::query_as::<_, ProviderProfile>(&format!(
        r#"
        INSERT INTO provider_profiles AS p (user_id, restaurant_name, description, address,
                                            phone, logo, cuisine_type, is_open)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {PROFILE_COLUMNS}
        "#
    ))
    .bind(profile.user_id)
    .bind(&profile.restaurant_name)
    .bind(&profile.description)
    .bind(&profile.address)
    .bind(&profile.phone)
    .bind(&profile.logo)
    .bind(&profile.cuisine_type)
    .bind(profile.is_open)
    .fetch_one(db)
    .await
    .context("insert provider profile")?;
    Ok(saved)
}

pub async fn update(db: &PgPool, profile: &ProviderProfile) -> anyhow::Result<ProviderProfile> {
    let saved = sqlx::query_as::<_, ProviderProfile>(&format!(
        r#"
        UPDATE provider_profiles AS p
           SET restaurant_name = $2, description = $3, address = $4, phone = $5,
               logo = $6, cuisine_type = $7, is_open = $8, updated_at = now()
         WHERE p.id = $1
        RETURNING {PROFILE_COLUMNS}
        "#
    ))
    .bind(profile.id)
    .bind(&profile.restaurant_name)
    .bind(&profile.description)
    .bind(&profile.address)
    .bind(&profile.phone)
    .bind(&profile.logo)
    .bind(&profile.cuisine_type)
    .bind(profile.is_open)
    .fetch_one(db)
    .await
    .context("update provider profile")?;
    Ok(saved)
}

pub async fn count_meals(db: &PgPool, provider_id: Uuid) -> anyhow::Result<i64> {
    let (count,) = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM meals WHERE provider_id = $1")
        .bind(provider_id)
        .fetch_one(db)
        .await
        .context("count provider meals")?;
    Ok(count)
}

/// Meals of one provider ranked by units sold, cancelled orders excluded.
pub async fn top_meals(db: &PgPool, provider_id: Uuid, limit: i64) -> anyhow::Result<Vec<TopMealRow>> {
    let rows = sqlx::query_as::<_, TopMealRow>(
        r#"
        SELECT m.id AS meal_id, m.name,
               SUM(oi.quantity)::bigint AS total_sold,
               SUM(oi.quantity * oi.price)::float8 AS revenue
          FROM order_items oi
          JOIN orders o ON o.id = oi.order_id
          JOIN meals m ON m.id = oi.meal_id
         WHERE o.provider_id = $1 AND o.status <> 'CANCELLED'
         GROUP BY m.id, m.name
         ORDER BY total_sold DESC, m.name
         LIMIT $2
        "#,
    )
    .bind(provider_id)
    .bind(limit)
    .fetch_all(db)
    .await
    .context("top meals")?;
    Ok(rows)
}
