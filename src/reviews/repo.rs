use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use crate::reviews::repo_types::ReviewRow;

pub async fn list_for_meal(db: &PgPool, meal_id: Uuid) -> anyhow::Result<Vec<ReviewRow>> {
    let rows = sqlx::query_as::<_, ReviewRow>(
        r#"
        SELECT r.id, r.meal_id, r.user_id, u.name AS user_name, r.rating, r.comment, r.created_at
          FROM reviews r
          JOIN users u ON u.id = r.user_id
         WHERE r.meal_id = $1
         ORDER BY r.created_at DESC
        "#,
    )
    .bind(meal_id)
    .fetch_all(db)
    .await
    .context("list reviews")?;
    Ok(rows)
}

pub async fn insert(
    db: &PgPool,
    meal_id: Uuid,
    user_id: Uuid,
    rating: i32,
    comment: Option<&str>,
) -> anyhow::Result<ReviewRow> {
    let row = sqlx::query_as::<_, ReviewRow>(
        r#"
        WITH inserted AS (
            INSERT INTO reviews (meal_id, user_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING id, meal_id, user_id, rating, comment, created_at
        )
        SELECT i.id, i.meal_id, i.user_id, u.name AS user_name, i.rating, i.comment, i.created_at
          FROM inserted i
          JOIN users u ON u.id = i.user_id
        "#,
    )
    .bind(meal_id)
    .bind(user_id)
    .bind(rating)
    .bind(comment)
    .fetch_one(db)
    .await
    .context("insert review")?;
    Ok(row)
}
