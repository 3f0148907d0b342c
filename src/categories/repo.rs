use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use crate::categories::repo_types::{Category, CategoryRow, CATEGORY_COLUMNS};

fn counted_select() -> String {
    format!(
        "SELECT {CATEGORY_COLUMNS}, \
         (SELECT COUNT(*) FROM meals m WHERE m.category_id = c.id AND m.available) AS meals_count \
         FROM categories c"
    )
}

pub async fn list(db: &PgPool) -> anyhow::Result<Vec<CategoryRow>> {
    let rows = sqlx::query_as::<_, CategoryRow>(&format!("{} ORDER BY c.name", counted_select()))
        .fetch_all(db)
        .await
        .context("list categories")?;
    Ok(rows)
}

pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<CategoryRow>> {
    let row = sqlx::query_as::<_, CategoryRow>(&format!("{} WHERE c.id = $1", counted_select()))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find category")?;
    Ok(row)
}

pub async fn exists(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let (exists,) =
        sqlx::query_as::<_, (bool,)>("SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1)")
            .bind(id)
            .fetch_one(db)
            .await
            .context("check category")?;
    Ok(exists)
}

pub async fn insert(
    db: &PgPool,
    name: &str,
    slug: &str,
    description: Option<&str>,
    image: Option<&str>,
) -> anyhow::Result<Category> {
    let category = sqlx::query_as::<_, Category>(&format!(
        r#"
        INSERT INTO categories AS c (name, slug, description, image)
        VALUES ($1, $2, $3, $4)
        RETURNING {CATEGORY_COLUMNS}
        "#
    ))
    .bind(name)
    .bind(slug)
    .bind(description)
    .bind(image)
    .fetch_one(db)
    .await
    .context("insert category")?;
    Ok(category)
}

pub async fn update(db: &PgPool, category: &Category) -> anyhow::Result<Option<Category>> {
    let saved = sqlx::query_as::<_, Category>(&format!(
        r#"
        UPDATE categories AS c
           SET name = $2, slug = $3, description = $4, image = $5
         WHERE c.id = $1
        RETURNING {CATEGORY_COLUMNS}
        "#
    ))
    .bind(category.id)
    .bind(&category.name)
    .bind(&category.slug)
    .bind(&category.description)
    .bind(&category.image)
    .fetch_optional(db)
    .await
    .context("update category")?;
    Ok(saved)
}

/// Meals referencing the category, available or not.
pub async fn count_meals(db: &PgPool, id: Uuid) -> anyhow::Result<i64> {
    let (count,) = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM meals WHERE category_id = $1")
        .bind(id)
        .fetch_one(db)
        .await
        .context("count category meals")?;
    Ok(count)
}

/// Deletes the category; false when it did not exist.
pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("delete category")?;
    Ok(res.rows_affected() > 0)
}
