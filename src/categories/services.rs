use tracing::{info, warn};
use uuid::Uuid;

use crate::categories::dto::{CreateCategoryRequest, UpdateCategoryRequest};
use crate::categories::repo;
use crate::categories::repo_types::{Category, CategoryRow};
use crate::error::{is_foreign_key_violation, is_unique_violation, ApiError, ApiResult};
use crate::slug::slugify;
use crate::state::AppState;

/// A category can only go once no meal points at it.
pub fn ensure_deletable(meals_count: i64) -> ApiResult<()> {
    if meals_count > 0 {
        return Err(ApiError::conflict(format!(
            "Cannot delete category with {meals_count} existing meal(s)"
        )));
    }
    Ok(())
}

fn normalized_name(name: &str) -> ApiResult<(String, String)> {
    let name = name.trim().to_string();
    let slug = slugify(&name);
    if name.is_empty() || slug.is_empty() {
        return Err(ApiError::bad_request("Category name is required"));
    }
    Ok((name, slug))
}

pub async fn list(st: &AppState) -> ApiResult<Vec<CategoryRow>> {
    repo::list(&st.db)
        .await
        .map_err(ApiError::internal("Error fetching categories"))
}

pub async fn get(st: &AppState, id: Uuid) -> ApiResult<CategoryRow> {
    repo::find(&st.db, id)
        .await
        .map_err(ApiError::internal("Error fetching category"))?
        .ok_or_else(|| ApiError::not_found("Category not found"))
}

pub async fn create(st: &AppState, body: CreateCategoryRequest) -> ApiResult<Category> {
    let (name, slug) = normalized_name(&body.name)?;
    match repo::insert(
        &st.db,
        &name,
        &slug,
        body.description.as_deref(),
        body.image.as_deref(),
    )
    .await
    {
        Ok(c) => {
            info!(category_id = %c.id, name = %c.name, "category created");
            Ok(c)
        }
        Err(e) if is_unique_violation(&e) => Err(ApiError::conflict("Category already exists")),
        Err(e) => Err(ApiError::internal("Error creating category")(e)),
    }
}

pub async fn update(st: &AppState, id: Uuid, body: UpdateCategoryRequest) -> ApiResult<Category> {
    let mut category = get(st, id).await?.category;
    if let Some(name) = body.name {
        let (name, slug) = normalized_name(&name)?;
        category.name = name;
        category.slug = slug;
    }
    if let Some(v) = body.description {
        category.description = Some(v);
    }
    if let Some(v) = body.image {
        category.image = Some(v);
    }
    match repo::update(&st.db, &category).await {
        Ok(Some(c)) => Ok(c),
        Ok(None) => Err(ApiError::not_found("Category not found")),
        Err(e) if is_unique_violation(&e) => Err(ApiError::conflict("Category already exists")),
        Err(e) => Err(ApiError::internal("Error updating category")(e)),
    }
}

pub async fn delete(st: &AppState, id: Uuid) -> ApiResult<()> {
    let meals_count = repo::count_meals(&st.db, id)
        .await
        .map_err(ApiError::internal("Error deleting category"))?;
    if let Err(e) = ensure_deletable(meals_count) {
        warn!(category_id = %id, meals_count, "category still in use");
        return Err(e);
    }
    match repo::delete(&st.db, id).await {
        Ok(true) => {
            info!(category_id = %id, "category deleted");
            Ok(())
        }
        Ok(false) => Err(ApiError::not_found("Category not found")),
        // a meal was added between the count and the delete
        Err(e) if is_foreign_key_violation(&e) => ensure_deletable(1),
        Err(e) => Err(ApiError::internal("Error deleting category")(e)),
    }
}
