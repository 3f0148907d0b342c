use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::categories;
use crate::db::total_pages;
use crate::error::{is_unique_violation, ApiError, ApiResult};
use crate::meals::dto::{validate_meal_fields, CreateMealRequest, MealPage, MealView, UpdateMealRequest};
use crate::meals::filter::MealFilter;
use crate::meals::repo;
use crate::meals::repo_types::Meal;
use crate::providers::repo_types::ProviderProfile;
use crate::slug::unique_slug;
use crate::state::AppState;

/// One page of available meals, each with its current rating.
pub async fn list_meals(st: &AppState, filter: &MealFilter) -> ApiResult<MealPage> {
    let rows = repo::list_available(&st.db, filter)
        .await
        .map_err(ApiError::internal("Error fetching meals"))?;
    let total = repo::count_available(&st.db, filter)
        .await
        .map_err(ApiError::internal("Error fetching meals"))?;

    let ids: Vec<Uuid> = rows.iter().map(|r| r.meal.id).collect();
    let ratings = repo::ratings_for(&st.db, &ids)
        .await
        .map_err(ApiError::internal("Error fetching meals"))?;

    let meals = rows
        .into_iter()
        .map(|row| {
            let summary = ratings.get(&row.meal.id).copied().unwrap_or_default();
            MealView::from_listing(row, summary)
        })
        .collect();

    Ok(MealPage {
        meals,
        total,
        page: filter.page,
        limit: filter.limit,
        total_pages: total_pages(total, filter.limit),
    })
}

pub async fn get_meal(st: &AppState, id: Uuid) -> ApiResult<MealView> {
    let row = repo::find_available(&st.db, id)
        .await
        .map_err(ApiError::internal("Error fetching meal"))?
        .ok_or_else(|| ApiError::not_found("Meal not found"))?;
    let ratings = repo::ratings_for(&st.db, &[id])
        .await
        .map_err(ApiError::internal("Error fetching meal"))?;
    let summary = ratings.get(&id).copied().unwrap_or_default();
    Ok(MealView::from_listing(row, summary))
}

/// The provider's whole menu, including unavailable meals.
pub async fn list_provider_meals(st: &AppState, provider: &ProviderProfile) -> ApiResult<Vec<MealView>> {
    let rows = repo::list_by_provider(&st.db, provider.id)
        .await
        .map_err(ApiError::internal("Error fetching meals"))?;
    let ids: Vec<Uuid> = rows.iter().map(|r| r.meal.id).collect();
    let ratings = repo::ratings_for(&st.db, &ids)
        .await
        .map_err(ApiError::internal("Error fetching meals"))?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let summary = ratings.get(&row.meal.id).copied().unwrap_or_default();
            MealView::from_listing(row, summary)
        })
        .collect())
}

async fn ensure_category(st: &AppState, category_id: Uuid) -> ApiResult<()> {
    let exists = categories::repo::exists(&st.db, category_id)
        .await
        .map_err(ApiError::internal("Error validating category"))?;
    if !exists {
        return Err(ApiError::bad_request("Category does not exist"));
    }
    Ok(())
}

/// Loads a meal and checks it belongs to `provider`.
async fn owned_meal(st: &AppState, provider: &ProviderProfile, id: Uuid) -> ApiResult<Meal> {
    let meal = repo::find_by_id(&st.db, id)
        .await
        .map_err(ApiError::internal("Error fetching meal"))?
        .ok_or_else(|| ApiError::not_found("Meal not found"))?;
    if meal.provider_id != provider.id {
        warn!(meal_id = %id, provider_id = %provider.id, "meal owned by another provider");
        return Err(ApiError::forbidden("You can only manage your own meals"));
    }
    Ok(meal)
}

pub async fn create_meal(
    st: &AppState,
    provider: &ProviderProfile,
    body: CreateMealRequest,
) -> ApiResult<MealView> {
    body.validate()?;
    ensure_category(st, body.category_id).await?;

    let name = body.name.trim().to_string();
    let now = OffsetDateTime::now_utc();
    let meal = Meal {
        id: Uuid::new_v4(),
        provider_id: provider.id,
        category_id: body.category_id,
        slug: unique_slug(&name),
        name,
        description: body.description,
        price: body.price,
        original_price: body.original_price,
        image: body.image,
        is_vegetarian: body.is_vegetarian,
        is_spicy: body.is_spicy,
        is_popular: body.is_popular,
        available: body.available,
        ingredients: body.ingredients,
        preparation_time: body.preparation_time,
        created_at: now,
        updated_at: now,
    };

    let saved = match repo::insert(&st.db, &meal).await {
        Ok(m) => m,
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::conflict("A meal with this slug already exists"));
        }
        Err(e) => return Err(ApiError::internal("Error creating meal")(e)),
    };
    info!(meal_id = %saved.id, provider_id = %provider.id, "meal created");
    Ok(MealView::from_meal(saved, Default::default()))
}

pub async fn update_meal(
    st: &AppState,
    provider: &ProviderProfile,
    id: Uuid,
    body: UpdateMealRequest,
) -> ApiResult<MealView> {
    let mut meal = owned_meal(st, provider, id).await?;
    let category_changed = body.category_id.is_some_and(|c| c != meal.category_id);

    if body.apply(&mut meal) {
        meal.slug = unique_slug(&meal.name);
    }
    validate_meal_fields(&meal.name, meal.price, meal.original_price, meal.preparation_time)?;
    if category_changed {
        ensure_category(st, meal.category_id).await?;
    }

    let saved = repo::update(&st.db, &meal)
        .await
        .map_err(ApiError::internal("Error updating meal"))?;
    let ratings = repo::ratings_for(&st.db, &[id])
        .await
        .map_err(ApiError::internal("Error updating meal"))?;
    info!(meal_id = %id, "meal updated");
    Ok(MealView::from_meal(
        saved,
        ratings.get(&id).copied().unwrap_or_default(),
    ))
}

/// Outcome of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MealRemoval {
    Deleted,
    /// Ordered before, so kept for order history and hidden instead.
    Hidden,
}

pub async fn delete_meal(st: &AppState, provider: &ProviderProfile, id: Uuid) -> ApiResult<MealRemoval> {
    owned_meal(st, provider, id).await?;
    let ordered = repo::is_ordered(&st.db, id)
        .await
        .map_err(ApiError::internal("Error deleting meal"))?;
    if ordered {
        repo::mark_unavailable(&st.db, id)
            .await
            .map_err(ApiError::internal("Error deleting meal"))?;
        info!(meal_id = %id, "meal has orders; marked unavailable");
        return Ok(MealRemoval::Hidden);
    }
    repo::delete(&st.db, id)
        .await
        .map_err(ApiError::internal("Error deleting meal"))?;
    info!(meal_id = %id, "meal deleted");
    Ok(MealRemoval::Deleted)
}
