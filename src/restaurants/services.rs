use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::meals;
use crate::meals::dto::MealView;
use crate::providers;
use crate::providers::dto::ProviderProfileView;
use crate::restaurants::dto::RestaurantDetail;
use crate::state::AppState;

pub async fn list(st: &AppState, search: Option<&str>) -> ApiResult<Vec<ProviderProfileView>> {
    let rows = providers::repo::list_listings(&st.db, search)
        .await
        .map_err(ApiError::internal("Error fetching restaurants"))?;
    Ok(rows.into_iter().map(ProviderProfileView::from).collect())
}

pub async fn get(st: &AppState, id: Uuid) -> ApiResult<RestaurantDetail> {
    let listing = providers::repo::find_listing(&st.db, id)
        .await
        .map_err(ApiError::internal("Error fetching restaurant"))?
        .ok_or_else(|| ApiError::not_found("Restaurant not found"))?;

    let rows: Vec<_> = meals::repo::list_by_provider(&st.db, id)
        .await
        .map_err(ApiError::internal("Error fetching restaurant"))?
        .into_iter()
        .filter(|row| row.meal.available)
        .collect();
    let ids: Vec<Uuid> = rows.iter().map(|r| r.meal.id).collect();
    let ratings = meals::repo::ratings_for(&st.db, &ids)
        .await
        .map_err(ApiError::internal("Error fetching restaurant"))?;

    let meals = rows
        .into_iter()
        .map(|row| {
            let summary = ratings.get(&row.meal.id).copied().unwrap_or_default();
            MealView::from_listing(row, summary)
        })
        .collect();

    Ok(RestaurantDetail {
        profile: listing.into(),
        meals,
    })
}
