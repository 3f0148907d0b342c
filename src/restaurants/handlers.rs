use axum::{
    extract::State,
    routing::get,
    Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    error::ApiResult,
    extract::{Json, Path, Query},
    providers::dto::ProviderProfileView,
    response::ApiResponse,
    restaurants::{
        dto::{RestaurantDetail, RestaurantQuery},
        services,
    },
    state::AppState,
};

pub fn restaurant_routes() -> Router<AppState> {
    Router::new()
        .route("/restaurants", get(list_restaurants))
        .route("/restaurants/:id", get(get_restaurant))
}

#[instrument(skip(state))]
pub async fn list_restaurants(
    State(state): State<AppState>,
    Query(query): Query<RestaurantQuery>,
) -> ApiResult<Json<ApiResponse<Vec<ProviderProfileView>>>> {
    Ok(Json(ApiResponse::ok(
        services::list(&state, query.search()).await?,
    )))
}

#[instrument(skip(state))]
pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<RestaurantDetail>>> {
    Ok(Json(ApiResponse::ok(services::get(&state, id).await?)))
}
