use axum::{
    extract::State,
    routing::{get, put},
    Router,
};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    error::ApiResult,
    extract::{Json, Path, Query},
    providers,
    response::{ApiResponse, Created},
    state::AppState,
};

use super::dto::{CreateMealRequest, MealPage, MealView, UpdateMealRequest};
use super::filter::{MealFilter, MealListParams};
use super::services::{self, MealRemoval};

// --- public routers ---

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals))
        .route("/meals/:id", get(get_meal))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/provider/meals", get(list_provider_meals).post(create_meal))
        .route(
            "/provider/meals/:id",
            put(update_meal).delete(delete_meal),
        )
}

// --- handlers ---

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<Json<ApiResponse<MealPage>>> {
    let filter = MealFilter::try_from(MealListParams::from_pairs(pairs))?;
    debug!(?filter, "meal search");
    let page = services::list_meals(&state, &filter).await?;
    Ok(Json(ApiResponse::ok(page)))
}

#[instrument(skip(state))]
pub async fn get_meal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<MealView>>> {
    Ok(Json(ApiResponse::ok(services::get_meal(&state, id).await?)))
}

#[instrument(skip(state))]
pub async fn list_provider_meals(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<MealView>>>> {
    let provider = providers::services::require_profile(&state, &auth).await?;
    let meals = services::list_provider_meals(&state, &provider).await?;
    Ok(Json(ApiResponse::ok(meals)))
}

#[instrument(skip(state, body))]
pub async fn create_meal(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateMealRequest>,
) -> ApiResult<Created<MealView>> {
    let provider = providers::services::require_profile(&state, &auth).await?;
    let meal = services::create_meal(&state, &provider, body).await?;
    Ok(Created(ApiResponse::with_message(meal, "Meal created")))
}

#[instrument(skip(state, body))]
pub async fn update_meal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateMealRequest>,
) -> ApiResult<Json<ApiResponse<MealView>>> {
    let provider = providers::services::require_profile(&state, &auth).await?;
    let meal = services::update_meal(&state, &provider, id, body).await?;
    Ok(Json(ApiResponse::with_message(meal, "Meal updated")))
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let provider = providers::services::require_profile(&state, &auth).await?;
    let message = match services::delete_meal(&state, &provider, id).await? {
        MealRemoval::Deleted => "Meal deleted",
        MealRemoval::Hidden => "Meal has existing orders and was marked unavailable",
    };
    Ok(Json(ApiResponse::with_message((), message)))
}
