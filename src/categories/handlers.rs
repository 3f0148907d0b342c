use axum::{
    extract::State,
    routing::{get, post, put},
    Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::{extractors::AuthUser, repo_types::Role},
    categories::{
        dto::{CategoryView, CreateCategoryRequest, UpdateCategoryRequest},
        services,
    },
    error::ApiResult,
    extract::{Json, Path},
    response::{ApiResponse, Created},
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/categories/:id", get(get_category))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/categories", post(create_category))
        .route(
            "/admin/categories/:id",
            put(update_category).delete(delete_category),
        )
}

#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<CategoryView>>>> {
    let rows = services::list(&state).await?;
    Ok(Json(ApiResponse::ok(
        rows.into_iter().map(CategoryView::from).collect(),
    )))
}

#[instrument(skip(state))]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<CategoryView>>> {
    let row = services::get(&state, id).await?;
    Ok(Json(ApiResponse::ok(row.into())))
}

#[instrument(skip(state, body))]
pub async fn create_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateCategoryRequest>,
) -> ApiResult<Created<CategoryView>> {
    auth.require(&[Role::Admin])?;
    let category = services::create(&state, body).await?;
    Ok(Created(ApiResponse::with_message(
        category.into(),
        "Category created",
    )))
}

#[instrument(skip(state, body))]
pub async fn update_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateCategoryRequest>,
) -> ApiResult<Json<ApiResponse<CategoryView>>> {
    auth.require(&[Role::Admin])?;
    let category = services::update(&state, id, body).await?;
    Ok(Json(ApiResponse::with_message(
        category.into(),
        "Category updated",
    )))
}

#[instrument(skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    auth.require(&[Role::Admin])?;
    services::delete(&state, id).await?;
    Ok(Json(ApiResponse::with_message((), "Category deleted")))
}
