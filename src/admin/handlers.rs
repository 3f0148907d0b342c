use axum::{
    extract::State,
    routing::{get, patch},
    Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    admin::{
        dto::{AdminStats, UpdateUserStatusRequest, UserListQuery},
        services,
    },
    auth::{dto::PublicUser, extractors::AuthUser, repo_types::Role},
    error::ApiResult,
    extract::{Json, Path, Query},
    orders::{self, dto::{OrderListQuery, OrderView}},
    response::ApiResponse,
    state::AppState,
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/:id/status", patch(update_user_status))
        .route("/admin/orders", get(list_orders))
        .route("/admin/stats", get(get_stats))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<UserListQuery>,
) -> ApiResult<Json<ApiResponse<Vec<PublicUser>>>> {
    auth.require(&[Role::Admin])?;
    let role = query.role()?;
    Ok(Json(ApiResponse::ok(services::list_users(&state, role).await?)))
}

#[instrument(skip(state, body))]
pub async fn update_user_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateUserStatusRequest>,
) -> ApiResult<Json<ApiResponse<PublicUser>>> {
    auth.require(&[Role::Admin])?;
    let user = services::set_user_status(&state, &auth, id, body.status).await?;
    Ok(Json(ApiResponse::with_message(user, "User status updated")))
}

#[instrument(skip(state))]
pub async fn list_orders(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> ApiResult<Json<ApiResponse<Vec<OrderView>>>> {
    auth.require(&[Role::Admin])?;
    let status = query.status()?;
    Ok(Json(ApiResponse::ok(
        orders::services::list_all(&state, status).await?,
    )))
}

#[instrument(skip(state))]
pub async fn get_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<AdminStats>>> {
    auth.require(&[Role::Admin])?;
    Ok(Json(ApiResponse::ok(services::stats(&state).await?)))
}
