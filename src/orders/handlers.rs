use axum::{
    extract::State,
    routing::{get, patch},
    Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::{extractors::AuthUser, repo_types::Role},
    error::ApiResult,
    extract::{Json, Path, Query},
    orders::{
        dto::{CreateOrderRequest, OrderListQuery, OrderView, UpdateOrderStatusRequest},
        services,
    },
    providers,
    response::{ApiResponse, Created},
    state::AppState,
};

pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/cancel", patch(cancel_order))
}

pub fn provider_routes() -> Router<AppState> {
    Router::new()
        .route("/provider/orders", get(list_provider_orders))
        .route("/provider/orders/:id/status", patch(update_order_status))
}

#[instrument(skip(state, body))]
pub async fn create_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateOrderRequest>,
) -> ApiResult<Created<OrderView>> {
    auth.require(&[Role::Customer])?;
    let order = services::create(&state, &auth, body).await?;
    Ok(Created(ApiResponse::with_message(order, "Order placed")))
}

#[instrument(skip(state))]
pub async fn list_orders(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<OrderView>>>> {
    auth.require(&[Role::Customer])?;
    Ok(Json(ApiResponse::ok(
        services::list_for_customer(&state, &auth).await?,
    )))
}

#[instrument(skip(state))]
pub async fn get_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<OrderView>>> {
    Ok(Json(ApiResponse::ok(services::get(&state, &auth, id).await?)))
}

#[instrument(skip(state))]
pub async fn cancel_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<OrderView>>> {
    auth.require(&[Role::Customer])?;
    let order = services::cancel(&state, &auth, id).await?;
    Ok(Json(ApiResponse::with_message(order, "Order cancelled")))
}

#[instrument(skip(state))]
pub async fn list_provider_orders(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> ApiResult<Json<ApiResponse<Vec<OrderView>>>> {
    auth.require(&[Role::Provider])?;
    let status = query.status()?;
    let provider = providers::services::require_profile(&state, &auth).await?;
    Ok(Json(ApiResponse::ok(
        services::list_for_provider(&state, &provider, status).await?,
    )))
}

#[instrument(skip(state, body))]
pub async fn update_order_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateOrderStatusRequest>,
) -> ApiResult<Json<ApiResponse<OrderView>>> {
    let provider = providers::services::require_profile(&state, &auth).await?;
    let order = services::update_status(&state, &provider, id, body.status).await?;
    Ok(Json(ApiResponse::with_message(order, "Order status updated")))
}
