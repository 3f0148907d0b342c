use axum::{
    extract::State,
    routing::get,
    Router,
};
use tracing::instrument;

use crate::{
    auth::{extractors::AuthUser, repo_types::Role},
    error::ApiResult,
    extract::Json,
    providers::{
        dto::{CreateProfileRequest, ProviderProfileView, ProviderStats, UpdateProfileRequest},
        services,
    },
    response::{ApiResponse, Created},
    state::AppState,
};

pub fn provider_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/provider/profile",
            get(get_profile).post(create_profile).put(update_profile),
        )
        .route("/provider/stats", get(get_stats))
}

#[instrument(skip(state, body))]
pub async fn create_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateProfileRequest>,
) -> ApiResult<Created<ProviderProfileView>> {
    auth.require(&[Role::Provider])?;
    let profile = services::create_profile(&state, auth.id, body).await?;
    Ok(Created(ApiResponse::with_message(
        profile.into(),
        "Provider profile created",
    )))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<ProviderProfileView>>> {
    let profile = services::require_profile(&state, &auth).await?;
    Ok(Json(ApiResponse::ok(profile.into())))
}

#[instrument(skip(state, body))]
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ApiResponse<ProviderProfileView>>> {
    let profile = services::require_profile(&state, &auth).await?;
    let saved = services::update_profile(&state, profile, body).await?;
    Ok(Json(ApiResponse::with_message(
        saved.into(),
        "Provider profile updated",
    )))
}

#[instrument(skip(state))]
pub async fn get_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<ProviderStats>>> {
    let profile = services::require_profile(&state, &auth).await?;
    Ok(Json(ApiResponse::ok(services::stats(&state, &profile).await?)))
}
