use tracing::info;
use uuid::Uuid;

use crate::auth::extractors::AuthUser;
use crate::auth::repo_types::Role;
use crate::error::{is_unique_violation, ApiError, ApiResult};
use crate::orders;
use crate::providers::dto::{CreateProfileRequest, ProviderStats, UpdateProfileRequest};
use crate::providers::repo;
use crate::providers::repo_types::ProviderProfile;
use crate::state::AppState;
use crate::stats::OrderSummary;

const TOP_MEALS: i64 = 5;

/// Profile of the calling provider; 403 for other roles, 404 before the
/// profile exists.
pub async fn require_profile(st: &AppState, auth: &AuthUser) -> ApiResult<ProviderProfile> {
    auth.require(&[Role::Provider])?;
    repo::find_by_user(&st.db, auth.id)
        .await
        .map_err(ApiError::internal("Error fetching provider profile"))?
        .ok_or_else(|| ApiError::not_found("Provider profile not found"))
}

pub async fn create_profile(
    st: &AppState,
    user_id: Uuid,
    body: CreateProfileRequest,
) -> ApiResult<ProviderProfile> {
    let profile = body.into_profile(user_id)?;

    if repo::find_by_user(&st.db, user_id)
        .await
        .map_err(ApiError::internal("Error creating provider profile"))?
        .is_some()
    {
        return Err(ApiError::conflict("Provider profile already exists"));
    }

    let saved = match repo::insert(&st.db, &profile).await {
        Ok(p) => p,
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::conflict("Provider profile already exists"));
        }
        Err(e) => return Err(ApiError::internal("Error creating provider profile")(e)),
    };
    info!(provider_id = %saved.id, %user_id, "provider profile created");
    Ok(saved)
}

pub async fn update_profile(
    st: &AppState,
    mut profile: ProviderProfile,
    body: UpdateProfileRequest,
) -> ApiResult<ProviderProfile> {
    body.apply(&mut profile)?;
    repo::update(&st.db, &profile)
        .await
        .map_err(ApiError::internal("Error updating provider profile"))
}

pub async fn stats(st: &AppState, profile: &ProviderProfile) -> ApiResult<ProviderStats> {
    let rows = orders::repo::status_and_totals(&st.db, Some(profile.id))
        .await
        .map_err(ApiError::internal("Error fetching provider stats"))?;
    let total_meals = repo::count_meals(&st.db, profile.id)
        .await
        .map_err(ApiError::internal("Error fetching provider stats"))?;
    let top_meals = repo::top_meals(&st.db, profile.id, TOP_MEALS)
        .await
        .map_err(ApiError::internal("Error fetching provider stats"))?;

    Ok(ProviderStats {
        orders: OrderSummary::from_rows(rows),
        total_meals,
        top_meals: top_meals.into_iter().map(Into::into).collect(),
    })
}
