use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::{extractors::AuthUser, repo_types::Role},
    error::ApiResult,
    extract::{Json, Path},
    response::{ApiResponse, Created},
    reviews::{
        dto::{CreateReviewRequest, MealReviews, ReviewView},
        services,
    },
    state::AppState,
};

pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/meals/:id/reviews", get(list_reviews))
        .route("/reviews", post(create_review))
}

#[instrument(skip(state))]
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(meal_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<MealReviews>>> {
    Ok(Json(ApiResponse::ok(
        services::list_for_meal(&state, meal_id).await?,
    )))
}

#[instrument(skip(state, body))]
pub async fn create_review(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateReviewRequest>,
) -> ApiResult<Created<ReviewView>> {
    auth.require(&[Role::Customer])?;
    let review = services::create(&state, &auth, body).await?;
    Ok(Created(ApiResponse::with_message(review, "Review submitted")))
}
